//! Default generator: scatter props and rare structures.

use std::f64::consts::{PI, TAU};

use glam::Vec3;

use tracing::trace;

use crate::factory::{
    BasicFactory, ColumnOrder, ColumnParams, ContentFactory, PropSpec, StructureSpec,
    TempleParams, VillaParams,
};
use crate::content::NodeId;

use super::{GenContext, GenError, Generator};


/// Probability of a second structure in a chunk.
const SECOND_STRUCTURE_CHANCE: f64 = 0.35;
/// Probability of a third structure in a chunk.
const THIRD_STRUCTURE_CHANCE: f64 = 0.15;


/// The reference generator. Places trees, rocks and flowers at uniformly sampled
/// chunk-local positions according to the configured densities, then one to three
/// rare structures with a weighted kind selection.
///
/// All shape parameters are drawn from the chunk RNG *before* the factory is
/// invoked, so a failing factory omits one prop without shifting the random stream
/// of everything placed after it.
pub struct ScatterGenerator {
    factory: Box<dyn ContentFactory>,
}

impl ScatterGenerator {

    pub fn new() -> Self {
        Self::with_factory(Box::new(BasicFactory))
    }

    pub fn with_factory(factory: Box<dyn ContentFactory>) -> Self {
        Self { factory }
    }

    /// Build a prop and place it under the chunk root, ignoring factory failure.
    fn place_prop(&self, ctx: &mut GenContext, spec: &PropSpec, position: Vec3, rotation: Vec3, scale: Vec3) {
        match self.factory.make_prop(ctx.arena, spec) {
            Ok(node) => attach(ctx, node, position, rotation, scale),
            Err(err) => trace!("prop omitted in chunk ({}, {}): {err}", ctx.ix, ctx.iz),
        }
    }

}

impl Default for ScatterGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for ScatterGenerator {

    fn generate(&self, ctx: &mut GenContext) -> Result<(), GenError> {

        let size = ctx.size;

        // Trees, an even mix of cypress and olive.
        for _ in 0..ctx.densities.trees {
            let spec = if ctx.rand.next_chance(0.5) {
                PropSpec::CypressTree
            } else {
                PropSpec::OliveTree
            };
            let x = ctx.rand.next_range(0.0, size) as f32;
            let z = ctx.rand.next_range(0.0, size) as f32;
            let rot_y = ctx.rand.next_range(0.0, TAU) as f32;
            let scale = ctx.rand.next_range(0.85, 1.25) as f32;
            self.place_prop(ctx, &spec,
                Vec3::new(x, 0.0, z),
                Vec3::new(0.0, rot_y, 0.0),
                Vec3::splat(scale));
        }

        // Rocks, tumbled on all three axes and slightly sunk into the ground.
        for _ in 0..ctx.densities.rocks {
            let radius = ctx.rand.next_range(0.4, 1.3);
            let x = ctx.rand.next_range(0.0, size) as f32;
            let z = ctx.rand.next_range(0.0, size) as f32;
            let rotation = Vec3::new(
                ctx.rand.next_range(0.0, PI) as f32,
                ctx.rand.next_range(0.0, PI) as f32,
                ctx.rand.next_range(0.0, PI) as f32,
            );
            self.place_prop(ctx, &PropSpec::Rock { radius },
                Vec3::new(x, 0.02, z),
                rotation,
                Vec3::ONE);
        }

        // Flowers.
        for _ in 0..ctx.densities.flowers {
            let x = ctx.rand.next_range(0.0, size) as f32;
            let z = ctx.rand.next_range(0.0, size) as f32;
            let scale = ctx.rand.next_range(0.8, 1.2) as f32;
            self.place_prop(ctx, &PropSpec::Flower,
                Vec3::new(x, 0.0, z),
                Vec3::ZERO,
                Vec3::splat(scale));
        }

        // Rare structures: always at least one per chunk, with probabilistic extras
        // to avoid overcrowding.
        let count = structure_count(ctx.rand);
        for _ in 0..count {

            let x = ctx.rand.next_range(0.0, size) as f32;
            let z = ctx.rand.next_range(0.0, size) as f32;
            let rot_y = ctx.rand.next_range(0.0, TAU) as f32;

            let which = ctx.rand.next_double();
            let (spec, scale) = if which < 0.2 {
                (StructureSpec::Temple(TempleParams {
                    cols: (ctx.rand.next_range(6.0, 9.0).floor() as u32).max(5),
                    rows: (ctx.rand.next_range(9.0, 12.0).floor() as u32).max(7),
                    column_height: ctx.rand.next_range(5.2, 6.2),
                    col_spacing_x: ctx.rand.next_range(2.2, 2.8),
                    col_spacing_z: ctx.rand.next_range(2.3, 3.0),
                }), 1.0)
            } else if which < 0.45 {
                let params = VillaParams {
                    width: ctx.rand.next_range(10.0, 16.0),
                    depth: ctx.rand.next_range(8.0, 12.0),
                    height: ctx.rand.next_range(3.5, 5.2),
                };
                (StructureSpec::Villa(params), ctx.rand.next_range(0.9, 1.2))
            } else if which < 0.7 {
                (StructureSpec::Column(ColumnParams {
                    height: ctx.rand.next_range(4.2, 6.2),
                    radius: ctx.rand.next_range(0.24, 0.34),
                    order: match ctx.rand.next_range(0.0, 3.0).floor() as u32 {
                        0 => ColumnOrder::Doric,
                        1 => ColumnOrder::Ionic,
                        _ => ColumnOrder::Corinthian,
                    },
                }), 1.0)
            } else if which < 0.85 {
                (StructureSpec::Statue, 1.0)
            } else {
                (StructureSpec::Obelisk { height: ctx.rand.next_range(5.5, 7.5) }, 1.0)
            };

            match self.factory.make_structure(ctx.arena, &spec) {
                Ok(node) => attach(ctx, node,
                    Vec3::new(x, 0.0, z),
                    Vec3::new(0.0, rot_y, 0.0),
                    Vec3::splat(scale as f32)),
                Err(err) => trace!("structure omitted in chunk ({}, {}): {err}", ctx.ix, ctx.iz),
            }

        }

        Ok(())

    }

}

/// Set a node's local transform and register it under the chunk root.
fn attach(ctx: &mut GenContext, node: NodeId, position: Vec3, rotation: Vec3, scale: Vec3) {
    if let Some(content) = ctx.arena.get_mut(node) {
        content.position = position;
        content.rotation = rotation;
        content.scale = scale;
    }
    ctx.arena.attach_child(ctx.root, node);
}

/// Draw the structure count for one chunk, in `{1, 2, 3}` with a skewed
/// distribution. Both chance draws are always consumed so the random stream
/// advances the same amount per chunk; the third structure only stacks on top of
/// the second.
fn structure_count(rand: &mut crate::rand::ChunkRand) -> u32 {
    let second = rand.next_chance(SECOND_STRUCTURE_CHANCE);
    let third = rand.next_chance(THIRD_STRUCTURE_CHANCE);
    1 + u32::from(second) + u32::from(second && third)
}


#[cfg(test)]
mod tests {

    use glam::DVec3;

    use crate::content::{ContentArena, ContentNode};
    use crate::rand::{ChunkRand, derive_chunk_seed};

    use super::*;
    use super::super::Densities;

    /// Run the scatter generator once for the given chunk and return a flat
    /// snapshot of every node reachable from the chunk root.
    fn generate_snapshot(world_seed: u32, ix: i32, iz: i32) -> Vec<(String, Vec3, Vec3, Vec3)> {

        let mut arena = ContentArena::new();
        let root = arena.insert(ContentNode::new(format!("chunk_{ix}_{iz}")));
        let mut rand = ChunkRand::new(derive_chunk_seed(world_seed, ix, iz));
        let densities = Densities::default();

        let generator = ScatterGenerator::new();
        let mut ctx = GenContext {
            ix, iz,
            origin: DVec3::ZERO,
            size: 200.0,
            root,
            arena: &mut arena,
            rand: &mut rand,
            densities: &densities,
        };
        generator.generate(&mut ctx).unwrap();

        let mut snapshot = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = arena.get(id).unwrap();
            snapshot.push((node.name.clone(), node.position, node.rotation, node.scale));
            stack.extend(node.children.iter().copied());
        }
        snapshot

    }

    #[test]
    fn deterministic_per_chunk() {
        let a = generate_snapshot(1337, 4, -9);
        let b = generate_snapshot(1337, 4, -9);
        assert_eq!(a, b);
        // A neighbor chunk must not repeat the same layout.
        let c = generate_snapshot(1337, 5, -9);
        assert_ne!(a, c);
    }

    #[test]
    fn respects_densities() {
        let mut arena = ContentArena::new();
        let root = arena.insert(ContentNode::new("chunk"));
        let mut rand = ChunkRand::new(99);
        let densities = Densities { trees: 5, rocks: 2, flowers: 3 };

        let generator = ScatterGenerator::new();
        let mut ctx = GenContext {
            ix: 0, iz: 0,
            origin: DVec3::ZERO,
            size: 100.0,
            root,
            arena: &mut arena,
            rand: &mut rand,
            densities: &densities,
        };
        generator.generate(&mut ctx).unwrap();

        // 10 scatter props plus 1 to 3 structures directly under the root.
        let children = arena.get(root).unwrap().children.len();
        assert!((11..=13).contains(&children), "unexpected child count {children}");
    }

    #[test]
    fn positions_inside_chunk() {
        let snapshot = generate_snapshot(42, 0, 0);
        for (name, position, _, _) in &snapshot[1..] {
            // Only top-level placements are chunk-local samples, but no part may
            // stray below zero anyway.
            assert!(position.x >= 0.0 && position.z >= 0.0, "{name} at {position}");
            assert!(position.x < 200.0 && position.z < 200.0, "{name} at {position}");
        }
    }

    #[test]
    fn structure_count_distribution() {
        let mut rand = ChunkRand::new(9001);
        let mut counts = [0u32; 3];
        const SAMPLES: u32 = 10_000;
        for _ in 0..SAMPLES {
            counts[structure_count(&mut rand) as usize - 1] += 1;
        }
        let freq = |n: u32| n as f64 / SAMPLES as f64;
        // Analytic: P(1) = 0.65, P(2) = 0.35 * 0.85, P(3) = 0.35 * 0.15.
        assert!((freq(counts[0]) - 0.65).abs() < 0.02, "P(1) = {}", freq(counts[0]));
        assert!((freq(counts[1]) - 0.2975).abs() < 0.02, "P(2) = {}", freq(counts[1]));
        assert!((freq(counts[2]) - 0.0525).abs() < 0.01, "P(3) = {}", freq(counts[2]));
    }

}
