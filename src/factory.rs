//! Opaque content factories.
//!
//! Factories are pure constructors: they build one attachable content unit into the
//! arena and return its root handle, without reading any ambient state. Shape
//! parameters are always drawn by the *caller* from the chunk RNG and passed in, so
//! the random stream consumed per chunk stays deterministic no matter which factory
//! implementation is plugged in.

use glam::Vec3;

use thiserror::Error;

use crate::content::{ContentArena, ContentNode, NodeId};


/// Error type for content factories. A failed factory call means one prop is
/// silently omitted from its chunk, it never corrupts the chunk as a whole.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// The factory does not know how to build the requested content.
    #[error("unsupported content spec")]
    Unsupported,
}


/// Scatter prop kinds placed by the default generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropSpec {
    CypressTree,
    OliveTree,
    Rock { radius: f64 },
    Flower,
}

/// Column order of a [`StructureSpec::Column`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnOrder {
    Doric,
    Ionic,
    Corinthian,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempleParams {
    pub cols: u32,
    pub rows: u32,
    pub column_height: f64,
    pub col_spacing_x: f64,
    pub col_spacing_z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VillaParams {
    pub width: f64,
    pub depth: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnParams {
    pub height: f64,
    pub radius: f64,
    pub order: ColumnOrder,
}

/// Rare structure kinds, with their fully drawn shape parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StructureSpec {
    Temple(TempleParams),
    Villa(VillaParams),
    Column(ColumnParams),
    Statue,
    Obelisk { height: f64 },
}


/// A constructor of opaque content units. Implementations must confine every
/// allocation to the given arena so that disposal by traversal from the returned
/// root reaches all of it.
pub trait ContentFactory {

    /// Build one scatter prop and return its root node, with identity transform.
    fn make_prop(&self, arena: &mut ContentArena, spec: &PropSpec) -> Result<NodeId, FactoryError>;

    /// Build one structure and return its root node, with identity transform.
    fn make_structure(&self, arena: &mut ContentArena, spec: &StructureSpec) -> Result<NodeId, FactoryError>;

}


/// Reference factory producing simple placeholder content trees. Each visible part
/// owns one geometry buffer and one or more materials, which is what matters to the
/// streaming core; the actual vertex data is the display pipeline's business.
#[derive(Debug, Default)]
pub struct BasicFactory;

impl BasicFactory {

    /// Build a leaf node owning one geometry and one material.
    fn leaf(&self, arena: &mut ContentArena, name: &str, position: Vec3) -> NodeId {
        let mut node = ContentNode::new(name);
        node.position = position;
        node.geometry = Some(arena.alloc_geometry());
        node.materials.push(arena.alloc_material());
        arena.insert(node)
    }

    fn tree(&self, arena: &mut ContentArena, name: &str, trunk_height: f32) -> NodeId {
        let root = arena.insert(ContentNode::new(name));
        let trunk = self.leaf(arena, "trunk", Vec3::new(0.0, trunk_height * 0.5, 0.0));
        let foliage = self.leaf(arena, "foliage", Vec3::new(0.0, trunk_height, 0.0));
        arena.attach_child(root, trunk);
        arena.attach_child(root, foliage);
        root
    }

}

impl ContentFactory for BasicFactory {

    fn make_prop(&self, arena: &mut ContentArena, spec: &PropSpec) -> Result<NodeId, FactoryError> {
        Ok(match *spec {
            PropSpec::CypressTree => self.tree(arena, "cypress", 3.2),
            PropSpec::OliveTree => self.tree(arena, "olive", 2.1),
            PropSpec::Rock { radius } => {
                let rock = self.leaf(arena, "rock", Vec3::ZERO);
                if let Some(node) = arena.get_mut(rock) {
                    node.scale = Vec3::splat(radius as f32);
                }
                rock
            }
            PropSpec::Flower => {
                let root = arena.insert(ContentNode::new("flower"));
                let stem = self.leaf(arena, "stem", Vec3::new(0.0, 0.12, 0.0));
                let petal = self.leaf(arena, "petal", Vec3::new(0.0, 0.28, 0.0));
                arena.attach_child(root, stem);
                arena.attach_child(root, petal);
                root
            }
        })
    }

    fn make_structure(&self, arena: &mut ContentArena, spec: &StructureSpec) -> Result<NodeId, FactoryError> {
        Ok(match *spec {
            StructureSpec::Temple(params) => {

                let root = arena.insert(ContentNode::new("temple"));
                let floor = self.leaf(arena, "floor", Vec3::ZERO);
                arena.attach_child(root, floor);

                // Peristyle: one column per grid slot along the outer edge.
                for col in 0..params.cols {
                    for row in 0..params.rows {
                        if col != 0 && col != params.cols - 1 && row != 0 && row != params.rows - 1 {
                            continue;
                        }
                        let position = Vec3::new(
                            col as f32 * params.col_spacing_x as f32,
                            params.column_height as f32 * 0.5,
                            row as f32 * params.col_spacing_z as f32,
                        );
                        let column = self.leaf(arena, "column", position);
                        arena.attach_child(root, column);
                    }
                }

                root

            }
            StructureSpec::Villa(params) => {
                let root = arena.insert(ContentNode::new("villa"));
                let body = self.leaf(arena, "body", Vec3::new(0.0, params.height as f32 * 0.5, 0.0));
                let roof = self.leaf(arena, "roof", Vec3::new(0.0, params.height as f32, 0.0));
                if let Some(node) = arena.get_mut(body) {
                    node.scale = Vec3::new(params.width as f32, params.height as f32, params.depth as f32);
                }
                arena.attach_child(root, body);
                arena.attach_child(root, roof);
                root
            }
            StructureSpec::Column(params) => {
                let order = match params.order {
                    ColumnOrder::Doric => "doric",
                    ColumnOrder::Ionic => "ionic",
                    ColumnOrder::Corinthian => "corinthian",
                };
                let root = arena.insert(ContentNode::new(format!("column_{order}")));
                let shaft = self.leaf(arena, "shaft", Vec3::new(0.0, params.height as f32 * 0.5, 0.0));
                if let Some(node) = arena.get_mut(shaft) {
                    node.scale = Vec3::new(params.radius as f32, params.height as f32, params.radius as f32);
                }
                let capital = self.leaf(arena, "capital", Vec3::new(0.0, params.height as f32, 0.0));
                arena.attach_child(root, shaft);
                arena.attach_child(root, capital);
                root
            }
            StructureSpec::Statue => {
                let root = arena.insert(ContentNode::new("statue"));
                let pedestal = self.leaf(arena, "pedestal", Vec3::new(0.0, 0.4, 0.0));
                let figure = self.leaf(arena, "figure", Vec3::new(0.0, 1.6, 0.0));
                arena.attach_child(root, pedestal);
                arena.attach_child(root, figure);
                root
            }
            StructureSpec::Obelisk { height } => {
                let root = arena.insert(ContentNode::new("obelisk"));
                let shaft = self.leaf(arena, "shaft", Vec3::new(0.0, height as f32 * 0.5, 0.0));
                let cap = self.leaf(arena, "cap", Vec3::new(0.0, height as f32, 0.0));
                arena.attach_child(root, shaft);
                arena.attach_child(root, cap);
                root
            }
        })
    }

}


#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn props_are_fully_disposable() {
        let mut arena = ContentArena::new();
        let factory = BasicFactory;
        for spec in [
            PropSpec::CypressTree,
            PropSpec::OliveTree,
            PropSpec::Rock { radius: 0.8 },
            PropSpec::Flower,
        ] {
            let root = factory.make_prop(&mut arena, &spec).unwrap();
            assert!(arena.live_resources() > 0);
            arena.dispose(root);
            assert_eq!(arena.live_resources(), 0, "leak for {spec:?}");
            assert_eq!(arena.live_nodes(), 0, "node leak for {spec:?}");
        }
    }

    #[test]
    fn temple_peristyle_size() {
        let mut arena = ContentArena::new();
        let factory = BasicFactory;
        let root = factory.make_structure(&mut arena, &StructureSpec::Temple(TempleParams {
            cols: 6,
            rows: 9,
            column_height: 5.5,
            col_spacing_x: 2.4,
            col_spacing_z: 2.6,
        })).unwrap();
        // Outer ring of a 6x9 grid plus the floor slab.
        let children = &arena.get(root).unwrap().children;
        assert_eq!(children.len(), 1 + (6 * 9 - 4 * 7));
        arena.dispose(root);
        assert_eq!(arena.live_resources(), 0);
    }

}
