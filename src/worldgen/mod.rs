//! Chunk content generation.
//!
//! Generators form a closed, ordered registry owned by the chunk manager. Each one
//! is invoked exactly once per chunk load with a [`GenContext`] and may append
//! content under the chunk root. Generators must be pure with respect to the
//! context: everything they produce comes from the context RNG and densities, and
//! everything they allocate goes into the context arena, so a chunk's content is a
//! function of `(world seed, ix, iz, densities, registry)` alone.

use glam::DVec3;

use thiserror::Error;
use serde::{Serialize, Deserialize};

use crate::content::{ContentArena, NodeId};
use crate::factory::FactoryError;
use crate::rand::ChunkRand;

mod scatter;
pub use scatter::ScatterGenerator;


/// Named content counts per scatter category, per chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Densities {
    pub trees: u32,
    pub rocks: u32,
    pub flowers: u32,
}

impl Default for Densities {
    fn default() -> Self {
        Self { trees: 40, rocks: 16, flowers: 60 }
    }
}


/// Error returned by a failing generator. The chunk manager logs it and keeps
/// running the remaining generators, the chunk load itself still completes.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("factory failed: {0}")]
    Factory(#[from] FactoryError),
    #[error("{0}")]
    Other(String),
}


/// Everything a generator may see and touch during one chunk load. The RNG is
/// seeded for this chunk alone and discarded when the load completes, it must not
/// be shared across chunks.
pub struct GenContext<'a> {
    /// Chunk coordinate being generated.
    pub ix: i32,
    pub iz: i32,
    /// World-space lower corner of the chunk.
    pub origin: DVec3,
    /// Chunk edge length in world units.
    pub size: f64,
    /// Root node of this chunk, all generated content attaches below it.
    pub root: NodeId,
    pub arena: &'a mut ContentArena,
    pub rand: &'a mut ChunkRand,
    pub densities: &'a Densities,
}


/// A registered chunk content generator.
pub trait Generator {

    /// Generate content for one chunk. Positions are chunk-local, in
    /// `[0, ctx.size)` on X and Z.
    fn generate(&self, ctx: &mut GenContext) -> Result<(), GenError>;

}
