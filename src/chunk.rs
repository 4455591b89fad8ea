//! Chunk lifecycle management around a moving observer.
//!
//! The [`ChunkManager`] owns the mapping from chunk coordinate to live content and
//! reconciles it once per tick against the desired neighborhood of the observer:
//! chunks entering the neighborhood are generated and attached to the display,
//! chunks leaving it are detached and disposed. Loading is synchronous and atomic
//! within one tick, so no partially generated chunk is ever exposed and unloading a
//! chunk mid-generation cannot occur.

use std::mem;

use glam::DVec3;
use indexmap::IndexMap;

use serde::{Serialize, Deserialize};
use tracing::{trace, warn};

use crate::content::{ContentArena, ContentNode, NodeId};
use crate::coord::{ChunkArea, calc_chunk_pos, chunk_origin};
use crate::worldgen::{Densities, GenContext, Generator, ScatterGenerator};
use crate::rand::{ChunkRand, derive_chunk_seed};
use crate::storage::{MarkerRecord, MarkerStore};
use crate::view::ChunkView;


/// Smallest allowed chunk edge length, in world units.
pub const MIN_CHUNK_SIZE: f64 = 50.0;
/// Smallest allowed streaming radius, in chunks.
pub const MIN_RADIUS: u32 = 1;


/// Static configuration of a [`ChunkManager`]. Out-of-range values are clamped to
/// sane minimums at construction instead of failing, so a bad config degrades the
/// stream rather than taking it down.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkConfig {
    /// Chunk edge length in world units, at least [`MIN_CHUNK_SIZE`].
    pub size: f64,
    /// Streaming box radius in chunks, at least [`MIN_RADIUS`].
    pub radius: u32,
    /// The world seed every chunk seed derives from, immutable for the session.
    pub seed: u32,
    pub densities: Densities,
    /// Namespace prefix for persistence marker keys.
    pub storage_prefix: String,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            size: 200.0,
            radius: 2,
            seed: 0,
            densities: Densities::default(),
            storage_prefix: "worldstream.chunk".to_string(),
        }
    }
}


/// Bookkeeping for one currently loaded chunk. The manager exclusively owns these
/// records, no other component holds chunk content past unload.
#[derive(Debug)]
struct ActiveChunk {
    /// Root of the chunk's content tree, sole entry point for disposal.
    root: NodeId,
    /// Whether this load wrote the persistence marker.
    marker_written: bool,
}


/// Streams chunks around a moving observer.
///
/// Each tick, [`update`](Self::update) computes the observer's chunk coordinate and
/// the desired square neighborhood, loads every missing chunk (seed derivation,
/// generator registry invocation, display attach, advisory marker write) and
/// unloads every active chunk that fell out of the neighborhood (display detach,
/// disposal, record removal).
///
/// A chunk's content is a pure function of `(seed, ix, iz, densities, registry)`:
/// regenerating a coordinate after an unload is indistinguishable from the first
/// generation.
pub struct ChunkManager {
    size: f64,
    radius: u32,
    seed: u32,
    densities: Densities,
    storage_prefix: String,
    /// Ordered generator registry, every entry runs once per chunk load.
    generators: Vec<Box<dyn Generator>>,
    /// Active chunks in load order.
    active: IndexMap<(i32, i32), ActiveChunk>,
    arena: ContentArena,
    view: Box<dyn ChunkView>,
    store: Box<dyn MarkerStore>,
    /// Total chunk loads performed since construction.
    loaded_count: u64,
}

impl ChunkManager {

    /// Create a manager with the default scatter generator registered, mirroring
    /// the reference behavior. Use [`add_generator`](Self::add_generator) to append
    /// more generators.
    pub fn new(config: ChunkConfig, view: Box<dyn ChunkView>, store: Box<dyn MarkerStore>) -> Self {
        let mut manager = Self::new_empty(config, view, store);
        manager.add_generator(Box::new(ScatterGenerator::new()));
        manager
    }

    /// Create a manager with an empty generator registry.
    pub fn new_empty(config: ChunkConfig, view: Box<dyn ChunkView>, store: Box<dyn MarkerStore>) -> Self {

        let size = if config.size < MIN_CHUNK_SIZE {
            warn!("chunk size {} below minimum, clamped to {MIN_CHUNK_SIZE}", config.size);
            MIN_CHUNK_SIZE
        } else {
            config.size
        };

        let radius = if config.radius < MIN_RADIUS {
            warn!("radius {} below minimum, clamped to {MIN_RADIUS}", config.radius);
            MIN_RADIUS
        } else {
            config.radius
        };

        Self {
            size,
            radius,
            seed: config.seed,
            densities: config.densities,
            storage_prefix: config.storage_prefix,
            generators: Vec::new(),
            active: IndexMap::new(),
            arena: ContentArena::new(),
            view,
            store,
            loaded_count: 0,
        }

    }

    /// Append a generator to the registry. Order of registration is the order of
    /// invocation on every subsequent chunk load.
    pub fn add_generator(&mut self, generator: Box<dyn Generator>) {
        self.generators.push(generator);
    }

    /// Set the streaming radius, clamped to at least [`MIN_RADIUS`]. Only affects
    /// future calls to [`update`](Self::update), already active chunks are
    /// untouched until the next reconciliation.
    pub fn set_radius(&mut self, radius: u32) {
        self.radius = radius.max(MIN_RADIUS);
    }

    /// Reconcile active chunks against the observer's current world position. Loads
    /// and unloads happen inline; when nothing changed this is a no-op.
    pub fn update(&mut self, observer: DVec3) {

        let (cx, cz) = calc_chunk_pos(observer, self.size);
        let area = ChunkArea::new(cx, cz, self.radius);

        for (ix, iz) in area {
            if !self.active.contains_key(&(ix, iz)) {
                self.load_chunk(ix, iz);
            }
        }

        // A coordinate is in exactly one of {desired, not desired}, so the stale
        // set is disjoint from the loads above.
        let stale = self.active.keys()
            .copied()
            .filter(|&(ix, iz)| !area.contains(ix, iz))
            .collect::<Vec<_>>();

        for (ix, iz) in stale {
            self.unload_chunk(ix, iz);
        }

    }

    /// Unload every active chunk unconditionally, leaving the active map empty and
    /// the display free of this component's content. Used for full teardown.
    pub fn dispose_all(&mut self) {
        let keys = self.active.keys().copied().collect::<Vec<_>>();
        for (ix, iz) in keys {
            self.unload_chunk(ix, iz);
        }
    }

    fn load_chunk(&mut self, ix: i32, iz: i32) {

        debug_assert!(!self.active.contains_key(&(ix, iz)), "chunk ({ix}, {iz}) already active");

        let origin = chunk_origin(ix, iz, self.size);
        let mut root_node = ContentNode::new(format!("chunk_{ix}_{iz}"));
        root_node.position = origin.as_vec3();
        let root = self.arena.insert(root_node);

        let mut rand = ChunkRand::new(derive_chunk_seed(self.seed, ix, iz));

        // The registry is swapped out while it runs, because the context borrows
        // the arena mutably.
        let generators = mem::take(&mut self.generators);
        let mut ctx = GenContext {
            ix, iz,
            origin,
            size: self.size,
            root,
            arena: &mut self.arena,
            rand: &mut rand,
            densities: &self.densities,
        };

        for generator in &generators {
            if let Err(err) = generator.generate(&mut ctx) {
                warn!("generator failed for chunk ({ix}, {iz}): {err}");
            }
        }

        self.generators = generators;

        self.view.attach(&self.arena, root);
        let marker_written = self.write_marker(ix, iz);
        self.active.insert((ix, iz), ActiveChunk { root, marker_written });
        self.loaded_count += 1;

        trace!("loaded chunk ({ix}, {iz})");

    }

    fn unload_chunk(&mut self, ix: i32, iz: i32) {

        let Some(chunk) = self.active.shift_remove(&(ix, iz)) else {
            return;
        };

        self.view.detach(&self.arena, chunk.root);
        self.arena.dispose(chunk.root);

        trace!("unloaded chunk ({ix}, {iz})");

    }

    /// Write the advisory generation marker for a chunk, at most once per
    /// coordinate. Store failures are swallowed: this path never affects the load.
    fn write_marker(&mut self, ix: i32, iz: i32) -> bool {

        let key = format!("{}.{}.{}.{}", self.storage_prefix, self.seed, ix, iz);
        if self.store.get(&key).is_some() {
            return false;
        }

        let Ok(value) = serde_json::to_string(&MarkerRecord::now()) else {
            return false;
        };

        match self.store.set(&key, &value) {
            Ok(()) => true,
            Err(err) => {
                trace!("marker write failed for chunk ({ix}, {iz}): {err}");
                false
            }
        }

    }

    /// Number of currently active chunks.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Return true if the given chunk coordinate is currently loaded.
    pub fn is_active(&self, ix: i32, iz: i32) -> bool {
        self.active.contains_key(&(ix, iz))
    }

    /// Root content node of an active chunk.
    pub fn chunk_root(&self, ix: i32, iz: i32) -> Option<NodeId> {
        self.active.get(&(ix, iz)).map(|chunk| chunk.root)
    }

    /// Return true if the marker write succeeded when the given chunk loaded.
    pub fn is_marker_written(&self, ix: i32, iz: i32) -> bool {
        self.active.get(&(ix, iz)).is_some_and(|chunk| chunk.marker_written)
    }

    /// Total chunk loads performed since construction, counting reloads.
    pub fn loaded_count(&self) -> u64 {
        self.loaded_count
    }

    /// Read access to the content arena, for the display pipeline between ticks.
    pub fn arena(&self) -> &ContentArena {
        &self.arena
    }

}
