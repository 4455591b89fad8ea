//! Arena storage for generated chunk content.
//!
//! Every piece of content produced for a chunk lives in a [`ContentArena`] as a tree
//! of [`ContentNode`]s addressed by generational [`NodeId`] handles. The chunk
//! manager is the sole owner of the arena; collaborators only ever hold handles, so
//! disposing a chunk's subtree is guaranteed to reach every resource the chunk owns.

use glam::Vec3;

use tracing::warn;


/// Stable handle to a node stored in a [`ContentArena`]. Handles are generational:
/// a handle kept past disposal of its node goes stale instead of aliasing whatever
/// content reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// Handle to a geometry buffer owned by a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryHandle(u32);

/// Handle to a material resource owned by a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(u32);


/// One unit of generated content: a local transform, an optional geometry buffer,
/// zero or more materials, and child nodes.
#[derive(Debug, Clone)]
pub struct ContentNode {
    pub name: String,
    pub position: Vec3,
    /// Euler rotation in radians.
    pub rotation: Vec3,
    pub scale: Vec3,
    pub geometry: Option<GeometryHandle>,
    pub materials: Vec<MaterialHandle>,
    pub children: Vec<NodeId>,
}

impl ContentNode {

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            geometry: None,
            materials: Vec::new(),
            children: Vec::new(),
        }
    }

}


/// Internal arena slot, the generation is bumped on each free so stale handles can
/// be rejected.
#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<ContentNode>,
}


/// Slot arena owning every live content node together with the graphics resources
/// they reference. Tracks live resource counts so tests and debug builds can assert
/// that unloading a chunk returns the arena to its previous baseline.
#[derive(Debug, Default)]
pub struct ContentArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    /// Liveness flag per allocated geometry, indexed by handle.
    geometries: Vec<bool>,
    /// Liveness flag per allocated material, indexed by handle.
    materials: Vec<bool>,
    live_nodes: usize,
    live_geometries: usize,
    live_materials: usize,
}

impl ContentArena {

    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node and return its stable handle.
    pub fn insert(&mut self, node: ContentNode) -> NodeId {
        self.live_nodes += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId { index, generation: slot.generation }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot { generation: 0, node: Some(node) });
            NodeId { index, generation: 0 }
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&ContentNode> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut ContentNode> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    /// Register `child` under `parent`. Does nothing if the parent is stale.
    pub fn attach_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.get_mut(parent) {
            node.children.push(child);
        }
    }

    /// Allocate a geometry buffer and return its handle.
    pub fn alloc_geometry(&mut self) -> GeometryHandle {
        let handle = GeometryHandle(self.geometries.len() as u32);
        self.geometries.push(true);
        self.live_geometries += 1;
        handle
    }

    /// Allocate a material resource and return its handle.
    pub fn alloc_material(&mut self) -> MaterialHandle {
        let handle = MaterialHandle(self.materials.len() as u32);
        self.materials.push(true);
        self.live_materials += 1;
        handle
    }

    /// Release a geometry buffer. Releasing an already released buffer is logged and
    /// otherwise ignored, it never throws the counters off.
    pub fn release_geometry(&mut self, handle: GeometryHandle) {
        match self.geometries.get_mut(handle.0 as usize) {
            Some(alive) if *alive => {
                *alive = false;
                self.live_geometries -= 1;
            }
            _ => warn!("geometry {} released twice", handle.0),
        }
    }

    /// Release a material resource, with the same double-release guard as
    /// [`release_geometry`](Self::release_geometry).
    pub fn release_material(&mut self, handle: MaterialHandle) {
        match self.materials.get_mut(handle.0 as usize) {
            Some(alive) if *alive => {
                *alive = false;
                self.live_materials -= 1;
            }
            _ => warn!("material {} released twice", handle.0),
        }
    }

    /// Dispose a whole content subtree: release every geometry and material owned by
    /// any node reachable from `root`, then free the nodes themselves. Safe to call
    /// on a stale handle, in which case nothing happens.
    pub fn dispose(&mut self, root: NodeId) {
        let Some(node) = self.remove(root) else { return };
        if let Some(geometry) = node.geometry {
            self.release_geometry(geometry);
        }
        for material in node.materials {
            self.release_material(material);
        }
        for child in node.children {
            self.dispose(child);
        }
    }

    /// Remove a single node from its slot, bumping the slot generation.
    fn remove(&mut self, id: NodeId) -> Option<ContentNode> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live_nodes -= 1;
        Some(node)
    }

    /// Number of live nodes in the arena.
    pub fn live_nodes(&self) -> usize {
        self.live_nodes
    }

    /// Number of live graphics resources (geometries + materials), the leak counter
    /// checked by disposal tests.
    pub fn live_resources(&self) -> usize {
        self.live_geometries + self.live_materials
    }

}
