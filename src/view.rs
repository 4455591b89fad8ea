//! Display collaborator interface.

use crate::content::{ContentArena, NodeId};


/// Interface to the external display pipeline. The chunk manager calls [`attach`]
/// exactly once per chunk load, after generation fully completed, and [`detach`]
/// exactly once per unload, before disposal. The arena is handed over read-only so
/// the implementation can walk the content tree it is about to show or hide.
///
/// [`attach`]: Self::attach
/// [`detach`]: Self::detach
pub trait ChunkView {

    /// Make a generated content tree visible.
    fn attach(&mut self, arena: &ContentArena, root: NodeId);

    /// Remove a content tree from display. The nodes are still live at this point.
    fn detach(&mut self, arena: &ContentArena, root: NodeId);

}

/// A display that shows nothing, for headless hosts and tests.
#[derive(Debug, Default)]
pub struct NullView;

impl ChunkView for NullView {

    fn attach(&mut self, _arena: &ContentArena, _root: NodeId) {}

    fn detach(&mut self, _arena: &ContentArena, _root: NodeId) {}

}
