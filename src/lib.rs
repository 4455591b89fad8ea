//! Deterministic chunk streaming for large explorable worlds.
//!
//! The world is an infinite integer grid of fixed-size square chunks. A
//! [`chunk::ChunkManager`] keeps a box-shaped neighborhood of chunks alive around a
//! moving observer: every tick it loads the chunks that entered the neighborhood,
//! generating their content from a seed derived from the world seed and the chunk
//! coordinate, and unloads the chunks that left it, releasing every resource they
//! own. Same seed and coordinate always produce the same chunk, independent of
//! visit order or history.
//!
//! Rendering, input and persistence are external collaborators behind the
//! [`view::ChunkView`] and [`storage::MarkerStore`] ports.

pub mod rand;
pub mod coord;

pub mod content;
pub mod factory;
pub mod worldgen;

pub mod view;
pub mod storage;
pub mod chunk;
