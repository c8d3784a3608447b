//! DOM abstraction and the SVG surface drawn into it.

pub mod document;
pub mod memory;
pub mod surface;

pub use document::{Document, HandleTable, NodeId};
pub use memory::MemoryDocument;
pub use surface::SvgSurface;
