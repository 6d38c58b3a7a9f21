//! Document storage adapters.

mod local;
mod memory;

pub use local::LocalDocumentStorage;
pub use memory::MemoryDocumentStorage;
