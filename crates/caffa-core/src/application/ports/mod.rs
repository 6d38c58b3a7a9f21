//! Application ports (traits) for external dependencies.
//!
//! Ports define what the application needs from the outside world.
//! Adapters in `caffa-adapters` implement them.
//!
//! - `ObjectSerializer`: object graph to text and back
//! - `DocumentStorage`: where document text lives

pub mod output;

pub use output::{DocumentStorage, ObjectSerializer};

#[cfg(test)]
pub use output::{MockDocumentStorage, MockObjectSerializer};
