//! Object serializer adapters.

mod json;

pub use json::JsonObjectSerializer;
