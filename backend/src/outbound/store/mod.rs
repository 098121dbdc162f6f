//! Session store adapters.

mod document_ops;
mod memory;

pub use memory::InMemorySessionStore;
