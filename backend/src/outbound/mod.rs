//! Outbound adapters implementing domain ports for infrastructure.
//!
//! - **store**: the watchable document store backing session state.
//!
//! Adapters are thin translators between domain port types and the
//! underlying storage representation. They contain no business logic.

pub mod store;
