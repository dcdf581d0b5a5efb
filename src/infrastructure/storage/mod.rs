//! In-memory storage backend
//!
//! Development and test double for the SeaORM backend, implementing
//! the same repository traits over concurrent maps.

mod memory;

pub use memory::InMemoryStorage;
