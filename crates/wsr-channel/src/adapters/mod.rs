//! Adapters implementing the channel-layer ports.

pub mod memory;

pub use memory::InMemoryDispatcher;
