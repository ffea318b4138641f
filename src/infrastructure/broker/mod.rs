//! Broker implementations.

pub mod inmemory;

pub use inmemory::InMemoryRoomBroker;
