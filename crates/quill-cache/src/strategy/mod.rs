//! # Strategy Module
//!
//! Enum-dispatched cache/store access patterns used by the orchestrator.
//!
//! ### Read Strategies
//! - `CacheAside` - Check cache, load from the store on miss, populate (default)
//! - `StoreOnly` - Skip the cache entirely
//!
//! ### Write Strategies
//! - `WriteThrough` - After the store commits, refresh affected entries in
//!   place; on any population failure, invalidate instead (default)
//! - `StoreOnly` - No cache interaction
//!
//! Both pick `StoreOnly` automatically when the backend cannot serve hits,
//! so a disabled cache costs no round-trips.

pub mod read_strategy;
pub mod write_strategy;

pub use read_strategy::ReadStrategy;
pub use write_strategy::WriteStrategy;
