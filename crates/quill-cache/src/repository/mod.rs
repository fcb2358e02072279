//! # Repository Module
//!
//! The post store contract and an in-process implementation.

pub mod memory;
pub mod traits;

pub use memory::InMemoryPostStore;
pub use traits::PostStore;
