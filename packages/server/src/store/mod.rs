//! Persistence for uploaded files and their extracted blocks.
//!
//! Both stores borrow any [`sea_orm::ConnectionTrait`], so the same calls
//! work on the pool or inside a transaction.

mod blocks;
mod files;

pub use blocks::{BlockFilter, BlockStore, BlockWithFile};
pub use files::FileStore;
