//! devforum/crates/df-core/src/lib.rs
//!
//! The vote-and-ranking engine and comment-tree logic behind DevForum.
//! Presentation layers call into [`Registry`]; everything else here is
//! the machinery it delegates to.

pub mod comment_tree;
pub mod error;
pub mod models;
pub mod ranking;
pub mod registry;
pub mod seed;
pub mod traits;
pub mod vote;

// Re-exporting for easier access in other crates
pub use comment_tree::*;
pub use error::*;
pub use models::*;
pub use ranking::*;
pub use registry::*;
pub use traits::*;
pub use vote::*;
