//! errside_core: Core utilities shared by every errside crate.
//!
//! Provides source ranges, line maps, and string interning used throughout
//! the front end and the renderer.

pub mod intern;
pub mod text;

// Re-export commonly used types
pub use intern::{InternedString, StringInterner};
pub use text::{LineAndColumn, LineMap, TextPos, TextRange};

/// Fast hash map for compiler-internal tables keyed by ids.
pub type FxMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// Fast hash set for compiler-internal tables keyed by ids.
pub type FxSet<T> = rustc_hash::FxHashSet<T>;
