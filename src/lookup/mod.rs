//! Word definition lookup for lexdrill.
//!
//! Fetching definitions from the network is left to callers; this module
//! defines the `Lookup` seam, a file cache, and wrappers that compose them.

pub mod fallback;
pub mod file;
pub mod traits;

pub use fallback::{CachedLookup, HintLookup};
pub use file::FileDefinitionCache;
pub use traits::{mask_word, Definition, Example, Lookup, Pronunciation, Sense};
