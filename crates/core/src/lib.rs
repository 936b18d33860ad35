//! Pure domain logic for the lexd text-analysis service.
//!
//! Zero internal dependencies: everything here is usable by the storage
//! layer, the analysis engine, and the HTTP surface alike.

pub mod credentials;
pub mod error;
pub mod frequency;
pub mod stopwords;
pub mod tasks;
pub mod types;
