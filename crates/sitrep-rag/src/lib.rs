//! Retrieval layer for sitrep
//!
//! Turns retrieved news into ranked context:
//!
//! - [`EmbeddingEncoder`]: memoised text-to-vector encoding with a fixed dimension
//! - [`VectorStore`]: in-memory store with cosine nearest-neighbour queries
//! - [`SimilaritySearcher`]: embeds a corpus into the store and ranks it against a query
//! - [`HashingEmbedder`]: offline deterministic embedding provider
//! - `LocalEmbedder`: fastembed model (feature `local-embeddings`)

pub mod encoder;
pub mod error;
pub mod hashing;
#[cfg(feature = "local-embeddings")]
pub mod local;
pub mod search;
pub mod store;

pub use encoder::{EMPTY_TEXT_PLACEHOLDER, EmbeddingEncoder};
pub use error::{RagError, Result};
pub use hashing::{DEFAULT_HASHING_DIMENSION, HashingEmbedder};
#[cfg(feature = "local-embeddings")]
pub use local::LocalEmbedder;
pub use search::SimilaritySearcher;
pub use store::{InsertOutcome, VectorStore};
