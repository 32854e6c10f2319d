//! News retrieval for sitrep
//!
//! - [`NewsSource`]: a paged source of articles, consumed as a lazy stream
//! - [`NewsApiClient`]: the NewsAPI `/v2/everything` source
//! - [`StaticNewsSource`]: a saved response, for offline runs
//! - [`NewsRetriever`]: URL de-duplication and result bound over any source

pub mod error;
pub mod newsapi;
pub mod retriever;
pub mod snapshot;
pub mod source;

pub use error::{NewsError, Result};
pub use newsapi::{DEFAULT_PAGE_SIZE, NewsApiClient};
pub use retriever::NewsRetriever;
pub use snapshot::StaticNewsSource;
pub use source::{NewsQuery, NewsSource};
