//! RDFS vocabulary resolution for notegraph.
//!
//! Item types and properties reference published vocabularies (schema.org
//! and friends). This crate fetches those vocabulary documents as JSON-LD,
//! normalizes them into [`RdfsClass`] / [`RdfsProperty`] views, and caches
//! the results for the process lifetime.
//!
//! ```no_run
//! use notegraph_schema::{HttpFetcher, SchemaResolver};
//! use std::sync::Arc;
//!
//! # async fn demo() -> notegraph_schema::Result<()> {
//! let resolver = SchemaResolver::new(Arc::new(HttpFetcher::new()));
//! let props = resolver.properties("https://schema.org/Person").await?;
//! for prop in props {
//!     println!("{}: {:?}", prop.id, prop.label);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod fetcher;
pub mod model;
pub mod resolver;

pub use error::{Result, SchemaError};
pub use fetcher::{HttpFetcher, HttpFetcherConfig, MemoryFetcher, SchemaFetcher, JSON_LD_MEDIA_TYPE};
pub use model::{RdfsClass, RdfsProperty};
pub use resolver::{ResolverConfig, SchemaResolver};
