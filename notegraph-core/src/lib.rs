//! The notegraph item pipeline.
//!
//! Items are small user-authored JSON-LD documents (notes, people,
//! events). This crate owns their lifecycle:
//!
//! - [`Item`] expands and flattens a payload into a named-graph container
//!   with a single primary subject and a durable minted uri;
//! - [`Triple`] and the subject list are the normalized read views;
//! - [`build_sections`] / [`build_item_sections`] derive the ordered
//!   section list a renderer consumes;
//! - [`create_default`] scaffolds a blank item for a type using the
//!   vocabulary resolver.
//!
//! ```
//! use notegraph_core::Item;
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> notegraph_core::Result<()> {
//! let mut item = Item::new("https://schema.org/NoteDigitalDocument");
//! item.load(&json!({
//!     "@context": "https://schema.org/",
//!     "@type": "NoteDigitalDocument",
//!     "text": "hello"
//! }))
//! .await?;
//!
//! assert_eq!(item.subjects().len(), 1);
//! assert_eq!(item.type_url(), Some("https://schema.org/NoteDigitalDocument"));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod factory;
pub mod ident;
pub mod item;
pub mod section;
pub mod triple;
pub mod value;

pub use error::{CoreError, Result};
pub use factory::create_default;
pub use ident::{mint_uri, DEFAULT_PREFIX};
pub use item::{Item, DERIVED_FROM, PROVENANCE_NS};
pub use section::{build_item_sections, build_sections, build_sections_with, Section, MAX_HEADER_LEVEL};
pub use triple::{Triple, TripleObject};
pub use value::{classify, NodeValue};
