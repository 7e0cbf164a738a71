//! Item identity: URI minting.

use uuid::Uuid;

/// Default URI prefix for newly minted items.
pub const DEFAULT_PREFIX: &str = "item:";

/// Mint a new item URI under `prefix`.
///
/// Uses a time-ordered unique id, so URIs sort by creation time and never
/// collide within a process lifetime.
pub fn mint_uri(prefix: &str) -> String {
    format!("{}{}", prefix, Uuid::now_v7())
}
