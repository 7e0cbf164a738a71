//! Default-item factory: scaffold a blank item for a type.

use crate::error::Result;
use crate::item::Item;
use notegraph_schema::SchemaResolver;
use serde_json::{json, Map, Value as JsonValue};

/// Build and load a blank item of `type_iri`.
///
/// The payload maps each applicable property to an empty value, using the
/// curated defaults where the type has them and the resolver's full
/// property set otherwise. Resolution and load failures propagate; a
/// partially loaded item is never returned.
pub async fn create_default(type_iri: &str, resolver: &SchemaResolver) -> Result<Item> {
    let properties = match resolver.default_properties(type_iri) {
        Some(defaults) => defaults,
        None => resolver.properties(type_iri).await?,
    };

    let mut payload = Map::new();
    payload.insert("@type".to_string(), json!(type_iri));
    for property in properties {
        payload.insert(property.id, json!(""));
    }

    let mut item = Item::new(type_iri);
    item.load(&JsonValue::Object(payload)).await?;
    Ok(item)
}
