//! Dataset loading and normalization.
//!
//! Items arrive either as a flat array or as a category-keyed map of arrays;
//! recipes either as an array or wrapped in a `knownRecipes` field. Both are
//! loaded once at startup and held immutably for the session.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result, json_type_name};

/// Tolerant decoding of raw records into typed values
pub mod decode;
/// The relational index over the loaded collections
pub mod index;
/// The catalog data model
pub mod types;

pub use index::{Catalog, CatalogProvider};
pub use types::{
    Durability, Effect, Item, Material, Rarity, Recipe, Requirements, SkillRequirements,
    name_slug,
};

/// Flattens a raw items payload into one ordered list of records.
///
/// Arrays pass through unchanged. Category maps are flattened in iteration
/// order, and any record lacking a `type` inherits its category key. Nothing
/// is deduplicated or validated here; malformed records pass through and
/// degrade at decode time instead.
pub fn normalize_items(data: Value) -> Result<Vec<Value>> {
    match data {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items),
        Value::Object(categories) => {
            let mut items = Vec::new();
            for (category, entries) in categories {
                let Value::Array(entries) = entries else {
                    continue;
                };
                for mut entry in entries {
                    if let Some(record) = entry.as_object_mut() {
                        let has_type = record.get("type").is_some_and(decode::truthy);
                        if !has_type {
                            record.insert("type".to_owned(), Value::String(category.clone()));
                        }
                    }
                    items.push(entry);
                }
            }
            Ok(items)
        }
        other => Err(Error::InvalidItemsData {
            got: json_type_name(&other),
        }),
    }
}

/// Unwraps a raw recipes payload into an ordered list of records: either the
/// payload itself (array form) or its `knownRecipes` field (object form,
/// missing or non-array field yields an empty list).
pub fn normalize_recipes(data: Value) -> Result<Vec<Value>> {
    match data {
        Value::Null => Ok(Vec::new()),
        Value::Array(recipes) => Ok(recipes),
        Value::Object(mut wrapper) => match wrapper.remove("knownRecipes") {
            Some(Value::Array(recipes)) => Ok(recipes),
            _ => Ok(Vec::new()),
        },
        other => Err(Error::InvalidRecipesData {
            got: json_type_name(&other),
        }),
    }
}

/// Decodes an items payload (optionally wrapped in a top-level `items` field)
/// into typed records.
pub fn items_from_value(data: Value) -> Result<Vec<Item>> {
    let data = match data {
        Value::Object(mut wrapper) if wrapper.get("items").is_some_and(decode::truthy) => {
            wrapper.remove("items").unwrap_or(Value::Null)
        }
        other => other,
    };
    let records = normalize_items(data)?;
    Ok(records.iter().map(decode::build_item).collect())
}

/// Decodes a recipes payload into typed records.
pub fn recipes_from_value(data: Value) -> Result<Vec<Recipe>> {
    let records = normalize_recipes(data)?;
    Ok(records.iter().map(decode::build_recipe).collect())
}

/// Builds a catalog from two already-parsed payloads.
pub fn catalog_from_values(items: Value, recipes: Value) -> Result<Catalog> {
    let items = items_from_value(items)?;
    let recipes = recipes_from_value(recipes)?;
    debug!(
        items = items.len(),
        recipes = recipes.len(),
        "indexed catalog"
    );
    Ok(Catalog::new(items, recipes))
}

/// Builds a catalog from two JSON streams. The two reads are sequential and
/// independently failable; either failure is terminal for the session.
pub fn catalog_from_readers<I: Read, R: Read>(items: I, recipes: R) -> Result<Catalog> {
    let items: Value = serde_json::from_reader(items)?;
    let recipes: Value = serde_json::from_reader(recipes)?;
    catalog_from_values(items, recipes)
}

/// Loads a catalog from the two static dataset files.
pub fn load_catalog<P: AsRef<Path>, Q: AsRef<Path>>(
    items_path: P,
    recipes_path: Q,
) -> Result<Catalog> {
    debug!(path = %items_path.as_ref().display(), "loading items");
    let items = File::open(items_path)?;
    debug!(path = %recipes_path.as_ref().display(), "loading recipes");
    let recipes = File::open(recipes_path)?;
    catalog_from_readers(items, recipes)
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_passes_arrays_through_unchanged() {
        let data = json!([{"itemId": "a"}, {"itemId": "b"}]);
        let items = normalize_items(data.clone()).unwrap();
        assert_eq!(Value::Array(items), data);
    }

    #[test]
    fn normalize_flattens_category_maps_in_order() {
        let data = json!({
            "weapons": [{"itemId": "sword"}, {"itemId": "axe", "type": "greataxe"}],
            "armor": [{"itemId": "helm"}]
        });
        let items = normalize_items(data).unwrap();
        // insertion order, via serde_json's preserve_order feature
        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["itemId"], "sword");
        assert_eq!(items[0]["type"], "weapons");
        // a present type is never overwritten
        assert_eq!(items[1]["type"], "greataxe");
        assert_eq!(items[2]["type"], "armor");
    }

    #[test]
    fn normalize_output_length_is_sum_of_category_lengths() {
        let data = json!({
            "a": [{}, {}, {}],
            "b": [{}],
            "c": []
        });
        assert_eq!(normalize_items(data).unwrap().len(), 4);
    }

    #[test]
    fn normalize_replaces_empty_type_with_category() {
        let data = json!({"weapons": [{"itemId": "sword", "type": ""}]});
        let items = normalize_items(data).unwrap();
        assert_eq!(items[0]["type"], "weapons");
    }

    #[test]
    fn normalize_skips_non_array_categories() {
        let data = json!({"meta": "v2", "weapons": [{"itemId": "sword"}]});
        let items = normalize_items(data).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn normalize_accepts_null_as_empty() {
        assert!(normalize_items(Value::Null).unwrap().is_empty());
        assert!(normalize_recipes(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn normalize_rejects_scalar_payloads() {
        assert!(matches!(
            normalize_items(json!(42)),
            Err(Error::InvalidItemsData { got: "number" })
        ));
        assert!(matches!(
            normalize_recipes(json!("nope")),
            Err(Error::InvalidRecipesData { got: "string" })
        ));
    }

    #[test]
    fn recipes_unwrap_known_recipes_field() {
        let data = json!({"knownRecipes": [{"recipeId": "r1"}]});
        let recipes = recipes_from_value(data).unwrap();
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].recipe_id.as_deref(), Some("r1"));
    }

    #[test]
    fn recipes_object_without_known_recipes_is_empty() {
        assert!(recipes_from_value(json!({"other": 1})).unwrap().is_empty());
    }

    #[test]
    fn items_payload_may_wrap_items_field() {
        let data = json!({"items": [{"itemId": "a"}], "gameInfo": {"totalItems": 1}});
        let items = items_from_value(data).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_id, "a");
    }

    #[test]
    fn catalog_builds_from_values() {
        let catalog = catalog_from_values(
            json!([{"itemId": "a", "name": "A"}]),
            json!([{"recipeId": "a", "materials": [{"itemId": "m", "quantity": 1}]}]),
        )
        .unwrap();
        assert_eq!(catalog.items().len(), 1);
        assert!(catalog.recipe_for("a").is_some());
    }

    #[test]
    fn malformed_entries_pass_through_normalization() {
        let data = json!({"weapons": [42, {"itemId": "sword"}]});
        let items = items_from_value(data).unwrap();
        assert_eq!(items.len(), 2);
        // the malformed entry decodes empty and fails downstream, not here
        assert_eq!(items[0].item_id, "");
        assert_eq!(items[1].item_id, "sword");
    }
}
