use serde_json::Value;

use crate::catalog::types::Item;

/// Nesting bound for the recursive scan. Objects more than this many levels
/// below the record's own fields are not entered, so deep structure (or an
/// accidental cycle in hand-edited data) short-circuits to "no match".
const MAX_SEARCH_DEPTH: usize = 5;

/// True if the item matches the lowercased, trimmed `needle`: either one of
/// the basic display fields contains it, or a depth-bounded scan of the raw
/// record finds a string value containing it.
pub fn item_matches(item: &Item, needle: &str) -> bool {
    let basic = [
        Some(item.name.as_str()),
        Some(item.description.as_str()),
        item.item_type.as_deref(),
        item.subtype.as_deref(),
        Some(item.rarity.as_str()),
        item.by_type.as_deref(),
    ];
    if basic
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
    {
        return true;
    }

    value_contains(&item.raw, needle, 0)
}

/// Depth-bounded traversal of a JSON tree looking for a string value that
/// contains `needle`. Only values are scanned, not keys. `depth` counts
/// nested objects: string fields of an object at the depth bound are still
/// checked, and arrays are transparent (their elements sit at the parent's
/// depth).
pub fn value_contains(value: &Value, needle: &str, depth: usize) -> bool {
    match value {
        Value::String(s) => s.to_lowercase().contains(needle),
        Value::Array(entries) => entries.iter().any(|e| value_contains(e, needle, depth)),
        Value::Object(fields) => {
            depth <= MAX_SEARCH_DEPTH
                && fields.values().any(|v| value_contains(v, needle, depth + 1))
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => false,
    }
}
