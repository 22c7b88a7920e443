use std::collections::BTreeMap;

use bon::Builder;
use serde_json::Value;

use crate::catalog::types::{Item, Recipe};

/// A key/value predicate over an open mapping (or a recipe's fields). Active
/// only when both sides are non-empty after trimming.
#[derive(Debug, Clone, Default, Builder)]
pub struct KeyValueFilter {
    #[builder(into)]
    pub key: String,
    #[builder(into)]
    pub value: String,
}

impl KeyValueFilter {
    fn active(&self) -> Option<(&str, &str)> {
        let key = self.key.trim();
        let value = self.value.trim();
        (!key.is_empty() && !value.is_empty()).then_some((key, value))
    }
}

/// The structured predicate set. Each predicate applies only when its control
/// value is non-empty; an item must pass all active predicates.
#[derive(Debug, Clone, Default, Builder)]
pub struct ItemFilters {
    #[builder(into)]
    pub item_type: Option<String>,
    pub min_damage: Option<i64>,
    pub max_damage: Option<i64>,
    pub min_level: Option<i64>,
    pub max_level: Option<i64>,
    pub base_stat: Option<KeyValueFilter>,
    pub stat: Option<KeyValueFilter>,
    pub recipe_field: Option<KeyValueFilter>,
    #[builder(default)]
    pub has_effects: bool,
    #[builder(default)]
    pub craftable: bool,
    #[builder(default)]
    pub has_recipe: bool,
}

fn caseless_eq(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Stringification used by the non-numeric comparison path. Absent values
/// stringify to empty.
fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Exact-match rule for stat mappings: a value that parses as an integer
/// compares numerically (a stored number equal to it, or a stored numeric
/// string coercing to it, passes); anything else compares as a
/// case-insensitive string against the stringified stat.
fn stat_matches(stats: &BTreeMap<String, Value>, key: &str, wanted: &str) -> bool {
    match wanted.parse::<i64>() {
        Ok(want) => match stats.get(key) {
            Some(Value::Number(n)) => n.as_f64() == Some(want as f64),
            Some(Value::String(s)) => s.trim().parse::<i64>() == Ok(want),
            _ => false,
        },
        Err(_) => {
            let actual = stats.get(key).map(value_to_string).unwrap_or_default();
            caseless_eq(&actual, wanted)
        }
    }
}

fn recipe_field_matches(recipe: &Recipe, key: &str, wanted: &str) -> bool {
    match key {
        "materials.itemId" => recipe
            .materials
            .iter()
            .any(|m| caseless_eq(&m.item_id, wanted)),
        // The legacy flat field, deliberately -- this predicate predates the
        // nested skillRequirements form.
        "skillLevel" => match wanted.parse::<i64>() {
            Ok(want) => recipe.skill_level == Some(want),
            Err(_) => false,
        },
        "skillRequired" => caseless_eq(recipe.skill_required.as_deref().unwrap_or(""), wanted),
        other => {
            let actual = recipe
                .raw
                .get(other)
                .map(value_to_string)
                .unwrap_or_default();
            caseless_eq(&actual, wanted)
        }
    }
}

impl ItemFilters {
    /// True if the item passes every active predicate.
    pub fn matches(&self, item: &Item) -> bool {
        if let Some(wanted) = self
            .item_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
        {
            if !caseless_eq(item.type_label().unwrap_or(""), wanted) {
                return false;
            }
        }

        let damage = item.stat("damage");
        if self.min_damage.is_some_and(|min| damage < min as f64)
            || self.max_damage.is_some_and(|max| damage > max as f64)
        {
            return false;
        }

        // The level range reads `stats.Level`, which is a different field
        // from the item's top-level `level`.
        let level = item.stat("Level");
        if self.min_level.is_some_and(|min| level < min as f64)
            || self.max_level.is_some_and(|max| level > max as f64)
        {
            return false;
        }

        if let Some((key, wanted)) = self.base_stat.as_ref().and_then(KeyValueFilter::active) {
            if !stat_matches(&item.base_stats, key, wanted) {
                return false;
            }
        }

        if let Some((key, wanted)) = self.stat.as_ref().and_then(KeyValueFilter::active) {
            if !stat_matches(&item.stats, key, wanted) {
                return false;
            }
        }

        if let Some((key, wanted)) = self.recipe_field.as_ref().and_then(KeyValueFilter::active) {
            let Some(recipe) = item.recipe.as_ref() else {
                return false;
            };
            if !recipe_field_matches(recipe, key, wanted) {
                return false;
            }
        }

        if self.has_effects && item.effects.is_empty() {
            return false;
        }

        if self.craftable && !item.craftable {
            return false;
        }

        if self.has_recipe && item.recipe.is_none() {
            return false;
        }

        true
    }
}
