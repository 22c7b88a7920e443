//! Tolerant decoding of raw JSON records into typed catalog values.
//!
//! Source data is inconsistent (missing fields, legacy aliases, stringly
//! numbers), so every read here is fallible-with-default rather than strict.
//! Records that are not even objects still decode -- to an empty value that
//! fails predicates downstream instead of failing the load.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::types::{
    Durability, Effect, Item, Material, Rarity, Recipe, Requirements, SkillRequirements,
};

fn read_string(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn read_i64(obj: &Map<String, Value>, key: &str) -> Option<i64> {
    obj.get(key)
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
}

fn read_u64(obj: &Map<String, Value>, key: &str) -> Option<u64> {
    obj.get(key)
        .and_then(|v| v.as_u64().or_else(|| v.as_f64().map(|f| f as u64)))
}

fn read_f64(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key).and_then(Value::as_f64)
}

fn read_map(obj: &Map<String, Value>, key: &str) -> BTreeMap<String, Value> {
    obj.get(key)
        .and_then(Value::as_object)
        .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default()
}

/// JavaScript-style truthiness, matching how the source data's flag fields
/// were consumed (`craftable: 1` and `craftable: "yes"` both count).
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn build_requirements(value: &Value) -> Option<Requirements> {
    let obj = value.as_object()?;
    Some(Requirements {
        level: read_i64(obj, "level").unwrap_or(0),
        strength: read_i64(obj, "strength").unwrap_or(0),
        agility: read_i64(obj, "agility").unwrap_or(0),
        intelligence: read_i64(obj, "intelligence").unwrap_or(0),
    })
}

fn build_effect(value: &Value) -> Effect {
    let Some(obj) = value.as_object() else {
        return Effect::default();
    };
    Effect {
        name: read_string(obj, "name"),
        description: read_string(obj, "description").unwrap_or_default(),
        effect_type: read_string(obj, "effectType"),
        trigger_condition: read_string(obj, "triggerCondition"),
        trigger_chance: read_f64(obj, "triggerChance"),
    }
}

fn build_material(value: &Value) -> Material {
    let Some(obj) = value.as_object() else {
        return Material::default();
    };
    Material {
        item_id: read_string(obj, "itemId").unwrap_or_default(),
        quantity: read_u64(obj, "quantity").unwrap_or(0),
    }
}

fn build_skill_requirements(value: &Value) -> Option<SkillRequirements> {
    let obj = value.as_object()?;
    Some(SkillRequirements {
        primary_skill: read_string(obj, "primarySkill"),
        level: read_i64(obj, "level"),
    })
}

pub fn build_recipe(value: &Value) -> Recipe {
    let Some(obj) = value.as_object() else {
        return Recipe {
            raw: value.clone(),
            ..Recipe::default()
        };
    };

    Recipe {
        recipe_id: read_string(obj, "recipeId"),
        item_id: read_string(obj, "itemId"),
        name: read_string(obj, "name"),
        category: read_string(obj, "category"),
        craft_time: read_u64(obj, "craftTime"),
        materials: obj
            .get("materials")
            .and_then(Value::as_array)
            .map(|entries| entries.iter().map(build_material).collect())
            .unwrap_or_default(),
        skill_requirements: obj
            .get("skillRequirements")
            .and_then(build_skill_requirements),
        skill_required: read_string(obj, "skillRequired"),
        skill_level: read_i64(obj, "skillLevel"),
        raw: value.clone(),
    }
}

pub fn build_item(value: &Value) -> Item {
    let Some(obj) = value.as_object() else {
        return Item {
            raw: value.clone(),
            ..Item::default()
        };
    };

    Item {
        item_id: read_string(obj, "itemId").unwrap_or_default(),
        name: read_string(obj, "name").unwrap_or_default(),
        description: read_string(obj, "description").unwrap_or_default(),
        item_type: read_string(obj, "type"),
        by_type: read_string(obj, "byType"),
        subtype: read_string(obj, "subtype"),
        rarity: read_string(obj, "rarity")
            .map(|r| Rarity::from_name(&r))
            .unwrap_or_default(),
        level: read_i64(obj, "level").unwrap_or(0),
        value: read_f64(obj, "value"),
        weight: read_f64(obj, "weight"),
        max_stack: read_u64(obj, "maxStack"),
        enhancement_level: read_i64(obj, "enhancementLevel"),
        requirements: obj.get("requirements").and_then(build_requirements),
        stats: read_map(obj, "stats"),
        base_stats: read_map(obj, "baseStats"),
        effects: obj
            .get("effects")
            .and_then(Value::as_array)
            .map(|entries| entries.iter().map(build_effect).collect())
            .unwrap_or_default(),
        durability: obj
            .get("durability")
            .and_then(Value::as_object)
            .map(|d| Durability {
                max: read_f64(d, "max").unwrap_or(0.0),
            }),
        drop_sources: obj
            .get("dropSources")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
        craftable: obj.get("craftable").is_some_and(truthy),
        recipe: obj.get("recipe").map(build_recipe),
        raw: value.clone(),
    }
}
