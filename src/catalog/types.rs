use std::collections::BTreeMap;

use bon::Builder;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Item rarity tier. Source data carries free-form strings; anything outside
/// the known tiers is preserved as-is and ranks below every known tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rarity {
    Uncommon,
    Common,
    Rare,
    Epic,
    Legendary,
    Mythic,
    Unranked(String),
}

impl Rarity {
    pub fn from_name(name: &str) -> Self {
        match name {
            "uncommon" => Rarity::Uncommon,
            "common" => Rarity::Common,
            "rare" => Rarity::Rare,
            "epic" => Rarity::Epic,
            "legendary" => Rarity::Legendary,
            "mythic" => Rarity::Mythic,
            other => Rarity::Unranked(other.to_owned()),
        }
    }

    /// Sort rank. Unranked rarities sort below `uncommon`.
    pub fn rank(&self) -> u8 {
        match self {
            Rarity::Uncommon => 1,
            Rarity::Common => 2,
            Rarity::Rare => 3,
            Rarity::Epic => 4,
            Rarity::Legendary => 5,
            Rarity::Mythic => 6,
            Rarity::Unranked(_) => 0,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Rarity::Uncommon => "uncommon",
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
            Rarity::Mythic => "mythic",
            Rarity::Unranked(other) => other.as_str(),
        }
    }
}

impl Default for Rarity {
    fn default() -> Self {
        Rarity::Unranked(String::new())
    }
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Rarity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Attribute requirements for equipping an item. Absent attributes are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Builder)]
pub struct Requirements {
    #[builder(default)]
    pub level: i64,
    #[builder(default)]
    pub strength: i64,
    #[builder(default)]
    pub agility: i64,
    #[builder(default)]
    pub intelligence: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Builder)]
#[serde(rename_all = "camelCase")]
pub struct Effect {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[builder(default)]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_chance: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Durability {
    pub max: f64,
}

/// One crafting ingredient: an item reference plus a quantity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Builder)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    #[builder(into)]
    pub item_id: String,
    #[builder(default)]
    pub quantity: u64,
}

/// Nested skill requirement form. Older records instead carry flat
/// `skillRequired`/`skillLevel` fields directly on the recipe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Builder)]
#[serde(rename_all = "camelCase")]
pub struct SkillRequirements {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_skill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<i64>,
}

/// A crafting definition. Identity is inconsistent in source data: a record
/// may carry `recipeId`, `itemId`, or only a display `name`.
#[derive(Debug, Clone, Default, Serialize, Builder)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub recipe_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub item_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub craft_time: Option<u64>,
    #[builder(default)]
    pub materials: Vec<Material>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_requirements: Option<SkillRequirements>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub skill_required: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_level: Option<i64>,
    /// The source record, kept for generic field matching in recipe predicates.
    #[serde(skip)]
    #[builder(default)]
    pub raw: Value,
}

impl Recipe {
    /// Resolves this recipe's identity through the ordered fallback chain:
    /// `recipeId`, then `itemId`, then the normalized display name.
    pub fn resolved_id(&self) -> Option<String> {
        self.recipe_id
            .clone()
            .or_else(|| self.item_id.clone())
            .or_else(|| self.name.as_deref().map(name_slug))
    }

    /// The skill needed to craft, preferring the nested form over the legacy
    /// flat field.
    pub fn required_skill(&self) -> Option<&str> {
        self.skill_requirements
            .as_ref()
            .and_then(|sr| sr.primary_skill.as_deref())
            .or(self.skill_required.as_deref())
    }

    /// The skill level needed to craft, preferring the nested form.
    pub fn required_skill_level(&self) -> Option<i64> {
        self.skill_requirements
            .as_ref()
            .and_then(|sr| sr.level)
            .or(self.skill_level)
    }

    pub fn uses_material(&self, material_id: &str) -> bool {
        self.materials.iter().any(|m| m.item_id == material_id)
    }
}

/// Lowercases a display name and replaces spaces with underscores, producing
/// the id form used by name-based recipe resolution.
pub fn name_slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// A catalog entity. All fields are decoded tolerantly: absent numerics are
/// zero, absent strings empty, so downstream predicates and comparators never
/// fail on missing data.
#[derive(Debug, Clone, Default, Serialize, Builder)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[builder(into)]
    pub item_id: String,
    #[builder(default, into)]
    pub name: String,
    #[builder(default, into)]
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// The primary category. Assigned from the category key during
    /// normalization when the source record lacks one.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub item_type: Option<String>,
    /// Legacy alias for `type`; when present it takes precedence for
    /// filtering and option discovery.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub by_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub subtype: Option<String>,
    #[builder(default)]
    pub rarity: Rarity,
    #[builder(default)]
    pub level: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_stack: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhancement_level: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<Requirements>,
    /// Open stat mapping; keys vary per item and values may be strings in
    /// older records.
    #[builder(default)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub stats: BTreeMap<String, Value>,
    #[builder(default)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub base_stats: BTreeMap<String, Value>,
    #[builder(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<Effect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub durability: Option<Durability>,
    #[builder(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub drop_sources: Vec<Value>,
    #[builder(default)]
    pub craftable: bool,
    /// A recipe embedded in the source record, when the loading context
    /// attached one. Distinct from the catalog's recipe index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe: Option<Recipe>,
    /// The source record; drives the recursive search stage.
    #[serde(skip)]
    #[builder(default)]
    pub raw: Value,
}

impl Item {
    /// The effective category: `byType` when present, else `type`.
    pub fn type_label(&self) -> Option<&str> {
        self.by_type.as_deref().or(self.item_type.as_deref())
    }

    /// Numeric value of a stat, defaulting to zero when the stat is absent or
    /// not a number.
    pub fn stat(&self, key: &str) -> f64 {
        self.stats.get(key).and_then(Value::as_f64).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rarity_ranks_are_ordered() {
        let tiers = [
            Rarity::Uncommon,
            Rarity::Common,
            Rarity::Rare,
            Rarity::Epic,
            Rarity::Legendary,
            Rarity::Mythic,
        ];
        for pair in tiers.windows(2) {
            assert!(pair[0].rank() < pair[1].rank());
        }
    }

    #[test]
    fn unranked_rarity_sorts_lowest_and_round_trips() {
        let odd = Rarity::from_name("artifact");
        assert_eq!(odd.rank(), 0);
        assert_eq!(odd.as_str(), "artifact");
        assert!(odd.rank() < Rarity::Uncommon.rank());
    }

    #[test]
    fn resolved_id_prefers_recipe_id() {
        let recipe = Recipe::builder()
            .recipe_id("steel_sword")
            .item_id("other")
            .name("Something Else")
            .build();
        assert_eq!(recipe.resolved_id().as_deref(), Some("steel_sword"));
    }

    #[test]
    fn resolved_id_falls_back_to_item_id_then_name() {
        let by_item = Recipe::builder().item_id("steel_sword").name("X").build();
        assert_eq!(by_item.resolved_id().as_deref(), Some("steel_sword"));

        let by_name = Recipe::builder().name("Steel Sword").build();
        assert_eq!(by_name.resolved_id().as_deref(), Some("steel_sword"));

        let anonymous = Recipe::builder().build();
        assert_eq!(anonymous.resolved_id(), None);
    }

    #[test]
    fn skill_accessors_prefer_nested_form() {
        let recipe = Recipe::builder()
            .skill_requirements(SkillRequirements {
                primary_skill: Some("smithing".to_owned()),
                level: Some(12),
            })
            .skill_required("old_smithing")
            .skill_level(3)
            .build();
        assert_eq!(recipe.required_skill(), Some("smithing"));
        assert_eq!(recipe.required_skill_level(), Some(12));

        let legacy = Recipe::builder().skill_required("alchemy").skill_level(5).build();
        assert_eq!(legacy.required_skill(), Some("alchemy"));
        assert_eq!(legacy.required_skill_level(), Some(5));
    }

    #[test]
    fn type_label_prefers_by_type() {
        let item = Item::builder()
            .item_id("x")
            .item_type("weapon")
            .by_type("Weapon")
            .build();
        assert_eq!(item.type_label(), Some("Weapon"));
    }

    #[test]
    fn stat_defaults_to_zero() {
        let item = Item::builder().item_id("x").build();
        assert_eq!(item.stat("damage"), 0.0);
    }
}
