use std::collections::HashMap;

use tracing::warn;

use crate::Rc;

use super::types::{Item, Recipe, name_slug};

/// Read-side lookups over the loaded collections. Implemented by [`Catalog`];
/// the seam a presentation layer should depend on.
pub trait CatalogProvider {
    fn item_by_id(&self, item_id: &str) -> Option<Rc<Item>>;
    fn recipe_for(&self, item_id: &str) -> Option<Rc<Recipe>>;
    fn items_using_material(&self, material_id: &str) -> Vec<Rc<Item>>;
    fn items(&self) -> &[Rc<Item>];
    fn recipes(&self) -> &[Rc<Recipe>];
}

/// The in-memory relational index over the item and recipe collections.
/// Both collections are immutable for the session; every query returns a
/// fresh projection.
pub struct Catalog {
    items: Vec<Rc<Item>>,
    id_to_item: HashMap<String, Rc<Item>>,
    recipes: Vec<Rc<Recipe>>,
}

fn build_item_lookup(items: &[Rc<Item>]) -> HashMap<String, Rc<Item>> {
    let mut by_id = HashMap::with_capacity(items.len());
    for item in items {
        // first occurrence of an id wins
        by_id
            .entry(item.item_id.clone())
            .or_insert_with(|| item.clone());
    }
    by_id
}

impl Catalog {
    pub fn new(items: Vec<Item>, recipes: Vec<Recipe>) -> Self {
        let items: Vec<Rc<Item>> = items.into_iter().map(Rc::new).collect();
        let id_to_item = build_item_lookup(&items);
        Self {
            items,
            id_to_item,
            recipes: recipes.into_iter().map(Rc::new).collect(),
        }
    }

    /// Synthesizes a minimal stand-in for a recipe whose output item is not
    /// present in the item collection, so reverse lookups never drop entries.
    fn placeholder_output(recipe: &Recipe) -> Item {
        Item::builder()
            .item_id(recipe.resolved_id().unwrap_or_default())
            .name(recipe.name.clone().unwrap_or_else(|| "Unknown".to_owned()))
            .item_type(recipe.category.clone().unwrap_or_else(|| "Recipe".to_owned()))
            .build()
    }

    /// Resolves the item a recipe produces: by `recipeId`, by `itemId`, or by
    /// case-insensitive display-name equality, whichever an item matches
    /// first in collection order.
    fn output_item(&self, recipe: &Recipe) -> Option<Rc<Item>> {
        self.items
            .iter()
            .find(|item| {
                recipe
                    .recipe_id
                    .as_deref()
                    .is_some_and(|id| item.item_id == id)
                    || recipe
                        .item_id
                        .as_deref()
                        .is_some_and(|id| item.item_id == id)
                    || match &recipe.name {
                        Some(recipe_name) if !item.name.is_empty() => {
                            item.name.to_lowercase() == recipe_name.to_lowercase()
                        }
                        _ => false,
                    }
            })
            .cloned()
    }
}

impl CatalogProvider for Catalog {
    fn item_by_id(&self, item_id: &str) -> Option<Rc<Item>> {
        self.id_to_item.get(item_id).cloned()
    }

    /// Resolves the recipe that produces `item_id`, checking identity fields
    /// in precedence order: `recipeId`, then `itemId`, then the normalized
    /// display name. Within a precedence level the first recipe in collection
    /// order wins.
    fn recipe_for(&self, item_id: &str) -> Option<Rc<Recipe>> {
        self.recipes
            .iter()
            .find(|r| r.recipe_id.as_deref() == Some(item_id))
            .or_else(|| {
                self.recipes
                    .iter()
                    .find(|r| r.item_id.as_deref() == Some(item_id))
            })
            .or_else(|| {
                self.recipes
                    .iter()
                    .find(|r| r.name.as_deref().map(name_slug).as_deref() == Some(item_id))
            })
            .cloned()
    }

    /// Every recipe consuming `material_id`, mapped to its output item in
    /// recipe order. Outputs that resolve to the same item are *not*
    /// deduplicated; callers observing duplicates are seeing one entry per
    /// consuming recipe.
    fn items_using_material(&self, material_id: &str) -> Vec<Rc<Item>> {
        self.recipes
            .iter()
            .filter(|recipe| recipe.uses_material(material_id))
            .map(|recipe| {
                self.output_item(recipe).unwrap_or_else(|| {
                    warn!(
                        recipe = %recipe.resolved_id().unwrap_or_default(),
                        "recipe output not present in item collection, synthesizing placeholder"
                    );
                    Rc::new(Self::placeholder_output(recipe))
                })
            })
            .collect()
    }

    fn items(&self) -> &[Rc<Item>] {
        &self.items
    }

    fn recipes(&self) -> &[Rc<Recipe>] {
        &self.recipes
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::catalog::types::Material;

    fn sword_items() -> Vec<Item> {
        vec![
            Item::builder()
                .item_id("sword_1")
                .name("Iron Sword")
                .item_type("weapon")
                .build(),
            Item::builder()
                .item_id("sword_2")
                .name("Steel Sword")
                .item_type("weapon")
                .build(),
        ]
    }

    fn material(id: &str) -> Material {
        Material::builder().item_id(id).quantity(3).build()
    }

    #[test]
    fn item_by_id_resolves() {
        let catalog = Catalog::new(sword_items(), Vec::new());
        assert_eq!(catalog.item_by_id("sword_2").unwrap().name, "Steel Sword");
        assert!(catalog.item_by_id("missing").is_none());
    }

    #[test]
    fn recipe_for_matches_recipe_id_round_trip() {
        let recipes = vec![
            Recipe::builder().recipe_id("sword_1").build(),
            Recipe::builder().recipe_id("sword_2").build(),
        ];
        let catalog = Catalog::new(sword_items(), recipes);
        let found = catalog.recipe_for("sword_2").unwrap();
        assert_eq!(found.recipe_id.as_deref(), Some("sword_2"));
    }

    #[test]
    fn recipe_for_precedence_prefers_recipe_id_over_item_id_and_name() {
        let recipes = vec![
            Recipe::builder().name("Sword 1").build(), // slug: sword_1
            Recipe::builder().item_id("sword_1").category("late").build(),
            Recipe::builder().recipe_id("sword_1").category("winner").build(),
        ];
        let catalog = Catalog::new(sword_items(), recipes);
        let found = catalog.recipe_for("sword_1").unwrap();
        assert_eq!(found.category.as_deref(), Some("winner"));
    }

    #[test]
    fn recipe_for_ties_resolve_in_collection_order() {
        let recipes = vec![
            Recipe::builder().item_id("sword_1").category("first").build(),
            Recipe::builder().item_id("sword_1").category("second").build(),
        ];
        let catalog = Catalog::new(sword_items(), recipes);
        assert_eq!(
            catalog.recipe_for("sword_1").unwrap().category.as_deref(),
            Some("first")
        );
    }

    #[test]
    fn recipe_for_falls_back_to_normalized_name() {
        let recipes = vec![Recipe::builder().name("Steel Sword").build()];
        let catalog = Catalog::new(sword_items(), recipes);
        assert!(catalog.recipe_for("steel_sword").is_some());
        assert!(catalog.recipe_for("Steel Sword").is_none());
    }

    #[test]
    fn items_using_material_resolves_output_by_id() {
        let recipes = vec![
            Recipe::builder()
                .recipe_id("sword_2")
                .materials(vec![material("iron_ingot")])
                .build(),
        ];
        let catalog = Catalog::new(sword_items(), recipes);
        let uses = catalog.items_using_material("iron_ingot");
        assert_eq!(uses.len(), 1);
        assert_eq!(uses[0].item_id, "sword_2");
        assert_eq!(uses[0].name, "Steel Sword");
    }

    #[test]
    fn items_using_material_resolves_output_by_name_caselessly() {
        let recipes = vec![
            Recipe::builder()
                .name("STEEL SWORD")
                .materials(vec![material("iron_ingot")])
                .build(),
        ];
        let catalog = Catalog::new(sword_items(), recipes);
        let uses = catalog.items_using_material("iron_ingot");
        assert_eq!(uses[0].item_id, "sword_2");
    }

    #[test]
    fn items_using_material_synthesizes_placeholder() {
        let recipes = vec![
            Recipe::builder()
                .recipe_id("mystery_blade")
                .materials(vec![material("iron_ingot")])
                .build(),
        ];
        let catalog = Catalog::new(sword_items(), recipes);
        let uses = catalog.items_using_material("iron_ingot");
        assert_eq!(uses.len(), 1);
        assert_eq!(uses[0].item_id, "mystery_blade");
        assert_eq!(uses[0].name, "Unknown");
        assert_eq!(uses[0].item_type.as_deref(), Some("Recipe"));
    }

    #[test]
    fn placeholder_from_anonymous_recipe_uses_name_fields() {
        let recipes = vec![
            Recipe::builder()
                .name("Mystery Blade")
                .category("weapon")
                .materials(vec![material("iron_ingot")])
                .build(),
        ];
        let catalog = Catalog::new(Vec::new(), recipes);
        let uses = catalog.items_using_material("iron_ingot");
        assert_eq!(uses[0].item_id, "mystery_blade");
        assert_eq!(uses[0].name, "Mystery Blade");
        assert_eq!(uses[0].item_type.as_deref(), Some("weapon"));
    }

    #[test]
    fn items_using_material_preserves_duplicates_and_order() {
        // Two recipes consuming the same material and producing the same
        // item: both entries are kept, in recipe order.
        let recipes = vec![
            Recipe::builder()
                .recipe_id("sword_2")
                .category("a")
                .materials(vec![material("iron_ingot")])
                .build(),
            Recipe::builder()
                .recipe_id("sword_1")
                .materials(vec![material("leather_strip")])
                .build(),
            Recipe::builder()
                .recipe_id("sword_2")
                .category("b")
                .materials(vec![material("iron_ingot")])
                .build(),
        ];
        let catalog = Catalog::new(sword_items(), recipes);
        let uses = catalog.items_using_material("iron_ingot");
        assert_eq!(uses.len(), 2);
        assert_eq!(uses[0].item_id, "sword_2");
        assert_eq!(uses[1].item_id, "sword_2");
    }

    #[test]
    fn material_match_is_exact() {
        let recipes = vec![
            Recipe::builder()
                .recipe_id("sword_2")
                .materials(vec![material("Iron_Ingot")])
                .build(),
        ];
        let catalog = Catalog::new(sword_items(), recipes);
        assert!(catalog.items_using_material("iron_ingot").is_empty());
    }
}
