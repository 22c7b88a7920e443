//! The query pipeline: free-text search, then conjunctive structured
//! predicates, then a stable sort. Each stage feeds the next and none
//! mutates its input, so the same base collection can be re-queried on every
//! interaction.

use std::cmp::Ordering;

use bon::Builder;

use crate::Rc;
use crate::catalog::types::Item;

/// Structured field predicates
pub mod filters;
/// Depth-bounded free-text search over raw records
pub mod search;

pub use filters::{ItemFilters, KeyValueFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Rarity,
    Level,
    Value,
    Damage,
    EnhancementLevel,
}

impl SortKey {
    /// Parses a sort-control value. Unrecognized values yield `None`, which
    /// the pipeline treats as "leave order unchanged".
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "name" => Some(SortKey::Name),
            "rarity" => Some(SortKey::Rarity),
            "level" => Some(SortKey::Level),
            "value" => Some(SortKey::Value),
            "damage" => Some(SortKey::Damage),
            "enhancementLevel" => Some(SortKey::EnhancementLevel),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }
}

/// Caseless string ordering with an original-string tiebreak. Stands in for
/// locale collation for both the sort stage and option discovery.
pub(crate) fn caseless_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn compare_by(key: SortKey, a: &Item, b: &Item) -> Ordering {
    match key {
        SortKey::Name => caseless_cmp(&a.name, &b.name),
        SortKey::Rarity => a.rarity.rank().cmp(&b.rarity.rank()),
        SortKey::Level => a.level.cmp(&b.level),
        SortKey::Value => a.value.unwrap_or(0.0).total_cmp(&b.value.unwrap_or(0.0)),
        SortKey::Damage => a.stat("damage").total_cmp(&b.stat("damage")),
        SortKey::EnhancementLevel => a
            .enhancement_level
            .unwrap_or(0)
            .cmp(&b.enhancement_level.unwrap_or(0)),
    }
}

/// One evaluation of the pipeline: search text, predicates, and sort.
#[derive(Debug, Clone, Default, Builder)]
pub struct ItemQuery {
    #[builder(default, into)]
    pub search: String,
    #[builder(default)]
    pub filters: ItemFilters,
    pub sort_by: Option<SortKey>,
    #[builder(default)]
    pub order: SortOrder,
}

impl ItemQuery {
    /// Evaluates the pipeline over `items`, producing a new ordered list.
    pub fn run(&self, items: &[Rc<Item>]) -> Vec<Rc<Item>> {
        let mut results: Vec<Rc<Item>> = items.to_vec();

        let needle = self.search.trim().to_lowercase();
        if !needle.is_empty() {
            results.retain(|item| search::item_matches(item, &needle));
        }

        results.retain(|item| self.filters.matches(item));

        if let Some(key) = self.sort_by {
            results.sort_by(|a, b| {
                let ordering = compare_by(key, a, b);
                match self.order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }

        results
    }
}
