//! Discovery of the effective runtime schema: the distinct item types and
//! the stat keys that actually occur in the loaded data. Used to populate
//! predicate choices; has no effect on query semantics.

use std::collections::BTreeSet;

use itertools::Itertools;
use serde::Serialize;

use crate::Rc;
use crate::catalog::types::Item;
use crate::query::caseless_cmp;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub types: Vec<String>,
    pub base_stat_keys: Vec<String>,
    pub stat_keys: Vec<String>,
}

fn sorted(values: BTreeSet<String>) -> Vec<String> {
    values
        .into_iter()
        .sorted_by(|a, b| caseless_cmp(a, b))
        .collect()
}

/// Scans every item once, collecting the distinct `byType`-or-`type` values
/// and every key occurring in any `baseStats`/`stats` mapping. Each output
/// list is deduplicated and caselessly sorted.
pub fn build_filter_options(items: &[Rc<Item>]) -> FilterOptions {
    let mut types = BTreeSet::new();
    let mut base_stat_keys = BTreeSet::new();
    let mut stat_keys = BTreeSet::new();

    for item in items {
        if let Some(label) = item.type_label().filter(|t| !t.is_empty()) {
            types.insert(label.to_owned());
        }
        base_stat_keys.extend(item.base_stats.keys().cloned());
        stat_keys.extend(item.stats.keys().cloned());
    }

    FilterOptions {
        types: sorted(types),
        base_stat_keys: sorted(base_stat_keys),
        stat_keys: sorted(stat_keys),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::catalog::decode::build_item;
    use serde_json::json;

    fn items(records: &[serde_json::Value]) -> Vec<Rc<Item>> {
        records.iter().map(|v| Rc::new(build_item(v))).collect()
    }

    #[test]
    fn collects_distinct_sorted_types() {
        let items = items(&[
            json!({"itemId": "a", "type": "weapon"}),
            json!({"itemId": "b", "type": "armor"}),
            json!({"itemId": "c", "type": "weapon"}),
        ]);
        let options = build_filter_options(&items);
        assert_eq!(options.types, ["armor", "weapon"]);
    }

    #[test]
    fn by_type_takes_precedence_over_type() {
        let items = items(&[json!({"itemId": "a", "type": "weapon", "byType": "Blade"})]);
        let options = build_filter_options(&items);
        assert_eq!(options.types, ["Blade"]);
    }

    #[test]
    fn collects_stat_keys_across_items() {
        let items = items(&[
            json!({"itemId": "a", "stats": {"damage": 1}, "baseStats": {"tier": 1}}),
            json!({"itemId": "b", "stats": {"range": 2, "damage": 3}}),
        ]);
        let options = build_filter_options(&items);
        assert_eq!(options.stat_keys, ["damage", "range"]);
        assert_eq!(options.base_stat_keys, ["tier"]);
    }

    #[test]
    fn untyped_items_contribute_nothing() {
        let options = build_filter_options(&items(&[json!({"itemId": "a"})]));
        assert_eq!(options, FilterOptions::default());
    }

    #[test]
    fn sorting_is_caseless() {
        let items = items(&[
            json!({"itemId": "a", "type": "Zephyr"}),
            json!({"itemId": "b", "type": "armor"}),
        ]);
        let options = build_filter_options(&items);
        assert_eq!(options.types, ["armor", "Zephyr"]);
    }
}
