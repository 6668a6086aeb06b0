//! Property-based tests for generator item selection
//! Items take part in a run only when active and included by the filter,
//! and always in configuration order.

use constgen_storage::{GeneratorItem, Settings};
use proptest::prelude::*;

fn logic_id_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("loca-json".to_string()),
        Just("json-ints".to_string()),
        Just("json-strings".to_string()),
        Just("custom".to_string()),
    ]
}

fn item_strategy() -> impl Strategy<Value = GeneratorItem> {
    (logic_id_strategy(), any::<bool>(), "[A-Z][a-z]{2,8}").prop_map(
        |(logic_id, is_active, class_name_keys)| GeneratorItem {
            is_active,
            class_name_keys,
            ..GeneratorItem::new(logic_id)
        },
    )
}

proptest! {
    /// Property: without a filter, exactly the active items are selected, in order
    #[test]
    fn prop_selection_without_filter_keeps_active_in_order(
        items in prop::collection::vec(item_strategy(), 0..12),
    ) {
        let settings = Settings { generators: items.clone(), ..Default::default() };

        let selected: Vec<GeneratorItem> = settings.selected_items(None).cloned().collect();
        let expected: Vec<GeneratorItem> = items.into_iter().filter(|i| i.is_active).collect();

        prop_assert_eq!(selected, expected);
    }

    /// Property: a filter only ever narrows the unfiltered selection
    #[test]
    fn prop_filter_is_subsequence_of_unfiltered(
        items in prop::collection::vec(item_strategy(), 0..12),
        filter in prop::collection::vec(logic_id_strategy(), 0..3),
    ) {
        let settings = Settings { generators: items, ..Default::default() };

        let unfiltered: Vec<&GeneratorItem> = settings.selected_items(None).collect();
        let filtered: Vec<&GeneratorItem> = settings.selected_items(Some(filter.as_slice())).collect();

        for item in &filtered {
            prop_assert!(filter.contains(&item.logic_id));
        }

        let expected: Vec<&GeneratorItem> = unfiltered
            .into_iter()
            .filter(|i| filter.contains(&i.logic_id))
            .collect();
        prop_assert_eq!(filtered, expected);
    }
}
