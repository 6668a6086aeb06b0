//! Property-based tests for per-entry expansion
//!
//! Entries are driven through a lookup model's transform callback into a
//! block builder, the same way a generation run does.

use std::cell::RefCell;
use std::rc::Rc;

use constgen_generation::{
    BlockBuilder, IntLookupModel, LookupSource, Placeholders, SubstitutionEngine,
    TemplateMarkerParser,
};
use proptest::prelude::*;

const TEMPLATE: &str = "begin\n// %constComment//%1\n%constKey=%constValue//%0\nend\n";

/// Values and optional comments, keyed by position
fn entries_strategy() -> impl Strategy<Value = Vec<(String, Option<String>)>> {
    prop::collection::vec(
        ("[a-zA-Z][a-zA-Z ]{0,15}", prop::option::of("[a-z]{1,10}")),
        0..24,
    )
}

fn expand(entries: &[(String, Option<String>)]) -> (String, usize, usize) {
    let mut model = IntLookupModel::new();
    for (index, (value, comment)) in entries.iter().enumerate() {
        model.insert(index as i64, value.clone());
        if let Some(comment) = comment {
            model.insert_comment(value.replace(' ', "_"), comment.clone());
        }
    }

    let parsed = TemplateMarkerParser::parse(TEMPLATE);
    let builder = Rc::new(RefCell::new(BlockBuilder::new(&parsed, model.type_name())));
    let sink = Rc::clone(&builder);
    model.set_transform(Box::new(move |key, value, comment| {
        sink.borrow_mut().push(key, value, comment);
    }));
    model.transform_each().unwrap();

    let builder = builder.borrow();
    let (data_lines, comment_lines) = (builder.data_lines(), builder.comment_lines());
    let block = builder.clone().finish();
    (parsed.inject_block(&block), data_lines, comment_lines)
}

proptest! {
    /// Property: N entries produce N data lines, in model order, and no marker text
    #[test]
    fn prop_one_data_line_per_entry(entries in entries_strategy()) {
        let (output, data_lines, _) = expand(&entries);
        prop_assert_eq!(data_lines, entries.len());

        let keys: Vec<String> = output
            .lines()
            .filter(|line| !line.starts_with("// ") && *line != "begin" && *line != "end")
            .map(|line| line.split('=').next().unwrap_or_default().to_string())
            .collect();
        let expected: Vec<String> = (0..entries.len()).map(|i| i.to_string()).collect();
        prop_assert_eq!(keys, expected);
        prop_assert!(!output.contains("//%"));
    }

    /// Property: emitted values never contain a literal space
    #[test]
    fn prop_cleanup_removes_spaces(entries in entries_strategy()) {
        let (output, _, _) = expand(&entries);
        for line in output.lines().filter(|line| line.contains('=')) {
            let value = line.split_once('=').map(|(_, v)| v).unwrap_or_default();
            prop_assert!(!value.contains(' '), "value {:?} contains a space", value);
        }
    }

    /// Property: exactly one comment line precedes each commented entry, none otherwise
    #[test]
    fn prop_comment_lines_match_comments(entries in entries_strategy()) {
        let (output, _, comment_lines) = expand(&entries);
        let lines: Vec<&str> = output.lines().collect();

        // Later duplicates of a value share its comment
        let commented_values: std::collections::HashSet<String> = entries
            .iter()
            .filter(|(_, comment)| comment.is_some())
            .map(|(value, _)| value.replace(' ', "_"))
            .collect();
        let expected = entries
            .iter()
            .filter(|(value, _)| commented_values.contains(&value.replace(' ', "_")))
            .count();
        prop_assert_eq!(comment_lines, expected);

        for (index, line) in lines.iter().enumerate() {
            if line.starts_with("// ") {
                prop_assert!(lines.get(index + 1).map_or(false, |next| next.contains('=')));
            }
        }
    }

    /// Property: expansion is deterministic
    #[test]
    fn prop_expansion_is_deterministic(entries in entries_strategy()) {
        prop_assert_eq!(expand(&entries), expand(&entries));
    }

    /// Property: a line template without tokens expands to itself
    #[test]
    fn prop_unbound_text_is_untouched(text in "[a-zA-Z0-9 =;]{0,40}") {
        let placeholders = Placeholders::for_entry("k", "v", "int", None);
        prop_assert_eq!(SubstitutionEngine::expand(&text, &placeholders), text);
    }
}
