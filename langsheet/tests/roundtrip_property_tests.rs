use langsheet::tree::build_translations;
use langsheet::{Converter, ConverterConfig, KeyMode, RowRecord, normalize};
use proptest::prelude::*;
use std::collections::BTreeMap;

const LANGUAGES: [&str; 2] = ["en", "ko"];

fn languages() -> Vec<String> {
    LANGUAGES.iter().map(|l| l.to_string()).collect()
}

fn segment_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z0-9_]{0,5}").expect("valid segment regex")
}

fn value_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9 _\\-,!\\?]{0,20}").expect("valid value regex")
}

fn separator_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("/"), Just(".")]
}

type Row = (String, String, String, String);

/// Two category segments and a key: every leaf sits at depth three, so rows
/// can never disagree about leaf versus branch.
fn row_strategy() -> impl Strategy<Value = Row> {
    (
        segment_strategy(),
        separator_strategy(),
        segment_strategy(),
        segment_strategy(),
        value_strategy(),
        value_strategy(),
    )
        .prop_map(|(group, sep, section, key, en, ko)| {
            (format!("{}{}{}", group, sep, section), key, en, ko)
        })
}

fn record(category: &str, key: &str, en: &str, ko: &str) -> RowRecord {
    RowRecord::new(category, key)
        .with_value("en", en)
        .with_value("ko", ko)
}

/// Last write wins: the expected `(language, dotted path) -> value` triples.
fn expected_triples(rows: &[Row]) -> BTreeMap<(String, String), String> {
    let mut out = BTreeMap::new();
    for (category, key, en, ko) in rows {
        let path = format!("{}.{}", category.replace('/', "."), key);
        out.insert(("en".to_string(), path.clone()), en.clone());
        out.insert(("ko".to_string(), path), ko.clone());
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn key_path_ends_with_key_after_category_segments(
        segments in prop::collection::vec(segment_strategy(), 0..4),
        sep in separator_strategy(),
        key in segment_strategy(),
    ) {
        let category = segments.join(sep);
        let row = normalize(&RowRecord::new(category.as_str(), key.as_str()), &languages())
            .expect("row with a key is kept");
        prop_assert_eq!(row.path.key(), key.as_str());
        prop_assert_eq!(row.path.prefix(), segments.as_slice());
        for lang in LANGUAGES {
            prop_assert_eq!(row.value(lang), "");
        }
    }

    #[test]
    fn blank_keys_never_reach_a_tree(
        category in segment_strategy(),
        blank in "[ \t]{0,3}",
        value in value_strategy(),
    ) {
        let rows = vec![record(&category, &blank, &value, &value)];
        let set = build_translations(&rows, &languages(), KeyMode::Nested).unwrap();
        for (_, tree) in set.iter() {
            prop_assert!(tree.is_empty());
        }
    }

    #[test]
    fn flattening_reproduces_last_written_triples(
        rows in prop::collection::vec(row_strategy(), 1..12),
    ) {
        let records: Vec<RowRecord> = rows
            .iter()
            .map(|(category, key, en, ko)| record(category, key, en, ko))
            .collect();
        let set = build_translations(&records, &languages(), KeyMode::Nested).unwrap();

        let mut actual = BTreeMap::new();
        for (lang, tree) in set.iter() {
            for (path, value) in tree.flatten(".") {
                actual.insert((lang.to_string(), path), value);
            }
        }
        prop_assert_eq!(actual, expected_triples(&rows));
    }

    #[test]
    fn csv_pipeline_is_deterministic(
        rows in prop::collection::vec(row_strategy(), 1..8),
    ) {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["category", "key", "en", "ko"]).unwrap();
        for (category, key, en, ko) in &rows {
            writer.write_record([category, key, en, ko]).unwrap();
        }
        let bytes = writer.into_inner().unwrap();

        let config = ConverterConfig::new("strings.csv", "out", languages());
        let converter = Converter::new(config).unwrap();
        let first = converter.convert_bytes(&bytes).unwrap();
        let second = converter.convert_bytes(&bytes).unwrap();

        for lang in LANGUAGES {
            let a = first.translations.tree(lang).unwrap().to_json_pretty().unwrap();
            let b = second.translations.tree(lang).unwrap().to_json_pretty().unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
