//! Row normalization: raw [`RowRecord`]s to key paths and per-language values.

use std::collections::HashMap;

use crate::types::{KeyPath, NormalizedRow, RowRecord};

/// Splits a category on `/` and `.` into path segments.
///
/// Segments are trimmed and empty ones dropped, so `"common//button."` and
/// `"common/button"` give the same path.
pub fn split_category(category: &str) -> Vec<String> {
    category
        .split(['/', '.'])
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(String::from)
        .collect()
}

/// Category text for flat keys: the same segments as [`split_category`],
/// each joined by the first separator written after the previous one.
///
/// `"common.button"` stays as is, `"a//b"` becomes `"a/b"` and `"/"` becomes
/// `""`.
pub fn compact_category(category: &str) -> String {
    let mut compact = String::new();
    let mut separator = None;
    let mut rest = category;
    loop {
        let end = rest.find(['/', '.']).unwrap_or(rest.len());
        let segment = rest[..end].trim();
        if !segment.is_empty() {
            if !compact.is_empty() {
                compact.push(separator.unwrap_or('/'));
            }
            compact.push_str(segment);
            separator = None;
        }
        let Some(found) = rest[end..].chars().next() else {
            break;
        };
        if separator.is_none() {
            separator = Some(found);
        }
        rest = &rest[end + found.len_utf8()..];
    }
    compact
}

/// Normalizes one row for the given languages.
///
/// Returns `None` when the row has no key (absent or blank after trimming).
/// Every language in `languages` gets a value; missing ones become `""`.
pub fn normalize(row: &RowRecord, languages: &[String]) -> Option<NormalizedRow> {
    let key = row.key.as_deref().map(str::trim).unwrap_or_default();
    if key.is_empty() {
        return None;
    }

    let category = row.category.as_deref().map(str::trim).unwrap_or_default();
    let values: HashMap<String, String> = languages
        .iter()
        .map(|lang| {
            let value = row.values.get(lang).cloned().unwrap_or_default();
            (lang.clone(), value)
        })
        .collect();

    Some(NormalizedRow {
        path: KeyPath::new(split_category(category), key),
        category: compact_category(category),
        values,
        row_number: row.row_number,
    })
}
