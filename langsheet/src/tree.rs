//! Per-language translation trees.
//!
//! A [`TranslationTree`] is a JSON object whose keys keep first-insertion
//! order. A [`TranslationSet`] holds one tree per supported language and
//! inserts normalized rows into all of them at once, rejecting rows that would
//! turn a value into a category or the other way around.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    error::Error,
    normalize::normalize,
    types::{NodeKind, NormalizedRow, RowRecord},
};

/// How row paths map onto output keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyMode {
    /// `common/button` + `reset` becomes `{"common":{"button":{"reset":..}}}`.
    #[default]
    Nested,
    /// `common/button` + `reset` becomes `{"common/button/reset": ..}`.
    Flat,
}

impl KeyMode {
    pub fn from_nested_flag(use_nested_keys: bool) -> Self {
        if use_nested_keys {
            KeyMode::Nested
        } else {
            KeyMode::Flat
        }
    }
}

/// Where an insertion collided with an existing node of the other kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clash {
    /// Index of the colliding segment in the inserted path.
    pub depth: usize,
    /// What the existing node was.
    pub existing: NodeKind,
}

/// Nested translations for one language.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct TranslationTree(Map<String, Value>);

impl TranslationTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the leaf at `segments`, creating branches on the way.
    ///
    /// An existing leaf at the same path is overwritten. Descending through a
    /// leaf, or replacing a branch with a leaf, is reported as a [`Clash`] and
    /// leaves the tree unchanged.
    pub fn insert(&mut self, segments: &[String], value: &str) -> Result<(), Clash> {
        let Some((leaf, parents)) = segments.split_last() else {
            return Ok(());
        };

        let mut node = &mut self.0;
        for (depth, segment) in parents.iter().enumerate() {
            let child = node
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            match child {
                Value::Object(map) => node = map,
                _ => {
                    return Err(Clash {
                        depth,
                        existing: NodeKind::Leaf,
                    });
                }
            }
        }

        if let Some(Value::Object(_)) = node.get(leaf) {
            return Err(Clash {
                depth: parents.len(),
                existing: NodeKind::Branch,
            });
        }
        node.insert(leaf.clone(), Value::String(value.to_string()));
        Ok(())
    }

    /// Sets a top-level key without any nesting.
    pub fn insert_flat(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_string(), Value::String(value.to_string()));
    }

    /// Looks up the value at `segments`.
    pub fn get(&self, segments: &[&str]) -> Option<&Value> {
        let (leaf, parents) = segments.split_last()?;
        let mut node = &self.0;
        for segment in parents {
            match node.get(*segment)? {
                Value::Object(map) => node = map,
                _ => return None,
            }
        }
        node.get(*leaf)
    }

    /// Flattens back to `(path, value)` pairs in insertion order, joining
    /// segments with `separator`. Non-string leaves are skipped.
    pub fn flatten(&self, separator: &str) -> Vec<(String, String)> {
        fn walk(
            map: &Map<String, Value>,
            prefix: &str,
            separator: &str,
            out: &mut Vec<(String, String)>,
        ) {
            for (key, value) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}{}{}", prefix, separator, key)
                };
                match value {
                    Value::Object(child) => walk(child, &path, separator, out),
                    Value::String(s) => out.push((path, s.clone())),
                    _ => {}
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.0, "", separator, &mut out);
        out
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Pretty-printed JSON with 2-space indentation.
    pub fn to_json_pretty(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(&self.0)?)
    }
}

impl TryFrom<Value> for TranslationTree {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::parse_error(format!(
                "translation tree must be a JSON object, got {}",
                other
            ))),
        }
    }
}

/// One translation tree per supported language, filled row by row.
#[derive(Debug, Clone)]
pub struct TranslationSet {
    languages: Vec<String>,
    trees: HashMap<String, TranslationTree>,
    mode: KeyMode,
    /// Row that created each node, keyed by its path. Shared by all languages.
    origins: HashMap<Vec<String>, Option<usize>>,
}

impl TranslationSet {
    /// Creates an empty tree for every language up front, so languages without
    /// any rows still produce a (empty) file.
    pub fn new(languages: &[String], mode: KeyMode) -> Self {
        let trees = languages
            .iter()
            .map(|lang| (lang.clone(), TranslationTree::new()))
            .collect();
        Self {
            languages: languages.to_vec(),
            trees,
            mode,
            origins: HashMap::new(),
        }
    }

    /// Builds a set from already-converted trees, e.g. the output of an
    /// acceleration module. Languages missing from `translations` get an
    /// empty tree; extra languages are ignored.
    pub fn from_translations(
        languages: &[String],
        mode: KeyMode,
        mut translations: HashMap<String, Value>,
    ) -> Result<Self, Error> {
        let mut set = Self::new(languages, mode);
        for lang in languages {
            if let Some(value) = translations.remove(lang) {
                set.trees.insert(lang.clone(), TranslationTree::try_from(value)?);
            }
        }
        Ok(set)
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn mode(&self) -> KeyMode {
        self.mode
    }

    pub fn tree(&self, language: &str) -> Option<&TranslationTree> {
        self.trees.get(language)
    }

    /// Trees in the order the languages were declared.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TranslationTree)> {
        self.languages
            .iter()
            .filter_map(|lang| self.trees.get(lang).map(|tree| (lang.as_str(), tree)))
    }

    /// Inserts one normalized row into every language's tree.
    pub fn insert_row(&mut self, row: &NormalizedRow) -> Result<(), Error> {
        if self.mode == KeyMode::Flat {
            let key = row.flat_key();
            for lang in &self.languages {
                if let Some(tree) = self.trees.get_mut(lang) {
                    tree.insert_flat(&key, row.value(lang));
                }
            }
            return Ok(());
        }

        let segments = row.path.segments();
        for lang in &self.languages {
            let Some(tree) = self.trees.get_mut(lang) else {
                continue;
            };
            // Every tree has the same shape, so a clash shows up in the first
            // language before any tree is touched.
            if let Err(clash) = tree.insert(segments, row.value(lang)) {
                return Err(self.conflict(segments, clash, row.row_number));
            }
        }
        self.record_origins(segments, row.row_number);
        Ok(())
    }

    /// Normalizes and inserts a raw row; rows without a key are skipped.
    /// Returns whether the row was used.
    pub fn insert_record(&mut self, record: &RowRecord) -> Result<bool, Error> {
        match normalize(record, &self.languages) {
            Some(row) => self.insert_row(&row).map(|_| true),
            None => Ok(false),
        }
    }

    /// Converts into a `language -> tree` JSON map.
    pub fn into_translations(self) -> HashMap<String, Value> {
        self.trees
            .into_iter()
            .map(|(lang, tree)| (lang, tree.into_value()))
            .collect()
    }

    fn record_origins(&mut self, segments: &[String], row_number: Option<usize>) {
        for end in 1..segments.len() {
            self.origins
                .entry(segments[..end].to_vec())
                .or_insert(row_number);
        }
        // The leaf belongs to whichever row wrote it last.
        self.origins.insert(segments.to_vec(), row_number);
    }

    fn conflict(&self, segments: &[String], clash: Clash, row_number: Option<usize>) -> Error {
        let clashing = &segments[..=clash.depth];
        Error::StructuralConflict {
            path: clashing.join("."),
            existing: clash.existing,
            languages: self.languages.clone(),
            first_row: self.origins.get(clashing).copied().flatten(),
            second_row: row_number,
        }
    }
}

/// Builds translation trees from raw rows: normalize, skip keyless rows,
/// insert in order.
pub fn build_translations<'a, I>(
    rows: I,
    languages: &[String],
    mode: KeyMode,
) -> Result<TranslationSet, Error>
where
    I: IntoIterator<Item = &'a RowRecord>,
{
    let mut set = TranslationSet::new(languages, mode);
    let mut skipped = 0usize;
    for record in rows {
        if !set.insert_record(record)? {
            skipped += 1;
        }
    }
    if skipped > 0 {
        tracing::debug!("skipped {} rows without a key", skipped);
    }
    Ok(set)
}
