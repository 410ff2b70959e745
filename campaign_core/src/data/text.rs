//! Key -> string localization table.

use std::collections::BTreeMap;

use crate::environment::Localization;

/// In-memory text table with positional `{0}`, `{1}` placeholders.
#[derive(Debug, Clone, Default)]
pub struct TextCatalog {
    entries: BTreeMap<String, String>,
}

impl TextCatalog {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Localization for TextCatalog {
    fn text(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}

/// Replace `{n}` placeholders with the matching parameter.
///
/// Placeholders without a parameter are left untouched.
pub fn substitute(template: &str, params: &[&str]) -> String {
    let mut out = template.to_string();
    for (index, param) in params.iter().enumerate() {
        out = out.replace(&format!("{{{index}}}"), param);
    }
    out
}
