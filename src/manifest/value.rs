//! Generic property-list tree
//!
//! Decoded plists become a closed set of node types; field mapping goes
//! through the typed accessors here instead of dynamic key access.

use std::time::SystemTime;

#[derive(Debug, Clone, PartialEq)]
pub enum ManifestValue {
    String(String),
    /// Plist integers span i64 and u64; i128 holds both
    Integer(i128),
    Real(f64),
    Boolean(bool),
    Date(SystemTime),
    Data(Vec<u8>),
    Array(Vec<ManifestValue>),
    Dictionary(Dictionary),
}

/// Keyed map that keeps document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    entries: Vec<(String, ManifestValue)>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; a replaced key keeps its original position
    pub fn insert(&mut self, key: impl Into<String>, value: ManifestValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ManifestValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ManifestValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Follow nested dictionaries by key
    pub fn get_path(&self, path: &[&str]) -> Option<&ManifestValue> {
        let (last, parents) = path.split_last()?;
        let mut current = self;
        for key in parents {
            current = current.get(key)?.as_dictionary()?;
        }
        current.get(last)
    }

    /// First key in `keys` whose value converts to non-empty text
    pub fn first_text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.get(key).and_then(ManifestValue::to_text))
    }
}

impl ManifestValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ManifestValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            ManifestValue::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ManifestValue]> {
        match self {
            ManifestValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// String form for descriptor fields
    ///
    /// Strings are trimmed; numbers give their decimal text, and a whole real
    /// keeps its fraction (`1.0`). Empty strings and non-scalar nodes give
    /// `None`.
    pub fn to_text(&self) -> Option<String> {
        let text = match self {
            ManifestValue::String(s) => s.trim().to_string(),
            ManifestValue::Integer(i) => i.to_string(),
            ManifestValue::Real(r) => format!("{r:?}"),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    }

    /// Strings of a string-or-array-of-strings node
    pub fn to_string_list(&self) -> Vec<String> {
        match self {
            ManifestValue::Array(items) => items.iter().filter_map(ManifestValue::to_text).collect(),
            other => other.to_text().into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dictionary {
        let mut primary = Dictionary::new();
        primary.insert(
            "CFBundleIconFiles",
            ManifestValue::Array(vec![
                ManifestValue::String("AppIcon60x60".into()),
                ManifestValue::Integer(7),
                ManifestValue::Boolean(true),
            ]),
        );
        let mut icons = Dictionary::new();
        icons.insert("CFBundlePrimaryIcon", ManifestValue::Dictionary(primary));

        let mut root = Dictionary::new();
        root.insert("CFBundleName", ManifestValue::String("  ".into()));
        root.insert("CFBundleDisplayName", ManifestValue::String("Test".into()));
        root.insert("CFBundleVersion", ManifestValue::Integer(10));
        root.insert("CFBundleIcons", ManifestValue::Dictionary(icons));
        root
    }

    #[test]
    fn test_first_text_skips_empty() {
        let root = sample();
        assert_eq!(root.first_text(&["CFBundleName", "CFBundleDisplayName"]).as_deref(), Some("Test"));
        assert_eq!(root.first_text(&["CFBundleVersion"]).as_deref(), Some("10"));
        assert_eq!(root.first_text(&["CFBundleIcons"]), None);
        assert_eq!(root.first_text(&["Missing"]), None);
    }

    #[test]
    fn test_get_path() {
        let root = sample();
        let files = root
            .get_path(&["CFBundleIcons", "CFBundlePrimaryIcon", "CFBundleIconFiles"])
            .unwrap();
        assert_eq!(files.to_string_list(), vec!["AppIcon60x60".to_string(), "7".to_string()]);
        assert!(root.get_path(&["CFBundleName", "Nested"]).is_none());
        assert!(root.get_path(&[]).is_none());
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut dict = Dictionary::new();
        dict.insert("a", ManifestValue::Integer(1));
        dict.insert("b", ManifestValue::Integer(2));
        dict.insert("a", ManifestValue::Integer(3));

        let keys: Vec<&str> = dict.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(dict.get("a"), Some(&ManifestValue::Integer(3)));
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn test_real_text_keeps_fraction() {
        assert_eq!(ManifestValue::Real(1.0).to_text().as_deref(), Some("1.0"));
        assert_eq!(ManifestValue::Real(10.0).to_text().as_deref(), Some("10.0"));
        assert_eq!(ManifestValue::Real(2.5).to_text().as_deref(), Some("2.5"));
    }
}
