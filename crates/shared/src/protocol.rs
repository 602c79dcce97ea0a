use std::fmt;

use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};

pub const API_PREFIX: &str = "/api";
pub const COMBINE_ROUTE: &str = "/combine";
pub const OUTPUT_ROUTE: &str = "/output";
pub const IMAGE1_PART: &str = "image1";
pub const IMAGE2_PART: &str = "image2";
/// Conventional suffix on result keys, e.g. `xor_result`.
pub const RESULT_KEY_SUFFIX: &str = "_result";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEntry {
    pub key: String,
    pub url: String,
}

/// Ordered mapping of result variant name to image URL.
///
/// The key set is decided by the combine service and is open-ended. Entries
/// keep the order in which the service listed them; a repeated key keeps its
/// first position and takes the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    entries: Vec<ResultEntry>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, url: impl Into<String>) {
        let key = key.into();
        let url = url.into();
        match self.entries.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => entry.url = url,
            None => self.entries.push(ResultEntry { key, url }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.url.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResultEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ResultSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = ResultSet::new();
        for (key, url) in iter {
            set.insert(key, url);
        }
        set
    }
}

impl Serialize for ResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.key, &entry.url)?;
        }
        map.end()
    }
}

struct ResultSetVisitor;

impl<'de> Visitor<'de> for ResultSetVisitor {
    type Value = ResultSet;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a flat object of result names to image URLs")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut set = ResultSet::new();
        while let Some((key, url)) = access.next_entry::<String, String>()? {
            set.insert(key, url);
        }
        Ok(set)
    }
}

impl<'de> Deserialize<'de> for ResultSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ResultSetVisitor)
    }
}
