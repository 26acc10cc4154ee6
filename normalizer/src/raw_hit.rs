//! The flat parameter mapping a hit arrives as.

use indexmap::IndexMap;
use serde::de::{Deserializer, Error as _};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::keys::ParamKey;

/// Decoded measurement protocol payload plus collector enrichment fields.
///
/// Keeps insertion order so that everything derived from iterating the
/// parameters comes out in the same order for the same input.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RawHit {
    params: IndexMap<String, String>,
}

impl RawHit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a URL-encoded body. Blank values are kept and a repeated key
    /// keeps its last value.
    pub fn from_query_string(query: &str) -> Self {
        url::form_urlencoded::parse(query.as_bytes())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect()
    }

    /// Inserts or replaces a parameter, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.params.insert(key.into(), value.into())
    }

    /// Raw value, empty strings included
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Value only when it is present and not empty
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.is_empty())
    }

    /// Looks up a typed key
    pub fn get_key(&self, key: ParamKey) -> Option<&str> {
        self.get(&key.to_string())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Every recognized key together with its raw value, in input order
    pub fn parsed_keys(&self) -> impl Iterator<Item = (ParamKey, &str)> {
        self.iter()
            .filter_map(|(key, value)| ParamKey::parse(key).map(|parsed| (parsed, value)))
    }
}

impl<K, V> FromIterator<(K, V)> for RawHit
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut hit = RawHit::new();
        for (key, value) in iter {
            hit.insert(key, value);
        }
        hit
    }
}

/// Accepts the JSON object emitted by the collector. Numbers and booleans are
/// kept in their textual form (`serverTimeUtc` arrives as an integer) and
/// `null` marks a field the collector could not fill, so it is dropped.
impl<'de> Deserialize<'de> for RawHit {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = IndexMap::<String, JsonValue>::deserialize(deserializer)?;
        let mut hit = RawHit::new();

        for (key, value) in fields {
            let value = match value {
                JsonValue::Null => continue,
                JsonValue::String(s) => s,
                JsonValue::Number(n) => n.to_string(),
                JsonValue::Bool(b) => b.to_string(),
                JsonValue::Array(_) | JsonValue::Object(_) => {
                    return Err(D::Error::custom(format!(
                        "parameter {key} must be a scalar value"
                    )));
                }
            };
            hit.insert(key, value);
        }

        Ok(hit)
    }
}
