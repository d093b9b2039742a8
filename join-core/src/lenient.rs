//! Deserializers for fields the store may hold in more than one shape.
//!
//! Records written by older clients store an empty collection as `""`
//! and may leave optional objects as `null`. Readers accept all of them;
//! writers always emit the canonical shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

/// Accepts a map, `""`, `null`, or a missing field, yielding an empty map
/// for everything but a real object.
pub fn map_or_blank<'de, D, K, V>(deserializer: D) -> Result<BTreeMap<K, V>, D::Error>
where
    D: Deserializer<'de>,
    K: Deserialize<'de> + Ord,
    V: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Shape<K: Ord, V> {
        Map(BTreeMap<K, V>),
        Blank(String),
    }

    match Option::<Shape<K, V>>::deserialize(deserializer)? {
        Some(Shape::Map(map)) => Ok(map),
        Some(Shape::Blank(text)) => {
            discarded(&text);
            Ok(BTreeMap::new())
        }
        None => Ok(BTreeMap::new()),
    }
}

/// Treats `null` (or `""`) as the type's default.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Shape<T> {
        Value(T),
        Blank(String),
    }

    match Option::<Shape<T>>::deserialize(deserializer)? {
        Some(Shape::Value(value)) => Ok(value),
        Some(Shape::Blank(text)) => {
            discarded(&text);
            Ok(T::default())
        }
        None => Ok(T::default()),
    }
}

/// `""` is the legacy empty shape; any other text is data being dropped.
fn discarded(text: &str) {
    if !text.is_empty() {
        tracing::warn!(value = %text, "unexpected text in place of a structured field, using the empty value");
    }
}
