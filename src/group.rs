//! Grouping features by an administrative attribute

use geojson::Feature;
use serde_json::Value as JsonValue;

/// Insertion-ordered buckets of features sharing one attribute value
///
/// Bucket order is the order in which each key value was first seen, and
/// features keep their input order inside a bucket.
#[derive(Debug, Clone, Default)]
pub struct Groups<'a> {
    buckets: Vec<(String, Vec<&'a Feature>)>,
}

impl<'a> Groups<'a> {
    /// Number of distinct key values
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Features filed under `key`, if any
    pub fn get(&self, key: &str) -> Option<&[&'a Feature]> {
        self.buckets
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, features)| features.as_slice())
    }

    /// Key values in first-seen order
    pub fn keys(&self) -> Vec<&str> {
        self.buckets.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (String, Vec<&'a Feature>)> {
        self.buckets.iter()
    }

    fn push(&mut self, key: String, feature: &'a Feature) {
        // Linear scan: a level rarely has more than a few hundred units
        match self.buckets.iter_mut().find(|(name, _)| *name == key) {
            Some((_, features)) => features.push(feature),
            None => self.buckets.push((key, vec![feature])),
        }
    }
}

impl<'a> IntoIterator for Groups<'a> {
    type Item = (String, Vec<&'a Feature>);
    type IntoIter = std::vec::IntoIter<(String, Vec<&'a Feature>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.into_iter()
    }
}

/// Partition features by the value of property `key`
///
/// Features whose value is absent or falsy (null, `false`, `0`, `""`) do not
/// belong to any unit at this level and are left out.
pub fn group_by_key<'a>(features: &'a [Feature], key: &str) -> Groups<'a> {
    let mut groups = Groups::default();

    for feature in features {
        if let Some(name) = key_value(feature, key) {
            groups.push(name, feature);
        }
    }

    groups
}

/// Read `key` from a feature's properties as a group name
///
/// Strings are used verbatim; other truthy scalars use their JSON text.
pub fn key_value(feature: &Feature, key: &str) -> Option<String> {
    let value = feature.properties.as_ref()?.get(key)?;

    match value {
        JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
        JsonValue::Bool(true) => Some("true".to_string()),
        JsonValue::Number(n) if n.as_f64().map(|v| v != 0.0 && !v.is_nan()).unwrap_or(true) => {
            Some(n.to_string())
        }
        _ => None,
    }
}
