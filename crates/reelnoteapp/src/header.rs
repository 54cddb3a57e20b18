//! Frontmatter header values.
//!
//! YAML frontmatter can hold anything: scalars, lists, nested maps. Rather than
//! passing `serde_yaml::Value` around and probing it at every call site, the
//! header is converted once into [`HeaderValue`], a closed set of variants with
//! explicit accessors that return `Option`.
//!
//! Keys the tool does not own (user fields, aliases, ratings...) are carried
//! through untouched. Values the variants cannot express exactly (tagged nodes,
//! integers beyond `i64`, maps with non-string keys) are kept as
//! [`HeaderValue::Raw`], and top-level entries whose key is not a string are
//! kept verbatim beside the named fields. The only canonicalisation is key
//! order: named fields are written sorted, followed by the other entries in
//! their original order.

use serde_yaml::{Mapping, Number, Value};
use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

/// Frontmatter fields by name, plus any entries keyed by something other than
/// a string. Derefs to the named fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Header {
    fields: BTreeMap<String, HeaderValue>,
    other: Vec<(Value, Value)>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.other.is_empty()
    }

    /// Entries whose key is not a plain string, e.g. `1: one` or `? [a, b]`.
    pub fn other_entries(&self) -> &[(Value, Value)] {
        &self.other
    }
}

impl Deref for Header {
    type Target = BTreeMap<String, HeaderValue>;

    fn deref(&self) -> &Self::Target {
        &self.fields
    }
}

impl DerefMut for Header {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.fields
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<HeaderValue>),
    Map(BTreeMap<String, HeaderValue>),
    /// A YAML node kept exactly as parsed.
    Raw(Value),
}

impl HeaderValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            HeaderValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Integer view that also accepts floats without a fractional part.
    pub fn as_integral(&self) -> Option<i64> {
        match self {
            HeaderValue::Int(i) => Some(*i),
            HeaderValue::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[HeaderValue]> {
        match self {
            HeaderValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Non-empty string items of a list. Anything else yields `None`.
    pub fn as_string_list(&self) -> Option<Vec<String>> {
        self.as_list().map(|items| {
            items
                .iter()
                .filter_map(HeaderValue::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
    }

    /// Scalar rendered as text; used where a YAML number stands in for a string
    /// (e.g. `title: 1917`).
    pub fn to_scalar_string(&self) -> Option<String> {
        match self {
            HeaderValue::String(s) => Some(s.clone()),
            HeaderValue::Int(i) => Some(i.to_string()),
            HeaderValue::Float(f) => Some(f.to_string()),
            _ => None,
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        HeaderValue::String(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        HeaderValue::String(value)
    }
}

impl From<i64> for HeaderValue {
    fn from(value: i64) -> Self {
        HeaderValue::Int(value)
    }
}

impl From<Vec<String>> for HeaderValue {
    fn from(value: Vec<String>) -> Self {
        HeaderValue::List(value.into_iter().map(HeaderValue::String).collect())
    }
}

impl From<Value> for HeaderValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => HeaderValue::Null,
            Value::Bool(b) => HeaderValue::Bool(b),
            Value::Number(n) => number_to_header(&n),
            Value::String(s) => HeaderValue::String(s),
            Value::Sequence(items) => {
                HeaderValue::List(items.into_iter().map(HeaderValue::from).collect())
            }
            Value::Mapping(map) => nested_map(map),
            tagged @ Value::Tagged(_) => HeaderValue::Raw(tagged),
        }
    }
}

impl From<&HeaderValue> for Value {
    fn from(value: &HeaderValue) -> Self {
        match value {
            HeaderValue::Null => Value::Null,
            HeaderValue::Bool(b) => Value::Bool(*b),
            HeaderValue::Int(i) => Value::Number(Number::from(*i)),
            HeaderValue::Float(f) => Value::Number(Number::from(*f)),
            HeaderValue::String(s) => Value::String(s.clone()),
            HeaderValue::List(items) => Value::Sequence(items.iter().map(Value::from).collect()),
            HeaderValue::Map(map) => Value::Mapping(
                map.iter()
                    .map(|(key, value)| (Value::String(key.clone()), Value::from(value)))
                    .collect(),
            ),
            HeaderValue::Raw(value) => value.clone(),
        }
    }
}

fn number_to_header(n: &Number) -> HeaderValue {
    if let Some(i) = n.as_i64() {
        HeaderValue::Int(i)
    } else if n.is_u64() {
        // beyond i64::MAX, an f64 would lose digits
        HeaderValue::Raw(Value::Number(n.clone()))
    } else {
        n.as_f64()
            .map(HeaderValue::Float)
            .unwrap_or_else(|| HeaderValue::Raw(Value::Number(n.clone())))
    }
}

/// A nested map becomes [`HeaderValue::Map`] only when every key is a string.
fn nested_map(map: Mapping) -> HeaderValue {
    if map.keys().all(Value::is_string) {
        HeaderValue::Map(
            map.into_iter()
                .filter_map(|(key, value)| match key {
                    Value::String(key) => Some((key, HeaderValue::from(value))),
                    _ => None,
                })
                .collect(),
        )
    } else {
        HeaderValue::Raw(Value::Mapping(map))
    }
}

pub fn mapping_to_header(map: Mapping) -> Header {
    let mut header = Header::new();
    for (key, value) in map {
        match key {
            Value::String(key) => {
                header.fields.insert(key, HeaderValue::from(value));
            }
            key => header.other.push((key, value)),
        }
    }
    header
}

pub fn header_to_mapping(header: &Header) -> Mapping {
    let mut mapping: Mapping = header
        .fields
        .iter()
        .map(|(key, value)| (Value::String(key.clone()), Value::from(value)))
        .collect();
    for (key, value) in &header.other {
        mapping.insert(key.clone(), value.clone());
    }
    mapping
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Header {
        match serde_yaml::from_str::<Value>(yaml).unwrap() {
            Value::Mapping(map) => mapping_to_header(map),
            other => panic!("expected mapping, got {:?}", other),
        }
    }

    #[test]
    fn converts_every_yaml_shape() {
        let header = parse(
            "title: Heat\nruntime: 170\nrating: 8.5\nwatched: true\nnote: ~\ntags:\n  - a\n  - b\nextra:\n  k: v\n",
        );
        assert_eq!(header["title"], HeaderValue::String("Heat".into()));
        assert_eq!(header["runtime"], HeaderValue::Int(170));
        assert_eq!(header["rating"], HeaderValue::Float(8.5));
        assert_eq!(header["watched"], HeaderValue::Bool(true));
        assert_eq!(header["note"], HeaderValue::Null);
        assert_eq!(
            header["tags"].as_string_list(),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        match &header["extra"] {
            HeaderValue::Map(m) => assert_eq!(m["k"].as_str(), Some("v")),
            other => panic!("expected map, got {:?}", other),
        }
    }

    #[test]
    fn accessors_match_only_their_variant() {
        assert_eq!(HeaderValue::Int(3).as_str(), None);
        assert_eq!(HeaderValue::String("3".into()).as_int(), None);
        assert_eq!(HeaderValue::Float(603.0).as_integral(), Some(603));
        assert_eq!(HeaderValue::Float(603.5).as_integral(), None);
        assert_eq!(HeaderValue::String("x".into()).as_string_list(), None);
    }

    #[test]
    fn string_list_drops_non_strings_and_empties() {
        let value = HeaderValue::List(vec![
            HeaderValue::from("keep"),
            HeaderValue::Int(1),
            HeaderValue::from(""),
        ]);
        assert_eq!(value.as_string_list(), Some(vec!["keep".to_string()]));
    }

    #[test]
    fn survives_yaml_round_trip() {
        let header = parse("a: 1\nb: [x, y]\nc:\n  d: false\n");
        let yaml = serde_yaml::to_string(&header_to_mapping(&header)).unwrap();
        assert_eq!(parse(&yaml), header);
    }

    fn round_trip(yaml: &str) -> Header {
        let header = parse(yaml);
        let written = serde_yaml::to_string(&header_to_mapping(&header)).unwrap();
        let again = parse(&written);
        assert_eq!(again, header, "changed on save: {written}");
        again
    }

    #[test]
    fn non_string_keys_are_kept_verbatim() {
        let header = round_trip("title: x\n1: one\ntrue: yes\n");
        assert_eq!(header.len(), 1);
        assert_eq!(
            header.other_entries(),
            &[
                (Value::from(1), Value::from("one")),
                (Value::Bool(true), Value::from("yes")),
            ]
        );
    }

    #[test]
    fn complex_keys_survive() {
        let header = round_trip("title: x\n? [a, b]\n: pair\n");
        assert_eq!(header.other_entries().len(), 1);
        assert!(!header.is_empty());
    }

    #[test]
    fn tagged_values_keep_their_tag() {
        let header = round_trip("when: !custom 2024\n");
        let written = serde_yaml::to_string(&header_to_mapping(&header)).unwrap();
        assert!(written.contains("!custom"), "{written}");
        assert!(matches!(header["when"], HeaderValue::Raw(Value::Tagged(_))));
    }

    #[test]
    fn large_unsigned_integers_are_exact() {
        let header = round_trip("big: 18446744073709551615\n");
        let written = serde_yaml::to_string(&header_to_mapping(&header)).unwrap();
        assert_eq!(written, "big: 18446744073709551615\n");
    }

    #[test]
    fn nested_maps_with_odd_keys_are_raw() {
        let header = round_trip("extra:\n  1: one\n  k: v\n");
        assert!(matches!(header["extra"], HeaderValue::Raw(Value::Mapping(_))));
    }
}
