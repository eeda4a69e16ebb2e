//! Typed wire attribute values
//!
//! Serialises to the store's descriptor-keyed JSON: exactly one of
//! `S`, `N`, `B`, `BOOL`, `NULL`, `M`, `L`, `SS`, `NS`, `BS`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An item (document or key) as a map of attribute name to wire value
pub type Item = BTreeMap<String, AttributeValue>;

/// Type descriptors recognised as already wire-typed
const TYPE_DESCRIPTORS: [&str; 10] = ["S", "N", "B", "BOOL", "NULL", "M", "L", "SS", "NS", "BS"];

/// A single attribute value in wire form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// String
    #[serde(rename = "S")]
    S(String),
    /// Number, carried as its decimal string
    #[serde(rename = "N")]
    N(String),
    /// Binary, base64 on the wire
    #[serde(rename = "B", with = "base64_bytes")]
    B(Vec<u8>),
    /// Boolean
    #[serde(rename = "BOOL")]
    Bool(bool),
    /// Null marker (always `true` on the wire)
    #[serde(rename = "NULL")]
    Null(bool),
    /// Map of nested attributes
    #[serde(rename = "M")]
    M(BTreeMap<String, AttributeValue>),
    /// List of values
    #[serde(rename = "L")]
    L(Vec<AttributeValue>),
    /// String set
    #[serde(rename = "SS")]
    Ss(Vec<String>),
    /// Number set
    #[serde(rename = "NS")]
    Ns(Vec<String>),
    /// Binary set
    #[serde(rename = "BS", with = "base64_byte_sets")]
    Bs(Vec<Vec<u8>>),
}

impl AttributeValue {
    /// Creates a string value
    pub fn string(s: impl Into<String>) -> Self {
        AttributeValue::S(s.into())
    }

    /// Creates a number value from anything that prints as a number
    pub fn number(n: impl ToString) -> Self {
        AttributeValue::N(n.to_string())
    }

    /// Creates the null marker
    pub fn null() -> Self {
        AttributeValue::Null(true)
    }

    /// Returns the type descriptor used on the wire
    pub fn descriptor(&self) -> &'static str {
        match self {
            AttributeValue::S(_) => "S",
            AttributeValue::N(_) => "N",
            AttributeValue::B(_) => "B",
            AttributeValue::Bool(_) => "BOOL",
            AttributeValue::Null(_) => "NULL",
            AttributeValue::M(_) => "M",
            AttributeValue::L(_) => "L",
            AttributeValue::Ss(_) => "SS",
            AttributeValue::Ns(_) => "NS",
            AttributeValue::Bs(_) => "BS",
        }
    }

    /// Recognises a JSON value that is already in wire form.
    ///
    /// Returns `None` for anything that still needs marshalling, including
    /// objects that look like a descriptor but carry a malformed payload.
    pub fn from_wire_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        if object.len() != 1 {
            return None;
        }
        let (descriptor, _) = object.iter().next()?;
        if !TYPE_DESCRIPTORS.contains(&descriptor.as_str()) {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    /// Returns the wire JSON for this value
    pub fn to_wire_json(&self) -> Value {
        // Serialising a closed enum of strings, maps and lists cannot fail
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::S(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::S(s)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Bool(b)
    }
}

impl From<i64> for AttributeValue {
    fn from(n: i64) -> Self {
        AttributeValue::N(n.to_string())
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

mod base64_byte_sets {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(sets: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(sets.len()))?;
        for bytes in sets {
            seq.serialize_element(&STANDARD.encode(bytes))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Vec<u8>>, D::Error> {
        let encoded = Vec::<String>::deserialize(deserializer)?;
        encoded
            .into_iter()
            .map(|s| STANDARD.decode(s).map_err(serde::de::Error::custom))
            .collect()
    }
}
