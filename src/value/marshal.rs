//! Value marshalling seam
//!
//! `ValueMarshaller::to_wire_value` may be asynchronous. Callers that depend
//! on placeholder order must await each call before issuing the next.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use thiserror::Error;

use super::attribute::AttributeValue;

/// Future returned by a marshaller
pub type MarshalFuture<'a> =
    Pin<Box<dyn Future<Output = Result<AttributeValue, MarshalError>> + Send + 'a>>;

/// Failure converting a document value into wire form
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Cannot marshal value for '{attribute}': {reason}")]
pub struct MarshalError {
    attribute: String,
    reason: String,
}

impl MarshalError {
    /// Create a marshal error for the given attribute path
    pub fn new(attribute: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }

    /// Attribute path the value was bound to
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Underlying reason
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Converts a raw operand into its wire value
pub trait ValueMarshaller: Send + Sync {
    /// Marshal `value`, which is compared against `attribute_path`
    fn to_wire_value<'a>(&'a self, attribute_path: &'a str, value: &'a Value) -> MarshalFuture<'a>;
}

/// Schema-less marshaller mapping JSON types onto wire types
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMarshaller;

impl JsonMarshaller {
    /// Convert synchronously
    pub fn convert(value: &Value) -> AttributeValue {
        match value {
            Value::Null => AttributeValue::null(),
            Value::Bool(b) => AttributeValue::Bool(*b),
            Value::Number(n) => AttributeValue::N(n.to_string()),
            Value::String(s) => AttributeValue::S(s.clone()),
            Value::Array(items) => AttributeValue::L(items.iter().map(Self::convert).collect()),
            Value::Object(fields) => AttributeValue::M(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::convert(v)))
                    .collect::<BTreeMap<_, _>>(),
            ),
        }
    }
}

impl ValueMarshaller for JsonMarshaller {
    fn to_wire_value<'a>(&'a self, _attribute_path: &'a str, value: &'a Value) -> MarshalFuture<'a> {
        Box::pin(std::future::ready(Ok(Self::convert(value))))
    }
}

/// Adapts a synchronous closure into a marshaller
pub struct FnMarshaller<F> {
    convert: F,
}

impl<F> FnMarshaller<F>
where
    F: Fn(&str, &Value) -> Result<AttributeValue, MarshalError> + Send + Sync,
{
    pub fn new(convert: F) -> Self {
        Self { convert }
    }
}

impl<F> ValueMarshaller for FnMarshaller<F>
where
    F: Fn(&str, &Value) -> Result<AttributeValue, MarshalError> + Send + Sync,
{
    fn to_wire_value<'a>(&'a self, attribute_path: &'a str, value: &'a Value) -> MarshalFuture<'a> {
        Box::pin(std::future::ready((self.convert)(attribute_path, value)))
    }
}
