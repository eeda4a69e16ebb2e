//! Wire value subsystem for aeroquery
//!
//! The compiler never interprets document values itself. Every operand is
//! handed to a [`ValueMarshaller`] together with the attribute path it is
//! compared against, and the marshaller returns the typed wire form.
//!
//! # Wire form
//!
//! Values are emitted in the store's typed JSON shape, one type descriptor
//! per value: `{"S": "Charlie"}`, `{"N": "42"}`, `{"L": [...]}`.

mod attribute;
mod marshal;

pub use attribute::{AttributeValue, Item};
pub use marshal::{FnMarshaller, JsonMarshaller, MarshalError, MarshalFuture, ValueMarshaller};
