//! PDF object model.
//!
//! Every value in a PDF file is one of the nine object kinds below, plus
//! indirect references. Accessors return a typed error naming the expected
//! and actual kinds so structural failures read well in error output.

use std::collections::HashMap;

use bytes::Bytes;

use crate::error::{ExtractError, Result};

/// An indirect object reference (`12 0 R`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjRef {
    pub id: u32,
    pub genno: u16,
}

impl ObjRef {
    pub const fn new(id: u32, genno: u16) -> Self {
        ObjRef { id, genno }
    }
}

/// A dictionary: name keys to objects.
pub type Dict = HashMap<String, Object>;

/// A stream: attribute dictionary plus raw (still encoded) data.
///
/// Decoding happens through [`crate::document::Document::decode_stream`],
/// which resolves `/Filter` and `/DecodeParms` indirections.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamObject {
    pub dict: Dict,
    pub raw: Bytes,
}

/// Any PDF object.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    /// A name (`/Foo`), with `#xx` escapes already decoded.
    Name(String),
    /// A string, literal or hex; PDF strings are byte strings.
    Str(Vec<u8>),
    Array(Vec<Object>),
    Dict(Dict),
    Stream(Box<StreamObject>),
    Reference(ObjRef),
}

impl Object {
    /// The kind name used in `Type` errors.
    pub const fn kind(&self) -> &'static str {
        match self {
            Object::Null => "null",
            Object::Boolean(_) => "boolean",
            Object::Integer(_) => "integer",
            Object::Real(_) => "real",
            Object::Name(_) => "name",
            Object::Str(_) => "string",
            Object::Array(_) => "array",
            Object::Dict(_) => "dict",
            Object::Stream(_) => "stream",
            Object::Reference(_) => "reference",
        }
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Object::Boolean(b) => Ok(*b),
            other => Err(type_error("boolean", other)),
        }
    }

    pub fn as_i64(&self) -> Result<i64> {
        match self {
            Object::Integer(i) => Ok(*i),
            other => Err(type_error("integer", other)),
        }
    }

    /// Numeric value: integers widen to f64.
    pub fn as_f64(&self) -> Result<f64> {
        match self {
            Object::Integer(i) => Ok(*i as f64),
            Object::Real(r) => Ok(*r),
            other => Err(type_error("number", other)),
        }
    }

    pub fn as_name(&self) -> Result<&str> {
        match self {
            Object::Name(n) => Ok(n),
            other => Err(type_error("name", other)),
        }
    }

    pub fn as_str_bytes(&self) -> Result<&[u8]> {
        match self {
            Object::Str(s) => Ok(s),
            other => Err(type_error("string", other)),
        }
    }

    pub fn as_array(&self) -> Result<&[Object]> {
        match self {
            Object::Array(a) => Ok(a),
            other => Err(type_error("array", other)),
        }
    }

    /// Dictionary view; streams expose their attribute dict.
    pub fn as_dict(&self) -> Result<&Dict> {
        match self {
            Object::Dict(d) => Ok(d),
            Object::Stream(s) => Ok(&s.dict),
            other => Err(type_error("dict", other)),
        }
    }

    pub fn as_stream(&self) -> Result<&StreamObject> {
        match self {
            Object::Stream(s) => Ok(s),
            other => Err(type_error("stream", other)),
        }
    }

    pub fn as_reference(&self) -> Result<ObjRef> {
        match self {
            Object::Reference(r) => Ok(*r),
            other => Err(type_error("reference", other)),
        }
    }
}

fn type_error(expected: &'static str, got: &Object) -> ExtractError {
    ExtractError::Type {
        expected,
        got: got.kind(),
    }
}
