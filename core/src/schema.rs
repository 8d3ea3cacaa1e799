//! Required-field schema checks for inbound JSON payloads.
//!
//! Schemas are open: keys the declaration does not mention are always
//! accepted. Only top-level keys are checked.

use std::fmt;

use serde_json::Value;

/// JSON value kinds a field can be declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl JsonType {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => JsonType::Null,
            Value::Bool(_) => JsonType::Boolean,
            Value::Number(_) => JsonType::Number,
            Value::String(_) => JsonType::String,
            Value::Array(_) => JsonType::Array,
            Value::Object(_) => JsonType::Object,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JsonType::Null => "null",
            JsonType::Boolean => "boolean",
            JsonType::Number => "number",
            JsonType::String => "string",
            JsonType::Array => "array",
            JsonType::Object => "object",
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: &'static str,
    pub kind: JsonType,
    pub required: bool,
}

impl FieldDecl {
    pub const fn required(name: &'static str, kind: JsonType) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, kind: JsonType) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

/// A static object schema: the declared top-level fields of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaDecl {
    pub fields: &'static [FieldDecl],
}

/// The payload accepted by the validation endpoint.
pub const DEMO_SCHEMA: SchemaDecl = SchemaDecl {
    fields: &[
        FieldDecl::required("name", JsonType::String),
        FieldDecl::optional("url", JsonType::String),
    ],
};

/// A value whose JSON type differs from its declaration. `key` is `None`
/// when the payload itself is not an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMismatch {
    pub key: Option<String>,
    pub expected: JsonType,
    pub found: JsonType,
}

impl fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "'{key}' is not of type '{}'", self.expected)?,
            None => write!(f, "payload is not of type '{}'", self.expected)?,
        }
        write!(f, " (found {})", self.found)
    }
}

/// Every problem found in one payload, in schema declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    pub missing_keys: Vec<String>,
    pub type_mismatches: Vec<TypeMismatch>,
}

impl ValidationError {
    pub fn not_an_object(found: JsonType) -> Self {
        Self {
            missing_keys: Vec::new(),
            type_mismatches: vec![TypeMismatch {
                key: None,
                expected: JsonType::Object,
                found,
            }],
        }
    }

    fn is_empty(&self) -> bool {
        self.missing_keys.is_empty() && self.type_mismatches.is_empty()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let missing = self
            .missing_keys
            .iter()
            .map(|key| format!("'{key}' is a required property"));
        let mismatched = self.type_mismatches.iter().map(ToString::to_string);
        let messages: Vec<String> = missing.chain(mismatched).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationError {}

pub fn validate(payload: &Value, schema: &SchemaDecl) -> Result<(), ValidationError> {
    let Value::Object(fields) = payload else {
        return Err(ValidationError::not_an_object(JsonType::of(payload)));
    };

    let mut error = ValidationError::default();
    for decl in schema.fields {
        match fields.get(decl.name) {
            None if decl.required => error.missing_keys.push(decl.name.to_string()),
            None => {}
            Some(value) => {
                let found = JsonType::of(value);
                if found != decl.kind {
                    error.type_mismatches.push(TypeMismatch {
                        key: Some(decl.name.to_string()),
                        expected: decl.kind,
                        found,
                    });
                }
            }
        }
    }

    if error.is_empty() {
        Ok(())
    } else {
        Err(error)
    }
}
