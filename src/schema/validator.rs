//! Value validators shared by table definitions and function arguments

use serde_json::{Map, Value};
use std::fmt;

use crate::error::{Error, Result};

/// Fields every stored document carries in addition to its declared ones
const SYSTEM_FIELDS: &[&str] = &["_id", "_creationTime"];

/// Shape a JSON value must have
#[derive(Debug, Clone, PartialEq)]
pub enum Validator {
    /// Any string
    String,
    /// `true` or `false`
    Boolean,
    /// Any JSON number
    Float64,
    /// Id of a record in the named table
    Id(&'static str),
    /// Exactly this string
    Literal(&'static str),
    /// Absent, or matching the inner validator; `null` is not absent
    Optional(Box<Validator>),
    /// One of several shapes
    Union(Vec<Validator>),
    /// An object with exactly these fields
    Object(Vec<(&'static str, Validator)>),
    /// Anything at all
    Any,
}

/// Constructors mirroring how schemas are written on the platform
pub mod v {
    use super::Validator;

    pub fn string() -> Validator {
        Validator::String
    }

    pub fn boolean() -> Validator {
        Validator::Boolean
    }

    pub fn number() -> Validator {
        Validator::Float64
    }

    pub fn id(table: &'static str) -> Validator {
        Validator::Id(table)
    }

    pub fn literal(value: &'static str) -> Validator {
        Validator::Literal(value)
    }

    pub fn optional(inner: Validator) -> Validator {
        Validator::Optional(Box::new(inner))
    }

    pub fn union(members: Vec<Validator>) -> Validator {
        Validator::Union(members)
    }

    pub fn object(fields: Vec<(&'static str, Validator)>) -> Validator {
        Validator::Object(fields)
    }

    pub fn any() -> Validator {
        Validator::Any
    }
}

impl Validator {
    /// Whether a missing field satisfies this validator
    pub fn is_optional(&self) -> bool {
        matches!(self, Validator::Optional(_) | Validator::Any)
    }

    /// Check a value, reporting the first mismatch
    pub fn validate(&self, value: &Value) -> Result<()> {
        self.check(value, "").map_err(|msg| Error::validation(format!("ArgumentValidationError: {}", msg)))
    }

    /// Check a stored document; system fields are allowed on top of the
    /// declared ones
    pub fn validate_document(&self, value: &Value) -> Result<()> {
        let (Validator::Object(fields), Value::Object(map)) = (self, value) else {
            return self.validate(value);
        };
        check_fields(fields, map, "", SYSTEM_FIELDS)
            .map_err(|msg| Error::validation(format!("Schema validation failed: {}", msg)))
    }

    fn check(&self, value: &Value, path: &str) -> std::result::Result<(), String> {
        let ok = match (self, value) {
            (Validator::Any, _) => true,
            (Validator::String, Value::String(_)) => true,
            (Validator::Boolean, Value::Bool(_)) => true,
            (Validator::Float64, Value::Number(_)) => true,
            (Validator::Id(_), Value::String(id)) => !id.is_empty(),
            (Validator::Literal(expected), Value::String(actual)) => *expected == actual.as_str(),
            (Validator::Optional(inner), other) => return inner.check(other, path),
            (Validator::Union(members), other) => members.iter().any(|m| m.check(other, path).is_ok()),
            (Validator::Object(fields), Value::Object(map)) => return check_fields(fields, map, path, &[]),
            _ => false,
        };

        if ok {
            Ok(())
        } else {
            Err(format!(
                "Value does not match validator. Path: {} Value: {} Validator: {}",
                if path.is_empty() { "." } else { path },
                value,
                self
            ))
        }
    }
}

fn check_fields(
    fields: &[(&'static str, Validator)],
    map: &Map<String, Value>,
    path: &str,
    allowed_extra: &[&str],
) -> std::result::Result<(), String> {
    for (name, validator) in fields {
        let field_path = format!("{}.{}", path, name);
        match map.get(*name) {
            Some(value) => validator.check(value, &field_path)?,
            None if validator.is_optional() => {}
            None => return Err(format!("Object is missing the required field `{}`", field_path.trim_start_matches('.'))),
        }
    }

    for key in map.keys() {
        let declared = fields.iter().any(|(name, _)| *name == key.as_str());
        if !declared && !allowed_extra.contains(&key.as_str()) {
            return Err(format!("Object contains extra field `{}` that is not in the validator", key));
        }
    }

    Ok(())
}

impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validator::String => write!(f, "v.string()"),
            Validator::Boolean => write!(f, "v.boolean()"),
            Validator::Float64 => write!(f, "v.number()"),
            Validator::Id(table) => write!(f, "v.id(\"{}\")", table),
            Validator::Literal(value) => write!(f, "v.literal(\"{}\")", value),
            Validator::Optional(inner) => write!(f, "v.optional({})", inner),
            Validator::Any => write!(f, "v.any()"),
            Validator::Union(members) => {
                write!(f, "v.union(")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", member)?;
                }
                write!(f, ")")
            }
            Validator::Object(fields) => {
                write!(f, "v.object({{")?;
                for (i, (name, validator)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, validator)?;
                }
                write!(f, "}})")
            }
        }
    }
}
