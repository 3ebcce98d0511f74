use crate::error::{Error, Result};
use crate::validator::{Env, Walk};
use crate::value::Value;
use std::fmt;

/// The primitive and structural kinds a node's `type` (or `anyof_type`) can name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    /// A component-like host object.
    Component,
    /// Exactly `true` or `false`.
    Boolean,
    /// Any integer or float, including host numeric scalars.
    Number,
    /// Text.
    String,
    /// An array, or a host sequence such as a vector or series.
    List,
    /// A string-keyed map. Host objects never count, even map-like ones.
    Dict,
}

impl Kind {
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(match name {
            "component" => Kind::Component,
            "boolean" => Kind::Boolean,
            "number" => Kind::Number,
            "string" => Kind::String,
            "list" => Kind::List,
            "dict" => Kind::Dict,
            _ => {
                return Err(Error::MalformedSchema(format!(
                    "{:?} is not a known type",
                    name
                )))
            }
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Kind::Component => "component",
            Kind::Boolean => "boolean",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::List => "list",
            Kind::Dict => "dict",
        }
    }

    /// Check a non-null value against this kind, without recording anything.
    pub fn matches(&self, env: &Env, value: &Value) -> bool {
        match self {
            Kind::Component => env.is_component(value),
            Kind::Boolean => value.is_bool(),
            Kind::Number => env.as_number(value).is_some(),
            Kind::String => value.is_str(),
            Kind::List => env.elements(value).is_some(),
            Kind::Dict => value.is_map(),
        }
    }

    pub(crate) fn check(&self, walk: &mut Walk, value: &Value) -> bool {
        self.matches(walk.env(), value) || walk.wrong_type(self.name(), value)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in [
            Kind::Component,
            Kind::Boolean,
            Kind::Number,
            Kind::String,
            Kind::List,
            Kind::Dict,
        ] {
            assert_eq!(Kind::from_name(kind.name()).unwrap(), kind);
            assert_eq!(kind.to_string(), kind.name());
        }
        assert!(matches!(
            Kind::from_name("integer"),
            Err(Error::MalformedSchema(_))
        ));
    }

    #[test]
    fn booleans_are_not_numbers() {
        let env = Env::default();
        assert!(!Kind::Number.matches(&env, &Value::Bool(true)));
        assert!(Kind::Number.matches(&env, &Value::F32(1.5)));
        assert!(!Kind::Boolean.matches(&env, &Value::from("False")));
        assert!(!Kind::Boolean.matches(&env, &Value::from(0)));
    }

    #[test]
    fn strings_are_not_lists() {
        let env = Env::default();
        assert!(!Kind::List.matches(&env, &Value::from("abc")));
        assert!(Kind::List.matches(&env, &Value::Array(Vec::new())));
        assert!(!Kind::Dict.matches(&env, &Value::Array(Vec::new())));
    }
}
