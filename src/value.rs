use crate::integer::Integer;
use std::any::Any;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use std::ops::Index;
use std::sync::Arc;

/// An opaque value owned by the host application.
///
/// Property values are usually plain data, but applications also pass in things the validator
/// can't look inside on its own: component instances, numeric scalars from a numerics library,
/// vectors, labeled series, figure objects. All of these are `Object`s. The validator never
/// checks their concrete type; it asks structural questions through the methods below, or
/// hands the object to the registered [`HostTypes`][crate::host::HostTypes] hooks.
///
/// Only `type_name` and `as_any` are mandatory. A component instance additionally exposes a
/// type tag and its property names, which is what marks it as component-like.
pub trait Object: Debug + Send + Sync + 'static {
    /// Name of the concrete host type, used in failure messages.
    fn type_name(&self) -> &str;

    /// Access to the concrete type, for host-type hooks that downcast.
    fn as_any(&self) -> &dyn Any;

    /// The component type tag, such as `"Div"` or `"Table"`.
    fn type_tag(&self) -> Option<&str> {
        None
    }

    /// The component namespace, such as `"html_components"`.
    fn namespace(&self) -> Option<&str> {
        None
    }

    /// The names of every property this object declares.
    fn prop_names(&self) -> Option<&[String]> {
        None
    }

    /// The current value of one property, if it is set.
    fn prop(&self, _name: &str) -> Option<&Value> {
        None
    }
}

/// A candidate property value.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Int(Integer),
    F32(f32),
    F64(f64),
    Str(String),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Object(Arc<dyn Object>),
}

impl Value {
    /// Wrap a host object.
    pub fn object<T: Object>(obj: T) -> Self {
        Value::Object(Arc::new(obj))
    }

    /// Short name of the value's variant, or the host type name for objects.
    pub fn name(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::F32(_) | Value::F64(_) => "float",
            Value::Str(_) => "string",
            Value::Array(_) => "list",
            Value::Map(_) => "dict",
            Value::Object(obj) => obj.type_name(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    pub fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Bool(val) = *self {
            Some(val)
        } else {
            None
        }
    }

    pub fn as_int(&self) -> Option<Integer> {
        if let Value::Int(val) = *self {
            Some(val)
        } else {
            None
        }
    }

    /// Native numbers as `f64`. Host objects are not consulted here; see
    /// [`Env::as_number`][crate::Env::as_number] for that.
    pub fn as_floating(&self) -> Option<f64> {
        match *self {
            Value::Int(n) => Some(n.as_f64()),
            Value::F32(n) => Some(n.into()),
            Value::F64(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let Value::Str(ref s) = *self {
            Some(s)
        } else {
            None
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        if let Value::Array(ref v) = *self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        if let Value::Map(ref v) = *self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_object(&self) -> Option<&Arc<dyn Object>> {
        if let Value::Object(ref v) = *self {
            Some(v)
        } else {
            None
        }
    }

    /// Convert to JSON. Host objects have no JSON form and yield `None`, as do non-finite
    /// floats.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        use serde_json::Value as Json;
        Some(match self {
            Value::Null => Json::Null,
            Value::Bool(v) => Json::Bool(*v),
            Value::Int(v) => match v.as_i64() {
                Some(i) => Json::from(i),
                None => Json::from(v.as_u64()?),
            },
            Value::F32(v) => Json::Number(serde_json::Number::from_f64((*v).into())?),
            Value::F64(v) => Json::Number(serde_json::Number::from_f64(*v)?),
            Value::Str(v) => Json::String(v.clone()),
            Value::Array(v) => Json::Array(v.iter().map(Value::to_json).collect::<Option<_>>()?),
            Value::Map(v) => Json::Object(
                v.iter()
                    .map(|(k, v)| v.to_json().map(|v| (k.clone(), v)))
                    .collect::<Option<_>>()?,
            ),
            Value::Object(_) => return None,
        })
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

/// A JSON-like rendering, used in failure messages. Host objects show as `<type name>`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::F32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{:?}", v),
            Value::Array(v) => {
                f.write_str("[")?;
                for (i, elem) in v.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                f.write_str("]")
            }
            Value::Map(v) => {
                f.write_str("{")?;
                for (i, (key, val)) in v.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:?}: {}", key, val)?;
                }
                f.write_str("}")
            }
            Value::Object(obj) => write!(f, "<{}>", obj.type_name()),
        }
    }
}

static NULL: Value = Value::Null;

impl Index<usize> for Value {
    type Output = Value;

    fn index(&self, index: usize) -> &Self::Output {
        self.as_array().and_then(|v| v.get(index)).unwrap_or(&NULL)
    }
}

impl Index<&str> for Value {
    type Output = Value;

    fn index(&self, index: &str) -> &Self::Output {
        self.as_map().and_then(|v| v.get(index)).unwrap_or(&NULL)
    }
}

/// Structural equality for data, identity for host objects.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

macro_rules! impl_value_from_integer {
    ($t: ty) => {
        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(From::from(v))
            }
        }
    };
}

macro_rules! impl_value_from {
    ($t: ty, $p: ident) => {
        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::$p(From::from(v))
            }
        }
    };
}

impl_value_from!(bool, Bool);
impl_value_from!(Integer, Int);
impl_value_from!(f32, F32);
impl_value_from!(f64, F64);
impl_value_from!(String, Str);
impl_value_from!(Vec<Value>, Array);
impl_value_from!(BTreeMap<String, Value>, Map);
impl_value_from_integer!(u8);
impl_value_from_integer!(u16);
impl_value_from_integer!(u32);
impl_value_from_integer!(u64);
impl_value_from_integer!(usize);
impl_value_from_integer!(i8);
impl_value_from_integer!(i16);
impl_value_from_integer!(i32);
impl_value_from_integer!(i64);
impl_value_from_integer!(isize);

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Null
    }
}

impl<'a> From<&'a str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl<'a> From<Cow<'a, str>> for Value {
    fn from(v: Cow<'a, str>) -> Self {
        Value::Str(v.into_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            None => Value::Null,
            Some(v) => v.into(),
        }
    }
}

impl From<Arc<dyn Object>> for Value {
    fn from(v: Arc<dyn Object>) -> Self {
        Value::Object(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match v {
            Json::Null => Value::Null,
            Json::Bool(v) => Value::Bool(v),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::from(i)
                } else if let Some(u) = n.as_u64() {
                    Value::from(u)
                } else {
                    Value::F64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Json::String(s) => Value::Str(s),
            Json::Array(v) => Value::Array(v.into_iter().map(Value::from).collect()),
            Json::Object(v) => Value::Map(v.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
        }
    }
}
