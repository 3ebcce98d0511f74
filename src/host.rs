//! Recognition of host types that behave like numbers or sequences.
//!
//! Applications hand the validator values from numerics libraries: fixed-width scalars,
//! vectors, labeled series. They are not native [`Value`] numbers or arrays, yet a `number`
//! property must accept them and a `list` property must accept them element by element.
//! [`HostTypes`] is the registry that teaches the validator about them.
//!
//! The default registry knows this crate's own [`Scalar`], [`Vector`] and [`Series`]. Other
//! types are added with [`HostTypes::numeric_type`]/[`HostTypes::sequence_type`] (by
//! downcasting) or with the free-form [`HostTypes::numeric_when`]/
//! [`HostTypes::sequence_when`] hooks. Integer-valued types can also register an exact
//! reading with [`HostTypes::integer_type`], so `allowed` literals and option values beyond
//! 2^53 don't collapse onto their neighbours.
//!
//! ```
//! # use prop_schema::{host::*, Object, Value};
//! # use std::any::Any;
//! #[derive(Debug)]
//! struct Half(u16);
//!
//! impl Object for Half {
//!     fn type_name(&self) -> &str { "float16" }
//!     fn as_any(&self) -> &dyn Any { self }
//! }
//!
//! let hosts = HostTypes::default().numeric_type(|h: &Half| f64::from(h.0));
//! let half = Value::object(Half(3));
//! assert_eq!(hosts.as_number(half.as_object().unwrap().as_ref()), Some(3.0));
//! ```

use crate::integer::Integer;
use crate::value::{Object, Value};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

type NumericHook = Arc<dyn Fn(&dyn Object) -> Option<f64> + Send + Sync>;
type IntegerHook = Arc<dyn Fn(&dyn Object) -> Option<Integer> + Send + Sync>;
type SequenceHook = Arc<dyn Fn(&dyn Object) -> Option<Vec<Value>> + Send + Sync>;

/// Registry of numeric and sequence host types.
#[derive(Clone)]
pub struct HostTypes {
    numeric: Vec<NumericHook>,
    integer: Vec<IntegerHook>,
    sequence: Vec<SequenceHook>,
}

impl HostTypes {
    /// An empty registry. Only native values are numbers or lists.
    pub fn new() -> Self {
        Self {
            numeric: Vec::new(),
            integer: Vec::new(),
            sequence: Vec::new(),
        }
    }

    /// Add a hook that coerces matching objects to a number.
    pub fn numeric_when<F>(mut self, hook: F) -> Self
    where
        F: Fn(&dyn Object) -> Option<f64> + Send + Sync + 'static,
    {
        self.numeric.push(Arc::new(hook));
        self
    }

    /// Treat every object of type `T` as a number, coerced with `to_f64`.
    pub fn numeric_type<T, F>(self, to_f64: F) -> Self
    where
        T: Object,
        F: Fn(&T) -> f64 + Send + Sync + 'static,
    {
        self.numeric_when(move |obj| obj.as_any().downcast_ref::<T>().map(&to_f64))
    }

    /// Add a hook that reads matching objects as exact integers. Only consulted for
    /// comparisons; an object still needs a numeric hook to count as a number.
    pub fn integer_when<F>(mut self, hook: F) -> Self
    where
        F: Fn(&dyn Object) -> Option<Integer> + Send + Sync + 'static,
    {
        self.integer.push(Arc::new(hook));
        self
    }

    /// Read objects of type `T` as exact integers with `to_integer`, where it gives one.
    pub fn integer_type<T, F>(self, to_integer: F) -> Self
    where
        T: Object,
        F: Fn(&T) -> Option<Integer> + Send + Sync + 'static,
    {
        self.integer_when(move |obj| obj.as_any().downcast_ref::<T>().and_then(&to_integer))
    }

    /// Add a hook that exposes the elements of matching objects.
    pub fn sequence_when<F>(mut self, hook: F) -> Self
    where
        F: Fn(&dyn Object) -> Option<Vec<Value>> + Send + Sync + 'static,
    {
        self.sequence.push(Arc::new(hook));
        self
    }

    /// Treat every object of type `T` as a sequence, whose elements come from `elements`.
    pub fn sequence_type<T, F>(self, elements: F) -> Self
    where
        T: Object,
        F: Fn(&T) -> Vec<Value> + Send + Sync + 'static,
    {
        self.sequence_when(move |obj| obj.as_any().downcast_ref::<T>().map(&elements))
    }

    /// The numeric value of a host object, if any hook recognizes it.
    pub fn as_number(&self, obj: &dyn Object) -> Option<f64> {
        self.numeric.iter().find_map(|hook| hook(obj))
    }

    /// The exact integer value of a host object, if any hook reads it as one.
    pub fn as_integer(&self, obj: &dyn Object) -> Option<Integer> {
        self.integer.iter().find_map(|hook| hook(obj))
    }

    /// The elements of a host object, if any hook recognizes it as a sequence.
    pub fn elements(&self, obj: &dyn Object) -> Option<Vec<Value>> {
        self.sequence.iter().find_map(|hook| hook(obj))
    }
}

impl Default for HostTypes {
    fn default() -> Self {
        Self::new()
            .numeric_type(Scalar::as_f64)
            .integer_type(Scalar::as_integer)
            .sequence_type(|v: &Vector| v.values.clone())
            .sequence_type(|s: &Series| s.values.clone())
    }
}

impl fmt::Debug for HostTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostTypes")
            .field("numeric", &self.numeric.len())
            .field("integer", &self.integer.len())
            .field("sequence", &self.sequence.len())
            .finish()
    }
}

/// A fixed-width numeric scalar, as produced by numerics libraries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scalar {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
}

impl Scalar {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Scalar::I8(v) => v.into(),
            Scalar::I16(v) => v.into(),
            Scalar::I32(v) => v.into(),
            Scalar::I64(v) => v as f64,
            Scalar::U8(v) => v.into(),
            Scalar::U16(v) => v.into(),
            Scalar::U32(v) => v.into(),
            Scalar::U64(v) => v as f64,
            Scalar::F32(v) => v.into(),
            Scalar::F64(v) => v,
        }
    }

    /// The exact value of an integer scalar. Float scalars give `None`.
    pub fn as_integer(&self) -> Option<Integer> {
        match *self {
            Scalar::I8(v) => Some(v.into()),
            Scalar::I16(v) => Some(v.into()),
            Scalar::I32(v) => Some(v.into()),
            Scalar::I64(v) => Some(v.into()),
            Scalar::U8(v) => Some(v.into()),
            Scalar::U16(v) => Some(v.into()),
            Scalar::U32(v) => Some(v.into()),
            Scalar::U64(v) => Some(v.into()),
            Scalar::F32(_) | Scalar::F64(_) => None,
        }
    }

    pub fn dtype(&self) -> &'static str {
        match self {
            Scalar::I8(_) => "int8",
            Scalar::I16(_) => "int16",
            Scalar::I32(_) => "int32",
            Scalar::I64(_) => "int64",
            Scalar::U8(_) => "uint8",
            Scalar::U16(_) => "uint16",
            Scalar::U32(_) => "uint32",
            Scalar::U64(_) => "uint64",
            Scalar::F32(_) => "float32",
            Scalar::F64(_) => "float64",
        }
    }
}

impl Object for Scalar {
    fn type_name(&self) -> &str {
        self.dtype()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl From<Scalar> for Value {
    fn from(v: Scalar) -> Self {
        Value::object(v)
    }
}

/// A one-dimensional numeric array.
#[derive(Clone, Debug, Default)]
pub struct Vector {
    pub values: Vec<Value>,
}

impl Vector {
    pub fn new<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl Object for Vector {
    fn type_name(&self) -> &str {
        "ndarray"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A one-dimensional labeled series. Validation only sees the values; the index labels are
/// carried along for the host's benefit.
#[derive(Clone, Debug, Default)]
pub struct Series {
    pub name: Option<String>,
    pub index: Vec<Value>,
    pub values: Vec<Value>,
}

impl Series {
    /// A series with the default `0..n` index.
    pub fn new<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let index = (0..values.len()).map(Value::from).collect();
        Self {
            name: None,
            index,
            values,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Object for Series {
    fn type_name(&self) -> &str {
        "Series"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn obj(v: &Value) -> &dyn Object {
        v.as_object().unwrap().as_ref()
    }

    #[test]
    fn default_knows_builtin_types() {
        let hosts = HostTypes::default();
        assert_eq!(hosts.as_number(obj(&Scalar::U8(7).into())), Some(7.0));
        assert_eq!(hosts.as_number(obj(&Scalar::F32(0.5).into())), Some(0.5));
        let vector = Value::object(Vector::new([1, 2, 3]));
        assert_eq!(hosts.elements(obj(&vector)).unwrap().len(), 3);
        let series = Value::object(Series::new([1.5, 2.5]).name("y"));
        assert_eq!(hosts.elements(obj(&series)).unwrap()[1], Value::F64(2.5));
        assert!(hosts.as_number(obj(&vector)).is_none());
    }

    #[test]
    fn integer_scalars_read_exactly() {
        let hosts = HostTypes::default();
        let big = Value::from(Scalar::U64(9_007_199_254_740_993));
        assert_eq!(
            hosts.as_integer(obj(&big)),
            Some(Integer::from(9_007_199_254_740_993u64))
        );
        assert!(hosts.as_integer(obj(&Scalar::F64(1.0).into())).is_none());
    }

    #[test]
    fn empty_registry_knows_nothing() {
        let hosts = HostTypes::new();
        assert!(hosts.as_number(obj(&Scalar::I64(1).into())).is_none());
        assert!(hosts.as_integer(obj(&Scalar::I64(1).into())).is_none());
        assert!(hosts.elements(obj(&Value::object(Vector::new([1])))).is_none());
    }

    #[test]
    fn free_form_hooks() {
        let hosts = HostTypes::new()
            .numeric_when(|o| (o.type_name() == "ndarray").then_some(0.0))
            .sequence_when(|o| (o.type_name() == "int8").then(Vec::new));
        assert_eq!(hosts.as_number(obj(&Value::object(Vector::default()))), Some(0.0));
        assert_eq!(hosts.elements(obj(&Scalar::I8(1).into())), Some(Vec::new()));
    }
}
