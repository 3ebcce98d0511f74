//! prop-schema checks the properties handed to UI components against a declarative schema,
//! before anything gets rendered.
//!
//! Each component type has a [`Schema`]: one [`Node`][node::Node] per property, describing
//! what the property may hold. Nodes can say:
//!
//! - Whether null is acceptable, and whether the property is required.
//! - That the value is a component, boolean, number, string, list, or dict.
//! - That every element of a list, or every value of a dict, follows a nested node.
//! - That a dict has a particular shape, with or without unknown fields.
//! - That the value matches any one of several alternatives, or any one of several kinds.
//! - That the value is one of a fixed set of literals.
//! - That a named custom validator accepts it.
//!
//! Schemas also carry wildcard prefixes, so whole families of properties like `data-*` and
//! `aria-*` can be accepted without listing them.
//!
//! A [`Validator`] binds a schema to an [`Env`] and checks candidate property mappings,
//! returning a [`Report`] of failures, each with the path to the offending value. Candidates
//! are [`Value`]s: plain data, plus opaque host [`Object`]s. Host objects may be component
//! instances (recognized structurally, see [`Recognize`]), or numeric scalars and sequences
//! from a numerics library (see [`host`]), which count as numbers and lists.
//!
//! Whole component trees are checked with a [`ComponentRegistry`], which also catches
//! duplicate ids and self-containing layouts.
//!
//! # Example
//!
//! ```
//! # use prop_schema::*;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = Schema::from_props(serde_json::json!({
//!     "id": {"nullable": true, "type": "string"},
//!     "figure": {"nullable": true, "type": "custom", "validator": "plotly_figure"},
//!     "style": {"nullable": true, "type": "dict"}
//! }))?;
//! let validator = Validator::new(schema)?;
//!
//! let good = Value::from(serde_json::json!({
//!     "id": "graph",
//!     "figure": {"data": [{"x": [1, 2, 3], "y": [4, 1, 2]}]}
//! }));
//! assert!(validator.validate_value(&good).is_ok());
//!
//! let bad = Value::from(serde_json::json!({"figure": {"doto": []}}));
//! assert!(validator.validate_value(&bad).into_result().is_err());
//! # Ok(())
//! # }
//! ```

mod component;
mod error;
mod integer;
mod layout;
mod report;
mod schema;
mod validator;
mod value;

pub mod host;
pub mod node;

pub use self::component::{Component, Markers, Recognize};
pub use self::error::{Error, Result};
pub use self::integer::Integer;
pub use self::layout::ComponentRegistry;
pub use self::report::{Failure, Path, Reason, Report, Segment};
pub use self::schema::{Schema, Wildcard};
pub use self::validator::{CustomFn, CustomValidators, Env, Validator, ValidatorBuilder};
pub use self::value::{Object, Value};
