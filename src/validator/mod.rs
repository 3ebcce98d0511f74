//! The validator engine.
//!
//! A [`Validator`] binds an immutable [`Schema`] to an [`Env`]: the component recognizer, the
//! registry of host numeric/sequence types, and the registry of custom validators. It then
//! checks candidate property mappings, producing a [`Report`] of everything that failed.
//!
//! Validation never errors on bad input; it only reports. The one error a validator can raise
//! is at construction, when the schema names a custom validator that isn't registered.
//!
//! # Examples
//!
//! ```
//! # use prop_schema::*;
//! # use prop_schema::node::*;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = Schema::new()
//!     .prop("id", Node::kind(Kind::String).nullable(true))
//!     .prop("n_clicks", Node::kind(Kind::Number).nullable(true))
//!     .wildcard("data-", Node::any());
//! let validator = Validator::new(schema)?;
//!
//! let props = Value::from(serde_json::json!({"id": "button", "n_clicks": 3, "data-x": 1}));
//! assert!(validator.validate_value(&props).is_ok());
//!
//! let props = Value::from(serde_json::json!({"id": 7}));
//! let report = validator.validate_value(&props);
//! assert_eq!(report.to_string(), "id: expected string, found integer");
//! # Ok(())
//! # }
//! ```

mod custom;
mod walk;

pub use self::custom::*;
pub(crate) use self::walk::Walk;

use crate::component::{Markers, Recognize};
use crate::error::{Error, Result};
use crate::host::HostTypes;
use crate::integer::Integer;
use crate::node::Node;
use crate::report::{Reason, Report};
use crate::schema::Schema;
use crate::value::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Everything a check can consult besides the schema: how to recognize components, which host
/// types act as numbers or sequences, and the custom validators.
#[derive(Clone)]
pub struct Env {
    components: Arc<dyn Recognize>,
    hosts: HostTypes,
    customs: CustomValidators,
}

impl Env {
    pub fn new(
        components: Arc<dyn Recognize>,
        hosts: HostTypes,
        customs: CustomValidators,
    ) -> Self {
        Self {
            components,
            hosts,
            customs,
        }
    }

    pub fn hosts(&self) -> &HostTypes {
        &self.hosts
    }

    pub fn customs(&self) -> &CustomValidators {
        &self.customs
    }

    pub fn is_component(&self, value: &Value) -> bool {
        match value.as_object() {
            Some(obj) => self.components.is_component(obj.as_ref()),
            None => false,
        }
    }

    /// The numeric value of a native number or a registered host numeric type. Booleans are
    /// not numbers.
    pub fn as_number(&self, value: &Value) -> Option<f64> {
        match value {
            Value::Object(obj) => self.hosts.as_number(obj.as_ref()),
            _ => value.as_floating(),
        }
    }

    /// The elements of an array or of a registered host sequence. Strings, maps and
    /// component-like objects are never lists.
    pub fn elements<'v>(&self, value: &'v Value) -> Option<Cow<'v, [Value]>> {
        match value {
            Value::Array(v) => Some(Cow::Borrowed(v.as_slice())),
            Value::Object(obj) if !self.components.is_component(obj.as_ref()) => {
                self.hosts.elements(obj.as_ref()).map(Cow::Owned)
            }
            _ => None,
        }
    }

    /// The exact value of a native integer or an integer-valued host type.
    pub fn as_integer(&self, value: &Value) -> Option<Integer> {
        match value {
            Value::Object(obj) => self.hosts.as_integer(obj.as_ref()),
            _ => value.as_int(),
        }
    }

    /// Literal equality as used by `allowed`: numbers compare by value across integer, float
    /// and host numeric types; everything else compares structurally. Two integers compare
    /// exactly, and only a float on either side brings the comparison down to `f64`.
    pub fn literal_eq(&self, literal: &Value, value: &Value) -> bool {
        if let (Some(a), Some(b)) = (self.as_integer(literal), self.as_integer(value)) {
            return a == b;
        }
        match (self.as_number(literal), self.as_number(value)) {
            (Some(a), Some(b)) => a == b,
            _ => literal == value,
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new(Arc::new(Markers), HostTypes::default(), CustomValidators::default())
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Env")
            .field("hosts", &self.hosts)
            .field("customs", &self.customs)
            .finish_non_exhaustive()
    }
}

/// Checks candidate property mappings against one schema.
///
/// Cheap to clone, and safe to share between threads.
#[derive(Clone, Debug)]
pub struct Validator {
    schema: Arc<Schema>,
    env: Env,
    allow_unknown: bool,
}

impl Validator {
    /// A validator with the default environment.
    pub fn new(schema: Schema) -> Result<Self> {
        Self::builder(schema).build()
    }

    pub fn builder(schema: Schema) -> ValidatorBuilder {
        ValidatorBuilder::new(schema)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Whether properties the schema doesn't cover are tolerated.
    pub fn allows_unknown(&self) -> bool {
        self.allow_unknown
    }

    /// Validate a mapping of property names to values.
    pub fn validate(&self, candidate: &BTreeMap<String, Value>) -> Report {
        let mut walk = Walk::new(&self.env);
        self.check_props(&mut walk, candidate.iter().map(|(k, v)| (k.as_str(), v)));
        Report::new(walk.finish())
    }

    /// Validate a map value, or the set properties of a component-like object.
    pub fn validate_value(&self, candidate: &Value) -> Report {
        let mut walk = Walk::new(&self.env);
        self.check_candidate(&mut walk, candidate);
        Report::new(walk.finish())
    }

    pub fn is_valid(&self, candidate: &BTreeMap<String, Value>) -> bool {
        self.validate(candidate).is_ok()
    }

    /// Check one value against one node, outside of any property mapping. Fails if the node
    /// uses a custom validator this validator doesn't have.
    pub fn check(&self, node: &Node, value: &Value) -> Result<Report> {
        let mut names = Vec::new();
        node.custom_names(&mut names);
        if let Some(missing) = names.iter().find(|n| !self.env.customs.contains(n)) {
            return Err(Error::UnknownValidator(missing.to_string()));
        }
        let mut walk = Walk::new(&self.env);
        node.check(&mut walk, value);
        Ok(Report::new(walk.finish()))
    }

    fn check_candidate(&self, walk: &mut Walk, candidate: &Value) -> bool {
        match candidate {
            Value::Map(map) => {
                self.check_props(walk, map.iter().map(|(k, v)| (k.as_str(), v)))
            }
            Value::Object(obj) if self.env.is_component(candidate) => walk.guard(candidate, |walk| {
                let props = obj.prop_names().unwrap_or_default();
                self.check_props(
                    walk,
                    props
                        .iter()
                        .filter_map(|name| obj.prop(name).map(|v| (name.as_str(), v))),
                )
            }),
            _ => walk.wrong_type("dict", candidate),
        }
    }

    fn check_props<'v>(
        &self,
        walk: &mut Walk,
        props: impl Iterator<Item = (&'v str, &'v Value)>,
    ) -> bool {
        let mut pass = true;
        let mut present = BTreeMap::new();
        for (name, value) in props {
            present.insert(name, value);
            let node = self
                .schema
                .get(name)
                .or_else(|| self.schema.wildcard_for(name).map(|w| &w.node));
            pass &= match node {
                Some(node) => walk.field(name, |walk| node.check(walk, value)),
                None if self.allow_unknown => true,
                None => walk.field(name, |walk| walk.fail(Reason::UnknownProperty)),
            };
        }
        // Required props must be present and non-null, even where the node accepts null. A
        // null in a non-nullable prop already failed above.
        for (name, node) in self.schema.props().filter(|(_, node)| node.required) {
            let missing = match present.get(name) {
                None => true,
                Some(value) => value.is_null() && node.nullable,
            };
            if missing {
                pass &= walk.field(name, |walk| walk.fail(Reason::Required));
            }
        }
        pass
    }
}

/// Configures a [`Validator`].
pub struct ValidatorBuilder {
    schema: Schema,
    components: Arc<dyn Recognize>,
    hosts: HostTypes,
    customs: CustomValidators,
    allow_unknown: Option<bool>,
}

impl ValidatorBuilder {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            components: Arc::new(Markers),
            hosts: HostTypes::default(),
            customs: CustomValidators::default(),
            allow_unknown: None,
        }
    }

    /// Set how component-like objects are recognized.
    pub fn recognizer<R: Recognize + 'static>(mut self, recognizer: R) -> Self {
        self.components = Arc::new(recognizer);
        self
    }

    /// Replace the host type registry.
    pub fn host_types(mut self, hosts: HostTypes) -> Self {
        self.hosts = hosts;
        self
    }

    /// Add one custom validator to the registry.
    pub fn custom<F>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value, &Env) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        self.customs.insert(name, check);
        self
    }

    /// Replace the custom validator registry, built-ins included.
    pub fn customs(mut self, customs: CustomValidators) -> Self {
        self.customs = customs;
        self
    }

    /// Override the schema's own `allow_unknown` setting.
    pub fn allow_unknown(mut self, allow_unknown: bool) -> Self {
        self.allow_unknown = Some(allow_unknown);
        self
    }

    /// Finish the validator. Fails if the schema uses a custom validator that isn't
    /// registered.
    pub fn build(self) -> Result<Validator> {
        let mut names = Vec::new();
        for (_, node) in self.schema.props() {
            node.custom_names(&mut names);
        }
        for wildcard in self.schema.wildcards() {
            wildcard.node.custom_names(&mut names);
        }
        if let Some(missing) = names.iter().find(|n| !self.customs.contains(n)) {
            return Err(Error::UnknownValidator(missing.to_string()));
        }
        let allow_unknown = self.allow_unknown.unwrap_or_else(|| self.schema.allows_unknown());
        tracing::debug!(
            props = self.schema.len(),
            wildcards = self.schema.wildcards().len(),
            customs = names.len(),
            allow_unknown,
            "built validator"
        );
        Ok(Validator {
            env: Env::new(self.components, self.hosts, self.customs),
            schema: Arc::new(self.schema),
            allow_unknown,
        })
    }
}
