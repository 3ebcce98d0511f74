//! Schema nodes: the constraint attached to one property.
//!
//! A [`Node`] is built once, from a schema document or with the builder methods here, and is
//! immutable afterwards. Its [`Rule`] is a tagged variant over the kinds of constraint a
//! property can carry:
//!
//! - [`Rule::Any`] - no constraint beyond nullability.
//! - [`Rule::Kind`] - a primitive or structural [`Kind`]: component, boolean, number, string,
//!     plain list, plain dict.
//! - [`Rule::List`] - a list whose every element passes a nested node.
//! - [`Rule::Map`] - a dict checked field by field ([`MapRule`]), for shapes and "object of"
//!     values.
//! - [`Rule::AnyOf`] - passes if any alternative node passes.
//! - [`Rule::AnyOfKind`] - passes if the value is of any listed kind.
//! - [`Rule::Allowed`] - passes if the value equals one of a set of literals.
//! - [`Rule::Custom`] - delegates to a named custom validator.
//! - [`Rule::All`] - several of the above on one node; every one must pass.
//!
//! # Examples
//!
//! The "node content" union accepted by a component's `children`:
//!
//! ```
//! # use prop_schema::node::*;
//! let leaf = || Node::any_of([
//!     Node::kind(Kind::Component),
//!     Node::kind(Kind::Boolean),
//!     Node::kind(Kind::Number),
//!     Node::kind(Kind::String),
//! ]);
//! let children = Node::any_of([
//!     leaf(),
//!     Node::list_of(leaf().nullable(true)).nullable(true),
//! ])
//! .nullable(true);
//! ```

mod doc;
mod kind;

pub use self::kind::Kind;
pub(crate) use self::doc::NodeDoc;

use crate::report::Reason;
use crate::validator::Walk;
use crate::value::Value;
use educe::Educe;
use serde::Deserialize;
use std::collections::BTreeMap;

/// The constraint attached to one property.
#[derive(Educe, Clone, Debug, Deserialize)]
#[educe(PartialEq, Default)]
#[serde(try_from = "NodeDoc")]
pub struct Node {
    /// An optional description of the property, as given in component metadata.
    #[educe(PartialEq(ignore))]
    pub description: String,
    /// Whether null passes, regardless of the rule.
    pub nullable: bool,
    /// Whether the property must be present with a non-null value. Checked by whoever owns
    /// the property: the top-level schema, or the enclosing [`MapRule`].
    pub required: bool,
    /// The constraint on non-null values.
    #[educe(Default(expression = Rule::Any))]
    pub rule: Rule,
}

/// The constraint on a non-null value. See the [module-level documentation][crate::node].
#[derive(Clone, Debug, PartialEq)]
pub enum Rule {
    Any,
    Kind(Kind),
    List(Box<Node>),
    Map(Box<MapRule>),
    AnyOf(Vec<Node>),
    AnyOfKind(Vec<Kind>),
    Allowed(Vec<Value>),
    Custom(String),
    All(Vec<Rule>),
}

impl Node {
    /// A non-nullable, optional node with the given rule.
    pub fn new(rule: Rule) -> Self {
        Self {
            description: String::new(),
            nullable: false,
            required: false,
            rule,
        }
    }

    /// A node that accepts every non-null value.
    pub fn any() -> Self {
        Self::new(Rule::Any)
    }

    pub fn kind(kind: Kind) -> Self {
        Self::new(Rule::Kind(kind))
    }

    pub fn list_of(items: Node) -> Self {
        Self::new(Rule::List(Box::new(items)))
    }

    pub fn any_of(alternatives: impl IntoIterator<Item = Node>) -> Self {
        Self::new(Rule::AnyOf(alternatives.into_iter().collect()))
    }

    pub fn any_of_kind(kinds: impl IntoIterator<Item = Kind>) -> Self {
        Self::new(Rule::AnyOfKind(kinds.into_iter().collect()))
    }

    /// Literals should be plain data: host objects and non-finite floats still compare, but
    /// such a node can't be serialized.
    pub fn allowed<T: Into<Value>>(literals: impl IntoIterator<Item = T>) -> Self {
        Self::new(Rule::Allowed(literals.into_iter().map(Into::into).collect()))
    }

    pub fn custom(name: impl Into<String>) -> Self {
        Self::new(Rule::Custom(name.into()))
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set whether null passes.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Set whether the property must be present and non-null.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Visit the names of every custom validator this node and its children use.
    pub fn custom_names<'a>(&'a self, found: &mut Vec<&'a str>) {
        self.rule.custom_names(found)
    }

    pub(crate) fn check(&self, walk: &mut Walk, value: &Value) -> bool {
        if value.is_null() {
            return self.nullable || walk.fail(Reason::NotNullable);
        }
        self.rule.check(walk, value)
    }
}

impl Rule {
    /// The kind every passing value must have, if this rule pins one down.
    pub fn kind(&self) -> Option<Kind> {
        match self {
            Rule::Kind(kind) => Some(*kind),
            Rule::List(_) => Some(Kind::List),
            Rule::Map(_) => Some(Kind::Dict),
            Rule::All(rules) => rules.iter().find_map(Rule::kind),
            _ => None,
        }
    }

    fn custom_names<'a>(&'a self, found: &mut Vec<&'a str>) {
        match self {
            Rule::Custom(name) => found.push(name),
            Rule::List(items) => items.custom_names(found),
            Rule::Map(map) => {
                map.fields.values().for_each(|n| n.custom_names(found));
                if let Some(values) = &map.values {
                    values.custom_names(found);
                }
            }
            Rule::AnyOf(alts) => alts.iter().for_each(|n| n.custom_names(found)),
            Rule::All(rules) => rules.iter().for_each(|r| r.custom_names(found)),
            Rule::Any | Rule::Kind(_) | Rule::AnyOfKind(_) | Rule::Allowed(_) => (),
        }
    }

    pub(crate) fn check(&self, walk: &mut Walk, value: &Value) -> bool {
        match self {
            Rule::Any => true,
            Rule::Kind(kind) => kind.check(walk, value),
            Rule::List(items) => {
                let elements = match walk.env().elements(value) {
                    Some(elements) => elements,
                    None => return walk.wrong_type("list", value),
                };
                walk.guard(value, |walk| {
                    let mut pass = true;
                    for (i, elem) in elements.iter().enumerate() {
                        pass &= walk.index(i, |walk| items.check(walk, elem));
                    }
                    pass
                })
            }
            Rule::Map(map) => map.check(walk, value),
            Rule::AnyOf(alts) => {
                alts.iter().any(|alt| walk.trial(|walk| alt.check(walk, value)))
                    || walk.fail(Reason::NoAlternative { tried: alts.len() })
            }
            Rule::AnyOfKind(kinds) => {
                if kinds.iter().any(|kind| kind.matches(walk.env(), value)) {
                    true
                } else {
                    let expected = kinds.iter().map(Kind::name).collect::<Vec<_>>().join(" | ");
                    walk.wrong_type(&expected, value)
                }
            }
            Rule::Allowed(literals) => {
                literals.iter().any(|lit| walk.env().literal_eq(lit, value))
                    || walk.fail(Reason::NotAllowed)
            }
            Rule::Custom(name) => walk.custom(name, value),
            Rule::All(rules) => rules.iter().all(|rule| rule.check(walk, value)),
        }
    }
}

impl From<Rule> for Node {
    fn from(rule: Rule) -> Self {
        Node::new(rule)
    }
}

/// Checks a dict field by field.
///
/// Validation passes if the value is a map and, for each key-value pair:
///
/// 1. If the key is in `fields`, the corresponding node is used to validate the value.
/// 2. Otherwise, if there is a node in `values`, it is used to validate the value.
/// 3. Otherwise, the key is unknown, and fails unless `allow_unknown` is set.
///
/// Fields whose node is `required` must also be present and non-null.
///
/// A map rule with only `fields` is a shape; one with only `values` is an "object of".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapRule {
    /// Per-field nodes.
    pub fields: BTreeMap<String, Node>,
    /// A node that every value not covered by `fields` must pass.
    pub values: Option<Box<Node>>,
    /// Whether keys covered by neither `fields` nor `values` are tolerated.
    pub allow_unknown: bool,
}

impl MapRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field to the shape.
    pub fn field(mut self, name: impl Into<String>, node: Node) -> Self {
        self.fields.insert(name.into(), node);
        self
    }

    /// Set the node used for every value without a field of its own.
    pub fn values(mut self, values: Node) -> Self {
        self.values = Some(Box::new(values));
        self
    }

    pub fn allow_unknown(mut self, allow_unknown: bool) -> Self {
        self.allow_unknown = allow_unknown;
        self
    }

    /// Build this into a [`Node`].
    pub fn build(self) -> Node {
        Node::new(Rule::Map(Box::new(self)))
    }

    pub(crate) fn check(&self, walk: &mut Walk, value: &Value) -> bool {
        let map = match value.as_map() {
            Some(map) => map,
            None => return walk.wrong_type("dict", value),
        };

        let mut pass = true;
        for (key, val) in map {
            pass &= match self.fields.get(key).or(self.values.as_deref()) {
                Some(node) => walk.field(key, |walk| node.check(walk, val)),
                None if self.allow_unknown => true,
                None => walk.field(key, |walk| walk.fail(Reason::UnknownField)),
            };
        }

        for (key, node) in self.fields.iter().filter(|(_, n)| n.required) {
            // A null in a non-nullable field already failed above.
            let missing = match map.get(key) {
                None => true,
                Some(val) => val.is_null() && node.nullable,
            };
            if missing {
                pass &= walk.field(key, |walk| walk.fail(Reason::Required));
            }
        }
        pass
    }
}
