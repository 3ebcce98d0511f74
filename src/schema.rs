//! A component's property schema: one [`Node`] per named property, wildcard-prefix rules for
//! families like `data-*` and `aria-*`, and whether other properties are tolerated.
//!
//! Schemas are usually loaded from the metadata produced alongside a component class:
//!
//! ```
//! # use prop_schema::Schema;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = Schema::from_json(r#"{
//!     "props": {
//!         "id": {"nullable": true, "type": "string"},
//!         "n_clicks": {"nullable": true, "type": "number"}
//!     },
//!     "wildcards": {"data-*": null, "aria-*": {"type": "string"}},
//!     "allow_unknown": false
//! }"#)?;
//! assert!(schema.get("id").is_some());
//! assert!(schema.wildcard_for("aria-label").is_some());
//! assert!(schema.wildcard_for("title").is_none());
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use crate::node::{Node, NodeDoc};
use regex::Regex;
use serde::{ser, Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::sync::OnceLock;

/// Properties whose name starts with `prefix` are checked against `node`.
#[derive(Clone, Debug, PartialEq)]
pub struct Wildcard {
    pub prefix: String,
    pub node: Node,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(try_from = "SchemaDoc")]
pub struct Schema {
    props: BTreeMap<String, Node>,
    wildcards: Vec<Wildcard>,
    allow_unknown: bool,
}

impl Schema {
    /// An empty schema that rejects every property.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a full schema document.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: SchemaDoc = serde_json::from_str(json).map_err(json_error)?;
        Schema::try_from(doc)
    }

    /// Load a bare mapping of property names to nodes, with no wildcards and no unknown
    /// properties allowed.
    pub fn from_props(props: serde_json::Value) -> Result<Self> {
        let props: BTreeMap<String, NodeDoc> =
            serde_json::from_value(props).map_err(json_error)?;
        Schema::try_from(SchemaDoc {
            props,
            ..SchemaDoc::default()
        })
    }

    /// Add or replace a property.
    pub fn prop(mut self, name: impl Into<String>, node: Node) -> Self {
        self.props.insert(name.into(), node);
        self
    }

    /// Add a wildcard rule. Use [`Node::any`] to leave matching properties unconstrained.
    pub fn wildcard(mut self, prefix: impl Into<String>, node: Node) -> Self {
        let prefix = prefix.into();
        let wildcard = Wildcard { prefix, node };
        // Kept sorted by prefix, the order a loaded document produces.
        match self
            .wildcards
            .binary_search_by(|w| w.prefix.cmp(&wildcard.prefix))
        {
            Ok(i) => self.wildcards[i] = wildcard,
            Err(i) => self.wildcards.insert(i, wildcard),
        }
        self
    }

    pub fn allow_unknown(mut self, allow_unknown: bool) -> Self {
        self.allow_unknown = allow_unknown;
        self
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.props.get(name)
    }

    /// The wildcard rule covering `name`. If several prefixes match, the longest wins.
    pub fn wildcard_for(&self, name: &str) -> Option<&Wildcard> {
        self.wildcards
            .iter()
            .filter(|w| name.starts_with(w.prefix.as_str()))
            .max_by_key(|w| w.prefix.len())
    }

    pub fn allows_unknown(&self) -> bool {
        self.allow_unknown
    }

    pub fn props(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.props.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn wildcards(&self) -> &[Wildcard] {
        &self.wildcards
    }

    /// Number of named properties.
    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty() && self.wildcards.is_empty()
    }
}

/// Data errors come from a document that parsed but doesn't follow the schema grammar.
fn json_error(e: serde_json::Error) -> Error {
    match e.classify() {
        serde_json::error::Category::Data => Error::MalformedSchema(e.to_string()),
        _ => Error::from(e),
    }
}

fn prefix_pattern() -> Result<&'static Regex> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^([A-Za-z][A-Za-z0-9_-]*-)\*?$"))
        .as_ref()
        .map_err(|e| Error::MalformedSchema(e.to_string()))
}

/// Normalize `data-*` or `data-` to the bare prefix `data-`.
fn parse_prefix(key: &str) -> Result<String> {
    prefix_pattern()?
        .captures(key)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            Error::MalformedSchema(format!(
                "wildcard {:?} is not a prefix like \"data-*\"",
                key
            ))
        })
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct SchemaDoc {
    props: BTreeMap<String, NodeDoc>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    wildcards: BTreeMap<String, Option<NodeDoc>>,
    allow_unknown: bool,
}

impl TryFrom<SchemaDoc> for Schema {
    type Error = Error;

    fn try_from(doc: SchemaDoc) -> Result<Self> {
        let mut props = BTreeMap::new();
        for (name, node) in doc.props {
            let node = Node::try_from(node)
                .map_err(|e| Error::MalformedSchema(format!("property {:?}: {}", name, e)))?;
            props.insert(name, node);
        }
        let mut wildcards = Vec::with_capacity(doc.wildcards.len());
        for (key, node) in doc.wildcards {
            let prefix = parse_prefix(&key)?;
            if wildcards.iter().any(|w: &Wildcard| w.prefix == prefix) {
                return Err(Error::MalformedSchema(format!(
                    "wildcard prefix {:?} is declared twice",
                    prefix
                )));
            }
            let node = match node {
                None => Node::any().nullable(true),
                Some(node) => Node::try_from(node)?,
            };
            wildcards.push(Wildcard { prefix, node });
        }
        wildcards.sort_by(|a, b| a.prefix.cmp(&b.prefix));
        Ok(Schema {
            props,
            wildcards,
            allow_unknown: doc.allow_unknown,
        })
    }
}

impl TryFrom<Schema> for SchemaDoc {
    type Error = Error;

    fn try_from(schema: Schema) -> Result<Self> {
        let props = schema
            .props
            .into_iter()
            .map(|(k, v)| NodeDoc::try_from(v).map(|doc| (k, doc)))
            .collect::<Result<_>>()?;
        let wildcards = schema
            .wildcards
            .into_iter()
            .map(|w| NodeDoc::try_from(w.node).map(|doc| (format!("{}*", w.prefix), Some(doc))))
            .collect::<Result<_>>()?;
        Ok(SchemaDoc {
            props,
            wildcards,
            allow_unknown: schema.allow_unknown,
        })
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SchemaDoc::try_from(self.clone())
            .map_err(<S::Error as ser::Error>::custom)?
            .serialize(serializer)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::node::{Kind, Rule};
    use serde_json::json;

    #[test]
    fn wildcard_prefixes() {
        let schema = Schema::new()
            .wildcard("data-", Node::any())
            .wildcard("data-x-", Node::kind(Kind::Number));
        assert_eq!(schema.wildcard_for("data-foo").unwrap().prefix, "data-");
        assert_eq!(schema.wildcard_for("data-x-y").unwrap().prefix, "data-x-");
        assert!(schema.wildcard_for("data").is_none());
        assert!(schema.wildcard_for("aria-label").is_none());

        assert_eq!(parse_prefix("data-*").unwrap(), "data-");
        assert_eq!(parse_prefix("aria-").unwrap(), "aria-");
        assert_eq!(parse_prefix("data-x-*").unwrap(), "data-x-");
        for bad in ["data", "*", "-*", "data-*-*", "da ta-*"] {
            assert!(parse_prefix(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn null_wildcard_is_unconstrained() {
        let schema = Schema::from_json(r#"{"wildcards": {"data-*": null}}"#).unwrap();
        let w = schema.wildcard_for("data-anything").unwrap();
        assert_eq!(w.node.rule, Rule::Any);
        assert!(w.node.nullable);
    }

    #[test]
    fn from_props() {
        let schema = Schema::from_props(json!({
            "optionalString": {"nullable": true, "type": "string"},
            "requiredString": {"nullable": false, "required": true, "type": "string"}
        }))
        .unwrap();
        assert_eq!(schema.len(), 2);
        assert!(schema.get("requiredString").unwrap().required);
        assert!(!schema.allows_unknown());
        assert!(schema.wildcards().is_empty());
    }

    #[test]
    fn malformed_documents() {
        let errs = [
            Schema::from_props(json!({"a": {"type": "str"}})),
            Schema::from_props(json!({"a": {"nulable": true}})),
            Schema::from_props(json!(["a"])),
            Schema::from_json(r#"{"wildcards": {"data": null}}"#),
            Schema::from_json(r#"{"wildcards": {"data-*": null, "data-": null}}"#),
            Schema::from_json(r#"{"prop": {}}"#),
        ];
        for res in errs {
            assert!(matches!(res, Err(Error::MalformedSchema(_))), "{:?}", res);
        }
        assert!(matches!(Schema::from_json("{"), Err(Error::SerdeFail(_))));
    }

    #[test]
    fn serde_round_trip() {
        let schema = Schema::new()
            .prop("id", Node::kind(Kind::String).nullable(true))
            .wildcard("aria-", Node::kind(Kind::String))
            .allow_unknown(true);
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(
            json,
            json!({
                "props": {"id": {"nullable": true, "type": "string"}},
                "wildcards": {"aria-*": {"type": "string"}},
                "allow_unknown": true
            })
        );
        let back: Schema = serde_json::from_value(json).unwrap();
        assert_eq!(back, schema);
    }

    #[test]
    fn wildcard_order_does_not_matter() {
        let schema = Schema::new()
            .wildcard("data-", Node::any().nullable(true))
            .wildcard("aria-", Node::kind(Kind::String))
            .wildcard("data-", Node::any());
        let prefixes: Vec<_> = schema.wildcards().iter().map(|w| w.prefix.as_str()).collect();
        assert_eq!(prefixes, ["aria-", "data-"]);
        assert!(!schema.wildcard_for("data-x").unwrap().node.nullable);

        let back: Schema = serde_json::from_value(serde_json::to_value(&schema).unwrap()).unwrap();
        assert_eq!(back, schema);
        let reordered = Schema::new()
            .wildcard("aria-", Node::kind(Kind::String))
            .wildcard("data-", Node::any());
        assert_eq!(reordered, schema);
    }
}
