//! The declarative wire form of a node, as exchanged with component code generation.
//!
//! ```json
//! {
//!     "nullable": true,
//!     "type": "dict",
//!     "allow_unknown": false,
//!     "schema": {
//!         "color": {"nullable": true, "type": "string"},
//!         "fontSize": {"nullable": true, "type": "number"}
//!     }
//! }
//! ```

use super::{Kind, MapRule, Node, Rule};
use crate::error::{Error, Result};
use crate::value::Value;
use serde::{ser, Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::convert::TryFrom;

#[inline]
fn is_false(v: &bool) -> bool {
    !v
}

/// Keys that may appear in a node document.
const NODE_KEYS: &[&str] = &[
    "description",
    "nullable",
    "required",
    "type",
    "schema",
    "valueschema",
    "anyof",
    "anyof_type",
    "allow_unknown",
    "allowed",
    "validator",
];

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub(crate) struct NodeDoc {
    #[serde(skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(skip_serializing_if = "is_false")]
    nullable: bool,
    #[serde(skip_serializing_if = "is_false")]
    required: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    /// Either one node (list elements, dict values) or a map of field nodes (dict shapes).
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    valueschema: Option<Box<NodeDoc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    anyof: Option<Vec<NodeDoc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    anyof_type: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    allow_unknown: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    allowed: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    validator: Option<String>,
}

fn malformed(msg: impl Into<String>) -> Error {
    Error::MalformedSchema(msg.into())
}

/// A dict's `schema` is a single node when it uses node keywords with non-map values, such as
/// `{"type": "number"}`. Otherwise it maps field names to nodes; a field may itself be named
/// `type`, as long as its node is a map.
fn looks_like_node(schema: &serde_json::Map<String, serde_json::Value>) -> bool {
    schema
        .iter()
        .any(|(k, v)| NODE_KEYS.contains(&k.as_str()) && !v.is_object())
}

fn node_from_json(v: serde_json::Value) -> Result<Node> {
    let doc: NodeDoc =
        serde_json::from_value(v).map_err(|e| malformed(format!("bad nested node: {}", e)))?;
    Node::try_from(doc)
}

impl TryFrom<NodeDoc> for Node {
    type Error = Error;

    fn try_from(doc: NodeDoc) -> Result<Self> {
        // Rules are gathered in evaluation order: anyof, anyof_type, type, allowed, validator.
        let mut rules = Vec::new();

        if let Some(anyof) = doc.anyof {
            if anyof.is_empty() {
                return Err(malformed("`anyof` has no alternatives"));
            }
            let alts = anyof
                .into_iter()
                .map(Node::try_from)
                .collect::<Result<Vec<_>>>()?;
            rules.push(Rule::AnyOf(alts));
        }

        let mut any_kinds = None;
        if let Some(names) = doc.anyof_type {
            if names.is_empty() {
                return Err(malformed("`anyof_type` has no types"));
            }
            let mut kinds = names
                .iter()
                .map(|n| Kind::from_name(n))
                .collect::<Result<Vec<_>>>()?;
            kinds.sort_unstable();
            kinds.dedup();
            any_kinds = Some(kinds.clone());
            rules.push(Rule::AnyOfKind(kinds));
        }

        let kind_name = doc.kind.as_deref();
        match kind_name {
            None | Some("enum") | Some("custom") => {
                if doc.schema.is_some() || doc.valueschema.is_some() {
                    return Err(malformed("`schema` needs a `list` or `dict` type"));
                }
            }
            Some(name) => {
                let kind = Kind::from_name(name)?;
                if let Some(kinds) = &any_kinds {
                    if !kinds.contains(&kind) {
                        return Err(malformed(format!(
                            "type `{}` is not among the `anyof_type` types",
                            kind
                        )));
                    }
                }
                if let Some(Rule::AnyOf(alts)) = rules.first() {
                    let typed: Vec<Kind> = alts.iter().filter_map(|n| n.rule.kind()).collect();
                    if typed.len() == alts.len() && !typed.contains(&kind) {
                        return Err(malformed(format!(
                            "type `{}` matches none of the `anyof` alternatives",
                            kind
                        )));
                    }
                }
                rules.push(kind_rule(kind, doc.schema, doc.valueschema, doc.allow_unknown)?);
            }
        }

        match doc.allowed {
            Some(allowed) if allowed.is_empty() => {
                return Err(malformed("`allowed` has no values"));
            }
            Some(allowed) => {
                rules.push(Rule::Allowed(allowed.into_iter().map(Value::from).collect()));
            }
            None if kind_name == Some("enum") => {
                return Err(malformed("type `enum` needs an `allowed` list"));
            }
            None => (),
        }

        match doc.validator {
            Some(name) => rules.push(Rule::Custom(name)),
            None if kind_name == Some("custom") => {
                return Err(malformed("type `custom` needs a `validator`"));
            }
            None => (),
        }

        let rule = match rules.len() {
            0 => Rule::Any,
            1 => rules.remove(0),
            _ => Rule::All(rules),
        };
        Ok(Node {
            description: doc.description,
            nullable: doc.nullable,
            required: doc.required,
            rule,
        })
    }
}

fn kind_rule(
    kind: Kind,
    schema: Option<serde_json::Value>,
    valueschema: Option<Box<NodeDoc>>,
    allow_unknown: Option<bool>,
) -> Result<Rule> {
    match kind {
        Kind::List => {
            if valueschema.is_some() {
                return Err(malformed("`valueschema` needs a `dict` type"));
            }
            Ok(match schema {
                Some(items) => Rule::List(Box::new(node_from_json(items)?)),
                None => Rule::Kind(Kind::List),
            })
        }
        Kind::Dict => {
            if schema.is_none() && valueschema.is_none() {
                return Ok(Rule::Kind(Kind::Dict));
            }
            let mut map = MapRule::new().allow_unknown(allow_unknown.unwrap_or(false));
            match schema {
                None => (),
                Some(serde_json::Value::Object(fields)) if !looks_like_node(&fields) => {
                    for (name, field) in fields {
                        let node = node_from_json(field)
                            .map_err(|e| malformed(format!("field `{}`: {}", name, e)))?;
                        map.fields.insert(name, node);
                    }
                }
                Some(values @ serde_json::Value::Object(_)) => {
                    map = map.values(node_from_json(values)?);
                }
                Some(_) => return Err(malformed("dict `schema` must be a map")),
            }
            if let Some(values) = valueschema {
                if map.values.is_some() {
                    return Err(malformed("dict has both a value `schema` and `valueschema`"));
                }
                map = map.values(Node::try_from(*values)?);
            }
            Ok(Rule::Map(Box::new(map)))
        }
        _ => {
            if schema.is_some() || valueschema.is_some() {
                return Err(malformed(format!(
                    "type `{}` can't have a `schema`",
                    kind
                )));
            }
            Ok(Rule::Kind(kind))
        }
    }
}

fn rule_into_doc(rule: Rule, doc: &mut NodeDoc) -> Result<()> {
    match rule {
        Rule::Any => (),
        Rule::Kind(kind) => doc.kind = Some(kind.name().to_string()),
        Rule::List(items) => {
            doc.kind = Some("list".to_string());
            doc.schema = Some(serde_json::to_value(NodeDoc::try_from(*items)?)?);
        }
        Rule::Map(map) => {
            let map = *map;
            doc.kind = Some("dict".to_string());
            if map.allow_unknown {
                doc.allow_unknown = Some(true);
            }
            // An empty shape still forbids unknown keys, so it keeps its (empty) schema.
            if !map.fields.is_empty() || map.values.is_none() {
                let fields = map
                    .fields
                    .into_iter()
                    .map(|(k, v)| NodeDoc::try_from(v).map(|doc| (k, doc)))
                    .collect::<Result<BTreeMap<String, NodeDoc>>>()?;
                doc.schema = Some(serde_json::to_value(fields)?);
            }
            if let Some(values) = map.values {
                doc.valueschema = Some(Box::new(NodeDoc::try_from(*values)?));
            }
        }
        Rule::AnyOf(alts) => {
            let alts = alts
                .into_iter()
                .map(NodeDoc::try_from)
                .collect::<Result<Vec<_>>>()?;
            doc.anyof = Some(alts);
        }
        Rule::AnyOfKind(kinds) => {
            doc.anyof_type = Some(kinds.iter().map(|k| k.name().to_string()).collect())
        }
        Rule::Allowed(literals) => {
            let literals = literals
                .iter()
                .map(|lit| {
                    lit.to_json().ok_or_else(|| {
                        Error::SerdeFail(format!("allowed literal {} has no JSON form", lit))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            doc.allowed = Some(literals);
        }
        Rule::Custom(name) => doc.validator = Some(name),
        Rule::All(rules) => {
            for rule in rules {
                rule_into_doc(rule, doc)?;
            }
        }
    }
    Ok(())
}

/// Fails for nodes holding literals with no JSON form: host objects and non-finite floats.
impl TryFrom<Node> for NodeDoc {
    type Error = Error;

    fn try_from(node: Node) -> Result<Self> {
        let mut doc = NodeDoc {
            description: node.description,
            nullable: node.nullable,
            required: node.required,
            ..NodeDoc::default()
        };
        rule_into_doc(node.rule, &mut doc)?;
        Ok(doc)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        NodeDoc::try_from(self.clone())
            .map_err(<S::Error as ser::Error>::custom)?
            .serialize(serializer)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn load(v: serde_json::Value) -> Result<Node> {
        let doc: NodeDoc = serde_json::from_value(v)?;
        Node::try_from(doc)
    }

    #[test]
    fn plain_types() {
        let node = load(json!({"nullable": true, "type": "number"})).unwrap();
        assert_eq!(node, Node::kind(Kind::Number).nullable(true));
        let node = load(json!({"type": "dict"})).unwrap();
        assert_eq!(node.rule, Rule::Kind(Kind::Dict));
        let node = load(json!({"type": "dict", "schema": {}})).unwrap();
        assert_eq!(node, MapRule::new().build());
        let node = load(json!({"nullable": true})).unwrap();
        assert_eq!(node.rule, Rule::Any);
    }

    #[test]
    fn descriptions_are_kept() {
        let doc = json!({"description": "Text shown on the button", "type": "string"});
        let node = load(doc.clone()).unwrap();
        assert_eq!(node.description, "Text shown on the button");
        assert_eq!(serde_json::to_value(&node).unwrap(), doc);
    }

    #[test]
    fn list_allow_unknown_is_ignored() {
        let node = load(json!({
            "allow_unknown": false,
            "nullable": true,
            "schema": {"nullable": true, "type": "number"},
            "type": "list"
        }))
        .unwrap();
        assert_eq!(
            node,
            Node::list_of(Node::kind(Kind::Number).nullable(true)).nullable(true)
        );
    }

    #[test]
    fn dict_schema_forms() {
        let shape = load(json!({
            "type": "dict",
            "schema": {"type": {"type": "string"}, "size": {"type": "number"}}
        }))
        .unwrap();
        match shape.rule {
            Rule::Map(map) => {
                assert_eq!(map.fields.len(), 2);
                assert!(map.values.is_none());
            }
            other => panic!("expected a map rule, got {:?}", other),
        }

        let object_of = load(json!({
            "type": "dict",
            "schema": {"nullable": true, "type": "number"}
        }))
        .unwrap();
        let expected = MapRule::new()
            .values(Node::kind(Kind::Number).nullable(true))
            .build();
        assert_eq!(object_of, expected);

        let value_schema = load(json!({
            "type": "dict",
            "valueschema": {"nullable": true, "type": "number"}
        }))
        .unwrap();
        assert_eq!(value_schema, expected);
    }

    #[test]
    fn combined_keys() {
        let node = load(json!({"type": "string", "allowed": ["News", "Photos"]})).unwrap();
        assert_eq!(
            node.rule,
            Rule::All(vec![
                Rule::Kind(Kind::String),
                Rule::Allowed(vec!["News".into(), "Photos".into()])
            ])
        );
        let node = load(json!({"type": "enum", "allowed": [1, "1"]})).unwrap();
        assert_eq!(node.rule, Rule::Allowed(vec![Value::from(1), "1".into()]));
        let node = load(json!({"type": "custom", "validator": "plotly_figure"})).unwrap();
        assert_eq!(node.rule, Rule::Custom("plotly_figure".into()));
    }

    #[test]
    fn malformed_documents() {
        let bad = [
            json!({"type": "integer"}),
            json!({"anyof": []}),
            json!({"anyof_type": []}),
            json!({"anyof_type": ["boolean", "blob"]}),
            json!({"allowed": []}),
            json!({"type": "string", "schema": {"type": "number"}}),
            json!({"schema": {"type": "number"}}),
            json!({"type": "list", "valueschema": {"type": "number"}}),
            json!({"type": "boolean", "anyof_type": ["string", "number"]}),
            json!({"type": "boolean", "anyof": [{"type": "string"}, {"type": "number"}]}),
            json!({"type": "enum"}),
            json!({"type": "custom"}),
            json!({"type": "dict", "schema": ["a"]}),
            json!({"type": "dict", "schema": {"f": {"type": "nope"}}}),
        ];
        for doc in bad {
            let res = load(doc.clone());
            assert!(
                matches!(res, Err(Error::MalformedSchema(_))),
                "accepted {}: {:?}",
                doc,
                res
            );
        }
        // Unknown keys are rejected by serde before conversion.
        assert!(load(json!({"typo": "string"})).is_err());
    }

    #[test]
    fn literals_without_json_form_fail_to_serialize() {
        let node = Node::allowed([Value::object(crate::host::Scalar::I8(1))]);
        assert!(matches!(
            NodeDoc::try_from(node.clone()),
            Err(Error::SerdeFail(_))
        ));
        assert!(serde_json::to_value(&node).is_err());
        let nested = Node::list_of(Node::allowed([f64::NAN]));
        assert!(serde_json::to_value(&nested).is_err());
        let fine = Node::list_of(Node::allowed([1.5]));
        assert_eq!(
            serde_json::to_value(&fine).unwrap(),
            json!({"type": "list", "schema": {"allowed": [1.5]}})
        );
    }

    #[test]
    fn agreeing_keys_are_fine() {
        assert!(load(json!({"type": "boolean", "anyof_type": ["boolean", "number"]})).is_ok());
        // An untyped alternative could be anything, so no contradiction is provable.
        assert!(load(json!({"type": "boolean", "anyof": [{"type": "string"}, {}]})).is_ok());
    }

    #[test]
    fn serializes_back() {
        let doc = json!({
            "nullable": true,
            "type": "dict",
            "schema": {
                "data": {"nullable": true, "type": "list", "schema": {"nullable": true, "type": "dict"}},
                "layout": {"nullable": true, "type": "dict"}
            }
        });
        let node = load(doc.clone()).unwrap();
        assert_eq!(serde_json::to_value(&node).unwrap(), doc);
        let again: Node = serde_json::from_value(doc).unwrap();
        assert_eq!(again, node);
    }
}
