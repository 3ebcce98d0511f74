//! Component instances, and how the validator decides something is one.

use crate::value::{Object, Value};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

/// Decides whether a host object is component-like.
///
/// Component classes are generated independently, so recognition is structural: the check
/// looks at what the object exposes, never at its concrete type. A plain map or scalar is never
/// component-like, and never reaches this trait.
pub trait Recognize: Send + Sync {
    fn is_component(&self, obj: &dyn Object) -> bool;
}

/// The default recognizer: an object is component-like if it exposes both a type tag and a
/// list of property names.
#[derive(Clone, Copy, Debug, Default)]
pub struct Markers;

impl Recognize for Markers {
    fn is_component(&self, obj: &dyn Object) -> bool {
        obj.type_tag().is_some() && obj.prop_names().is_some()
    }
}

impl<F> Recognize for F
where
    F: Fn(&dyn Object) -> bool + Send + Sync,
{
    fn is_component(&self, obj: &dyn Object) -> bool {
        self(obj)
    }
}

/// A generic component instance: a type tag, a namespace, the declared property names, and
/// the properties that are currently set.
///
/// ```
/// # use prop_schema::{Component, Value};
/// let button = Component::new("Button", "html")
///     .declare(["id", "children", "n_clicks"])
///     .prop("id", "submit")
///     .prop("children", "Submit");
/// assert_eq!(button.get("id"), Some(&Value::from("submit")));
/// ```
#[derive(Clone, Default)]
pub struct Component {
    type_tag: String,
    namespace: String,
    prop_names: Vec<String>,
    props: BTreeMap<String, Value>,
}

impl Component {
    pub fn new(type_tag: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            namespace: namespace.into(),
            prop_names: Vec::new(),
            props: BTreeMap::new(),
        }
    }

    /// Declare property names without setting them.
    pub fn declare<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        for name in names {
            let name = name.into();
            if !self.prop_names.contains(&name) {
                self.prop_names.push(name);
            }
        }
        self
    }

    /// Set a property, declaring it if needed.
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        if !self.prop_names.contains(&name) {
            self.prop_names.push(name.clone());
        }
        self.props.insert(name, value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.props.get(name)
    }

    /// The properties that are set.
    pub fn props(&self) -> &BTreeMap<String, Value> {
        &self.props
    }
}

impl Object for Component {
    fn type_name(&self) -> &str {
        &self.type_tag
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_tag(&self) -> Option<&str> {
        Some(&self.type_tag)
    }

    fn namespace(&self) -> Option<&str> {
        Some(&self.namespace)
    }

    fn prop_names(&self) -> Option<&[String]> {
        Some(&self.prop_names)
    }

    fn prop(&self, name: &str) -> Option<&Value> {
        self.props.get(name)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Props can nest components arbitrarily deep (and, in hostile input, cyclically), so
        // only the names are printed.
        f.debug_struct("Component")
            .field("type", &self.type_tag)
            .field("namespace", &self.namespace)
            .field("props", &self.props.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl From<Component> for Value {
    fn from(v: Component) -> Self {
        Value::object(v)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::host::Scalar;

    #[derive(Debug)]
    struct Lookalike;

    impl Object for Lookalike {
        fn type_name(&self) -> &str {
            "Lookalike"
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn type_tag(&self) -> Option<&str> {
            Some("Div")
        }
    }

    #[test]
    fn markers() {
        let div = Component::new("Div", "html");
        assert!(Markers.is_component(&div));
        // A type tag alone is not enough.
        assert!(!Markers.is_component(&Lookalike));
        assert!(!Markers.is_component(&Scalar::I32(1)));
    }

    #[test]
    fn closures_recognize() {
        let only_html = |obj: &dyn Object| obj.namespace() == Some("html");
        assert!(only_html.is_component(&Component::new("Div", "html")));
        assert!(!only_html.is_component(&Component::new("Graph", "core")));
    }

    #[test]
    fn props_declare_names() {
        let c = Component::new("Div", "html").declare(["id"]).prop("title", "t").prop("id", "x");
        assert_eq!(c.prop_names().unwrap(), &["id".to_string(), "title".to_string()]);
        assert_eq!(c.props().len(), 2);
        assert!(c.get("style").is_none());
    }
}
