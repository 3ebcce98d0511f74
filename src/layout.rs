//! Validation of a whole layout: a tree of component instances, each checked against the
//! validator registered for its type.
//!
//! The walk starts at the root component (or list of components) and follows every prop:
//! nested components, lists, dicts and host sequences. Along the way it reports
//!
//! - props that fail their component's validator, at their full path from the root,
//! - components whose type has no registered validator,
//! - `id` values used by more than one component,
//! - components that contain themselves.

use crate::report::{Reason, Report};
use crate::validator::{Env, Validator, Walk};
use crate::value::{Object, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Validators for every component type that may appear in a layout.
///
/// Types are registered either by bare type tag (`"Div"`), or qualified by namespace
/// (`"html.Div"`). The qualified name is tried first.
#[derive(Clone, Debug, Default)]
pub struct ComponentRegistry {
    validators: BTreeMap<String, Validator>,
    env: Env,
    allow_unregistered: bool,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different environment to find components and host sequences while walking. Each
    /// component's props are still checked in its own validator's environment.
    pub fn env(mut self, env: Env) -> Self {
        self.env = env;
        self
    }

    pub fn register(mut self, type_name: impl Into<String>, validator: Validator) -> Self {
        self.validators.insert(type_name.into(), validator);
        self
    }

    /// Whether components with no registered validator pass unchecked.
    pub fn allow_unregistered(mut self, allow: bool) -> Self {
        self.allow_unregistered = allow;
        self
    }

    pub fn validator_for(&self, obj: &dyn Object) -> Option<&Validator> {
        let tag = obj.type_tag()?;
        obj.namespace()
            .and_then(|ns| self.validators.get(&format!("{}.{}", ns, tag)))
            .or_else(|| self.validators.get(tag))
    }

    /// Validate every component reachable from `root`, which must be a component or a list.
    pub fn validate_layout(&self, root: &Value) -> Report {
        let mut walk = Walk::new(&self.env);
        let mut ids = BTreeSet::new();
        if self.env.is_component(root) || self.env.elements(root).is_some() {
            self.visit(&mut walk, root, &mut ids);
        } else {
            walk.wrong_type("component or list of components", root);
        }
        Report::new(walk.finish())
    }

    fn visit(&self, walk: &mut Walk, value: &Value, ids: &mut BTreeSet<String>) -> bool {
        if let Some(obj) = value.as_object().filter(|_| self.env.is_component(value)) {
            return walk.guard(value, |walk| self.visit_component(walk, obj.as_ref(), value, ids));
        }
        if let Some(map) = value.as_map() {
            let mut pass = true;
            for (key, val) in map {
                pass &= walk.field(key, |walk| self.visit(walk, val, ids));
            }
            return pass;
        }
        match self.env.elements(value) {
            Some(elements) => walk.guard(value, |walk| {
                let mut pass = true;
                for (i, elem) in elements.iter().enumerate() {
                    pass &= walk.index(i, |walk| self.visit(walk, elem, ids));
                }
                pass
            }),
            None => true,
        }
    }

    fn visit_component(
        &self,
        walk: &mut Walk,
        obj: &dyn Object,
        value: &Value,
        ids: &mut BTreeSet<String>,
    ) -> bool {
        let mut pass = match self.validator_for(obj) {
            Some(validator) => walk.absorb(validator.validate_value(value).into_failures()),
            None if self.allow_unregistered => true,
            None => {
                let tag = obj.type_tag().unwrap_or_else(|| obj.type_name());
                tracing::warn!(component = tag, "no validator registered for component type");
                walk.fail(Reason::UnregisteredComponent(tag.to_string()))
            }
        };

        if let Some(id) = obj.prop("id").filter(|id| !id.is_null()) {
            let id = match id.as_str() {
                Some(s) => s.to_string(),
                None => id.to_string(),
            };
            if !ids.insert(id.clone()) {
                tracing::warn!(%id, "duplicate component id in layout");
                pass &= walk.field("id", |walk| walk.fail(Reason::DuplicateId(id)));
            }
        }

        for name in obj.prop_names().unwrap_or_default() {
            if let Some(val) = obj.prop(name) {
                pass &= walk.field(name, |walk| self.visit(walk, val, ids));
            }
        }
        pass
    }
}
