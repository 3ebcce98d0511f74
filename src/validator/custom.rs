use super::Env;
use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A named custom check. Returns a message describing the problem on failure.
pub type CustomFn = Arc<dyn Fn(&Value, &Env) -> Result<(), String> + Send + Sync>;

/// Registry of custom validators, looked up by the name in a node's `validator` key.
///
/// The default registry holds the built-in `plotly_figure` and `options_with_unique_values`
/// validators.
#[derive(Clone)]
pub struct CustomValidators {
    checks: BTreeMap<String, CustomFn>,
}

impl CustomValidators {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            checks: BTreeMap::new(),
        }
    }

    /// Register a validator, replacing any previous one of the same name.
    pub fn with<F>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value, &Env) -> Result<(), String> + Send + Sync + 'static,
    {
        self.insert(name, check);
        self
    }

    pub fn insert<F>(&mut self, name: impl Into<String>, check: F)
    where
        F: Fn(&Value, &Env) -> Result<(), String> + Send + Sync + 'static,
    {
        self.checks.insert(name.into(), Arc::new(check));
    }

    pub fn get(&self, name: &str) -> Option<&CustomFn> {
        self.checks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.checks.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.checks.keys().map(String::as_str)
    }
}

impl Default for CustomValidators {
    fn default() -> Self {
        Self::new()
            .with("plotly_figure", plotly_figure)
            .with("options_with_unique_values", options_with_unique_values)
    }
}

impl fmt::Debug for CustomValidators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.checks.keys()).finish()
    }
}

const FIGURE_KEYS: [&str; 3] = ["data", "layout", "frames"];

/// A figure: either a component-like object tagged `Figure`, or a map whose keys are a
/// non-empty subset of `data`, `layout` and `frames`. `data` and `frames` hold lists of maps;
/// `layout` is a map.
pub fn plotly_figure(value: &Value, env: &Env) -> Result<(), String> {
    if env.is_component(value) {
        let tag = value.as_object().and_then(|obj| obj.type_tag());
        return match tag {
            Some("Figure") => Ok(()),
            _ => Err(format!("{} component is not a figure", value.name())),
        };
    }
    let map = value
        .as_map()
        .ok_or_else(|| format!("expected a figure, found {}", value.name()))?;
    if map.is_empty() {
        return Err("a figure needs at least one of data, layout, frames".to_string());
    }
    for (key, val) in map {
        match key.as_str() {
            "layout" if !val.is_map() => {
                return Err(format!("figure layout must be a dict, found {}", val.name()))
            }
            "layout" => (),
            "data" | "frames" => {
                let elements = env
                    .elements(val)
                    .ok_or_else(|| format!("figure {} must be a list, found {}", key, val.name()))?;
                if let Some((i, bad)) = elements.iter().enumerate().find(|(_, e)| !e.is_map()) {
                    return Err(format!(
                        "figure {}[{}] must be a dict, found {}",
                        key,
                        i,
                        bad.name()
                    ));
                }
            }
            _ => {
                return Err(format!(
                    "{:?} is not a figure key (expected one of {})",
                    key,
                    FIGURE_KEYS.join(", ")
                ))
            }
        }
    }
    Ok(())
}

/// A list of option dicts, each with a `value`, where no two values are equal.
pub fn options_with_unique_values(value: &Value, env: &Env) -> Result<(), String> {
    let options = env
        .elements(value)
        .ok_or_else(|| format!("expected a list of options, found {}", value.name()))?;
    let mut seen: Vec<&Value> = Vec::with_capacity(options.len());
    for (i, option) in options.iter().enumerate() {
        let val = option
            .as_map()
            .and_then(|m| m.get("value"))
            .ok_or_else(|| format!("option {} has no value", i))?;
        if seen.iter().any(|prev| env.literal_eq(prev, val)) {
            return Err(format!("duplicate option value {}", val));
        }
        seen.push(val);
    }
    Ok(())
}
