use super::Env;
use crate::report::{Failure, Path, Reason, Segment};
use crate::value::Value;
use std::mem;
use std::sync::Arc;

/// State for one descent through a candidate: where we are, what failed, and which host
/// objects are open on the current path.
pub(crate) struct Walk<'e> {
    env: &'e Env,
    path: Path,
    failures: Vec<Failure>,
    visiting: Vec<usize>,
}

impl<'e> Walk<'e> {
    pub(crate) fn new(env: &'e Env) -> Self {
        Self {
            env,
            path: Path::new(),
            failures: Vec::new(),
            visiting: Vec::new(),
        }
    }

    pub(crate) fn env(&self) -> &'e Env {
        self.env
    }

    /// Record a failure at the current path. Always returns false.
    pub(crate) fn fail(&mut self, reason: Reason) -> bool {
        tracing::trace!(path = %self.path, %reason, "validation failure");
        self.failures.push(Failure::new(self.path.clone(), reason));
        false
    }

    pub(crate) fn wrong_type(&mut self, expected: &str, value: &Value) -> bool {
        self.fail(Reason::WrongType {
            expected: expected.to_string(),
            found: value.name().to_string(),
        })
    }

    fn nested(&mut self, segment: Segment, f: impl FnOnce(&mut Self) -> bool) -> bool {
        self.path.push(segment);
        let pass = f(self);
        self.path.pop();
        pass
    }

    pub(crate) fn field(&mut self, key: &str, f: impl FnOnce(&mut Self) -> bool) -> bool {
        self.nested(Segment::Field(key.to_string()), f)
    }

    pub(crate) fn index(&mut self, i: usize, f: impl FnOnce(&mut Self) -> bool) -> bool {
        self.nested(Segment::Index(i), f)
    }

    /// Descend into `value`, failing with [`Reason::Cycle`] if it is a host object that is
    /// already open further up the path. Plain data owns its children and can't loop.
    pub(crate) fn guard(&mut self, value: &Value, f: impl FnOnce(&mut Self) -> bool) -> bool {
        let addr = match value.as_object() {
            Some(obj) => Arc::as_ptr(obj) as *const () as usize,
            None => return f(self),
        };
        if self.visiting.contains(&addr) {
            tracing::warn!(path = %self.path, object = value.name(), "cycle in candidate value");
            return self.fail(Reason::Cycle);
        }
        self.visiting.push(addr);
        let pass = f(self);
        self.visiting.pop();
        pass
    }

    /// Run a check whose failures are discarded: only the pass/fail result is kept.
    pub(crate) fn trial(&mut self, f: impl FnOnce(&mut Self) -> bool) -> bool {
        let saved = mem::take(&mut self.failures);
        let pass = f(self);
        self.failures = saved;
        pass
    }

    pub(crate) fn custom(&mut self, name: &str, value: &Value) -> bool {
        let env = self.env;
        match env.customs().get(name) {
            Some(check) => match check(value, env) {
                Ok(()) => true,
                Err(msg) => self.fail(Reason::Custom(msg)),
            },
            None => self.fail(Reason::Custom(format!("no validator named {:?}", name))),
        }
    }

    /// Take failures produced by a separate walk, nesting their paths under the current one.
    pub(crate) fn absorb(&mut self, failures: Vec<Failure>) -> bool {
        let pass = failures.is_empty();
        for failure in failures {
            let path = failure.path.under(&self.path);
            self.failures.push(Failure::new(path, failure.reason));
        }
        pass
    }

    pub(crate) fn finish(self) -> Vec<Failure> {
        self.failures
    }
}
