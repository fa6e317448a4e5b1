//! Context resolution.
//!
//! A render context is a chain of scopes. The outermost scope is the
//! caller's mapping; every loop iteration adds a scope holding only `item`
//! and a link to the enclosing scope, reachable through the `..` prefix.

use std::borrow::Cow;
use std::collections::BTreeMap;

use quill_parser::Value;

use crate::RenderError;

/// Prefix that moves resolution one scope outward (`..title`).
pub const ASCEND: &str = "..";

/// Name bound to the current element inside a loop body.
pub const ITEM: &str = "item";

/// Stand-in for a missing enclosing scope.
static EMPTY_SCOPE: Value = Value::Map(BTreeMap::new());

/// A render scope.
#[derive(Debug, Clone, Copy)]
pub enum Context<'a> {
    /// The caller-supplied mapping.
    Global(&'a Value),
    /// One loop iteration.
    Loop {
        item: &'a Value,
        parent: &'a Context<'a>,
    },
}

impl<'a> Context<'a> {
    /// The outermost scope over caller data.
    pub fn new(data: &'a Value) -> Self {
        Context::Global(data)
    }

    /// A loop scope nested in `self` with `item` bound.
    pub fn with_item<'b>(&'b self, item: &'b Value) -> Context<'b> {
        Context::Loop { item, parent: self }
    }

    /// The scope `..` refers to.
    ///
    /// For the outermost scope this is the caller's own `..` entry, or an
    /// empty mapping.
    pub fn parent(&self) -> Context<'a> {
        match self {
            Context::Global(data) => Context::Global(data.get(ASCEND).unwrap_or(&EMPTY_SCOPE)),
            Context::Loop { parent, .. } => **parent,
        }
    }

    /// Look up a single key in this scope.
    fn lookup(&self, key: &str) -> Option<&'a Value> {
        match self {
            Context::Global(data) => data.segment(key),
            Context::Loop { item, .. } => (key == ITEM).then_some(*item),
        }
    }
}

/// Resolve a dotted path such as `user.name` or `..title`.
///
/// Missing keys are not errors: an unresolvable path yields an empty string.
/// An empty segment (`a.`, `a..b`, or an empty name) is just a key that is
/// never present.
pub fn resolve<'a>(name: &str, context: &Context<'a>) -> Result<Cow<'a, Value>, RenderError> {
    Ok(resolve_in(name, *context))
}

fn resolve_in<'a>(name: &str, context: Context<'a>) -> Cow<'a, Value> {
    if let Some(rest) = name.strip_prefix(ASCEND) {
        return resolve_in(rest, context.parent());
    }

    let mut segments = name.split('.');
    let Some(mut current) = segments.next().and_then(|key| context.lookup(key)) else {
        return Cow::Owned(Value::empty());
    };
    for segment in segments {
        match current.segment(segment) {
            Some(value) => current = value,
            None => return Cow::Owned(Value::empty()),
        }
    }
    Cow::Borrowed(current)
}
