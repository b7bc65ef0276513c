//! Boundary decoding of raw tokens.
//!
//! The wire format encodes variable references and tagged unions as plain
//! objects with flag/discriminator keys. They are decoded here, once, into
//! [`Variable`] and [`Tagged`] so the engine only ever matches on variants.
use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::grammar::{self, Rule};
use crate::result::{ErrorCode, Invalid};

pub const IS_VARIABLE_REFERENCE: &str = "isVariableReference";
pub const REFERENCE: &str = "reference";
pub const DISCRIMINATOR: &str = "discriminator";
pub const PAYLOAD: &str = "payload";

/// A token at a `function`/`domain`/`value` position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Variable<'v> {
    /// Not a wrapper: the node itself.
    Direct(&'v Value),
    /// `isVariableReference: "true"`; the reference is a binding index.
    Bound(&'v Value),
    /// Any other flag; the reference is an inline node.
    Inline(&'v Value),
}

/// A `{discriminator, payload}` node. `tag` is `None` when the discriminator
/// is not a string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tagged<'v> {
    pub tag: Option<&'v str>,
    pub payload: &'v Value,
}

impl<'v> Variable<'v> {
    /// Any node carrying `isVariableReference` is a wrapper and must have
    /// exactly the wrapper's keys; everything else is `Direct`. Only the
    /// string `"true"` marks a binding index.
    pub fn decode(token: &'v Value) -> Result<Self, Invalid> {
        let is_wrapper = token
            .as_object()
            .is_some_and(|map| map.contains_key(IS_VARIABLE_REFERENCE));
        if !is_wrapper {
            return Ok(Variable::Direct(token));
        }
        let map = expect_keys(token, &[IS_VARIABLE_REFERENCE, REFERENCE])?;
        let flag = field(map, IS_VARIABLE_REFERENCE)?;
        let reference = field(map, REFERENCE)?;
        match flag.as_str() {
            Some("true") => Ok(Variable::Bound(reference)),
            _ => Ok(Variable::Inline(reference)),
        }
    }
}

impl<'v> Tagged<'v> {
    pub fn decode(token: &'v Value) -> Result<Self, Invalid> {
        let map = expect_keys(token, &[DISCRIMINATOR, PAYLOAD])?;
        let tag = field(map, DISCRIMINATOR)?.as_str();
        let payload = field(map, PAYLOAD)?;
        Ok(Tagged { tag, payload })
    }
}

/// Textual form used for primitive matching. Every token has one: `null` is
/// `null`, an object is `[object Object]` and an array joins its elements
/// with `,`, with `null` elements left empty.
pub fn as_text(token: &Value) -> Cow<'_, str> {
    match token {
        Value::String(s) => Cow::Borrowed(s),
        Value::Number(n) => match n.as_f64() {
            // 1.0 prints as 1
            Some(float) if n.is_f64() => Cow::Owned(float.to_string()),
            _ => Cow::Owned(n.to_string()),
        },
        Value::Bool(true) => Cow::Borrowed("true"),
        Value::Bool(false) => Cow::Borrowed("false"),
        Value::Null => Cow::Borrowed("null"),
        Value::Object(_) => Cow::Borrowed("[object Object]"),
        Value::Array(items) => {
            let parts: Vec<Cow<'_, str>> = items
                .iter()
                .map(|item| match item {
                    Value::Null => Cow::Borrowed(""),
                    other => as_text(other),
                })
                .collect();
            Cow::Owned(parts.join(","))
        }
    }
}

/// Text of `token` if it satisfies the primitive rule `type_name`.
pub fn text_of<'v>(token: &'v Value, type_name: &str) -> Result<Cow<'v, str>, Invalid> {
    let text = as_text(token);
    let matched = match grammar::rule_for(type_name) {
        Some(Rule::Primitive { regex, .. }) => regex.is_match(&text),
        _ => false,
    };
    if matched {
        return Ok(text);
    }
    tracing::trace!(expected = type_name, %token, "primitive mismatch");
    Err(Invalid::new(ErrorCode::InvalidPrimitive))
}

/// The node's key set must equal `expected`: missing keys are reported
/// before extra ones. Non-objects have no keys.
pub fn expect_keys<'v>(token: &'v Value, expected: &[&str]) -> Result<&'v Map<String, Value>, Invalid> {
    let Some(map) = token.as_object() else {
        tracing::trace!(%token, "expected an object");
        return Err(Invalid::new(ErrorCode::MissingKey));
    };
    if let Some(missing) = expected.iter().find(|key| !map.contains_key(**key)) {
        tracing::trace!(key = missing, "missing key");
        return Err(Invalid::new(ErrorCode::MissingKey));
    }
    if let Some(extra) = map.keys().find(|key| !expected.contains(&key.as_str())) {
        tracing::trace!(key = %extra, "extra key");
        return Err(Invalid::new(ErrorCode::ExtraKey));
    }
    Ok(map)
}

pub fn field<'v>(map: &'v Map<String, Value>, key: &str) -> Result<&'v Value, Invalid> {
    map.get(key).ok_or_else(|| Invalid::new(ErrorCode::MissingKey))
}
