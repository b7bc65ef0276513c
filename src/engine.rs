//! Recursive, grammar-driven validation.
//!
//! One recursion covers every node shape: the expected type name selects a
//! [`Rule`], and the rule selects the strategy. Every step is a fallible
//! operation chained with `?`, so the first failure unwinds the whole walk and
//! collects its path on the way out.
use serde::Deserialize;
use serde_json::Value;

use crate::grammar::{self, FieldSpec, Rule, INTEGER_LITERAL, ROOT_TYPE};
use crate::node::{self, Tagged, Variable, PAYLOAD, REFERENCE};
use crate::result::{ErrorCode, Invalid, ValidationResult, Verdict, WithinExt};

// ------------------------------- Options --------------------------------- //

pub const DEFAULT_MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidatorOptions {
    /// Deepest grammar step allowed before failing with `too-deep`.
    ///
    /// Depth counts grammar steps, not JSON levels. Each nested
    /// `ifelse`/`application` branch costs about three (value, tagged payload,
    /// field), so the default admits roughly 85 levels of expression nesting.
    pub max_depth: usize,
    /// Syntax-check libraries before the program. Off by default: libraries
    /// are taken as already validated.
    pub check_libraries: bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH, check_libraries: false }
    }
}

// ------------------------------- Entry ----------------------------------- //

/// Validate `program` against the `program` rule. Failure paths always start
/// with `"program"`.
pub fn validate_syntax(program: &Value) -> ValidationResult {
    validate_syntax_with(program, &ValidatorOptions::default())
}

pub fn validate_syntax_with(program: &Value, options: &ValidatorOptions) -> ValidationResult {
    let verdict = Engine { options }
        .token(program, ROOT_TYPE, false, 0)
        .within(ROOT_TYPE);
    ValidationResult::from(verdict)
}

/// Validate any token against any type name, without a root segment.
pub fn validate_token(token: &Value, expected_type: &str, variable_already_resolved: bool) -> ValidationResult {
    let options = ValidatorOptions::default();
    let verdict = Engine { options: &options }.token(token, expected_type, variable_already_resolved, 0);
    ValidationResult::from(verdict)
}

// ------------------------------- Engine ---------------------------------- //

struct Engine<'o> {
    options: &'o ValidatorOptions,
}

impl Engine<'_> {
    fn token(&self, token: &Value, expected: &str, resolved: bool, depth: usize) -> Verdict {
        if depth > self.options.max_depth {
            tracing::trace!(depth, expected, "depth limit reached");
            return Err(Invalid::new(ErrorCode::TooDeep));
        }
        let Some(rule) = grammar::rule_for(expected) else {
            tracing::trace!(expected, "no grammar rule");
            return Err(Invalid::new(ErrorCode::TypeNotAllowed));
        };
        match rule {
            Rule::Primitive { .. } => node::text_of(token, expected).map(drop),
            _ if !resolved && grammar::is_variable_type(expected) => {
                self.variable(token, expected, depth)
            }
            Rule::Multitype(tags) => self.multitype(tags, token, depth),
            Rule::Object(fields) => self.object(fields, token, depth),
        }
    }

    fn variable(&self, token: &Value, expected: &str, depth: usize) -> Verdict {
        match Variable::decode(token)? {
            Variable::Direct(inner) => self.token(inner, expected, true, depth + 1),
            Variable::Bound(index) => self
                .token(index, INTEGER_LITERAL, false, depth + 1)
                .within(REFERENCE),
            Variable::Inline(inner) => self
                .token(inner, expected, true, depth + 1)
                .within(REFERENCE),
        }
    }

    fn multitype(&self, tags: &[&'static str], token: &Value, depth: usize) -> Verdict {
        let Tagged { tag, payload } = Tagged::decode(token)?;
        let tag = tag
            .filter(|tag| tags.iter().any(|allowed| allowed == tag))
            .ok_or_else(|| {
                tracing::trace!(?tag, allowed = ?tags, "tag not allowed");
                Invalid::new(ErrorCode::TypeNotAllowed)
            })?;
        self.token(payload, tag, false, depth + 1).within(PAYLOAD)
    }

    fn object(&self, fields: &[FieldSpec], token: &Value, depth: usize) -> Verdict {
        let keys: Vec<&str> = fields.iter().map(|f| f.key).collect();
        let map = node::expect_keys(token, &keys)?;
        for spec in fields {
            let value = node::field(map, spec.key)?;
            if spec.is_list {
                self.list(spec, value, depth)?;
            } else {
                self.token(value, spec.expected_type, false, depth + 1)
                    .within(spec.key)?;
            }
        }
        Ok(())
    }

    fn list(&self, spec: &FieldSpec, value: &Value, depth: usize) -> Verdict {
        let Value::Array(items) = value else {
            tracing::trace!(key = spec.key, "expected a list");
            return Err(Invalid::new(ErrorCode::InvalidList).within(spec.key));
        };
        for (index, item) in items.iter().enumerate() {
            self.token(item, spec.expected_type, false, depth + 1)
                .within_index(spec.key, index)?;
        }
        Ok(())
    }
}
