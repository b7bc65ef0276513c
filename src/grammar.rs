//! Grammar table for the tactile expression language.
//!
//! Pure data. Every type name maps to exactly one [`Rule`]: a primitive
//! pattern, an ordered list of object fields, or the tag set of a tagged union
//! (a "multitype"). The engine in [`crate::engine`] is the only interpreter of
//! this table, so adding a node type is an entry here and nothing else.
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

// ------------------------------- Names ----------------------------------- //

pub const ROOT_TYPE: &str = "program";

pub const STRING_LITERAL: &str = "string-literal";
pub const BOOL_LITERAL: &str = "bool-literal";
pub const INTEGER_LITERAL: &str = "integer-literal";
pub const DOMAIN_LITERAL: &str = "domain-literal";

/// Types that may be replaced by a variable-reference wrapper.
pub const VARIABLE_TYPES: [&str; 3] = ["function", "domain", "value"];

pub fn is_variable_type(type_name: &str) -> bool {
    VARIABLE_TYPES.contains(&type_name)
}

// ------------------------------- Rules ----------------------------------- //

#[derive(Debug)]
pub enum Rule {
    /// Whole textual form of the token must match `regex`.
    Primitive { pattern: &'static str, regex: Regex },
    /// Exact key set, fields validated in declaration order.
    Object(Vec<FieldSpec>),
    /// `{discriminator, payload}` where the discriminator is one of these tags.
    Multitype(Vec<&'static str>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub expected_type: &'static str,
    pub is_list: bool,
}

impl FieldSpec {
    const fn one(key: &'static str, expected_type: &'static str) -> Self {
        Self { key, expected_type, is_list: false }
    }
    const fn list(key: &'static str, expected_type: &'static str) -> Self {
        Self { key, expected_type, is_list: true }
    }
}

impl Rule {
    pub fn kind(&self) -> &'static str {
        match self {
            Rule::Primitive { .. } => "primitive",
            Rule::Object(_) => "object",
            Rule::Multitype(_) => "multitype",
        }
    }

    /// Every type name this rule hands control to.
    pub fn referenced_types(&self) -> Vec<&'static str> {
        match self {
            Rule::Primitive { .. } => Vec::new(),
            Rule::Object(fields) => fields.iter().map(|f| f.expected_type).collect(),
            Rule::Multitype(tags) => tags.clone(),
        }
    }
}

// ------------------------------- Table ----------------------------------- //

static GRAMMAR: Lazy<IndexMap<&'static str, Rule>> = Lazy::new(build_grammar);

fn primitive(pattern: &'static str) -> Rule {
    // anchored: the token must match in full, not contain a match
    let regex = Regex::new(&format!(r"\A(?:{pattern})\z"))
        .unwrap_or_else(|error| panic!("grammar pattern {pattern:?} does not compile: {error}"));
    Rule::Primitive { pattern, regex }
}

fn build_grammar() -> IndexMap<&'static str, Rule> {
    use self::FieldSpec as F;
    let mut g = IndexMap::new();

    g.insert(ROOT_TYPE, Rule::Object(vec![
        F::list("functions", "function-definition"),
    ]));
    g.insert("function-definition", Rule::Object(vec![
        F::one("id", STRING_LITERAL),
        F::one("function", "function"),
    ]));
    g.insert("function", Rule::Object(vec![
        F::one("name", STRING_LITERAL),
        F::one("description", STRING_LITERAL),
        F::list("domainParams", "domainParam"),
        F::list("valueParams", "valueParam"),
        F::one("domain", "domain"),
        F::one("body", "value"),
    ]));
    g.insert("domainParam", Rule::Object(vec![
        F::one("name", STRING_LITERAL),
        F::one("description", STRING_LITERAL),
    ]));
    g.insert("valueParam", Rule::Object(vec![
        F::one("name", STRING_LITERAL),
        F::one("description", STRING_LITERAL),
        F::one("domain", "domain"),
    ]));
    g.insert("function-signature", Rule::Object(vec![
        F::one("domain", "domain"),
        F::one("domainParamsCount", INTEGER_LITERAL),
        F::list("valueParamDomains", "domain"),
    ]));
    g.insert("application", Rule::Object(vec![
        F::one("function", "function"),
        F::list("valueArgs", "value"),
        F::list("domainArgs", "domain"),
    ]));
    // `condition` must be a bool at a later stage; structurally it is any value
    g.insert("ifelse", Rule::Object(vec![
        F::one("domain", "domain"),
        F::one("condition", "value"),
        F::one("if", "value"),
        F::one("else", "value"),
    ]));

    g.insert("domain", Rule::Multitype(vec![DOMAIN_LITERAL, "function-signature"]));
    g.insert("value", Rule::Multitype(vec![
        "application",
        "ifelse",
        "function",
        INTEGER_LITERAL,
        STRING_LITERAL,
        BOOL_LITERAL,
    ]));

    g.insert(STRING_LITERAL, primitive(r"(?s:.*)"));
    g.insert(BOOL_LITERAL, primitive(r"true|false"));
    g.insert(INTEGER_LITERAL, primitive(r"[0-9]+"));
    g.insert(DOMAIN_LITERAL, primitive(r"string|integer|bool|function"));

    g
}

pub fn rule_for(type_name: &str) -> Option<&'static Rule> {
    GRAMMAR.get(type_name)
}

/// All rules in declaration order.
pub fn rules() -> impl Iterator<Item = (&'static str, &'static Rule)> {
    GRAMMAR.iter().map(|(name, rule)| (*name, rule))
}

pub fn type_names() -> impl Iterator<Item = &'static str> {
    GRAMMAR.keys().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(type_name: &str, text: &str) -> bool {
        match rule_for(type_name) {
            Some(Rule::Primitive { regex, .. }) => regex.is_match(text),
            other => panic!("{type_name} is not primitive: {other:?}"),
        }
    }

    #[test]
    fn every_reachable_type_has_a_rule() {
        for (name, rule) in rules() {
            for referenced in rule.referenced_types() {
                assert!(rule_for(referenced).is_some(), "{name} refers to undefined type {referenced}");
            }
        }
        let expected = [
            "program", "function-definition", "function", "domainParam", "valueParam",
            "function-signature", "application", "ifelse", "domain", "value",
            "string-literal", "bool-literal", "integer-literal", "domain-literal",
        ];
        let names: Vec<_> = type_names().collect();
        assert_eq!(names.len(), expected.len());
        for name in expected {
            assert!(names.contains(&name), "missing rule for {name}");
        }
    }

    #[test]
    fn variable_types_are_not_primitive() {
        for name in VARIABLE_TYPES {
            assert_ne!(rule_for(name).map(Rule::kind), Some("primitive"));
        }
    }

    #[test]
    fn object_rules_are_non_empty() {
        for (name, rule) in rules() {
            if let Rule::Object(fields) = rule {
                assert!(!fields.is_empty(), "{name} declares no fields");
            }
        }
    }

    #[test]
    fn primitive_patterns_match_whole_token() {
        assert!(matches(INTEGER_LITERAL, "0"));
        assert!(matches(INTEGER_LITERAL, "1234"));
        assert!(!matches(INTEGER_LITERAL, "12a"));
        assert!(!matches(INTEGER_LITERAL, "-1"));
        assert!(!matches(INTEGER_LITERAL, ""));

        assert!(matches(BOOL_LITERAL, "true"));
        assert!(!matches(BOOL_LITERAL, "truest"));
        assert!(!matches(BOOL_LITERAL, "True"));

        assert!(matches(DOMAIN_LITERAL, "function"));
        assert!(!matches(DOMAIN_LITERAL, "other"));
        assert!(!matches(DOMAIN_LITERAL, "integers"));

        assert!(matches(STRING_LITERAL, ""));
        assert!(matches(STRING_LITERAL, "multi\nline"));
    }

    #[test]
    fn field_order_follows_declaration() {
        let Some(Rule::Object(fields)) = rule_for("function") else {
            panic!("function should be an object rule");
        };
        let keys: Vec<_> = fields.iter().map(|f| f.key).collect();
        assert_eq!(keys, ["name", "description", "domainParams", "valueParams", "domain", "body"]);
        assert!(fields[2].is_list);
        assert!(!fields[4].is_list);
    }
}
