//! Which names ordinary fields already supply, and how required variables
//! split against them

use crate::analysis::AnalyzerOptions;
use crate::frontend::lexer::is_keyword;
use crate::template::schema::SchemaDescriptor;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// True when the schema's `name` is a value the render engine binds
pub fn supplies_value(schema: &SchemaDescriptor, options: &AnalyzerOptions) -> bool {
    !schema.is_read_only()
        && !options.is_expression_type(&schema.schema_type)
        && !options.is_static_type(&schema.schema_type)
}

/// Names supplied by writable, non-expression, non-static fields
pub fn available_field_names(
    schemas: &[SchemaDescriptor],
    options: &AnalyzerOptions,
) -> BTreeSet<String> {
    schemas
        .iter()
        .filter(|schema| supplies_value(schema, options))
        .filter_map(|schema| schema.name.clone())
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Categorized {
    pub provided: Vec<String>,
    pub missing: Vec<String>,
}

/// Stable partition of `required` by membership in `available`
pub fn categorize(required: &[String], available: &BTreeSet<String>) -> Categorized {
    let (provided, missing) = required
        .iter()
        .cloned()
        .partition(|name| available.contains(name));

    Categorized { provided, missing }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldWarningKind {
    /// No expression can ever reference the name
    InvalidIdentifier,
    /// The name is a built-in, so expressions never report it as required
    ShadowsBuiltin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldWarning {
    pub field: String,
    pub kind: FieldWarningKind,
}

impl fmt::Display for FieldWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FieldWarningKind::InvalidIdentifier => write!(
                f,
                "field '{}' is not a valid identifier and cannot be used in expressions",
                self.field
            ),
            FieldWarningKind::ShadowsBuiltin => write!(
                f,
                "field '{}' has the name of a built-in and will never be reported as required",
                self.field
            ),
        }
    }
}

/// Checks the names of value-supplying fields
pub struct FieldLinter {
    identifier_regex: Regex,
}

impl FieldLinter {
    pub fn new() -> Self {
        Self {
            // Same character classes the expression lexer accepts
            identifier_regex: Regex::new(r"^[\p{Alphabetic}_$][\p{Alphabetic}\p{N}_$\x{200C}\x{200D}]*$")
                .expect("identifier pattern is valid"),
        }
    }

    pub fn is_valid_identifier(&self, name: &str) -> bool {
        self.identifier_regex.is_match(name) && !is_keyword(name)
    }

    pub fn lint(&self, schemas: &[SchemaDescriptor], options: &AnalyzerOptions) -> Vec<FieldWarning> {
        let mut warnings = Vec::new();

        for schema in schemas.iter().filter(|schema| supplies_value(schema, options)) {
            let name = match &schema.name {
                Some(name) => name,
                None => continue,
            };

            let kind = if !self.is_valid_identifier(name) {
                FieldWarningKind::InvalidIdentifier
            } else if options.is_builtin(name) {
                FieldWarningKind::ShadowsBuiltin
            } else {
                continue;
            };

            warnings.push(FieldWarning {
                field: name.clone(),
                kind,
            });
        }

        warnings
    }
}

impl Default for FieldLinter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::{Lexer, TokenType};

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_available_field_names() {
        let schemas = vec![
            SchemaDescriptor::new("text").with_name("price"),
            SchemaDescriptor::new("text").with_name("locked").with_read_only(true),
            SchemaDescriptor::new("text").with_name("editable").with_read_only(false),
            SchemaDescriptor::new("expressionField").with_name("total").with_content("{price}"),
            SchemaDescriptor::new("rectangle").with_name("box"),
            SchemaDescriptor::new("line").with_name("rule"),
            SchemaDescriptor::new("image"),
        ];
        let available = available_field_names(&schemas, &AnalyzerOptions::default());
        assert_eq!(available.into_iter().collect::<Vec<_>>(), vec!["editable", "price"]);
    }

    #[test]
    fn test_extra_static_types() {
        let options = AnalyzerOptions {
            extra_static_types: vec!["qrcode".to_string()],
            ..AnalyzerOptions::default()
        };
        let schemas = vec![SchemaDescriptor::new("qrcode").with_name("code")];
        assert!(available_field_names(&schemas, &options).is_empty());
    }

    #[test]
    fn test_categorize_preserves_order() {
        let available: BTreeSet<String> = names(&["c", "a"]).into_iter().collect();
        let result = categorize(&names(&["d", "c", "b", "a"]), &available);
        assert_eq!(result.provided, names(&["c", "a"]));
        assert_eq!(result.missing, names(&["d", "b"]));
    }

    #[test]
    fn test_categorize_partition_covers_input() {
        let available: BTreeSet<String> = names(&["x", "unused"]).into_iter().collect();
        let required = names(&["w", "x", "y"]);
        let result = categorize(&required, &available);

        let provided: BTreeSet<_> = result.provided.iter().collect();
        let missing: BTreeSet<_> = result.missing.iter().collect();
        assert!(provided.is_disjoint(&missing));
        let union: BTreeSet<_> = provided.union(&missing).cloned().collect();
        let expected: BTreeSet<_> = required.iter().collect();
        assert_eq!(union, expected);
    }

    #[test]
    fn test_categorize_empty() {
        let result = categorize(&[], &BTreeSet::new());
        assert!(result.provided.is_empty());
        assert!(result.missing.is_empty());
    }

    #[test]
    fn test_valid_identifiers() {
        let linter = FieldLinter::new();
        assert!(linter.is_valid_identifier("price"));
        assert!(linter.is_valid_identifier("$total_2"));
        assert!(linter.is_valid_identifier("größe"));
        assert!(!linter.is_valid_identifier("unit price"));
        assert!(!linter.is_valid_identifier("2nd"));
        assert!(!linter.is_valid_identifier("class"));
        assert!(!linter.is_valid_identifier(""));
    }

    #[test]
    fn test_identifier_check_matches_lexer() {
        let linter = FieldLinter::new();
        let names = [
            "price", "größe", "合計", "x\u{200c}y", "a²", "$_", "_1", "1a", "a-b", "a b", "null",
            "return", "async", "", "€",
        ];
        for name in names {
            let tokens: Vec<TokenType> = Lexer::new(name)
                .tokenize()
                .into_iter()
                .map(|token| token.token_type)
                .collect();
            let lexes_as_identifier =
                tokens == vec![TokenType::Identifier(name.to_string()), TokenType::Eof];
            assert_eq!(linter.is_valid_identifier(name), lexes_as_identifier, "{:?}", name);
        }
    }

    #[test]
    fn test_lint_field_names() {
        let schemas = vec![
            SchemaDescriptor::new("text").with_name("unit price"),
            SchemaDescriptor::new("text").with_name("date"),
            SchemaDescriptor::new("text").with_name("qty"),
            SchemaDescriptor::new("line").with_name("not checked"),
            SchemaDescriptor::new("text").with_name("Math").with_read_only(true),
        ];
        let warnings = FieldLinter::new().lint(&schemas, &AnalyzerOptions::default());
        assert_eq!(
            warnings,
            vec![
                FieldWarning {
                    field: "unit price".to_string(),
                    kind: FieldWarningKind::InvalidIdentifier,
                },
                FieldWarning {
                    field: "date".to_string(),
                    kind: FieldWarningKind::ShadowsBuiltin,
                },
            ]
        );
        assert!(warnings[1].to_string().contains("built-in"));
    }
}
