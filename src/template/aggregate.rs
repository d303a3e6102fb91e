//! Union of free variables across a template's expression fields

use crate::analysis::{analyze_expression, AnalyzerOptions, IdentifierSet};
use crate::template::schema::SchemaDescriptor;
use serde::Serialize;

/// An expression field whose content failed to parse
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionDiagnostic {
    pub schema_name: String,
    pub expression: String,
    pub error: String,
}

/// Result of scanning every expression field of a schema list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    /// Sorted, de-duplicated free variables
    pub variables: Vec<String>,
    pub diagnostics: Vec<ExpressionDiagnostic>,
    /// Expression fields with non-empty content
    pub expression_count: usize,
}

/// The expression source of an expression-bearing schema, if it has any
pub fn expression_content<'a>(
    schema: &'a SchemaDescriptor,
    options: &AnalyzerOptions,
) -> Option<&'a str> {
    if !options.is_expression_type(&schema.schema_type) {
        return None;
    }
    schema.content.as_deref().filter(|content| !content.is_empty())
}

pub fn extract_all_variables_with_diagnostics(
    schemas: &[SchemaDescriptor],
    options: &AnalyzerOptions,
) -> Aggregation {
    let mut variables = IdentifierSet::new();
    let mut diagnostics = Vec::new();
    let mut expression_count = 0;

    for schema in schemas {
        let content = match expression_content(schema, options) {
            Some(content) => content,
            None => continue,
        };
        expression_count += 1;

        match analyze_expression(content, options) {
            Ok(found) => variables.extend(found),
            Err(e) => {
                log::warn!(
                    "Expression in '{}' contributes no variables: {}",
                    schema.label(),
                    e
                );
                diagnostics.push(ExpressionDiagnostic {
                    schema_name: schema.label(),
                    expression: content.to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    log::debug!(
        "Scanned {} expression fields: {} variables, {} failures",
        expression_count,
        variables.len(),
        diagnostics.len()
    );

    Aggregation {
        variables: variables.into_iter().collect(),
        diagnostics,
        expression_count,
    }
}

/// Sorted union of the free variables of every expression field.
/// Fields that fail to parse contribute nothing.
pub fn extract_all_variables(schemas: &[SchemaDescriptor], options: &AnalyzerOptions) -> Vec<String> {
    extract_all_variables_with_diagnostics(schemas, options).variables
}

/// Free variables of one delimited expression; empty when it fails to parse
pub fn extract_variables(expression: &str, options: &AnalyzerOptions) -> Vec<String> {
    match analyze_expression(expression, options) {
        Ok(variables) => variables.into_iter().collect(),
        Err(e) => {
            log::warn!("Expression '{}' contributes no variables: {}", expression, e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expression(content: &str) -> SchemaDescriptor {
        SchemaDescriptor::new("expressionField").with_content(content)
    }

    #[test]
    fn test_union_is_sorted() {
        let schemas = vec![
            expression("{qty * price}"),
            SchemaDescriptor::new("text").with_name("price"),
            expression("{ discount ?? 0 }"),
            expression("{price}"),
        ];
        let options = AnalyzerOptions::default();
        assert_eq!(
            extract_all_variables(&schemas, &options),
            vec!["discount", "price", "qty"]
        );
    }

    #[test]
    fn test_only_expression_types_are_scanned() {
        let schemas = vec![
            SchemaDescriptor::new("text").with_content("{ notAnExpression }"),
            expression(""),
            SchemaDescriptor::new("expressionField"),
        ];
        let aggregation = extract_all_variables_with_diagnostics(&schemas, &AnalyzerOptions::default());
        assert!(aggregation.variables.is_empty());
        assert_eq!(aggregation.expression_count, 0);
    }

    #[test]
    fn test_parse_failure_contributes_nothing() {
        let schemas = vec![
            expression("{price *}").with_name("broken"),
            expression("{tax}"),
        ];
        let aggregation = extract_all_variables_with_diagnostics(&schemas, &AnalyzerOptions::default());
        assert_eq!(aggregation.variables, vec!["tax"]);
        assert_eq!(aggregation.expression_count, 2);
        assert_eq!(aggregation.diagnostics.len(), 1);
        assert_eq!(aggregation.diagnostics[0].schema_name, "broken");
        assert_eq!(aggregation.diagnostics[0].expression, "{price *}");
    }

    #[test]
    fn test_custom_expression_types() {
        let options = AnalyzerOptions {
            expression_types: vec!["formula".to_string()],
            ..AnalyzerOptions::default()
        };
        let schemas = vec![
            SchemaDescriptor::new("formula").with_content("{a + b}"),
            expression("{c}"),
        ];
        assert_eq!(extract_all_variables(&schemas, &options), vec!["a", "b"]);
    }

    #[test]
    fn test_idempotent() {
        let schemas = vec![expression("{b + a}"), expression("{c[d]}")];
        let options = AnalyzerOptions::default();
        let first = extract_all_variables(&schemas, &options);
        let second = extract_all_variables(&schemas, &options);
        assert_eq!(first, second);
    }

    #[test]
    fn test_extract_variables() {
        let options = AnalyzerOptions::default();
        assert_eq!(extract_variables("{ total }", &options), vec!["total"]);
        assert!(extract_variables("{ ) }", &options).is_empty());
        assert!(extract_variables("", &options).is_empty());
    }
}
