//! Free-variable analysis of parsed expressions
//!
//! An identifier is reported when it is read by the expression, is not a
//! built-in, and is not bound by an enclosing function literal.

pub mod free_vars;

pub use free_vars::{FreeVariableCollector, IdentifierSet};

use crate::core::constants::{self, EXPRESSION_FIELD_TYPE};
use crate::error::Result;
use crate::frontend::{self, ast::Expr};

/// Knobs layered on top of the built-in tables. The constant tables are
/// always in effect; these only add to them.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerOptions {
    /// Names treated as built-ins in addition to the constant table
    pub extra_builtins: Vec<String>,
    /// Schema types whose `content` holds an expression
    pub expression_types: Vec<String>,
    /// Schema types that never supply a value, in addition to the shapes
    pub extra_static_types: Vec<String>,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            extra_builtins: Vec::new(),
            expression_types: vec![EXPRESSION_FIELD_TYPE.to_string()],
            extra_static_types: Vec::new(),
        }
    }
}

impl AnalyzerOptions {
    pub fn is_builtin(&self, name: &str) -> bool {
        constants::is_builtin(name) || self.extra_builtins.iter().any(|b| b == name)
    }

    pub fn is_expression_type(&self, schema_type: &str) -> bool {
        self.expression_types.iter().any(|t| t == schema_type)
    }

    pub fn is_static_type(&self, schema_type: &str) -> bool {
        constants::is_static_type(schema_type)
            || self.extra_static_types.iter().any(|t| t == schema_type)
    }
}

/// Free variables of a parsed expression, sorted ascending
pub fn extract_free_variables(expr: &Expr) -> Vec<String> {
    collect(expr, &AnalyzerOptions::default()).into_iter().collect()
}

/// Run the collector over one tree
pub fn collect(expr: &Expr, options: &AnalyzerOptions) -> IdentifierSet {
    let mut collector = FreeVariableCollector::new(options);
    collector.visit(expr);
    collector.finish()
}

/// Strip delimiters, parse and analyze one expression. Empty content has no
/// variables; a parse failure is returned to the caller.
pub fn analyze_expression(expression: &str, options: &AnalyzerOptions) -> Result<IdentifierSet> {
    let source = frontend::strip_delimiters(expression);
    if source.trim().is_empty() {
        return Ok(IdentifierSet::new());
    }

    let expr = frontend::parse(source)?;
    let variables = collect(&expr, options);
    log::debug!("'{}' reads {:?}", source, variables);
    Ok(variables)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = AnalyzerOptions::default();
        assert!(options.is_expression_type("expressionField"));
        assert!(!options.is_expression_type("text"));
        assert!(options.is_static_type("line"));
        assert!(options.is_builtin("Math"));
        assert!(!options.is_builtin("price"));
    }

    #[test]
    fn test_extra_tables_extend_constants() {
        let options = AnalyzerOptions {
            extra_builtins: vec!["locale".to_string()],
            expression_types: vec!["formula".to_string()],
            extra_static_types: vec!["qrcode".to_string()],
        };
        assert!(options.is_builtin("locale"));
        assert!(options.is_builtin("Math"));
        assert!(options.is_static_type("qrcode"));
        assert!(options.is_static_type("ellipse"));
        assert!(options.is_expression_type("formula"));
        assert!(!options.is_expression_type("expressionField"));
    }

    #[test]
    fn test_analyze_expression_strips_delimiters() {
        let options = AnalyzerOptions::default();
        let vars = analyze_expression("{ total }", &options).unwrap();
        assert_eq!(vars.into_iter().collect::<Vec<_>>(), vec!["total"]);
    }

    #[test]
    fn test_analyze_empty_expression() {
        let options = AnalyzerOptions::default();
        assert!(analyze_expression("", &options).unwrap().is_empty());
        assert!(analyze_expression("  {  } ", &options).unwrap().is_empty());
    }

    #[test]
    fn test_analyze_reports_parse_failure() {
        let options = AnalyzerOptions::default();
        assert!(analyze_expression("{price *}", &options).is_err());
    }
}
