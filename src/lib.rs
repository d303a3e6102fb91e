//! Template Expression Scanner
//!
//! Finds the input variables a PDF template's expression fields read, without
//! evaluating them. Expressions are ECMAScript 2021 expressions, usually
//! wrapped in `{ ... }`, such as `{Number(price) * quantity}`.
//!
//! # Basic Usage
//!
//! ```rust
//! use exprscan::{categorize, available_field_names, extract_all_variables, SchemaDescriptor};
//!
//! let schemas = vec![
//!     SchemaDescriptor::new("text").with_name("price"),
//!     SchemaDescriptor::new("expressionField").with_content("{price * qty}"),
//! ];
//! let required = extract_all_variables(&schemas);
//! let result = categorize(&required, &available_field_names(&schemas));
//! assert_eq!(result.provided, vec!["price"]);
//! assert_eq!(result.missing, vec!["qty"]);
//! ```
//!
//! # Pipeline
//!
//! 1. **Front end**: strip the `{ }` delimiters, lex and parse one expression
//! 2. **Analysis**: walk the tree with a scope stack and collect free names
//! 3. **Template**: union expression fields, resolve the names ordinary fields
//!    supply, and split the required set into provided and missing

pub mod analysis;
pub mod cli;
pub mod core;
pub mod error;
pub mod frontend;
pub mod template;

use std::collections::BTreeSet;

pub use analysis::{analyze_expression, AnalyzerOptions, FreeVariableCollector, IdentifierSet};
pub use error::{Result, ScanError};
pub use frontend::ast::Expr;
pub use frontend::strip_delimiters;
pub use template::{
    Aggregation, Categorized, ExpressionDiagnostic, FieldLinter, FieldWarning, JsonReportWriter,
    ReportSink, ReportStats, SchemaDescriptor, SchemaPage, Template, TextReportWriter,
    VariableReport,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Parse one expression from offset 0; trailing tokens are ignored
pub fn parse(expression: &str) -> Result<Expr> {
    frontend::parse(expression)
}

/// Free variables of a parsed expression, sorted ascending
pub fn extract_free_variables(expr: &Expr) -> Vec<String> {
    analysis::extract_free_variables(expr)
}

/// Free variables of one delimited expression; empty when it fails to parse
pub fn extract_variables(expression: &str) -> Vec<String> {
    template::extract_variables(expression, &AnalyzerOptions::default())
}

/// Sorted union of the free variables of every expression field
pub fn extract_all_variables(schemas: &[SchemaDescriptor]) -> Vec<String> {
    template::extract_all_variables(schemas, &AnalyzerOptions::default())
}

pub fn available_field_names(schemas: &[SchemaDescriptor]) -> BTreeSet<String> {
    template::available_field_names(schemas, &AnalyzerOptions::default())
}

pub fn categorize(required: &[String], available: &BTreeSet<String>) -> Categorized {
    template::categorize(required, available)
}

pub fn analyze_template(template: &Template, options: &AnalyzerOptions) -> VariableReport {
    template::analyze_template(template, options)
}
