//! Template-level scanning: the schema model, aggregation across expression
//! fields, field availability and the variable report

pub mod aggregate;
pub mod fields;
pub mod report;
pub mod schema;

pub use aggregate::{
    expression_content, extract_all_variables, extract_all_variables_with_diagnostics,
    extract_variables, Aggregation, ExpressionDiagnostic,
};
pub use fields::{
    available_field_names, categorize, supplies_value, Categorized, FieldLinter, FieldWarning,
    FieldWarningKind,
};
pub use report::{
    analyze_schemas, analyze_template, JsonReportWriter, ReportSink, ReportStats,
    TextReportWriter, VariableReport,
};
pub use schema::{SchemaDescriptor, SchemaPage, Template};
