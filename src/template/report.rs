//! Required / provided / missing report for a whole template

use crate::analysis::AnalyzerOptions;
use crate::error::{Result, ScanError};
use crate::template::aggregate::{extract_all_variables_with_diagnostics, ExpressionDiagnostic};
use crate::template::fields::{available_field_names, categorize};
use crate::template::schema::{SchemaDescriptor, Template};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStats {
    pub schema_count: usize,
    pub expression_count: usize,
    pub failed_expressions: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableReport {
    pub required: Vec<String>,
    pub available: Vec<String>,
    pub provided: Vec<String>,
    pub missing: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<ExpressionDiagnostic>,
    pub stats: ReportStats,
}

impl VariableReport {
    /// Every required variable is supplied by a field
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

pub fn analyze_schemas(schemas: &[SchemaDescriptor], options: &AnalyzerOptions) -> VariableReport {
    let aggregation = extract_all_variables_with_diagnostics(schemas, options);
    let available = available_field_names(schemas, options);
    let categorized = categorize(&aggregation.variables, &available);

    VariableReport {
        stats: ReportStats {
            schema_count: schemas.len(),
            expression_count: aggregation.expression_count,
            failed_expressions: aggregation.diagnostics.len(),
        },
        required: aggregation.variables,
        available: available.into_iter().collect(),
        provided: categorized.provided,
        missing: categorized.missing,
        diagnostics: aggregation.diagnostics,
    }
}

pub fn analyze_template(template: &Template, options: &AnalyzerOptions) -> VariableReport {
    analyze_schemas(&template.flatten(), options)
}

/// Receives finished reports
pub trait ReportSink {
    fn write_report(&mut self, report: &VariableReport) -> Result<()>;
}

/// Human-readable listing
pub struct TextReportWriter<W: Write> {
    out: W,
}

impl<W: Write> TextReportWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for TextReportWriter<W> {
    fn write_report(&mut self, report: &VariableReport) -> Result<()> {
        writeln!(self.out, "Required variables ({}):", report.required.len())?;
        for name in &report.required {
            writeln!(self.out, "  {}", name)?;
        }
        writeln!(
            self.out,
            "Provided ({}): {}",
            report.provided.len(),
            report.provided.join(", ")
        )?;
        writeln!(
            self.out,
            "Missing ({}): {}",
            report.missing.len(),
            report.missing.join(", ")
        )?;

        if !report.diagnostics.is_empty() {
            writeln!(self.out, "Failed expressions ({}):", report.diagnostics.len())?;
            for diagnostic in &report.diagnostics {
                writeln!(
                    self.out,
                    "  {}: {} ({})",
                    diagnostic.schema_name, diagnostic.expression, diagnostic.error
                )?;
            }
        }

        writeln!(
            self.out,
            "Scanned {} schemas, {} expressions",
            report.stats.schema_count, report.stats.expression_count
        )?;
        Ok(())
    }
}

/// Pretty-printed JSON document
pub struct JsonReportWriter<W: Write> {
    out: W,
}

impl<W: Write> JsonReportWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for JsonReportWriter<W> {
    fn write_report(&mut self, report: &VariableReport) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.out, report)
            .map_err(|e| ScanError::Io(e.into()))?;
        writeln!(self.out)?;
        Ok(())
    }
}
