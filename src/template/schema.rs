//! Template document model: schema descriptors grouped into pages

use crate::error::{Result, ScanError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// One field of a template page. Unknown keys in the document are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDescriptor {
    #[serde(rename = "type", default)]
    pub schema_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
}

impl SchemaDescriptor {
    pub fn new(schema_type: impl Into<String>) -> Self {
        Self {
            schema_type: schema_type.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = Some(read_only);
        self
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only.unwrap_or(false)
    }

    /// Name for messages; unnamed fields show their type instead
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("<unnamed {}>", self.schema_type),
        }
    }
}

/// One page of schemas. Current documents store a list; older ones store an
/// object keyed by field name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaPage {
    List(Vec<SchemaDescriptor>),
    Keyed(BTreeMap<String, SchemaDescriptor>),
}

impl SchemaPage {
    pub fn len(&self) -> usize {
        match self {
            SchemaPage::List(schemas) => schemas.len(),
            SchemaPage::Keyed(schemas) => schemas.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Descriptors in page order; a legacy key fills in a missing `name`
    pub fn descriptors(&self) -> Vec<SchemaDescriptor> {
        match self {
            SchemaPage::List(schemas) => schemas.clone(),
            SchemaPage::Keyed(schemas) => schemas
                .iter()
                .map(|(key, schema)| {
                    let mut schema = schema.clone();
                    if schema.name.is_none() {
                        schema.name = Some(key.clone());
                    }
                    schema
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Template {
    #[serde(default)]
    pub schemas: Vec<SchemaPage>,
}

impl Template {
    /// Single-page template from a list of descriptors
    pub fn from_schemas(schemas: Vec<SchemaDescriptor>) -> Self {
        Self {
            schemas: vec![SchemaPage::List(schemas)],
        }
    }

    /// Parse a template document. A bare array is read as one page of schemas.
    pub fn from_json(source: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(source).map_err(|e| ScanError::InvalidFormat {
                message: format!("Invalid template JSON: {}", e),
            })?;

        let template = if value.is_array() {
            serde_json::from_value::<Vec<SchemaDescriptor>>(value).map(Self::from_schemas)
        } else {
            serde_json::from_value::<Template>(value)
        };

        template.map_err(|e| ScanError::InvalidFormat {
            message: format!("Invalid template structure: {}", e),
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| ScanError::FileNotFound {
            path: format!("Template file {}: {}", path.display(), e),
        })?;

        let template = Self::from_json(&source).map_err(|e| match e {
            ScanError::InvalidFormat { message } => {
                ScanError::template(path.display().to_string(), message)
            }
            other => other,
        })?;

        log::info!(
            "Loaded template {} ({} pages, {} schemas)",
            path.display(),
            template.schemas.len(),
            template.schema_count()
        );
        Ok(template)
    }

    /// Every descriptor of every page, in page order
    pub fn flatten(&self) -> Vec<SchemaDescriptor> {
        self.schemas.iter().flat_map(SchemaPage::descriptors).collect()
    }

    pub fn schema_count(&self) -> usize {
        self.schemas.iter().map(SchemaPage::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_descriptor_from_json() {
        let schema: SchemaDescriptor = serde_json::from_str(
            r#"{"type":"text","name":"price","readOnly":true,"position":{"x":0,"y":0}}"#,
        )
        .unwrap();
        assert_eq!(schema.schema_type, "text");
        assert_eq!(schema.name.as_deref(), Some("price"));
        assert!(schema.is_read_only());
        assert!(schema.content.is_none());
    }

    #[test]
    fn test_template_with_list_pages() {
        let template = Template::from_json(
            r#"{
                "basePdf": "BLANK_PDF",
                "schemas": [
                    [{"type":"text","name":"price"}],
                    [{"type":"expressionField","name":"total","content":"{price*qty}"}]
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(template.schemas.len(), 2);
        let flat = template.flatten();
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[1].content.as_deref(), Some("{price*qty}"));
    }

    #[test]
    fn test_legacy_keyed_page_supplies_names() {
        let template = Template::from_json(
            r#"{"schemas":[{"customer":{"type":"text"},"total":{"type":"expressionField","content":"{a}"}}]}"#,
        )
        .unwrap();
        let flat = template.flatten();
        let names: Vec<_> = flat.iter().filter_map(|s| s.name.clone()).collect();
        assert_eq!(names, vec!["customer", "total"]);
    }

    #[test]
    fn test_bare_schema_array() {
        let template = Template::from_json(r#"[{"type":"text","name":"a"},{"type":"line"}]"#).unwrap();
        assert_eq!(template.schema_count(), 2);
        assert_eq!(template.flatten()[1].label(), "<unnamed line>");
    }

    #[test]
    fn test_invalid_json() {
        let err = Template::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ScanError::InvalidFormat { .. }));

        let err = Template::from_json(r#"{"schemas": 7}"#).unwrap_err();
        assert!(matches!(err, ScanError::InvalidFormat { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"schemas":[[{{"type":"text","name":"x"}}]]}}"#).unwrap();
        let template = Template::load(file.path()).unwrap();
        assert_eq!(template.flatten()[0].name.as_deref(), Some("x"));
    }

    #[test]
    fn test_load_reports_file_on_bad_content() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[1, 2").unwrap();
        let err = Template::load(file.path()).unwrap_err();
        assert!(matches!(err, ScanError::Template { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Template::load("/nonexistent/template.json").unwrap_err();
        assert!(matches!(err, ScanError::FileNotFound { .. }));
    }
}
