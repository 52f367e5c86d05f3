//! Reading input files into rows

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::format::InputFormat;

/// Keys a tab-separated line is exposed under
pub const TSV_SOURCE_KEY: &str = "complex";
pub const TSV_REFERENCES_KEY: &str = "simple";

/// Error type for input loading
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Missing field `{field}` on line {line}")]
    MissingField { field: String, line: usize },

    #[error("Field `{field}` on line {line} must be {expected}")]
    FieldType {
        field: String,
        line: usize,
        expected: &'static str,
    },

    #[error("Field `{field}` requested from a plain text file; use .jsonl or .tsv input")]
    NotStructured { field: String },

    #[error("{}: {source}", .path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<LoadError>,
    },
}

impl LoadError {
    fn in_file(self, path: &Path) -> Self {
        match self {
            LoadError::InFile { .. } => self,
            other => LoadError::InFile {
                path: path.to_path_buf(),
                source: Box::new(other),
            },
        }
    }
}

/// Payload of a parsed line
#[derive(Debug, Clone, PartialEq)]
pub enum RowContent {
    Text(String),
    Record(Map<String, Value>),
}

/// One non-empty line of an input file
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// 1-based line number in the file
    pub line: usize,
    pub content: RowContent,
}

impl Row {
    fn field(&self, field: &str) -> Result<&Value, LoadError> {
        match &self.content {
            RowContent::Record(map) => map.get(field).ok_or_else(|| LoadError::MissingField {
                field: field.to_string(),
                line: self.line,
            }),
            RowContent::Text(_) => Err(LoadError::NotStructured {
                field: field.to_string(),
            }),
        }
    }

    /// A string-valued field
    pub fn text_field(&self, field: &str) -> Result<String, LoadError> {
        match self.field(field)? {
            Value::String(s) => Ok(s.clone()),
            _ => Err(LoadError::FieldType {
                field: field.to_string(),
                line: self.line,
                expected: "a string",
            }),
        }
    }

    /// A reference field: one string, or a list of strings
    pub fn reference_field(&self, field: &str) -> Result<Vec<String>, LoadError> {
        let type_error = || LoadError::FieldType {
            field: field.to_string(),
            line: self.line,
            expected: "a string or a list of strings",
        };

        match self.field(field)? {
            Value::String(s) => Ok(vec![s.clone()]),
            Value::Array(items) => items
                .iter()
                .map(|v| v.as_str().map(String::from).ok_or_else(type_error))
                .collect(),
            _ => Err(type_error()),
        }
    }
}

/// A fully materialized input file
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub format: InputFormat,
    pub rows: Vec<Row>,
}

impl Document {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Raw lines for plain text, `field` for structured rows
    pub fn texts(&self, field: &str) -> Result<Vec<String>, LoadError> {
        self.collect(|row| match &row.content {
            RowContent::Text(line) => Ok(line.clone()),
            RowContent::Record(_) => row.text_field(field),
        })
    }

    /// One single-reference set per plain text line, `field` for structured rows
    pub fn reference_sets(&self, field: &str) -> Result<Vec<Vec<String>>, LoadError> {
        self.collect(|row| match &row.content {
            RowContent::Text(line) => Ok(vec![line.clone()]),
            RowContent::Record(_) => row.reference_field(field),
        })
    }

    /// `field` from every row; plain text files are rejected
    pub fn field_texts(&self, field: &str) -> Result<Vec<String>, LoadError> {
        self.collect(|row| row.text_field(field))
    }

    /// Reference list under `field` from every row; plain text files are rejected
    pub fn field_references(&self, field: &str) -> Result<Vec<Vec<String>>, LoadError> {
        self.collect(|row| row.reference_field(field))
    }

    fn collect<T>(&self, f: impl Fn(&Row) -> Result<T, LoadError>) -> Result<Vec<T>, LoadError> {
        self.rows
            .iter()
            .map(f)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.in_file(&self.path))
    }
}

/// Read and parse a file, dispatching on its extension
pub fn read_document(path: impl AsRef<Path>) -> Result<Document, LoadError> {
    let path = path.as_ref();
    let format = InputFormat::from_path(path);
    let content = std::fs::read_to_string(path).map_err(|e| LoadError::from(e).in_file(path))?;
    let rows = parse_rows(&content, format).map_err(|e| e.in_file(path))?;

    tracing::debug!("Read {} {} rows from {}", rows.len(), format, path.display());

    Ok(Document {
        path: path.to_path_buf(),
        format,
        rows,
    })
}

/// Parse file content according to `format`
pub fn parse_rows(content: &str, format: InputFormat) -> Result<Vec<Row>, LoadError> {
    match format {
        InputFormat::PlainText => Ok(parse_plain_text(content)),
        InputFormat::TabSeparated => Ok(parse_tab_separated(content)),
        InputFormat::RecordStream => parse_record_stream(content),
    }
}

fn non_empty_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

/// One row per trimmed non-empty line
pub fn parse_plain_text(content: &str) -> Vec<Row> {
    non_empty_lines(content)
        .map(|(line, text)| Row {
            line,
            content: RowContent::Text(text.to_string()),
        })
        .collect()
}

/// Column 0 becomes the source, remaining columns the references
pub fn parse_tab_separated(content: &str) -> Vec<Row> {
    non_empty_lines(content)
        .map(|(line, text)| {
            let mut columns = text.split('\t');
            let source = columns.next().unwrap_or_default().to_string();
            let references: Vec<Value> = columns.map(|c| Value::String(c.to_string())).collect();

            let mut record = Map::new();
            record.insert(TSV_SOURCE_KEY.to_string(), Value::String(source));
            record.insert(TSV_REFERENCES_KEY.to_string(), Value::Array(references));

            Row {
                line,
                content: RowContent::Record(record),
            }
        })
        .collect()
}

/// One JSON object per non-empty line
pub fn parse_record_stream(content: &str) -> Result<Vec<Row>, LoadError> {
    non_empty_lines(content)
        .map(|(line, text)| match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(record)) => Ok(Row {
                line,
                content: RowContent::Record(record),
            }),
            Ok(other) => Err(LoadError::Parse {
                line,
                message: format!("expected a JSON object, found {}", json_kind(&other)),
            }),
            Err(e) => Err(LoadError::Parse {
                line,
                message: e.to_string(),
            }),
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
