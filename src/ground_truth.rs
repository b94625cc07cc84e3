//! Ground truth loading
//!
//! Finds the annotation object inside a loaded document and reads its image
//! list, label names and label grid. Cells are classified into
//! [`PolygonEntry`] values here and never inspected as JSON again.

use log::{debug, warn};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{ExportError, Result};
use crate::types::PolygonEntry;
use crate::utils::read_json;

const DATA_SOURCE: &str = "DataSource";
const LABEL_DEFINITIONS: &str = "LabelDefinitions";
const LABEL_DATA: &str = "LabelData";
const DEFAULT_VARIABLE: &str = "gTruth";

// The annotation object: image list, label columns and the N×C grid of entries
#[derive(Debug, Clone, PartialEq)]
pub struct GroundTruth {
    pub image_files: Vec<String>,
    pub label_names: Vec<String>,
    pub label_data: Vec<Vec<PolygonEntry>>,
}

impl GroundTruth {
    pub fn dims(&self) -> (usize, usize) {
        (self.image_files.len(), self.label_names.len())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringList {
    Many(Vec<String>),
    One(String),
}

impl From<StringList> for Vec<String> {
    fn from(list: StringList) -> Self {
        match list {
            StringList::Many(items) => items,
            StringList::One(item) => vec![item],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DataSource {
    Files(StringList),
    Source {
        #[serde(rename = "Source", alias = "Files")]
        source: StringList,
    },
}

#[derive(Debug, Deserialize)]
struct LabelDefinitionRow {
    #[serde(rename = "Name")]
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LabelDefinitions {
    Rows(Vec<LabelDefinitionRow>),
    Names(StringList),
    Columns {
        #[serde(rename = "Name")]
        name: StringList,
    },
}

/// Whether a value has the shape of a ground truth object.
pub fn is_ground_truth(value: &Value) -> bool {
    value.as_object().is_some_and(|fields| {
        fields.contains_key(DATA_SOURCE)
            && fields.contains_key(LABEL_DEFINITIONS)
            && fields.contains_key(LABEL_DATA)
    })
}

/// Locate the ground truth object inside a loaded document.
///
/// A named variable must exist and be a ground truth object. Without a name the
/// document itself, then `gTruth`, then the first matching top-level value is used.
pub fn locate_ground_truth<'a>(
    document: &'a Value,
    variable: Option<&str>,
    path: &Path,
) -> Result<&'a Value> {
    if let Some(name) = variable {
        return document
            .get(name)
            .filter(|value| is_ground_truth(value))
            .ok_or_else(|| ExportError::VariableNotGroundTruth {
                path: path.to_path_buf(),
                name: name.to_string(),
            });
    }

    if is_ground_truth(document) {
        return Ok(document);
    }

    let found = document.as_object().and_then(|fields| {
        fields
            .get(DEFAULT_VARIABLE)
            .filter(|value| is_ground_truth(value))
            .or_else(|| fields.values().find(|value| is_ground_truth(value)))
    });

    found.ok_or_else(|| ExportError::GroundTruthNotFound {
        path: path.to_path_buf(),
    })
}

/// Load a ground truth object from a JSON file.
pub fn load_ground_truth(path: &Path, variable: Option<&str>) -> Result<GroundTruth> {
    let document = read_json(path)?;
    let value = locate_ground_truth(&document, variable, path)?;
    parse_ground_truth(value)
}

/// Read image files, label names and the label grid of a ground truth object.
pub fn parse_ground_truth(value: &Value) -> Result<GroundTruth> {
    let fields = value
        .as_object()
        .ok_or_else(|| ExportError::MalformedGroundTruth("not an object".to_string()))?;

    let image_files: Vec<String> = match field::<DataSource>(fields, DATA_SOURCE)? {
        DataSource::Files(files) | DataSource::Source { source: files } => files.into(),
    };

    let label_names: Vec<String> = match field::<LabelDefinitions>(fields, LABEL_DEFINITIONS)? {
        LabelDefinitions::Rows(rows) => rows.into_iter().map(|row| row.name).collect(),
        LabelDefinitions::Names(names) | LabelDefinitions::Columns { name: names } => names.into(),
    };

    let raw_data = fields
        .get(LABEL_DATA)
        .ok_or_else(|| ExportError::MalformedGroundTruth(format!("missing {}", LABEL_DATA)))?;
    let label_data = read_label_data(raw_data, &label_names)?;

    if label_data.len() != image_files.len() {
        return Err(ExportError::RowCountMismatch {
            images: image_files.len(),
            rows: label_data.len(),
        });
    }

    debug!(
        "Ground truth has {} images and {} labels",
        image_files.len(),
        label_names.len()
    );

    Ok(GroundTruth {
        image_files,
        label_names,
        label_data,
    })
}

fn field<T: for<'de> Deserialize<'de>>(fields: &Map<String, Value>, name: &str) -> Result<T> {
    let value = fields
        .get(name)
        .ok_or_else(|| ExportError::MalformedGroundTruth(format!("missing {}", name)))?;
    T::deserialize(value)
        .map_err(|e| ExportError::MalformedGroundTruth(format!("unreadable {}: {}", name, e)))
}

// Positional rows, keyed rows, or an object of columns
fn read_label_data(data: &Value, label_names: &[String]) -> Result<Vec<Vec<PolygonEntry>>> {
    match data {
        Value::Array(rows) => rows
            .iter()
            .enumerate()
            .map(|(index, row)| match row {
                Value::Array(cells) => Ok(positional_row(index, cells, label_names.len())),
                Value::Object(cells) => Ok(keyed_row(index, cells, label_names)),
                _ => Err(ExportError::MalformedGroundTruth(format!(
                    "{} row {} is neither a list nor an object",
                    LABEL_DATA, index
                ))),
            })
            .collect(),
        Value::Object(columns) => read_columns(columns, label_names),
        _ => Err(ExportError::MalformedGroundTruth(format!(
            "{} must be a list of rows or an object of columns",
            LABEL_DATA
        ))),
    }
}

fn positional_row(index: usize, cells: &[Value], num_labels: usize) -> Vec<PolygonEntry> {
    if cells.len() != num_labels {
        warn!(
            "{} row {} has {} cells, expected {}",
            LABEL_DATA,
            index,
            cells.len(),
            num_labels
        );
    }
    (0..num_labels)
        .map(|c| {
            cells
                .get(c)
                .map(PolygonEntry::from_value)
                .unwrap_or(PolygonEntry::Empty)
        })
        .collect()
}

fn keyed_row(index: usize, cells: &Map<String, Value>, label_names: &[String]) -> Vec<PolygonEntry> {
    label_names
        .iter()
        .map(|name| match cells.get(name) {
            Some(value) => PolygonEntry::from_value(value),
            None => {
                warn!("{} row {} has no column '{}'", LABEL_DATA, index, name);
                PolygonEntry::Empty
            }
        })
        .collect()
}

fn read_columns(
    columns: &Map<String, Value>,
    label_names: &[String],
) -> Result<Vec<Vec<PolygonEntry>>> {
    let mut column_entries: Vec<Vec<PolygonEntry>> = Vec::with_capacity(label_names.len());
    for name in label_names {
        let entries: Vec<PolygonEntry> = match columns.get(name) {
            Some(Value::Array(cells)) => cells.iter().map(PolygonEntry::from_value).collect(),
            Some(_) => {
                return Err(ExportError::MalformedGroundTruth(format!(
                    "{} column '{}' is not a list",
                    LABEL_DATA, name
                )))
            }
            None => {
                warn!("{} has no column '{}'", LABEL_DATA, name);
                Vec::new()
            }
        };
        column_entries.push(entries);
    }

    let num_rows = column_entries.iter().map(Vec::len).max().unwrap_or(0);
    let mut rows: Vec<Vec<PolygonEntry>> = vec![Vec::with_capacity(label_names.len()); num_rows];
    for (c, entries) in column_entries.into_iter().enumerate() {
        if entries.len() < num_rows && !entries.is_empty() {
            warn!(
                "{} column '{}' has {} cells for {} rows; missing cells are empty",
                LABEL_DATA,
                label_names[c],
                entries.len(),
                num_rows
            );
        }
        let mut entries = entries.into_iter();
        for row in rows.iter_mut() {
            row.push(entries.next().unwrap_or(PolygonEntry::Empty));
        }
    }
    Ok(rows)
}
