//! Classification of untyped annotation values
//!
//! Cells arrive as dynamic JSON. This is the one place that inspects their
//! shape; everything downstream works on [`PolygonEntry`]. Unrecognised shapes
//! become [`PolygonEntry::Unsupported`].

use serde_json::{Map, Value};

use crate::types::{PointMatrix, PolygonEntry, Polyshape, RoiRecord};

const POLYSHAPE_CLASS: &str = "polyshape";

impl PolygonEntry {
    /// Classify a dynamic value into a polygon entry.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => PolygonEntry::Empty,
            Value::Bool(_) | Value::String(_) => PolygonEntry::Unsupported,
            Value::Number(_) => numeric_matrix(value)
                .map(PolygonEntry::PointArray)
                .unwrap_or(PolygonEntry::Unsupported),
            Value::Array(items) if items.is_empty() => PolygonEntry::Empty,
            Value::Array(items) => match numeric_matrix(value) {
                Some(matrix) => PolygonEntry::PointArray(matrix),
                None => PolygonEntry::List(items.iter().map(PolygonEntry::from_value).collect()),
            },
            Value::Object(fields) => classify_object(fields),
        }
    }
}

fn classify_object(fields: &Map<String, Value>) -> PolygonEntry {
    let is_polyshape = attribute(fields, "class")
        .and_then(Value::as_str)
        .is_some_and(|class| class.eq_ignore_ascii_case(POLYSHAPE_CLASS));
    if is_polyshape {
        return PolygonEntry::BoundaryShape(Polyshape {
            vertices: attribute(fields, "Vertices").and_then(numeric_matrix),
        });
    }

    let position = attribute(fields, "Position");
    let vertices = attribute(fields, "Vertices");
    if position.is_none() && vertices.is_none() {
        return PolygonEntry::Unsupported;
    }

    PolygonEntry::Record(RoiRecord {
        position: position.and_then(numeric_matrix),
        vertices: vertices.and_then(numeric_matrix),
    })
}

/// Look up an attribute by its exact name, falling back to the lowercase name.
pub fn attribute<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    fields
        .get(name)
        .or_else(|| fields.get(&name.to_ascii_lowercase()))
}

// JSON has no NaN; exporters write non-finite values as null
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Null => Some(f64::NAN),
        _ => None,
    }
}

/// Read a value as a dense numeric matrix.
///
/// A number is 1×1, a flat numeric array is 1×K and an array of equal-length
/// numeric arrays is rows×cols. Anything else is not a matrix.
pub fn numeric_matrix(value: &Value) -> Option<PointMatrix> {
    match value {
        Value::Number(_) => numeric(value).map(|v| PointMatrix::new(1, 1, vec![v])),
        Value::Array(items) if items.is_empty() => None,
        Value::Array(items) if items.iter().all(|item| !item.is_array()) => {
            let values = items.iter().map(numeric).collect::<Option<Vec<_>>>()?;
            Some(PointMatrix::new(1, values.len(), values))
        }
        Value::Array(rows) => {
            let cols = rows.first()?.as_array()?.len();
            let mut values = Vec::with_capacity(rows.len() * cols);
            for row in rows {
                let row = row.as_array()?;
                if row.len() != cols {
                    return None;
                }
                for cell in row {
                    values.push(numeric(cell)?);
                }
            }
            Some(PointMatrix::new(rows.len(), cols, values))
        }
        _ => None,
    }
}
