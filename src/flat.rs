//! Flat dataset construction, filtering and persistence
//!
//! The flat container has three fields: `imageFiles` (N strings), `labelNames`
//! (C strings) and `labelPolys` (N×C cells, each a list of polygons).

use indicatif::ProgressBar;
use log::debug;
use rayon::prelude::*;
use serde_json::Value;
use std::path::Path;

use crate::error::{ExportError, Result};
use crate::ground_truth::GroundTruth;
use crate::normalize::normalize;
use crate::types::{FlatDataset, PolygonEntry, PolygonList};
use crate::utils::{read_json, write_json_atomic};

const IMAGE_FILES: &str = "imageFiles";
const LABEL_NAMES: &str = "labelNames";
const LABEL_POLYS: &str = "labelPolys";

/// Normalize every cell of the ground truth grid, one row per parallel task.
///
/// Row order and column order are preserved.
pub fn build_flat_dataset(ground_truth: &GroundTruth, pb: &ProgressBar) -> FlatDataset {
    let label_polys: Vec<Vec<PolygonList>> = ground_truth
        .label_data
        .par_iter()
        .map(|row| {
            let cells = normalize_row(row);
            pb.inc(1);
            cells
        })
        .collect();

    FlatDataset {
        image_files: ground_truth.image_files.clone(),
        label_names: ground_truth.label_names.clone(),
        label_polys,
    }
}

fn normalize_row(row: &[PolygonEntry]) -> Vec<PolygonList> {
    row.iter().map(normalize).collect()
}

impl FlatDataset {
    /// Whether any image has at least one polygon for label column `column`.
    pub fn label_has_polygons(&self, column: usize) -> bool {
        self.label_polys
            .iter()
            .any(|row| row.get(column).is_some_and(|cell| !cell.is_empty()))
    }

    /// Drop label columns that are empty in every image.
    ///
    /// Returns the dropped label names in column order. `label_names` and every
    /// row of `label_polys` stay index aligned.
    pub fn drop_empty_labels(&mut self) -> Vec<String> {
        let keep: Vec<bool> = (0..self.label_names.len())
            .map(|c| self.label_has_polygons(c))
            .collect();

        let mut dropped = Vec::new();
        let names = std::mem::take(&mut self.label_names);
        for (name, &kept) in names.into_iter().zip(&keep) {
            if kept {
                self.label_names.push(name);
            } else {
                dropped.push(name);
            }
        }

        for row in self.label_polys.iter_mut() {
            let cells = std::mem::take(row);
            *row = cells
                .into_iter()
                .zip(&keep)
                .filter_map(|(cell, &kept)| kept.then_some(cell))
                .collect();
        }

        debug!("Dropped {} empty label columns", dropped.len());
        dropped
    }

    /// Drop images that have no polygon in any label column.
    ///
    /// Returns how many images were removed.
    pub fn drop_empty_images(&mut self) -> usize {
        let before = self.image_files.len();
        let files = std::mem::take(&mut self.image_files);
        let rows = std::mem::take(&mut self.label_polys);
        for (file, row) in files.into_iter().zip(rows) {
            if row.iter().any(|cell| !cell.is_empty()) {
                self.image_files.push(file);
                self.label_polys.push(row);
            }
        }
        before - self.image_files.len()
    }
}

/// Write the flat container atomically.
pub fn write_flat_dataset(path: &Path, dataset: &FlatDataset) -> Result<()> {
    write_json_atomic(path, dataset)?;
    let (n, c) = dataset.dims();
    debug!("Wrote {} ({} images x {} labels)", path.display(), n, c);
    Ok(())
}

/// Read a flat container, checking its shape and re-normalizing every cell.
pub fn read_flat_dataset(path: &Path) -> Result<FlatDataset> {
    let document = read_json(path)?;
    parse_flat_dataset(&document)
}

/// Interpret a parsed flat container.
pub fn parse_flat_dataset(document: &Value) -> Result<FlatDataset> {
    let image_files = string_list(document, IMAGE_FILES)?;
    let label_names = string_list(document, LABEL_NAMES)?;

    let rows = document
        .get(LABEL_POLYS)
        .and_then(Value::as_array)
        .ok_or_else(|| ExportError::ShapeMismatch(format!("missing '{}' list", LABEL_POLYS)))?;

    if rows.len() != image_files.len() {
        return Err(ExportError::ShapeMismatch(format!(
            "{}={} vs {} rows={}",
            IMAGE_FILES,
            image_files.len(),
            LABEL_POLYS,
            rows.len()
        )));
    }

    let label_polys = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let cells = row.as_array().filter(|cells| cells.len() == label_names.len());
            cells
                .map(|cells| {
                    cells
                        .iter()
                        .map(|cell| normalize(&PolygonEntry::from_value(cell)))
                        .collect::<Vec<PolygonList>>()
                })
                .ok_or_else(|| {
                    ExportError::ShapeMismatch(format!(
                        "{} row {} does not have {} cells",
                        LABEL_POLYS,
                        index,
                        label_names.len()
                    ))
                })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(FlatDataset {
        image_files,
        label_names,
        label_polys,
    })
}

fn string_list(document: &Value, key: &str) -> Result<Vec<String>> {
    match document.get(key) {
        Some(Value::Array(items)) => Ok(items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()),
        Some(Value::String(item)) => Ok(vec![item.clone()]),
        _ => Err(ExportError::ShapeMismatch(format!("missing '{}' list", key))),
    }
}
