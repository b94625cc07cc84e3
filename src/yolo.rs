use indicatif::ProgressBar;
use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::YoloArgs;
use crate::types::{FlatDataset, Polygon, PolygonList, ProcessingStats};
use crate::utils::ensure_output_directory;

// Outcome of writing one image's label file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelOutcome {
    Written { empty: bool },
    MissingImage,
    Failed,
}

/// Write one YOLO segmentation label file per image, in parallel.
pub fn export_yolo_labels(
    dataset: &FlatDataset,
    args: &YoloArgs,
    pb: &ProgressBar,
) -> std::io::Result<ProcessingStats> {
    let labels_dir = ensure_output_directory(&args.labels_out)?;

    let outcomes: Vec<LabelOutcome> = dataset
        .image_files
        .par_iter()
        .zip(dataset.label_polys.par_iter())
        .map(|(image_file, row)| {
            let outcome = process_image(image_file, row, &labels_dir, args.image_root.as_deref());
            pb.inc(1);
            outcome
        })
        .collect();

    let mut stats = ProcessingStats::new();
    for outcome in outcomes {
        match outcome {
            LabelOutcome::Written { empty } => {
                stats.labels_written += 1;
                if empty {
                    stats.empty_labels += 1;
                }
            }
            LabelOutcome::MissingImage => stats.skipped_missing_image += 1,
            LabelOutcome::Failed => stats.failed_images += 1,
        }
    }
    Ok(stats)
}

fn process_image(
    image_file: &str,
    row: &[PolygonList],
    labels_dir: &Path,
    image_root: Option<&Path>,
) -> LabelOutcome {
    let image_path = resolve_image_path(image_file, image_root);
    if !image_path.is_file() {
        return LabelOutcome::MissingImage;
    }

    let (width, height) = match image::image_dimensions(&image_path) {
        Ok((0, _)) | Ok((_, 0)) => {
            warn!("Image has zero size: {}", image_path.display());
            return LabelOutcome::Failed;
        }
        Ok(dims) => dims,
        Err(e) => {
            warn!("Failed to read image size ({}): {}", image_path.display(), e);
            return LabelOutcome::Failed;
        }
    };

    let lines = convert_to_yolo_lines(row, width, height);
    match write_label_file(&image_path, labels_dir, &lines) {
        Ok(()) => LabelOutcome::Written {
            empty: lines.is_empty(),
        },
        Err(e) => {
            warn!(
                "Failed to write label file for {}: {}",
                image_path.display(),
                e
            );
            LabelOutcome::Failed
        }
    }
}

/// Resolve an image identifier, joining relative paths onto `image_root` when given.
pub fn resolve_image_path(image_file: &str, image_root: Option<&Path>) -> PathBuf {
    let path = PathBuf::from(image_file);
    match image_root {
        Some(root) if path.is_relative() => root.join(path),
        _ => path,
    }
}

fn write_label_file(image_path: &Path, labels_dir: &Path, lines: &[String]) -> std::io::Result<()> {
    let stem = image_path
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    // Stems may contain dots; they stay part of the file name
    let label_path = labels_dir.join(format!("{}.txt", sanitize_filename::sanitize(stem.as_ref())));

    let mut writer = BufWriter::new(File::create(label_path)?);
    for line in lines {
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

/// Convert one image row into YOLO lines; the class id is the column index.
pub fn convert_to_yolo_lines(row: &[PolygonList], width: u32, height: u32) -> Vec<String> {
    row.iter()
        .enumerate()
        .flat_map(|(class_id, polygons)| {
            polygons
                .iter()
                .map(move |polygon| format_polygon_line(class_id, polygon, width, height))
        })
        .collect()
}

/// Format one polygon: coordinates clipped to [1, W] x [1, H], then normalized.
pub fn format_polygon_line(class_id: usize, polygon: &Polygon, width: u32, height: u32) -> String {
    let (w, h) = (width as f64, height as f64);
    let mut line = String::with_capacity(polygon.len() * 20 + 4);
    line.push_str(&class_id.to_string());
    for &(x, y) in polygon.points() {
        let x_norm = x.max(1.0).min(w) / w;
        let y_norm = y.max(1.0).min(h) / h;
        line.push_str(&format!(" {:.6} {:.6}", x_norm, y_norm));
    }
    line
}

#[derive(Debug, Serialize)]
struct DataYaml<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    train: &'a str,
    val: &'a str,
    names: BTreeMap<usize, &'a str>,
}

/// Create the data.yaml file describing the label set
pub fn create_data_yaml(args: &YoloArgs, label_names: &[String]) -> std::io::Result<()> {
    if let Some(parent) = args.yaml_out.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_output_directory(parent)?;
        }
    }

    let content = data_yaml_content(args, label_names)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    let mut data_yaml = BufWriter::new(File::create(&args.yaml_out)?);
    data_yaml.write_all(content.as_bytes())?;
    data_yaml.flush()?;
    info!("Wrote {}", args.yaml_out.display());
    Ok(())
}

/// Render data.yaml; label names are quoted wherever YAML would misread them.
pub fn data_yaml_content(args: &YoloArgs, label_names: &[String]) -> serde_yaml::Result<String> {
    let data = DataYaml {
        path: (!args.dataset_root.is_empty()).then(|| args.dataset_root.replace('\\', "/")),
        train: &args.train_rel,
        val: &args.val_rel,
        names: label_names
            .iter()
            .enumerate()
            .map(|(id, label)| (id, label.as_str()))
            .collect(),
    };
    serde_yaml::to_string(&data)
}
