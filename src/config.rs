use clap::Parser;
use std::path::PathBuf;

/// Flatten a ground truth annotation object into imageFiles/labelNames/labelPolys.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct ExportArgs {
    /// JSON file holding the ground truth object
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Output path for the flat dataset
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// Name of the variable holding the ground truth object (searched for when omitted)
    #[arg(long = "variable")]
    pub variable: Option<String>,

    /// Drop label columns that have no polygon in any image
    #[arg(long = "drop_empty_labels")]
    pub drop_empty_labels: bool,

    /// Drop images that have no polygon in any label column
    #[arg(long = "drop_empty_images")]
    pub drop_empty_images: bool,
}

/// Remove images without polygons from an existing flat dataset.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct FilterArgs {
    /// Input flat dataset
    #[arg(long = "in_flat")]
    pub in_flat: PathBuf,

    /// Output path for the filtered flat dataset
    #[arg(long = "out_flat")]
    pub out_flat: PathBuf,

    /// Also drop label columns that have no polygon in any remaining image
    #[arg(long = "drop_empty_labels")]
    pub drop_empty_labels: bool,
}

/// Convert a flat dataset into YOLO segmentation labels and a data.yaml file.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct YoloArgs {
    /// Input flat dataset
    #[arg(long = "flat")]
    pub flat: PathBuf,

    /// Directory for the label files
    #[arg(long = "labels_out")]
    pub labels_out: PathBuf,

    /// Output path for data.yaml
    #[arg(long = "yaml_out")]
    pub yaml_out: PathBuf,

    /// Value for 'path:' in data.yaml (omitted when empty)
    #[arg(long = "dataset_root", default_value = "")]
    pub dataset_root: String,

    /// Train images path relative to the dataset root
    #[arg(long = "train_rel", default_value = "images/train", value_parser = validate_rel_path)]
    pub train_rel: String,

    /// Validation images path relative to the dataset root
    #[arg(long = "val_rel", default_value = "images/val", value_parser = validate_rel_path)]
    pub val_rel: String,

    /// Directory that relative image paths are resolved against
    #[arg(long = "image_root")]
    pub image_root: Option<PathBuf>,
}

// Validate that a data.yaml split path is a non-empty single line
pub fn validate_rel_path(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed.contains('\n') {
        Err("PATH must be a non-empty single line".to_string())
    } else {
        Ok(trimmed.to_string())
    }
}
