//! Ground truth to flat polygon dataset converter
//!
//! This library normalizes polymorphic polygon annotations into a flat
//! imageFiles/labelNames/labelPolys container, and converts that container
//! into YOLO segmentation labels.

pub mod classify;
pub mod config;
pub mod error;
pub mod flat;
pub mod ground_truth;
pub mod normalize;
pub mod types;
pub mod utils;
pub mod yolo;

// Re-export commonly used types and functions
pub use config::{ExportArgs, FilterArgs, YoloArgs};
pub use error::ExportError;
pub use flat::{build_flat_dataset, read_flat_dataset, write_flat_dataset};
pub use ground_truth::{load_ground_truth, GroundTruth};
pub use normalize::{is_valid_points, normalize};
pub use types::{FlatDataset, Point, PointMatrix, Polygon, PolygonEntry, PolygonList};
pub use yolo::{create_data_yaml, export_yolo_labels};
