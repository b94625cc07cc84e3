use std::path::PathBuf;

/// Fatal errors: any of these aborts the run before output is written.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON ({path}): {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No ground truth object found in {path} (expected a value with DataSource, LabelDefinitions and LabelData)")]
    GroundTruthNotFound { path: PathBuf },

    #[error("Variable '{name}' in {path} is missing or is not a ground truth object")]
    VariableNotGroundTruth { path: PathBuf, name: String },

    #[error("Malformed ground truth: {0}")]
    MalformedGroundTruth(String),

    #[error("Mismatch: {images} image files vs {rows} label rows")]
    RowCountMismatch { images: usize, rows: usize },

    #[error("Malformed flat dataset: {0}")]
    ShapeMismatch(String),
}

pub type Result<T> = std::result::Result<T, ExportError>;
