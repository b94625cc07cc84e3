use serde::Serialize;

// A pixel coordinate pair (x, y)
pub type Point = (f64, f64);

/// Canonical output for one (image, class) cell, in encounter order.
pub type PolygonList = Vec<Polygon>;

// A dense numeric matrix stored row-major, as read from a raw point array
#[derive(Debug, Clone, PartialEq)]
pub struct PointMatrix {
    pub rows: usize,
    pub cols: usize,
    pub values: Vec<f64>,
}

impl PointMatrix {
    pub fn new(rows: usize, cols: usize, values: Vec<f64>) -> Self {
        debug_assert_eq!(rows * cols, values.len());
        Self { rows, cols, values }
    }

    /// Build an N×2 matrix from a list of points.
    pub fn from_points(points: &[Point]) -> Self {
        let values = points.iter().flat_map(|&(x, y)| [x, y]).collect();
        Self::new(points.len(), 2, values)
    }

    /// Build an N×2 matrix by zipping x and y coordinate vectors.
    pub fn from_xy(xs: &[f64], ys: &[f64]) -> Self {
        let values = xs.iter().zip(ys).flat_map(|(&x, &y)| [x, y]).collect();
        Self::new(xs.len().min(ys.len()), 2, values)
    }

    pub fn row(&self, index: usize) -> &[f64] {
        &self.values[index * self.cols..(index + 1) * self.cols]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.rows).map(move |i| self.row(i))
    }
}

/// A polygon: at least three finite points, boundary order preserved.
///
/// The only way to obtain one is [`crate::normalize::polygon_from_points`],
/// which applies the validity filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Polygon(pub(crate) Vec<Point>);

impl Polygon {
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// A region that may have holes; contours are separated by non-finite rows in `vertices`
#[derive(Debug, Clone, PartialEq)]
pub struct Polyshape {
    pub vertices: Option<PointMatrix>,
}

/// An ROI-style record with optional `Position` and `Vertices` attributes.
///
/// Absence of an attribute is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoiRecord {
    pub position: Option<PointMatrix>,
    pub vertices: Option<PointMatrix>,
}

/// Zero, one or many regions of interest for one (image, class) pair.
#[derive(Debug, Clone, PartialEq)]
pub enum PolygonEntry {
    Empty,
    List(Vec<PolygonEntry>),
    BoundaryShape(Polyshape),
    PointArray(PointMatrix),
    Record(RoiRecord),
    /// Any shape the classifier does not recognise.
    Unsupported,
}

// The flat, self-describing export container
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatDataset {
    pub image_files: Vec<String>,
    pub label_names: Vec<String>,
    pub label_polys: Vec<Vec<PolygonList>>,
}

impl FlatDataset {
    /// (N, C): number of images and number of label columns.
    pub fn dims(&self) -> (usize, usize) {
        (self.image_files.len(), self.label_names.len())
    }

    pub fn polygon_count(&self) -> usize {
        self.label_polys
            .iter()
            .flat_map(|row| row.iter())
            .map(|cell| cell.len())
            .sum()
    }
}

// Statistics collected while exporting YOLO label files
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub labels_written: usize,
    pub empty_labels: usize,
    pub skipped_missing_image: usize,
    pub failed_images: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print_summary(&self) {
        log::info!("=== Processing Summary ===");
        log::info!("Label files written: {}", self.labels_written);
        log::info!("Empty label files: {}", self.empty_labels);
        log::info!("Failed images: {}", self.failed_images);

        if self.skipped_missing_image > 0 {
            log::warn!(
                "Skipped images (file not found): {}",
                self.skipped_missing_image
            );
        }
    }
}
