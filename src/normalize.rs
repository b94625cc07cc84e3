//! Polygon normalization
//!
//! Reduces an arbitrarily nested [`PolygonEntry`] to a flat, validated list of
//! polygons. The normalizer is total: any entry it cannot interpret contributes
//! no polygon instead of failing, so one bad cell never blocks an export.
//!
//! Input is assumed acyclic. Nesting deeper than [`MAX_NESTING_DEPTH`] fails the
//! whole cell closed.

use crate::types::{Point, PointMatrix, Polygon, PolygonEntry, PolygonList, Polyshape, RoiRecord};

/// Deepest list nesting accepted inside a single cell.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Minimum number of points for a polygon.
pub const MIN_POLYGON_POINTS: usize = 3;

/// Why a boundary trace could not be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BoundaryError {
    #[error("shape has no vertex matrix")]
    MissingVertices,
    #[error("vertex matrix has {0} columns, expected 2")]
    BadColumnCount(usize),
    #[error("vertex matrix holds {found} values for {rows} rows")]
    RaggedVertices { rows: usize, found: usize },
    #[error("shape has no contours")]
    NoContours,
    #[error("contour has {0} vertices, need at least 3")]
    DegenerateContour(usize),
}

#[derive(Debug)]
struct DepthExceeded;

/// Normalize one cell into its canonical polygon list.
pub fn normalize(entry: &PolygonEntry) -> PolygonList {
    let mut polygons = Vec::new();
    match collect(entry, 0, &mut polygons) {
        Ok(()) => polygons,
        Err(DepthExceeded) => Vec::new(),
    }
}

fn collect(
    entry: &PolygonEntry,
    depth: usize,
    out: &mut PolygonList,
) -> Result<(), DepthExceeded> {
    if depth > MAX_NESTING_DEPTH {
        return Err(DepthExceeded);
    }

    match entry {
        PolygonEntry::Empty | PolygonEntry::Unsupported => {}
        PolygonEntry::List(items) => {
            // Undo one level of single-element double wrapping, top of this list only
            let items = match items.as_slice() {
                [PolygonEntry::List(inner)] => inner,
                _ => items,
            };
            for item in items {
                collect(item, depth + 1, out)?;
            }
        }
        PolygonEntry::BoundaryShape(shape) => {
            if let Ok((xs, ys)) = boundary(shape) {
                out.extend(polygon_from_matrix(&PointMatrix::from_xy(&xs, &ys)));
            }
        }
        PolygonEntry::PointArray(matrix) => out.extend(polygon_from_matrix(matrix)),
        PolygonEntry::Record(record) => out.extend(polygon_from_record(record)),
    }
    Ok(())
}

// Position short-circuits when it holds a valid polygon; Vertices is the fallback
fn polygon_from_record(record: &RoiRecord) -> Option<Polygon> {
    record
        .position
        .as_ref()
        .and_then(polygon_from_matrix)
        .or_else(|| record.vertices.as_ref().and_then(polygon_from_matrix))
}

/// Validity predicate: 2 columns, at least 3 rows, every value finite.
pub fn is_valid_points(points: &PointMatrix) -> bool {
    points.cols == 2
        && points.rows >= MIN_POLYGON_POINTS
        && points.values.len() == points.rows * points.cols
        && points.values.iter().all(|v| v.is_finite())
}

/// Turn a candidate matrix into a polygon, or `None` if it fails validation.
pub fn polygon_from_matrix(points: &PointMatrix) -> Option<Polygon> {
    if !is_valid_points(points) {
        return None;
    }
    Some(Polygon(
        points.iter_rows().map(|row| (row[0], row[1])).collect(),
    ))
}

/// Turn a list of points into a polygon, or `None` if it fails validation.
pub fn polygon_from_points(points: &[Point]) -> Option<Polygon> {
    polygon_from_matrix(&PointMatrix::from_points(points))
}

/// Trace the boundary of a shape as x and y coordinate vectors.
///
/// Every contour (outer boundary or hole) is closed by repeating its first
/// vertex, and consecutive contours are separated by a NaN entry.
pub fn boundary(shape: &Polyshape) -> Result<(Vec<f64>, Vec<f64>), BoundaryError> {
    let vertices = shape
        .vertices
        .as_ref()
        .ok_or(BoundaryError::MissingVertices)?;
    if vertices.cols != 2 {
        return Err(BoundaryError::BadColumnCount(vertices.cols));
    }
    if vertices.values.len() != vertices.rows * 2 {
        return Err(BoundaryError::RaggedVertices {
            rows: vertices.rows,
            found: vertices.values.len(),
        });
    }

    let contours = split_contours(vertices);
    if contours.is_empty() {
        return Err(BoundaryError::NoContours);
    }

    let mut xs = Vec::with_capacity(vertices.rows + 2 * contours.len());
    let mut ys = Vec::with_capacity(xs.capacity());
    for (index, contour) in contours.iter().enumerate() {
        if contour.len() < MIN_POLYGON_POINTS {
            return Err(BoundaryError::DegenerateContour(contour.len()));
        }
        if index > 0 {
            xs.push(f64::NAN);
            ys.push(f64::NAN);
        }
        for &(x, y) in contour {
            xs.push(x);
            ys.push(y);
        }
        let first = contour[0];
        if contour[contour.len() - 1] != first {
            xs.push(first.0);
            ys.push(first.1);
        }
    }

    Ok((xs, ys))
}

fn split_contours(vertices: &PointMatrix) -> Vec<Vec<Point>> {
    let mut contours = Vec::new();
    let mut current = Vec::new();
    for row in vertices.iter_rows() {
        if row[0].is_finite() && row[1].is_finite() {
            current.push((row[0], row[1]));
        } else if !current.is_empty() {
            contours.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        contours.push(current);
    }
    contours
}
