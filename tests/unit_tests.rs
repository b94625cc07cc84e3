use serde_json::json;

use gtruth2flat::normalize::{
    boundary, polygon_from_points, BoundaryError, MAX_NESTING_DEPTH,
};
use gtruth2flat::types::{Polyshape, RoiRecord};
use gtruth2flat::{is_valid_points, normalize, PointMatrix, Polygon, PolygonEntry};

fn points(rows: &[(f64, f64)]) -> PolygonEntry {
    PolygonEntry::PointArray(PointMatrix::from_points(rows))
}

fn triangle(offset: f64) -> Vec<(f64, f64)> {
    vec![
        (offset, offset),
        (offset + 10.0, offset),
        (offset + 10.0, offset + 10.0),
    ]
}

fn polygon(rows: &[(f64, f64)]) -> Polygon {
    polygon_from_points(rows).expect("valid test polygon")
}

// Re-wrap a canonical result as a list of raw point arrays
fn as_entry(polygons: &[Polygon]) -> PolygonEntry {
    PolygonEntry::List(polygons.iter().map(|p| points(p.points())).collect())
}

#[test]
fn test_single_triangle_array() {
    let result = normalize(&points(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]));

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].points(), &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
}

#[test]
fn test_two_point_array_is_rejected() {
    assert!(normalize(&points(&[(0.0, 0.0), (10.0, 0.0)])).is_empty());
}

#[test]
fn test_list_of_two_triangles_keeps_order() {
    let entry = PolygonEntry::List(vec![points(&triangle(0.0)), points(&triangle(5.0))]);
    let result = normalize(&entry);

    assert_eq!(result, vec![polygon(&triangle(0.0)), polygon(&triangle(5.0))]);
}

#[test]
fn test_double_wrapped_list_is_unwrapped() {
    let inner = PolygonEntry::List(vec![points(&triangle(0.0)), points(&triangle(5.0))]);
    let wrapped = PolygonEntry::List(vec![inner.clone()]);

    let result = normalize(&wrapped);
    assert_eq!(result.len(), 2);
    assert_eq!(result, normalize(&inner));
}

#[test]
fn test_empty_entries_normalize_to_nothing() {
    let entries = [
        PolygonEntry::Empty,
        PolygonEntry::Unsupported,
        PolygonEntry::List(vec![]),
        PolygonEntry::List(vec![PolygonEntry::Empty, PolygonEntry::Unsupported]),
        PolygonEntry::Record(RoiRecord::default()),
    ];
    for entry in &entries {
        assert!(normalize(entry).is_empty(), "{:?}", entry);
    }
}

#[test]
fn test_non_finite_values_reject_whole_polygon() {
    let with_nan = points(&[(0.0, 0.0), (f64::NAN, 0.0), (10.0, 10.0)]);
    let with_inf = points(&[(0.0, 0.0), (10.0, f64::INFINITY), (10.0, 10.0)]);

    assert!(normalize(&with_nan).is_empty());
    assert!(normalize(&with_inf).is_empty());
}

#[test]
fn test_wrong_column_count_is_rejected() {
    let three_cols = PolygonEntry::PointArray(PointMatrix::new(
        3,
        3,
        vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0],
    ));
    let row_vector = PolygonEntry::PointArray(PointMatrix::new(1, 6, vec![0.0; 6]));

    assert!(normalize(&three_cols).is_empty());
    assert!(normalize(&row_vector).is_empty());
}

#[test]
fn test_concatenation_skips_invalid_elements() {
    let elements = vec![
        points(&triangle(0.0)),
        points(&[(0.0, 0.0), (1.0, 1.0)]),
        PolygonEntry::Empty,
        PolygonEntry::List(vec![points(&triangle(1.0)), points(&triangle(2.0))]),
        points(&triangle(3.0)),
    ];
    let expected: usize = elements.iter().map(|e| normalize(e).len()).sum();

    let result = normalize(&PolygonEntry::List(elements));
    assert_eq!(result.len(), expected);
    assert_eq!(result.len(), 4);
    assert_eq!(result[0], polygon(&triangle(0.0)));
    assert_eq!(result[1], polygon(&triangle(1.0)));
    assert_eq!(result[3], polygon(&triangle(3.0)));
}

#[test]
fn test_normalize_is_idempotent() {
    let entry = PolygonEntry::List(vec![
        PolygonEntry::List(vec![points(&triangle(0.0))]),
        points(&[(1.0, 1.0)]),
        PolygonEntry::Record(RoiRecord {
            position: Some(PointMatrix::from_points(&triangle(7.0))),
            vertices: None,
        }),
    ]);
    let first = normalize(&entry);
    let second = normalize(&as_entry(&first));

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

#[test]
fn test_idempotent_through_json() {
    let entry = PolygonEntry::List(vec![points(&triangle(0.0)), points(&triangle(4.0))]);
    let first = normalize(&entry);

    let value = serde_json::to_value(&first).unwrap();
    let second = normalize(&PolygonEntry::from_value(&value));
    assert_eq!(first, second);
}

#[test]
fn test_single_polygon_through_json() {
    let first = normalize(&points(&triangle(0.0)));
    let value = serde_json::to_value(&first).unwrap();

    assert_eq!(value, json!([[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]]]));
    assert_eq!(normalize(&PolygonEntry::from_value(&value)), first);
}

#[test]
fn test_record_prefers_valid_position() {
    let record = RoiRecord {
        position: Some(PointMatrix::from_points(&triangle(0.0))),
        vertices: Some(PointMatrix::from_points(&triangle(50.0))),
    };
    let result = normalize(&PolygonEntry::Record(record));

    assert_eq!(result, vec![polygon(&triangle(0.0))]);
}

#[test]
fn test_record_falls_back_to_vertices() {
    let record = RoiRecord {
        position: Some(PointMatrix::new(1, 4, vec![0.0, 0.0, 5.0, 5.0])),
        vertices: Some(PointMatrix::from_points(&triangle(50.0))),
    };
    assert_eq!(
        normalize(&PolygonEntry::Record(record)),
        vec![polygon(&triangle(50.0))]
    );

    let vertices_only = RoiRecord {
        position: None,
        vertices: Some(PointMatrix::from_points(&triangle(2.0))),
    };
    assert_eq!(normalize(&PolygonEntry::Record(vertices_only)).len(), 1);
}

#[test]
fn test_boundary_closes_single_contour() {
    let shape = Polyshape {
        vertices: Some(PointMatrix::from_points(&triangle(0.0))),
    };
    let (xs, ys) = boundary(&shape).unwrap();

    assert_eq!(xs, vec![0.0, 10.0, 10.0, 0.0]);
    assert_eq!(ys, vec![0.0, 0.0, 10.0, 0.0]);

    let result = normalize(&PolygonEntry::BoundaryShape(shape));
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].len(), 4);
    assert_eq!(result[0].points()[3], (0.0, 0.0));
}

#[test]
fn test_boundary_keeps_closed_contour() {
    let mut ring = triangle(0.0);
    ring.push((0.0, 0.0));
    let shape = Polyshape {
        vertices: Some(PointMatrix::from_points(&ring)),
    };

    assert_eq!(boundary(&shape).unwrap().0.len(), 4);
}

#[test]
fn test_boundary_with_hole_separates_contours() {
    let outer = [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)];
    let hole = [(10.0, 10.0), (20.0, 10.0), (20.0, 20.0)];
    let mut rows: Vec<(f64, f64)> = outer.to_vec();
    rows.push((f64::NAN, f64::NAN));
    rows.extend_from_slice(&hole);
    let shape = Polyshape {
        vertices: Some(PointMatrix::from_points(&rows)),
    };

    let (xs, _) = boundary(&shape).unwrap();
    assert_eq!(xs.len(), 5 + 1 + 4);
    assert!(xs[5].is_nan());

    // The separator makes the traced candidate non-finite, so it is dropped
    assert!(normalize(&PolygonEntry::BoundaryShape(shape)).is_empty());
}

#[test]
fn test_boundary_failures_yield_empty() {
    let missing = Polyshape { vertices: None };
    let degenerate = Polyshape {
        vertices: Some(PointMatrix::from_points(&[(0.0, 0.0), (1.0, 1.0)])),
    };
    let only_separators = Polyshape {
        vertices: Some(PointMatrix::from_points(&[(f64::NAN, f64::NAN)])),
    };
    let three_cols = Polyshape {
        vertices: Some(PointMatrix::new(1, 3, vec![0.0, 0.0, 0.0])),
    };

    assert_eq!(boundary(&missing), Err(BoundaryError::MissingVertices));
    assert_eq!(boundary(&degenerate), Err(BoundaryError::DegenerateContour(2)));
    assert_eq!(boundary(&only_separators), Err(BoundaryError::NoContours));
    assert_eq!(boundary(&three_cols), Err(BoundaryError::BadColumnCount(3)));

    for shape in [missing, degenerate, only_separators, three_cols] {
        assert!(normalize(&PolygonEntry::BoundaryShape(shape)).is_empty());
    }
}

#[test]
fn test_moderate_nesting_is_flattened() {
    let mut entry = points(&triangle(0.0));
    for _ in 0..20 {
        entry = PolygonEntry::List(vec![entry, PolygonEntry::Empty]);
    }
    assert_eq!(normalize(&entry).len(), 1);
}

#[test]
fn test_excessive_nesting_fails_cell_closed() {
    let mut entry = PolygonEntry::List(vec![points(&triangle(0.0))]);
    for _ in 0..(MAX_NESTING_DEPTH * 2) {
        entry = PolygonEntry::List(vec![points(&triangle(1.0)), entry]);
    }
    assert!(normalize(&entry).is_empty());
}

#[test]
fn test_is_valid_points() {
    assert!(is_valid_points(&PointMatrix::from_points(&triangle(0.0))));
    assert!(!is_valid_points(&PointMatrix::from_points(&triangle(0.0)[..2])));
    assert!(!is_valid_points(&PointMatrix::new(3, 1, vec![0.0, 1.0, 2.0])));
    assert!(!is_valid_points(&PointMatrix::from_points(&[
        (0.0, 0.0),
        (1.0, 0.0),
        (f64::NEG_INFINITY, 1.0),
    ])));
}

#[test]
fn test_classify_values() {
    assert_eq!(PolygonEntry::from_value(&json!(null)), PolygonEntry::Empty);
    assert_eq!(PolygonEntry::from_value(&json!([])), PolygonEntry::Empty);
    assert_eq!(PolygonEntry::from_value(&json!("roi")), PolygonEntry::Unsupported);
    assert_eq!(PolygonEntry::from_value(&json!(true)), PolygonEntry::Unsupported);
    assert_eq!(
        PolygonEntry::from_value(&json!({"Label": "apple"})),
        PolygonEntry::Unsupported
    );
    assert_eq!(
        PolygonEntry::from_value(&json!(4)),
        PolygonEntry::PointArray(PointMatrix::new(1, 1, vec![4.0]))
    );
    assert_eq!(
        PolygonEntry::from_value(&json!([1, 2])),
        PolygonEntry::PointArray(PointMatrix::new(1, 2, vec![1.0, 2.0]))
    );
    assert_eq!(
        PolygonEntry::from_value(&json!([[0, 0], [10, 0], [10, 10]])),
        points(&triangle(0.0))
    );
}

#[test]
fn test_classify_ragged_rows_as_list() {
    let entry = PolygonEntry::from_value(&json!([[0, 0], [1]]));
    match entry {
        PolygonEntry::List(items) => assert_eq!(items.len(), 2),
        other => panic!("expected a list, got {:?}", other),
    }
}

#[test]
fn test_classify_null_as_nan() {
    let entry = PolygonEntry::from_value(&json!([[0, 0], [null, 0], [10, 10]]));
    match &entry {
        PolygonEntry::PointArray(matrix) => assert!(matrix.values[2].is_nan()),
        other => panic!("expected a point array, got {:?}", other),
    }
    assert!(normalize(&entry).is_empty());
}

#[test]
fn test_classify_polyshape_before_vertices() {
    let value = json!({
        "class": "polyshape",
        "Vertices": [[0, 0], [10, 0], [10, 10]],
        "NumRegions": 1
    });
    let entry = PolygonEntry::from_value(&value);

    assert!(matches!(entry, PolygonEntry::BoundaryShape(_)));
    assert_eq!(normalize(&entry)[0].len(), 4);
}

#[test]
fn test_classify_roi_records() {
    let polygon_roi = json!({
        "class": "images.roi.Polygon",
        "Position": [[0, 0], [10, 0], [10, 10]],
        "Label": "apple"
    });
    let lowercase = json!({"vertices": [[0, 0], [10, 0], [10, 10]]});
    let bad_position = json!({"Position": "n/a", "Vertices": [[0, 0], [10, 0], [10, 10]]});

    assert_eq!(normalize(&PolygonEntry::from_value(&polygon_roi)).len(), 1);
    assert_eq!(normalize(&PolygonEntry::from_value(&lowercase)).len(), 1);
    match PolygonEntry::from_value(&bad_position) {
        PolygonEntry::Record(record) => {
            assert!(record.position.is_none());
            assert!(record.vertices.is_some());
        }
        other => panic!("expected a record, got {:?}", other),
    }
}

#[test]
fn test_mixed_json_cell() {
    let cell = json!([
        [[0, 0], [10, 0], [10, 10]],
        {"Position": [[5, 5], [15, 5], [15, 15]]},
        {"class": "polyshape", "Vertices": [[0, 0], [4, 0], [4, 4], [0, 4]]},
        [[0, 0], [1, 1]],
        "label",
        null
    ]);
    let result = normalize(&PolygonEntry::from_value(&cell));

    assert_eq!(result.len(), 3);
    assert_eq!(result[0].points()[0], (0.0, 0.0));
    assert_eq!(result[1].points()[0], (5.0, 5.0));
    assert_eq!(result[2].len(), 5);
}
