//! Aggregate tests: counts, sums and averages over scroll and search results

#[path = "testutils/mod.rs"]
mod testutils;

use ndc_qdrant::transport::{Point, PointId};
use ndc_qdrant::{QueryError, Value};
use serde_json::json;
use testutils::test_fixture::{column, compare, equal, field, ints, TestFixture};

#[tokio::test]
async fn test_star_count_without_fields() {
    let fixture = TestFixture::new();
    let response = fixture
        .run_json(json!({
            "collection": "articles",
            "query": {
                "fields": {},
                "aggregates": {"count": {"type": "star_count"}}
            },
            "arguments": {},
            "collection_relationships": {}
        }))
        .await;

    assert_eq!(response, json!([{"aggregates": {"count": 2}}]));
}

#[tokio::test]
async fn test_column_count_distinct_and_plain() {
    let fixture = TestFixture::new();
    let rows = fixture
        .run(json!({
            "collection": "documents",
            "query": {
                "fields": {},
                "aggregates": {
                    "distinct_ints": {"type": "column_count", "column": "int", "distinct": true},
                    "ints": {"type": "column_count", "column": "int", "distinct": false},
                    "points": {"type": "star_count"}
                }
            }
        }))
        .await;

    let row_set = &rows[0];
    assert!(row_set.rows.is_none());
    assert_eq!(row_set.aggregate("distinct_ints"), Some(&Value::Integer(2)));
    assert_eq!(row_set.aggregate("ints"), Some(&Value::Integer(4)));
    assert_eq!(row_set.aggregate("points"), Some(&Value::Integer(5)));

    let keys: Vec<_> = row_set.aggregates.as_ref().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["distinct_ints", "ints", "points"]);
}

#[tokio::test]
async fn test_sum_and_avg() {
    let fixture = TestFixture::new();
    let rows = fixture
        .run(json!({
            "collection": "documents",
            "query": {
                "where": {
                    "type": "not",
                    "expression": {
                        "type": "unary_comparison_operator",
                        "column": {"type": "column", "name": "int"},
                        "operator": "is_null"
                    }
                },
                "aggregates": {
                    "int_sum": {"type": "single_column", "column": "int", "function": "sum"},
                    "int_avg": {"type": "single_column", "column": "int", "function": "avg"},
                    "float_sum": {"type": "single_column", "column": "float", "function": "sum"},
                    "float_avg": {"type": "single_column", "column": "float", "function": "avg"}
                }
            }
        }))
        .await;

    let row_set = &rows[0];
    assert_eq!(row_set.aggregate("int_sum"), Some(&Value::Integer(6)));
    assert_eq!(row_set.aggregate("float_sum"), Some(&Value::Float(11.0)));

    let int_avg = row_set.aggregate("int_avg").and_then(Value::as_f64).unwrap();
    assert!((int_avg - 1.5).abs() < 1e-9);
    let float_avg = row_set.aggregate("float_avg").and_then(Value::as_f64).unwrap();
    assert!((float_avg - 2.75).abs() < 1e-9);
}

#[tokio::test]
async fn test_sum_and_avg_over_null_cells_are_not_supported() {
    let fixture = TestFixture::new();
    for function in ["sum", "avg"] {
        let err = fixture
            .run_err(json!({
                "collection": "documents",
                "query": {
                    "aggregates": {
                        "total": {"type": "single_column", "column": "int", "function": function}
                    }
                }
            }))
            .await;
        assert!(matches!(err, QueryError::NotSupported(_)));
    }

    // A point without the column at all is rejected the same way
    fixture
        .transport()
        .upsert(
            "articles",
            vec![Point::new(PointId::Num(3)).with_vector(vec![0.0, 0.0])],
        )
        .unwrap();
    let err = fixture
        .run_err(json!({
            "collection": "articles",
            "query": {
                "aggregates": {"total": {"type": "single_column", "column": "int", "function": "sum"}}
            }
        }))
        .await;
    assert_eq!(err.kind().code(), "NOT_SUPPORTED");
}

#[tokio::test]
async fn test_string_sum_concatenates() {
    let fixture = TestFixture::new();
    let rows = fixture
        .run(json!({
            "collection": "documents",
            "query": {
                "where": compare("int", equal(), json!(1)),
                "aggregates": {
                    "text": {"type": "single_column", "column": "string", "function": "sum"}
                }
            }
        }))
        .await;
    assert_eq!(rows[0].aggregate("text"), Some(&Value::from("alpha rustbeta")));
}

#[tokio::test]
async fn test_aggregate_column_hidden_unless_requested() {
    let fixture = TestFixture::new();

    let rows = fixture
        .run(json!({
            "collection": "articles",
            "query": {
                "fields": {"ID": field("id")},
                "aggregates": {"total": {"type": "single_column", "column": "int", "function": "sum"}}
            }
        }))
        .await;
    let row_set = &rows[0];
    assert_eq!(row_set.aggregate("total"), Some(&Value::Integer(15)));
    let rows_out = row_set.rows.as_ref().unwrap();
    assert!(rows_out.iter().all(|row| row.get("int").is_none()));
    assert_eq!(column(row_set, "ID"), ints(&[1, 2]));

    let rows = fixture
        .run(json!({
            "collection": "articles",
            "query": {
                "fields": {"int": field("int")},
                "aggregates": {"total": {"type": "single_column", "column": "int", "function": "sum"}}
            }
        }))
        .await;
    assert_eq!(column(&rows[0], "int"), ints(&[5, 10]));
    assert_eq!(rows[0].aggregate("total"), Some(&Value::Integer(15)));
}

#[tokio::test]
async fn test_aggregates_over_search_results() {
    let fixture = TestFixture::new();
    let rows = fixture
        .run(json!({
            "collection": "documents",
            "query": {
                "fields": {"ID": field("id")},
                "limit": 3,
                "aggregates": {"found": {"type": "star_count"}}
            },
            "arguments": {"vector": {"type": "literal", "value": [1, 0]}}
        }))
        .await;
    assert_eq!(rows[0].aggregate("found"), Some(&Value::Integer(3)));
    assert_eq!(rows[0].row_count(), 3);
}

#[tokio::test]
async fn test_invalid_aggregates() {
    let fixture = TestFixture::new();

    let err = fixture
        .run_err(json!({
            "collection": "booleans",
            "query": {
                "aggregates": {"total": {"type": "single_column", "column": "A", "function": "sum"}}
            }
        }))
        .await;
    assert!(matches!(err, QueryError::NotSupported(_)));

    let err = fixture
        .run_err(json!({
            "collection": "documents",
            "query": {
                "aggregates": {"top": {"type": "single_column", "column": "int", "function": "max"}}
            }
        }))
        .await;
    assert!(matches!(err, QueryError::NotSupported(_)));

    let err = fixture
        .run_err(json!({
            "collection": "documents",
            "query": {
                "aggregates": {"n": {"type": "column_count", "column": "missing"}}
            }
        }))
        .await;
    assert!(matches!(err, QueryError::BadRequest(_)));
}
