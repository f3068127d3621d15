//! Test fixture for ndc-qdrant integration tests
//!
//! Collections:
//! - `articles`: two points, `{id: 1, int: 5}` and `{id: 2, int: 10}`, both with vector `[0, 0]`
//! - `documents`: five points with `int`, `float`, `string` and `tags` payloads and 2-d vectors
//! - `booleans`: four points with boolean `A` / `B` payloads and no vectors

#![allow(dead_code)]

use ndc_qdrant::transport::{MemoryTransport, Point, PointId};
use ndc_qdrant::{
    CollectionConfig, ConnectorConfig, QueryCoordinator, QueryError, QueryExplanation,
    QueryRequest, RowSet, Value,
};
use std::sync::Arc;

/// Fixture bundling a seeded in-memory backend and a coordinator over it
pub struct TestFixture {
    coordinator: QueryCoordinator,
    transport: Arc<MemoryTransport>,
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn fixture_config() -> ConnectorConfig {
    ConnectorConfig::new()
        .with_collection(CollectionConfig::new("articles", &["int"]))
        .with_collection(CollectionConfig::new(
            "documents",
            &["int", "float", "string", "tags"],
        ))
        .with_collection(CollectionConfig::new("booleans", &["A", "B"]).without_vectors())
}

/// Seed the fixture collections into `transport`
pub fn seed(transport: &MemoryTransport) {
    transport.create_collection("articles");
    transport
        .upsert(
            "articles",
            vec![
                Point::new(PointId::Num(1))
                    .with_vector(vec![0.0, 0.0])
                    .with_payload("int", 5i64),
                Point::new(PointId::Num(2))
                    .with_vector(vec![0.0, 0.0])
                    .with_payload("int", 10i64),
            ],
        )
        .expect("Failed to seed articles");

    transport.create_collection("documents");
    transport
        .upsert(
            "documents",
            vec![
                document(1, Value::Integer(1), 1.5, "alpha rust", vec!["a", "b"], [1.0, 0.0]),
                document(2, Value::Integer(1), 2.5, "beta", vec!["b"], [0.9, 0.1]),
                document(3, Value::Integer(2), 2.5, "gamma rust", vec![], [0.0, 1.0]),
                document(4, Value::Null, 3.0, "delta", vec!["d"], [0.5, 0.5]),
                document(5, Value::Integer(2), 4.5, "epsilon", vec!["c"], [0.1, 0.9]),
            ],
        )
        .expect("Failed to seed documents");

    transport.create_collection("booleans");
    transport
        .upsert(
            "booleans",
            [(1, true, false), (2, false, true), (3, true, true), (4, false, false)]
                .into_iter()
                .map(|(id, a, b)| {
                    Point::new(PointId::Num(id))
                        .with_payload("A", a)
                        .with_payload("B", b)
                })
                .collect(),
        )
        .expect("Failed to seed booleans");
}

fn document(
    id: u64,
    int: Value,
    float: f64,
    string: &str,
    tags: Vec<&str>,
    vector: [f64; 2],
) -> Point {
    Point::new(PointId::Num(id))
        .with_vector(vector.to_vec())
        .with_payload("int", int)
        .with_payload("float", float)
        .with_payload("string", string)
        .with_payload("tags", tags)
}

impl TestFixture {
    pub fn new() -> Self {
        init_logging();
        let transport = Arc::new(MemoryTransport::new());
        seed(&transport);
        let coordinator = QueryCoordinator::from_config(fixture_config(), transport.clone());
        Self {
            coordinator,
            transport,
        }
    }

    pub fn coordinator(&self) -> &QueryCoordinator {
        &self.coordinator
    }

    pub fn transport(&self) -> &MemoryTransport {
        &self.transport
    }

    fn request(json: serde_json::Value) -> QueryRequest {
        serde_json::from_value(json).expect("Fixture request should parse")
    }

    /// Run a request and expect success
    pub async fn run(&self, json: serde_json::Value) -> Vec<RowSet> {
        let request = Self::request(json);
        self.coordinator
            .run_query(&request)
            .await
            .unwrap_or_else(|err| panic!("Query failed: {}", err))
    }

    /// Run a request and expect failure
    pub async fn run_err(&self, json: serde_json::Value) -> QueryError {
        let request = Self::request(json);
        match self.coordinator.run_query(&request).await {
            Ok(rows) => panic!("Expected query to fail, got {:?}", rows),
            Err(err) => err,
        }
    }

    /// Run a request through the JSON entry point
    pub async fn run_json(&self, json: serde_json::Value) -> serde_json::Value {
        self.coordinator
            .run_query_json(&json.to_string())
            .await
            .unwrap_or_else(|err| panic!("Query failed: {}", err))
    }

    pub fn explain(&self, json: serde_json::Value) -> QueryExplanation {
        self.coordinator.explain_query_json(&json.to_string())
    }
}

/// Values of `key` across the rows of a row set, in row order
pub fn column(row_set: &RowSet, key: &str) -> Vec<Value> {
    row_set
        .rows
        .as_ref()
        .map(|rows| {
            rows.iter()
                .map(|row| row.get(key).cloned().unwrap_or(Value::Null))
                .collect()
        })
        .unwrap_or_default()
}

/// Integer values helper for comparisons
pub fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().map(|v| Value::Integer(*v)).collect()
}

/// Build a `{"type": "column", "column": name}` field
pub fn field(column: &str) -> serde_json::Value {
    serde_json::json!({"type": "column", "column": column})
}

/// Build a binary comparison with a scalar operand
pub fn compare(column: &str, operator: serde_json::Value, value: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "type": "binary_comparison_operator",
        "column": {"type": "column", "name": column},
        "operator": operator,
        "value": {"type": "scalar", "value": value}
    })
}

pub fn equal() -> serde_json::Value {
    serde_json::json!({"type": "equal"})
}

pub fn custom(name: &str) -> serde_json::Value {
    serde_json::json!({"type": "custom", "name": name})
}
