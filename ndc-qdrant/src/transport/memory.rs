// Copyright (c) 2024-2025 ndc-qdrant Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! In-process transport
//!
//! Holds points per collection and answers scroll, search and recommend calls
//! with the same semantics as the remote store, so the full query pipeline can
//! run without a network.

use super::error::{TransportError, TransportResult};
use super::filter::Filter;
use super::matcher::FilterMatcher;
use super::traits::Transport;
use super::types::{
    BatchRequest, PayloadSelector, Point, PointId, RecommendRequest, ScrollRequest,
    ScrollResponse, SearchRequest,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

type PointStore = BTreeMap<PointId, Point>;

/// Transport backed by in-memory collections
#[derive(Debug, Default)]
pub struct MemoryTransport {
    collections: RwLock<HashMap<String, PointStore>>,
}

/// Shared options for similarity ranking
struct RankOptions<'a> {
    filter: Option<&'a Filter>,
    exclude: &'a [PointId],
    with_payload: &'a PayloadSelector,
    with_vector: bool,
    offset: u32,
    limit: u32,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty collection, keeping existing points if it already exists
    pub fn create_collection(&self, name: &str) {
        self.collections
            .write()
            .entry(name.to_string())
            .or_default();
    }

    /// Insert points, replacing any with the same id
    pub fn upsert(&self, collection: &str, points: Vec<Point>) -> TransportResult<()> {
        let mut collections = self.collections.write();
        let store = collections
            .get_mut(collection)
            .ok_or_else(|| TransportError::CollectionNotFound(collection.to_string()))?;
        for point in points {
            store.insert(point.id.clone(), point);
        }
        Ok(())
    }

    pub fn point_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    fn with_store<T>(
        &self,
        collection: &str,
        f: impl FnOnce(&PointStore) -> TransportResult<T>,
    ) -> TransportResult<T> {
        let collections = self.collections.read();
        let store = collections
            .get(collection)
            .ok_or_else(|| TransportError::CollectionNotFound(collection.to_string()))?;
        f(store)
    }

    /// Copy a point with only the requested payload keys and, optionally, its vector
    fn select(
        point: &Point,
        with_payload: &PayloadSelector,
        with_vector: bool,
        score: Option<f64>,
    ) -> Point {
        let payload = point.payload.as_ref().map(|payload| {
            payload
                .iter()
                .filter(|(key, _)| with_payload.include.iter().any(|k| k == *key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        });
        Point {
            id: point.id.clone(),
            version: point.version,
            score,
            payload,
            vector: if with_vector { point.vector.clone() } else { None },
        }
    }

    fn rank(store: &PointStore, target: &[f64], options: RankOptions<'_>) -> TransportResult<Vec<Point>> {
        let mut scored = Vec::new();
        for point in store.values() {
            if options.exclude.contains(&point.id) {
                continue;
            }
            if let Some(filter) = options.filter {
                if !FilterMatcher::matches(point, filter) {
                    continue;
                }
            }
            let Some(vector) = point.vector.as_ref().and_then(|v| v.primary()) else {
                continue;
            };
            scored.push((cosine_similarity(target, vector)?, point));
        }

        scored.sort_by(|(a, pa), (b, pb)| {
            b.partial_cmp(a)
                .unwrap_or(Ordering::Equal)
                .then_with(|| pa.id.cmp(&pb.id))
        });

        Ok(scored
            .into_iter()
            .skip(options.offset as usize)
            .take(options.limit as usize)
            .map(|(score, point)| {
                Self::select(point, options.with_payload, options.with_vector, Some(score))
            })
            .collect())
    }

    fn recommend(store: &PointStore, request: &RecommendRequest) -> TransportResult<Vec<Point>> {
        let positive = example_vectors(store, &request.positive)?;
        let negative = example_vectors(store, &request.negative)?;
        let avg_positive = average(&positive).ok_or_else(|| {
            TransportError::InvalidRequest("recommend requires positive examples".to_string())
        })?;
        let target = match average(&negative) {
            Some(avg_negative) => avg_positive
                .iter()
                .zip(&avg_negative)
                .map(|(p, n)| p + (p - n))
                .collect(),
            None => avg_positive,
        };

        let exclude: Vec<PointId> = request
            .positive
            .iter()
            .chain(&request.negative)
            .cloned()
            .collect();
        Self::rank(
            store,
            &target,
            RankOptions {
                filter: request.filter.as_ref(),
                exclude: &exclude,
                with_payload: &request.with_payload,
                with_vector: request.with_vector,
                offset: request.offset,
                limit: request.limit,
            },
        )
    }
}

fn example_vectors(store: &PointStore, ids: &[PointId]) -> TransportResult<Vec<Vec<f64>>> {
    ids.iter()
        .map(|id| {
            store
                .get(id)
                .and_then(|point| point.vector.as_ref())
                .and_then(|vector| vector.primary())
                .map(<[f64]>::to_vec)
                .ok_or_else(|| TransportError::InvalidRequest(format!("point {} not found", id)))
        })
        .collect()
}

fn average(vectors: &[Vec<f64>]) -> Option<Vec<f64>> {
    let first = vectors.first()?;
    let mut sum = vec![0.0f64; first.len()];
    for vector in vectors {
        for (acc, x) in sum.iter_mut().zip(vector) {
            *acc += x;
        }
    }
    let n = vectors.len() as f64;
    Some(sum.into_iter().map(|x| x / n).collect())
}

fn cosine_similarity(a: &[f64], b: &[f64]) -> TransportResult<f64> {
    if a.len() != b.len() {
        return Err(TransportError::InvalidRequest(format!(
            "vector dimension mismatch: expected {}, got {}",
            b.len(),
            a.len()
        )));
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (norm_a * norm_b))
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn scroll(
        &self,
        collection: &str,
        request: &ScrollRequest,
    ) -> TransportResult<ScrollResponse> {
        self.with_store(collection, |store| {
            let mut matching = store
                .values()
                .filter(|point| request.offset.as_ref().map_or(true, |start| &point.id >= start))
                .filter(|point| {
                    request
                        .filter
                        .as_ref()
                        .map_or(true, |filter| FilterMatcher::matches(point, filter))
                });

            let limit = request.limit as usize;
            let points: Vec<Point> = matching
                .by_ref()
                .take(limit)
                .map(|point| Self::select(point, &request.with_payload, request.with_vector, None))
                .collect();
            let next_page_offset = matching.next().map(|point| point.id.clone());

            log::debug!(
                "memory scroll on '{}' returned {} point(s)",
                collection,
                points.len()
            );
            Ok(ScrollResponse {
                points,
                next_page_offset,
            })
        })
    }

    async fn search(
        &self,
        collection: &str,
        request: &SearchRequest,
    ) -> TransportResult<Vec<Point>> {
        self.with_store(collection, |store| {
            Self::rank(
                store,
                &request.vector,
                RankOptions {
                    filter: request.filter.as_ref(),
                    exclude: &[],
                    with_payload: &request.with_payload,
                    with_vector: request.with_vector,
                    offset: request.offset,
                    limit: request.limit,
                },
            )
        })
    }

    async fn search_batch(
        &self,
        collection: &str,
        batch: &BatchRequest<'_, SearchRequest>,
    ) -> TransportResult<Vec<Vec<Point>>> {
        let mut results = Vec::with_capacity(batch.len());
        for request in batch.searches {
            results.push(self.search(collection, request).await?);
        }
        Ok(results)
    }

    async fn recommend_batch(
        &self,
        collection: &str,
        batch: &BatchRequest<'_, RecommendRequest>,
    ) -> TransportResult<Vec<Vec<Point>>> {
        self.with_store(collection, |store| {
            batch
                .searches
                .iter()
                .map(|request| Self::recommend(store, request))
                .collect()
        })
    }
}
