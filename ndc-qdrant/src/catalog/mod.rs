// Copyright (c) 2024-2025 ndc-qdrant Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Collection catalog: connector configuration and the schema view

pub mod config;
pub mod error;
pub mod traits;

pub use config::{CollectionConfig, ConnectorConfig};
pub use error::{ConfigError, ConfigResult};
pub use traits::{is_point_column, SchemaView, POINT_COLUMNS};
