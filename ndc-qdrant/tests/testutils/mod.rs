//! Test utilities for ndc-qdrant integration tests
//!
//! `TestFixture` seeds an in-memory backend with the fixture collections and
//! drives it through the public `QueryCoordinator` API only.

pub mod test_fixture;
