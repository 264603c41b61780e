//! Shared test fixtures for the Meridian configuration workspace.
//!
//! Builds throwaway on-disk configuration trees (environment documents plus
//! schemas) inside a tempdir so lifecycle tests can exercise the real file
//! pipeline without touching a checked-in config directory.
//!
//! Each fixture owns its directory; dropping the fixture removes the tree.

mod fixtures;

pub use fixtures::*;
