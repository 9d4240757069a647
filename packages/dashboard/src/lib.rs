#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Application state for the audit dashboard.
//!
//! The dashboard is modelled as one immutable [`DashboardState`] value and a
//! pure [`reduce`] function that maps `(state, event, now)` to the next state.
//! Derived views (the filtered table and the regional rollup) are recomputed
//! from the state through the aggregation engine and never stored.
//!
//! The [`actions`] module drives the network collaborators (inference
//! upload, AI insight) and feeds their outcomes back in as events, so a
//! failure can only ever leave the record store untouched.

pub mod actions;
pub mod event;
pub mod settings;
pub mod state;

pub use event::{DashboardEvent, reduce};
pub use settings::DashboardSettings;
pub use state::{
    DashboardState, DataSource, InsightState, LogEntry, MAX_LOG_ENTRIES, UploadStatus,
};
