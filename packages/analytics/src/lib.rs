#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation engine for district fraud-risk data.
//!
//! Every function here is a pure derivation over an in-memory record store:
//! no I/O, no shared state, and no error channel. Callers recompute the
//! outputs whenever the store or the active filter changes.

pub mod engine;
pub mod ranking;

pub use engine::{filter_and_aggregate, matches_filter, summarize_by_region};
pub use ranking::{available_regions, top_offenders, top_records};
