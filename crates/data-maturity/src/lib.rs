//! Data maturity survey engine.
//!
//! The [`survey`] module holds the fixed question catalog, the per-respondent
//! assessment session, and the collaborators that capture leads once a
//! respondent finishes. [`config`], [`telemetry`], and [`error`] carry the
//! service plumbing shared by the API binary.

pub mod config;
pub mod error;
pub mod survey;
pub mod telemetry;
