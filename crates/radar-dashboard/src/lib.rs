//! Stock Radar dashboard state
//!
//! Drives the batch analysis job, reconciles batch and single-ticker results into one
//! candidate set, and turns forecast payloads into chart-ready series.

pub mod controller;
pub mod poller;
pub mod reconciler;
pub mod stitcher;
pub mod view_model;
pub mod views;

#[cfg(test)]
mod test_support;

pub use controller::{ControllerConfig, DashboardSnapshot, JobPollingController};
pub use poller::PollHandle;
pub use reconciler::{ResultMode, SelectionReconciler};
pub use stitcher::stitch;
pub use view_model::{DashboardViewModel, ForecastPanel};
pub use views::{CandidateRow, DashboardHeader, RunButton, ScoreAxis, ScoreProfile};
