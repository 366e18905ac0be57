//! `packflow-forecasting`
//!
//! **Responsibility:** turn forecast + inventory snapshots into ranked order
//! recommendations.
//!
//! This crate is advisory only:
//! - It never mutates inventory or orders.
//! - It consumes forecast numbers; the reference [`RequirementsPlanner`] stands in
//!   for the external forecast service in dev/test.

pub mod params;
pub mod record;
pub mod recommender;
pub mod requirements;

pub use params::{DoiGoal, SafetyBufferRatio, TieBreak};
pub use record::{ForecastRecord, ProductDemand};
pub use recommender::{ForecastRecommender, Recommendation, RecommendationSet, DOI_NO_VELOCITY};
pub use requirements::RequirementsPlanner;
