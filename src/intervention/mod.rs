//! Intervention policy: when the facilitator may speak up, and what it says.

mod config;
mod engine;
mod templates;
mod types;


pub use config::{FacilitatorConfig, InterventionPolicy};
pub use engine::InterventionEngine;
pub use types::{
    Blocker, EvaluationInput, InterventionKind, InterventionRecord, InterventionStats, Modality,
    Priority,
};
