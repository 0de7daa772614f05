//! Level cascading.
//!
//! Pure functions over a `RelationSnapshot` that decide which placement case
//! an edit falls into and compute the membership level writes it entails.
//! Nothing in here talks to the store; the orchestrator applies the returned
//! `LevelPlan` write by write.

pub mod classify;
pub mod plan;
pub mod propagate;

pub use classify::{
    classify_lineage, classify_spousal, plan_lineage, plan_spousal, LineageCase, SpousalCase,
};
pub use plan::{LevelPlan, LevelWrite};
pub use propagate::{propagate_assign, propagate_clear, shift_placed};
