//! Shared type definitions for the photosynthesis day-cycle simulation.
//!
//! This crate is the single source of truth for the records that flow
//! between the day-cycle machine, the trial recorder, and the feedback
//! classifier. Types shared with the browser renderer are exported to
//! `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- UUID wrappers for trial and session identifiers
//! - [`enums`] -- Closed enumerations (events, light, water, templates, states)
//! - [`structs`] -- Events, series points, trials, and render snapshots

pub mod enums;
pub mod ids;
pub mod structs;

pub use enums::{
    CycleState, EndReason, EventKind, InvalidLightOptionCount, InvalidTemplateCode, LightLevel,
    LightOptionCount, SeriesKind, TemplateCode, WaterLevel,
};
pub use ids::{SessionId, TrialId};
pub use structs::{DaySnapshot, Event, ResourceTotals, SeriesPoint, Trial};
