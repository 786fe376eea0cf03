//! # Calibration Wizard Module
//!
//! The calibration state machine and its control vocabulary.
//!
//! This module handles:
//! - The fixed prompt order over logical buttons and axes
//! - Baseline capture and device selection from raw events
//! - Hold-to-confirm acceptance of a physical control per prompt
//! - Disambiguation of dual-purpose hardware (trigger-as-axis,
//!   D-pad-as-buttons)
//! - Assembly of the finished [`CalibrationSet`] for the mapping store

pub mod controls;
pub mod session;

pub use controls::{prompt_label, LogicalControl, AXIS_PROMPTS, BUTTON_PROMPTS};
pub use session::{
    resolve_commit_key, CalibrationSet, CalibrationWizard, MappingEntry, NullView, Prompt,
    WizardOutcome, WizardView, DEFAULT_AXIS_THRESHOLD, DEFAULT_HOLD_SECONDS,
};
