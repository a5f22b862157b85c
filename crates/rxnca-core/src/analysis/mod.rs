//! # Analysis Module
//!
//! Turns snapshots into physical quantities.
//!
//! ## Overview
//!
//! Every operation takes a *step group*: one or more snapshots treated as a single
//! combined sample. Volumes are scaled by each snapshot's own volume multiplier and
//! may optionally include the melted carryover held in its general state. Molar and
//! elemental quantities are derived through a [`PhaseRegistry`](crate::core::phases::registry::PhaseRegistry).
//!
//! ## Architecture
//!
//! - **Single Step Analysis** ([`step_analyzer`]) - Volumes, fractions, moles and
//!   elemental composition of one step group
//! - **Multi-Run Analysis** ([`bulk`]) - Evenly spaced step groups across several
//!   independent runs, and the trace data built from them

pub mod bulk;
pub mod step_analyzer;
