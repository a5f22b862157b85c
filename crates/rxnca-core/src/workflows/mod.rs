//! # Workflows Module
//!
//! Top-level entry points that walk a full heating schedule.
//!
//! ## Overview
//!
//! A workflow builds the initial lattice from the precursor composition, applies
//! the melt-and-regrind engine at every temperature change, advances the lattice
//! with a transition rule, and collects the resulting trajectory.
//!
//! ## Architecture
//!
//! - **Reaction Workflow** ([`react`]) - The step-by-step driver and the
//!   [`react::TransitionRule`] capability through which the automaton rule is plugged in.

pub mod react;
