//! # rxnca Core Library
//!
//! Reaction-state aggregation and thermal state rewriting for solid-state reaction
//! cellular automata.
//!
//! ## Architectural Philosophy
//!
//! The library follows a layered architecture so that each concern can be tested
//! in isolation and the external collaborators (the automaton rule engine, the
//! thermodynamic phase data) stay behind small capability traits.
//!
//! - **[`core`]: The Foundation.** Stateless data models: heating schedules, lattice
//!   snapshots and their general state, amount maps, and the phase registry capability.
//!
//! - **[`analysis`]: Aggregation.** Pure functions turning one or more snapshots into
//!   physical quantities (volumes, moles, elemental composition), plus multi-run
//!   trajectory analysis.
//!
//! - **[`engine`]: The Logic Core.** The melt-and-regrind state machine, the lattice
//!   construction capability, configuration, and progress reporting.
//!
//! - **[`workflows`]: The Public API.** The driver loop that walks a heating schedule,
//!   applying temperature transitions and the automaton rule step by step.

pub mod analysis;
pub mod core;
pub mod engine;
pub mod workflows;
