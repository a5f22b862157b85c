//! # Core Module
//!
//! Fundamental building blocks shared by the analysis, engine, and workflow layers.
//!
//! ## Architecture
//!
//! - **Heating Schedules** ([`heating`]) - Ordered temperature-hold segments and the
//!   step-to-temperature lookup used by the driver
//! - **Lattice Models** ([`models`]) - Site and general state, the [`models::snapshot::Snapshot`]
//!   capability, amount maps, and the concrete [`models::lattice::Lattice`]
//! - **Phase Data** ([`phases`]) - The [`phases::registry::PhaseRegistry`] capability
//!   and a TOML-backed implementation
//!
//! Everything in this layer is immutable after construction except through the
//! explicit `batch_update` entry point of a snapshot.

pub mod heating;
pub mod models;
pub mod phases;
