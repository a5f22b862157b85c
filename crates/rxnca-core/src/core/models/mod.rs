//! # Models Module
//!
//! Data structures describing a lattice snapshot and the physical quantities
//! aggregated from it.
//!
//! - [`amounts`] - Phase volume, molar, and elemental amount maps and their normalization
//! - [`snapshot`] - Per-site state, the typed general state, batch updates, and the
//!   [`snapshot::Snapshot`] capability implemented by any lattice engine
//! - [`lattice`] - A concrete, vector-backed [`snapshot::Snapshot`]
//! - [`result`] - Recorded trajectories of a run and the regrind events along them

pub mod amounts;
pub mod lattice;
pub mod result;
pub mod snapshot;
