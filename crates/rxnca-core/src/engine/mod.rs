//! # Engine Module
//!
//! The thermal state-rewrite machinery.
//!
//! ## Overview
//!
//! At every temperature change the driver hands the current snapshot to the
//! melt-and-regrind engine, which either passes it through with an updated
//! temperature (**Stable**) or rebuilds the lattice from the remaining solid
//! composition (**Regrind**), shrinking the volume multiplier so the represented
//! solid volume is conserved.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Regrind threshold and run parameters, with builders
//! - **Lattice Construction** ([`lattice`]) - The [`lattice::LatticeSetup`] capability and
//!   a seeded random packing implementation
//! - **Melt and Regrind** ([`melt`]) - The two-state transition rule
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Error Handling** ([`error`]) - Engine-level error type

pub mod config;
pub mod error;
pub mod lattice;
pub mod melt;
pub mod progress;
