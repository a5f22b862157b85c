//! # Phases Module
//!
//! Phase data consumed by the analysis and regrind layers.
//!
//! - [`registry`] - The [`registry::PhaseRegistry`] capability: melting lookup and the
//!   volume to moles to elements conversions, plus the free-space sentinel
//! - [`phase_set`] - [`phase_set::PhaseSet`], a registry loaded from a TOML file
//!
//! ```ignore
//! use rxnca::core::phases::phase_set::PhaseSet;
//!
//! let phases = PhaseSet::load(Path::new("phases.toml"))?;
//! assert!(phases.is_melted("Li2O", 1800.0));
//! ```

pub mod phase_set;
pub mod registry;
