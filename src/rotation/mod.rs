// src/rotation/mod.rs
//! Probabilistic persona rotation.

pub mod policy;
pub mod scheduler;

pub use policy::RotationCurve;
pub use scheduler::{RotationEvent, RotationScheduler, RotationStatus};
