//! Admissions workflows for the EduVerse site.
//!
//! The crate models the client side of the admissions journey as plain state
//! machines: the three-step application wizard with its document uploads, the
//! admin acceptance action and the student profile completion with its
//! signature capture. Remote calls go through [`api::AdmissionsBackend`] so the
//! flows can be driven against the live backend or an in-memory fake.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
