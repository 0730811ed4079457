//! Clearance workflow and approval-routing engine for the student clearance
//! portal. The engine decides whether an action is currently permitted and
//! who may perform it; storage, file streaming, and authentication live
//! behind the traits in [`workflows::clearance`].

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
