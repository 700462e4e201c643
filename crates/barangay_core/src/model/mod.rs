//! Typed records for the barangay registry.
//!
//! # Responsibility
//! - Define the household and resident shapes the membership reconciler
//!   works on.
//! - Define the civic records kept beside them: officials, ordinances,
//!   activities, reports, certificates and documents.
//! - Define the session value that scopes every store handle.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - Rows are decoded into these types at the store boundary and validated
//!   before any service sees them.

pub mod activity;
pub mod certificate;
pub mod document;
pub mod household;
pub mod official;
pub mod ordinance;
pub mod report;
pub mod resident;
pub mod session;
pub mod validation;
