//! Route handlers for the civic sensing API, grouped by resource.
//!
//! Route-level access is decided by the gate before these handlers run;
//! handlers only add method-level role checks via
//! [`require_any_role`](crate::auth::require_any_role) where a write
//! demands more than its route rule.

pub mod incidents;
pub mod seed;
pub mod sensors;
