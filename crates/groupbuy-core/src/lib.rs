//! Pure form-access and row-computation logic: role classification,
//! total computation, per-role projection, and per-buyer aggregation.
//! No I/O lives here; persistence and HTTP are the callers' problem.

pub mod access;
pub mod compute;
pub mod project;
pub mod summary;

pub use access::{Requester, Role};
pub use compute::RowError;
