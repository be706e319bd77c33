//! # Domain Layer
//!
//! Pure generation model: types, rule tables, operation metadata and
//! concrete signatures. No I/O.

pub mod catalog;
pub mod naming;
pub mod operation;
pub mod signature;
pub mod types;

pub use catalog::*;
pub use operation::*;
pub use signature::*;
pub use types::*;
