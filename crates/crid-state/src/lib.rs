//! # crid-state: Enrollment Agreement State Machine
//!
//! Implements the single stateful unit of the CRID protocol: the
//! **Agreement Record** (immutable identities and deadline, mutable
//! finalization status and course list) and the operations that read and
//! mutate it.
//!
//! ## Operations
//!
//! - [`Agreement::create`]: fixes coordinator, student, and
//!   `deadline = now + duration`.
//! - [`Agreement::enroll`]: student redeems a coordinator signature over
//!   the exact course list, on or before the deadline.
//! - [`Agreement::cancel_by_timeout`]: coordinator closes an unredeemed
//!   agreement after the deadline.
//!
//! Exactly one of the two terminal operations can succeed on a given
//! agreement. The status field is the only lock: every operation takes
//! `&mut self`, validates completely, then mutates.
//!
//! ## Errors
//!
//! [`CreateError`], [`EnrollError`], and [`CancelError`] name each failed
//! precondition. [`AgreementError`] aggregates them for tooling.

pub mod agreement;
pub mod error;
pub mod event;

pub use agreement::{Agreement, AgreementStatus};
pub use error::{AgreementError, CancelError, CreateError, EnrollError};
pub use event::{AgreementEvent, AgreementEventRecord};
