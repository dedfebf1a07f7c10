//! Service layer for the publisher.
//!
//! This module contains the business logic for:
//! - Reachability prechecks (`HttpPrechecker`)
//! - Quota accounting (`QuotaTracker`, `QuotaTable`)
//! - Retry and batch-continuation policies
//! - Single-URL publishing (`Publisher`)
//! - Multi-URL submission (`Submitter`)

pub mod precheck;
pub mod publisher;
pub mod quota;
pub mod retry;
pub mod submitter;

pub use precheck::{HttpPrechecker, Reachability, ReachabilityCheck};
pub use publisher::Publisher;
pub use quota::{QuotaTable, QuotaTracker};
pub use retry::{BatchPolicy, Continuation, RetryDecision, RetryPolicy};
pub use submitter::{SubmitRequest, Submitter};
