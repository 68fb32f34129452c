//! Request resilience: per-attempt timeout and bounded retry
//!
//! [`RequestExecutor`] runs one attempt under a deadline and classifies the
//! result as a [`RequestOutcome`]. [`RetryPolicy`] replays failed attempts
//! with linear backoff.

mod executor;
mod outcome;
mod retry;

pub use executor::RequestExecutor;
pub use outcome::RequestOutcome;
pub use retry::{RetryMode, RetryPolicy};
