//! Wire envelopes shared by every route.
//!
//! Election and voting routes wrap their payload in [`ApiResponse`];
//! every failure, from any route or catcher, is an [`ErrorBody`].

mod filter;
mod response;

pub use filter::Filter;
pub use response::{ApiResponse, ErrorBody, Meta};
