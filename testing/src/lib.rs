//! # Formdeck Testing
//!
//! Test doubles for the request-state store's collaborators, mirroring
//! the production traits in `formdeck-store`: a [`MockHttpClient`]
//! with canned and gated responses, and a [`CapturingAlerter`] that
//! records every alert. Plus a few JSON fixture helpers.

pub mod alert;
pub mod fixtures;
pub mod http;

pub use alert::CapturingAlerter;
pub use http::{GateHandle, MockHttpClient, RecordedRequest};
