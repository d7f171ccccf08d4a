//! # Formdeck Core
//!
//! Keys, domain types, and response decoding for the Formdeck
//! request-state store.
//!
//! This crate is transport-agnostic: it knows the closed set of data
//! domains the client manages ([`Key`]), the typed values cached for
//! each domain ([`CachedValue`] and the types in [`types`]), and the
//! backend's structured error body ([`Problem`]). The store itself
//! (request lifecycle, cancellation, orchestration) lives in
//! `formdeck-store`.

pub mod key;
pub mod problem;
pub mod response;
pub mod types;
pub mod value;

pub use key::Key;
pub use problem::Problem;
pub use response::Response;
pub use value::{CachedValue, DecodeError};
