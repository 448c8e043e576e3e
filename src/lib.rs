//! GraphQL query state for views that re-render.
//!
//! [`QueryController`] tracks `{loaded, fetching, data, error}` for a single
//! consumer and only talks to the [`RequestClient`] when the
//! `(query, variables)` pair actually changes. [`Query`] wraps a controller
//! in a render-prop style API.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod inputs;
pub mod normalize;
pub mod render;
pub mod state;

#[cfg(test)]
mod test_support;

pub use client::{GitHubClient, RequestClient};
pub use config::Config;
pub use controller::{QueryConfig, QueryController, QueryWatch, Reconciled};
pub use error::{GhQueryError, Result};
pub use inputs::{QueryInputs, Variables};
pub use normalize::{NormalizeError, Normalizer};
pub use render::Query;
pub use state::{Phase, QueryFailure, QueryState};
