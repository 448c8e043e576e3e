//! The four-field status record of one query.

use std::fmt;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::normalize::NormalizeError;

/// Why the most recent attempt failed.
#[derive(Debug)]
pub enum QueryFailure<E> {
    /// The request client rejected the request. The payload is kept opaque.
    Request(Arc<E>),
    /// The response arrived but the normalizer could not map it.
    Normalize(NormalizeError),
}

impl<E> Clone for QueryFailure<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Request(e) => Self::Request(Arc::clone(e)),
            Self::Normalize(e) => Self::Normalize(e.clone()),
        }
    }
}

impl<E> QueryFailure<E> {
    pub fn request(&self) -> Option<&E> {
        match self {
            Self::Request(e) => Some(e),
            Self::Normalize(_) => None,
        }
    }
}

impl<E: fmt::Display> fmt::Display for QueryFailure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(e) => write!(f, "{e}"),
            Self::Normalize(e) => write!(f, "normalize failed: {e}"),
        }
    }
}

/// Lifecycle phase derived from a [`QueryState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Fetching,
    Loaded,
    Failed,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "Idle",
            Phase::Fetching => "Fetching",
            Phase::Loaded => "Loaded",
            Phase::Failed => "Failed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// Data and error share one slot so they can never both be present.
#[derive(Debug)]
enum Outcome<T, E> {
    Empty,
    Data(T),
    Error(QueryFailure<E>),
}

impl<T: Clone, E> Clone for Outcome<T, E> {
    fn clone(&self) -> Self {
        match self {
            Outcome::Empty => Outcome::Empty,
            Outcome::Data(data) => Outcome::Data(data.clone()),
            Outcome::Error(error) => Outcome::Error(error.clone()),
        }
    }
}

/// `{loaded, fetching, data, error}` for one query.
#[derive(Debug)]
pub struct QueryState<T, E> {
    fetching: bool,
    outcome: Outcome<T, E>,
}

impl<T: Clone, E> Clone for QueryState<T, E> {
    fn clone(&self) -> Self {
        Self {
            fetching: self.fetching,
            outcome: self.outcome.clone(),
        }
    }
}

impl<T, E> Default for QueryState<T, E> {
    fn default() -> Self {
        Self {
            fetching: false,
            outcome: Outcome::Empty,
        }
    }
}

impl<T, E> QueryState<T, E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once a response has populated `data`.
    pub fn loaded(&self) -> bool {
        matches!(self.outcome, Outcome::Data(_))
    }

    pub fn fetching(&self) -> bool {
        self.fetching
    }

    pub fn data(&self) -> Option<&T> {
        match &self.outcome {
            Outcome::Data(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&QueryFailure<E>> {
        match &self.outcome {
            Outcome::Error(error) => Some(error),
            _ => None,
        }
    }

    pub fn phase(&self) -> Phase {
        match (&self.outcome, self.fetching) {
            (_, true) => Phase::Fetching,
            (Outcome::Empty, false) => Phase::Idle,
            (Outcome::Data(_), false) => Phase::Loaded,
            (Outcome::Error(_), false) => Phase::Failed,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self.outcome {
            Outcome::Data(data) => Some(data),
            _ => None,
        }
    }

    /// `{fetching: true}`; the previous outcome stays visible.
    pub(crate) fn begin_fetch(&mut self) {
        self.fetching = true;
    }

    /// `{data, error: absent, loaded: true, fetching: false}`
    pub(crate) fn resolve(&mut self, data: T) {
        self.fetching = false;
        self.outcome = Outcome::Data(data);
    }

    /// `{error, data: absent, loaded: false, fetching: false}`
    pub(crate) fn reject(&mut self, error: QueryFailure<E>) {
        self.fetching = false;
        self.outcome = Outcome::Error(error);
    }

    pub(crate) fn settle(&mut self, result: Result<T, QueryFailure<E>>) {
        match result {
            Ok(data) => self.resolve(data),
            Err(error) => self.reject(error),
        }
    }
}

impl<T: Serialize, E: fmt::Display> Serialize for QueryState<T, E> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("QueryState", 4)?;
        state.serialize_field("loaded", &self.loaded())?;
        state.serialize_field("fetching", &self.fetching)?;
        state.serialize_field("data", &self.data())?;
        state.serialize_field("error", &self.error().map(|e| e.to_string()))?;
        state.end()
    }
}
