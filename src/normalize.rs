//! Mapping from a raw GraphQL response to the shape stored in the state.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("no value at path {0}")]
    MissingPath(String),

    #[error("response did not match expected shape: {0}")]
    Shape(String),

    #[error("{0}")]
    Custom(String),
}

type NormalizeFn<T> = dyn Fn(Value) -> Result<T, NormalizeError> + Send + Sync;

/// A pure function applied to every successful response before it is stored.
pub struct Normalizer<T> {
    f: Arc<NormalizeFn<T>>,
}

impl<T> Clone for Normalizer<T> {
    fn clone(&self) -> Self {
        Self {
            f: Arc::clone(&self.f),
        }
    }
}

impl<T> fmt::Debug for Normalizer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer").finish_non_exhaustive()
    }
}

impl Normalizer<Value> {
    /// Stores the response as-is.
    pub fn identity() -> Self {
        Self::try_from_fn(Ok)
    }

    /// Selects the value at a JSON Pointer (`/viewer/login`).
    pub fn pointer(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::try_from_fn(move |res| select(&res, &path).cloned())
    }
}

impl Default for Normalizer<Value> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<T: 'static> Normalizer<T> {
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(Value) -> T + Send + Sync + 'static,
    {
        Self::try_from_fn(move |res| Ok(f(res)))
    }

    pub fn try_from_fn<F>(f: F) -> Self
    where
        F: Fn(Value) -> Result<T, NormalizeError> + Send + Sync + 'static,
    {
        Self { f: Arc::new(f) }
    }

    /// Runs the normalizer. A panic inside it is reported as an error.
    pub fn apply(&self, response: Value) -> Result<T, NormalizeError> {
        panic::catch_unwind(AssertUnwindSafe(|| (self.f)(response)))
            .unwrap_or_else(|payload| Err(NormalizeError::Custom(panic_message(payload))))
    }
}

impl<T: DeserializeOwned + 'static> Normalizer<T> {
    /// Deserializes the whole response into `T`.
    pub fn deserialize() -> Self {
        Self::try_from_fn(|res| {
            serde_json::from_value(res).map_err(|e| NormalizeError::Shape(e.to_string()))
        })
    }

    /// Deserializes the value at a JSON Pointer into `T`.
    pub fn pointer_deserialize(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::try_from_fn(move |res| {
            let selected = select(&res, &path)?;
            T::deserialize(selected).map_err(|e| NormalizeError::Shape(e.to_string()))
        })
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => format!("normalizer panicked: {message}"),
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(message) => format!("normalizer panicked: {message}"),
            Err(_) => "normalizer panicked".to_string(),
        },
    }
}

fn select<'v>(value: &'v Value, path: &str) -> Result<&'v Value, NormalizeError> {
    if path.is_empty() || path == "/" {
        return Ok(value);
    }

    value
        .pointer(path)
        .ok_or_else(|| NormalizeError::MissingPath(path.to_string()))
}
