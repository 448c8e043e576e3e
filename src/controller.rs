//! Query state controller.
//!
//! A [`QueryController`] owns the [`QueryState`] of one consumer. Each call to
//! [`QueryController::reconcile`] compares the inputs against the ones seen
//! last time and issues at most one request when they differ. Settlement
//! happens on a spawned task; the result is applied only while the request is
//! still the newest one issued by this controller and the controller has not
//! been dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, trace, warn};

use crate::client::RequestClient;
use crate::error::{GhQueryError, Result};
use crate::inputs::{QueryInputs, Variables};
use crate::normalize::Normalizer;
use crate::state::{QueryFailure, QueryState};

/// Configuration accepted by [`QueryController::use_query`] and the
/// render-prop wrapper.
#[derive(Debug, Clone)]
pub struct QueryConfig<T> {
    query: String,
    variables: Option<Variables>,
    normalize: Normalizer<T>,
}

impl QueryConfig<Value> {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: None,
            normalize: Normalizer::identity(),
        }
    }
}

impl<T> QueryConfig<T> {
    pub fn variables(mut self, variables: Variables) -> Self {
        self.variables = Some(variables);
        self
    }

    pub fn maybe_variables(mut self, variables: Option<Variables>) -> Self {
        self.variables = variables;
        self
    }

    pub fn normalize<U>(self, normalize: Normalizer<U>) -> QueryConfig<U> {
        QueryConfig {
            query: self.query,
            variables: self.variables,
            normalize,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn inputs(&self) -> QueryInputs {
        QueryInputs::new(self.query.clone(), self.variables.clone())
    }

    pub fn normalizer(&self) -> &Normalizer<T> {
        &self.normalize
    }

    /// The query must be a non-empty string. Variables and the normalizer
    /// are checked by their types.
    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(GhQueryError::InvalidQuery(
                "query must be a non-empty string".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of a reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// Inputs matched the previous ones; nothing was issued.
    Unchanged,
    /// A request was issued under this generation.
    Issued { generation: u64 },
}

struct Shared<T, E> {
    state: watch::Sender<QueryState<T, E>>,
    // Only mutated while holding the state's write lock.
    generation: AtomicU64,
}

pub struct QueryController<C: RequestClient, T> {
    client: Arc<C>,
    normalize: Normalizer<T>,
    shared: Arc<Shared<T, C::Error>>,
    previous: Option<QueryInputs>,
    tasks: JoinSet<()>,
}

impl<C, T> QueryController<C, T>
where
    C: RequestClient,
    T: Send + Sync + 'static,
{
    pub fn new(client: Arc<C>, normalize: Normalizer<T>) -> Self {
        let (state, _) = watch::channel(QueryState::new());
        Self {
            client,
            normalize,
            shared: Arc::new(Shared {
                state,
                generation: AtomicU64::new(0),
            }),
            previous: None,
            tasks: JoinSet::new(),
        }
    }

    /// Replaces the normalizer used by requests issued from now on.
    pub fn set_normalize(&mut self, normalize: Normalizer<T>) {
        self.normalize = normalize;
    }

    /// Issues a request if `inputs` differ from the previous reconciliation.
    ///
    /// `fetching` is set before this returns. Must be called from within a
    /// tokio runtime.
    pub fn reconcile(&mut self, inputs: &QueryInputs) -> Reconciled {
        self.reap();

        if self.previous.as_ref() == Some(inputs) {
            trace!("inputs unchanged, skipping request");
            return Reconciled::Unchanged;
        }

        let shared = Arc::clone(&self.shared);
        let mut issued = 0;
        shared.state.send_modify(|state| {
            issued = shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.begin_fetch();
        });

        debug!(generation = issued, "issuing request");

        let client = Arc::clone(&self.client);
        let normalize = self.normalize.clone();
        let request = inputs.clone();
        self.tasks.spawn(async move {
            let result = match client
                .request(&request.query, request.variables.as_ref())
                .await
            {
                Ok(response) => normalize.apply(response).map_err(QueryFailure::Normalize),
                Err(error) => Err(QueryFailure::Request(Arc::new(error))),
            };

            let applied = shared.state.send_if_modified(|state| {
                if shared.generation.load(Ordering::SeqCst) != issued {
                    return false;
                }
                state.settle(result);
                true
            });

            if applied {
                debug!(generation = issued, "request settled");
            } else {
                debug!(generation = issued, "discarding superseded response");
            }
        });

        self.previous = Some(inputs.clone());
        Reconciled::Issued { generation: issued }
    }

    /// Hook entry point: validate, reconcile, and return the current state.
    pub fn use_query(&mut self, config: &QueryConfig<T>) -> Result<QueryState<T, C::Error>>
    where
        T: Clone,
    {
        config.validate()?;
        self.set_normalize(config.normalizer().clone());
        self.reconcile(&config.inputs());
        Ok(self.state())
    }

    pub fn state(&self) -> QueryState<T, C::Error>
    where
        T: Clone,
    {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> QueryWatch<T, C::Error> {
        QueryWatch {
            rx: self.shared.state.subscribe(),
        }
    }

    /// Generation of the most recently issued request; 0 before the first.
    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::SeqCst)
    }

    /// Spawned requests that have not finished yet.
    pub fn in_flight(&mut self) -> usize {
        self.reap();
        self.tasks.len()
    }

    fn reap(&mut self) {
        while let Some(joined) = self.tasks.try_join_next() {
            if let Err(e) = joined {
                if e.is_panic() {
                    warn!(error = %e, "request task panicked");
                }
            }
        }
    }
}

impl<C: RequestClient, T> Drop for QueryController<C, T> {
    fn drop(&mut self) {
        let shared = &self.shared;
        shared.state.send_if_modified(|_| {
            shared.generation.fetch_add(1, Ordering::SeqCst);
            false
        });
        self.tasks.abort_all();
    }
}

/// Observer of a controller's state.
pub struct QueryWatch<T, E> {
    rx: watch::Receiver<QueryState<T, E>>,
}

impl<T: Clone, E> QueryWatch<T, E> {
    /// Current state, marking it as seen.
    pub fn current(&mut self) -> QueryState<T, E> {
        self.rx.borrow_and_update().clone()
    }

    /// Waits for the next applied patch. Returns `false` once the controller
    /// and all of its requests are gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Waits until no request is in flight.
    pub async fn settled(&mut self) -> Option<QueryState<T, E>> {
        match self.rx.wait_for(|state| !state.fetching()).await {
            Ok(state) => Some(state.clone()),
            Err(_) => None,
        }
    }
}
