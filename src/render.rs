//! Render-prop wrapper around [`QueryController`].

use std::sync::Arc;

use crate::client::RequestClient;
use crate::controller::{QueryConfig, QueryController, QueryWatch};
use crate::error::Result;
use crate::state::QueryState;

/// Owns a controller for the lifetime of a view and hands the current state
/// to a caller-supplied child function on every render.
pub struct Query<C: RequestClient, T> {
    controller: QueryController<C, T>,
}

impl<C, T> Query<C, T>
where
    C: RequestClient,
    T: Clone + Send + Sync + 'static,
{
    pub fn mount(client: Arc<C>, config: &QueryConfig<T>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            controller: QueryController::new(client, config.normalizer().clone()),
        })
    }

    pub fn render<R, F>(&mut self, config: &QueryConfig<T>, children: F) -> Result<R>
    where
        F: FnOnce(&QueryState<T, C::Error>) -> R,
    {
        let state = self.controller.use_query(config)?;
        Ok(children(&state))
    }

    pub fn subscribe(&self) -> QueryWatch<T, C::Error> {
        self.controller.subscribe()
    }

    pub fn controller(&self) -> &QueryController<C, T> {
        &self.controller
    }
}
