pub mod init;
pub mod query;
pub mod replay;
pub mod viewer;

use gh_query::{GhQueryError, QueryState, QueryWatch, Result};

/// Waits for the in-flight request to settle. A view torn down before that
/// is an error.
pub async fn wait_settled<T: Clone, E>(
    watch: &mut QueryWatch<T, E>,
) -> Result<QueryState<T, E>> {
    watch
        .settled()
        .await
        .ok_or_else(|| GhQueryError::QueryFailed("query was torn down".to_string()))
}
