//! Integration tests for the GitHub GraphQL client and the controller on top of it.

use std::sync::Arc;
use std::time::Duration;

use gh_query::{
    GhQueryError, GitHubClient, Normalizer, Phase, QueryConfig, QueryController, QueryInputs,
};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GitHubClient {
    let endpoint = Url::parse(&format!("{}/graphql", server.uri())).unwrap();
    GitHubClient::new(endpoint, "test-token".to_string())
}

#[tokio::test]
async fn test_query_returns_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("Authorization", "Bearer test-token"))
        .and(body_json(json!({
            "query": "{viewer{login}}",
            "variables": {"first": 1}
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": {"viewer": {"login": "octocat"}}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let variables = json!({"first": 1}).as_object().cloned();
    let data = client
        .query("{viewer{login}}", variables.as_ref())
        .await
        .unwrap();

    assert_eq!(data, json!({"viewer": {"login": "octocat"}}));
}

#[tokio::test]
async fn test_query_omits_absent_variables() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!({"query": "{viewer{login}}"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"viewer": null}})))
        .expect(1)
        .mount(&server)
        .await;

    let data = client_for(&server).query("{viewer{login}}", None).await.unwrap();
    assert_eq!(data, json!({"viewer": null}));
}

#[tokio::test]
async fn test_graphql_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [
                {"message": "Field 'nope' doesn't exist on type 'Query'"},
                {"message": "Something else"}
            ]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).query("{nope}", None).await.unwrap_err();
    match err {
        GhQueryError::GraphQL { messages } => {
            assert_eq!(messages.len(), 2);
            assert!(messages[0].contains("nope"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_http_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
        .mount(&server)
        .await;

    let err = client_for(&server).query("{viewer{login}}", None).await.unwrap_err();
    match err {
        GhQueryError::ApiError { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Bad credentials");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_data_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let err = client_for(&server).query("{viewer{login}}", None).await.unwrap_err();
    assert!(matches!(err, GhQueryError::EmptyResponse));
}

#[tokio::test]
async fn test_timeout_surfaces_as_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": {}}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let endpoint = Url::parse(&format!("{}/graphql", server.uri())).unwrap();
    let client =
        GitHubClient::with_timeout(endpoint, "t".to_string(), Duration::from_millis(100)).unwrap();

    let err = client.query("{viewer{login}}", None).await.unwrap_err();
    assert!(matches!(err, GhQueryError::Http(_)));
}

#[tokio::test]
async fn test_controller_over_http_requests_once_per_distinct_input() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": {"viewer": {"login": "octocat"}}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = Arc::new(client_for(&server));
    let config = QueryConfig::new("{viewer{login}}").normalize(Normalizer::pointer("/viewer/login"));
    let mut controller = QueryController::new(client, config.normalizer().clone());
    let mut watch = controller.subscribe();

    let state = controller.use_query(&config).unwrap();
    assert_eq!(state.phase(), Phase::Fetching);

    let state = watch.settled().await.unwrap();
    assert_eq!(state.data(), Some(&json!("octocat")));

    // Re-rendering with the same inputs must not hit the server again.
    controller.use_query(&config).unwrap();
    controller.use_query(&config).unwrap();
    assert_eq!(controller.generation(), 1);
}

#[tokio::test]
async fn test_controller_stores_http_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad gateway"))
        .mount(&server)
        .await;

    let client = Arc::new(client_for(&server));
    let mut controller = QueryController::new(client, Normalizer::identity());
    let mut watch = controller.subscribe();

    controller.reconcile(&QueryInputs::new("{viewer{login}}", None));
    let state = watch.settled().await.unwrap();

    assert_eq!(state.phase(), Phase::Failed);
    assert!(!state.loaded());
    assert!(matches!(
        state.error().and_then(|e| e.request()),
        Some(GhQueryError::ApiError { status: 502, .. })
    ));
}
