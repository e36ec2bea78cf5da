use std::collections::HashMap;

use super::*;
use crate::net::MockResponse;

const BASE: &str = "http://backend:8000";

fn api_with(responses: Vec<(&str, MockResponse)>) -> (DashboardApi, Net) {
    let net = Net::mock(HashMap::from_iter(
        responses
            .into_iter()
            .map(|(path, response)| (ArcStr::from(format!("{BASE}{path}")), response)),
    ));
    (DashboardApi::spawn(net.clone(), ArcStr::from(BASE)), net)
}

#[tokio::test]
async fn test_overview_is_decoded() {
    let body = fixtures::json(&fixtures::overview());
    let (api, net) = api_with(vec![(
        "/api/v1/dashboard/overview",
        MockResponse::ok(body),
    )]);

    let overview = api.overview().await.unwrap();
    assert_eq!(overview, fixtures::overview());
    assert_eq!(
        net.calls(&format!("{BASE}/api/v1/dashboard/overview")),
        Some(1)
    );
}

#[tokio::test]
async fn test_activities_limit_is_part_of_url() {
    let body = fixtures::json(&fixtures::activities(5));
    let (api, _) = api_with(vec![(
        "/api/v1/dashboard/recent-activities?limit=5",
        MockResponse::ok(body),
    )]);

    let page = api.recent_activities(5).await.unwrap();
    assert_eq!(page.activities.len(), 5);

    // a different limit is a different URL
    let err = api.recent_activities(6).await.unwrap_err();
    assert!(matches!(err, FetchError::Network(_)));
}

#[tokio::test]
async fn test_http_status_is_preserved() {
    let (api, _) = api_with(vec![("/api/v1/dashboard/charts", MockResponse::status(500))]);
    assert_eq!(
        api.charts().await.unwrap_err(),
        FetchError::Http { status: 500 }
    );
}

#[tokio::test]
async fn test_wrong_shape_is_decode_error() {
    let (api, _) = api_with(vec![("/health", MockResponse::ok(r#"{"up": true}"#))]);
    assert!(matches!(
        api.health().await.unwrap_err(),
        FetchError::Decode(_)
    ));
}

#[tokio::test]
async fn test_mock_api_truncates_activities() {
    let api = DashboardApi::mock();
    api.set_activities(Ok(fixtures::activities(10)));
    api.set_health(Ok(fixtures::health()));

    assert_eq!(api.recent_activities(3).await.unwrap().activities.len(), 3);
    assert!(api.health().await.unwrap().is_healthy());
    assert!(api.overview().await.is_err());
}
