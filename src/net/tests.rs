use std::time::Duration;

use tokio::net::TcpListener;

use tokio::time::Instant;

use super::*;

#[tokio::test]
async fn test_mock_serves_canned_body() {
    let net = Net::mock(HashMap::from([(
        ArcStr::from("http://api/health"),
        MockResponse::ok(r#"{"status":"healthy"}"#),
    )]));

    let body = net.get(ArcStr::from("http://api/health")).await.unwrap();
    assert_eq!(&*body, r#"{"status":"healthy"}"#);
    assert_eq!(net.calls("http://api/health"), Some(1));
}

#[tokio::test]
async fn test_mock_non_2xx_is_http_error() {
    let net = Net::mock_empty();
    net.respond("http://api/charts", MockResponse::status(503));

    let err = net.get(ArcStr::from("http://api/charts")).await.unwrap_err();
    assert_eq!(err, FetchError::Http { status: 503 });
}

#[tokio::test]
async fn test_mock_unknown_url_is_network_error() {
    let net = Net::mock_empty();
    let err = net.get(ArcStr::from("http://nowhere")).await.unwrap_err();
    assert!(matches!(err, FetchError::Network(_)));
    assert_eq!(net.calls("http://nowhere"), Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_mock_delay_uses_tokio_clock() {
    let net = Net::mock_empty();
    net.respond(
        "http://api/slow",
        MockResponse::ok("{}").delayed(Duration::from_millis(250)),
    );

    let start = Instant::now();
    net.get(ArcStr::from("http://api/slow")).await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(250));
}

#[tokio::test]
async fn test_actual_connection_refused_is_network_error() {
    let net = Net::spawn(Log::mock(), Duration::from_secs(2)).unwrap();
    assert_eq!(net.calls("http://127.0.0.1:9/"), None);

    // port 9 (discard) is closed on any sane test host
    let err = net
        .get(ArcStr::from("http://127.0.0.1:9/"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Network(_)));
}

#[tokio::test]
async fn test_actual_silent_server_times_out_as_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    // accept and hold the connection without ever answering
    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
        drop(socket);
    });

    let net = Net::spawn(Log::mock(), Duration::from_millis(300)).unwrap();
    let start = Instant::now();
    let err = net
        .get(ArcStr::from(format!("http://{addr}/api/v1/dashboard/overview")))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Network(_)), "{err:?}");
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(300));
    assert!(elapsed < Duration::from_secs(5));
    server.abort();
}
