use std::{collections::HashMap, time::Duration};

use super::*;
use crate::{
    api::dashboard::{Health, fixtures},
    config::ConfigError,
    net::{FetchError, MockResponse},
    terminal::UiEvent,
};

const BASE: &str = "http://backend:8000";

fn settings() -> DashboardSettings {
    DashboardSettings {
        activities_limit: 10,
        ..DashboardSettings::default()
    }
}

fn mocked() -> (App, DashboardApi) {
    let api = DashboardApi::mock();
    api.set_overview(Ok(fixtures::overview()));
    api.set_charts(Ok(fixtures::charts()));
    api.set_activities(Ok(fixtures::activities(30)));
    api.set_health(Ok(fixtures::health()));
    let app = App::with_api(Log::mock(), api.clone(), crate::arc_str!(BASE), settings());
    (app, api)
}

async fn run(app: &App, command: Command) -> (anyhow::Result<()>, String) {
    let mut out = Vec::new();
    let result = app.resolve(command, &mut out).await;
    (result, String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn test_overview_command_prints_report() {
    let (app, _) = mocked();
    let (result, out) = run(&app, Command::Overview).await;
    result.unwrap();
    assert!(out.starts_with("Overview (generated"));
    assert!(out.contains("2847 total"));
}

#[tokio::test]
async fn test_charts_command_prints_report() {
    let (app, _) = mocked();
    let (result, out) = run(&app, Command::Charts).await;
    result.unwrap();
    assert!(out.contains("Top routes"));
}

#[tokio::test]
async fn test_failed_command_without_data_is_an_error() {
    let (app, api) = mocked();
    api.set_overview(Err(FetchError::Http { status: 502 }));

    let (result, out) = run(&app, Command::Overview).await;
    let err = result.unwrap_err();
    assert_eq!(
        err.downcast_ref::<FetchError>(),
        Some(&FetchError::Http { status: 502 })
    );
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_activities_command_uses_configured_limit() {
    let (app, _) = mocked();
    let (result, out) = run(&app, Command::Activities { limit: None }).await;
    result.unwrap();
    assert!(out.starts_with("Recent activity (10 of 30)"));
}

#[tokio::test]
async fn test_activities_command_with_custom_limit() {
    let (app, _) = mocked();
    let (result, out) = run(&app, Command::Activities { limit: Some(3) }).await;
    result.unwrap();
    assert!(out.starts_with("Recent activity (3 of 30)"));
}

#[tokio::test]
async fn test_activities_limit_is_validated() {
    let (app, _) = mocked();
    for limit in [0, 101] {
        let (result, _) = run(&app, Command::Activities { limit: Some(limit) }).await;
        assert_eq!(
            result.unwrap_err().downcast_ref::<ConfigError>(),
            Some(&ConfigError::ActivitiesLimitOutOfRange(limit))
        );
    }
}

#[tokio::test]
async fn test_health_command() {
    let (app, api) = mocked();
    let (result, out) = run(&app, Command::Health).await;
    result.unwrap();
    assert_eq!(out, "Logistics API 1.0.0 is healthy\n");

    api.set_health(Ok(Health {
        status: ArcStr::from("degraded"),
        ..fixtures::health()
    }));
    let (result, _) = run(&app, Command::Health).await;
    assert!(result.unwrap_err().to_string().contains("degraded"));
}

#[tokio::test(start_paused = true)]
async fn test_watch_draws_until_quit() {
    let (app, _) = mocked();
    let (terminal, events) = Terminal::mock();

    let watcher = {
        let app = app.clone();
        let terminal = terminal.clone();
        tokio::spawn(async move { app.watch(&terminal).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    events.send(UiEvent::RefreshAll).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    events.send(UiEvent::Quit).unwrap();
    watcher.await.unwrap().unwrap();

    let frames = terminal.frames().unwrap();
    assert!(frames.iter().any(|frame| frame.is_refreshing));
    let last = frames.last().unwrap();
    assert_eq!(last.overview.data, Some(fixtures::overview()));
    assert_eq!(last.charts.data, Some(fixtures::charts()));
    assert_eq!(
        last.activities.data.as_ref().map(|page| page.activities.len()),
        Some(10)
    );
    assert_eq!(&*last.api_url, BASE);
}

#[tokio::test(start_paused = true)]
async fn test_watch_revalidates_on_focus() {
    let overview_url = format!("{BASE}/api/v1/dashboard/overview");
    let responses = HashMap::from([
        (
            ArcStr::from(overview_url.as_str()),
            MockResponse::ok(fixtures::json(&fixtures::overview())),
        ),
        (
            ArcStr::from(format!("{BASE}/api/v1/dashboard/charts")),
            MockResponse::ok(fixtures::json(&fixtures::charts())),
        ),
        (
            ArcStr::from(format!("{BASE}/api/v1/dashboard/recent-activities?limit=10")),
            MockResponse::ok(fixtures::json(&fixtures::activities(10))),
        ),
    ]);
    let net = Net::mock(responses);
    let api = DashboardApi::spawn(net.clone(), crate::arc_str!(BASE));
    let app = App::with_api(Log::mock(), api, crate::arc_str!(BASE), settings());
    let (terminal, events) = Terminal::mock();

    let watcher = {
        let app = app.clone();
        let terminal = terminal.clone();
        tokio::spawn(async move { app.watch(&terminal).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(net.calls(&overview_url), Some(1));

    events.send(UiEvent::Focus).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(net.calls(&overview_url), Some(2));

    drop(events);
    watcher.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_watch_fails_when_terminal_is_busy() {
    let (app, _) = mocked();
    let (terminal, _events) = Terminal::mock();
    terminal.take_over().await.unwrap();
    assert!(app.watch(&terminal).await.is_err());
}
