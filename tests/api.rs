use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, TimeZone, Utc};
use madakoko::{
    api::create_router,
    reservations::{Reservation, ResolveError, ResolvedReservation},
    rooms::RoomCatalog,
    state::{AppState, CountdownTarget, Tick},
    utils::{time::parse_local, ManualClock},
};
use serde_json::Value;
use tower::ServiceExt;

fn app_state() -> (Arc<ManualClock>, Arc<AppState>) {
    // 2024-01-01 09:15 local
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 15, 0).unwrap()));
    let state = Arc::new(AppState::new(
        RoomCatalog::default(),
        333,
        Duration::seconds(10),
        clock.clone(),
    ));
    (clock, state)
}

async fn call(app: Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

#[tokio::test]
async fn health_reports_ok() {
    let (_, state) = app_state();
    let (status, body) = call(create_router(state), "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn status_shows_loading_before_first_resolution() {
    let (_, state) = app_state();
    let (status, body) = call(create_router(state), "GET", "/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["room"]["id"], 333);
    assert_eq!(body["room"]["name"], "がじゅまる");
    assert_eq!(body["loading"], true);
    assert_eq!(body["placeholder"], "読み込み中…");
    assert!(body["reservation"].is_null());
    assert_eq!(body["countdown"]["phase"], "idle");
}

#[tokio::test]
async fn status_renders_resolved_reservation_and_countdown() {
    let (clock, state) = app_state();
    let resolved = ResolvedReservation {
        reservation: Reservation {
            employee_name: "山田".to_string(),
            meeting_name: "定例".to_string(),
            start_datetime: "2024-01-01 09:00".to_string(),
            end_datetime: "2024-01-01 09:45".to_string(),
        },
        start: parse_local("2024-01-01 09:00").unwrap(),
        end: parse_local("2024-01-01 09:45").unwrap(),
        is_ongoing: true,
    };

    let generation = state.begin_resolution(333).unwrap();
    assert!(state.apply_resolution(generation, Some(resolved)).unwrap());
    let target = *state.target_tx.borrow();
    state.retarget_countdown(target).unwrap();
    clock.advance(Duration::minutes(28));
    assert!(matches!(state.tick_countdown().unwrap(), Tick::Running { .. }));

    let (status, body) = call(create_router(state), "GET", "/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["loading"], false);
    assert!(body["placeholder"].is_null());
    assert_eq!(body["reservation"]["meeting_name"], "定例");
    assert_eq!(body["reservation"]["is_ongoing"], true);
    assert_eq!(body["view"]["headline"], "会議中（がじゅまる）");
    assert_eq!(body["view"]["time_range"], "09:00-09:45");

    let countdown = &body["countdown"];
    assert_eq!(countdown["label"], "until_end");
    assert_eq!(countdown["label_text"], "終了まで");
    assert_eq!(countdown["remaining_ms"], 2 * 60 * 1000);
    assert_eq!(countdown["clock"], "2:00");
    assert_eq!(countdown["wait_message"], "約2 分お待ちください");
    assert_eq!(countdown["tone"], "critical");
}

#[tokio::test]
async fn failed_fetch_after_room_switch_shows_only_the_error() {
    let (_, state) = app_state();
    let meeting = ResolvedReservation {
        reservation: Reservation {
            employee_name: "伊藤".to_string(),
            meeting_name: "がじゅまる定例".to_string(),
            start_datetime: "2024-01-01 09:00".to_string(),
            end_datetime: "2024-01-01 09:45".to_string(),
        },
        start: parse_local("2024-01-01 09:00").unwrap(),
        end: parse_local("2024-01-01 09:45").unwrap(),
        is_ongoing: true,
    };
    let generation = state.begin_resolution(333).unwrap();
    state.apply_resolution(generation, Some(meeting)).unwrap();

    let app = create_router(Arc::clone(&state));
    let (status, _) = call(app.clone(), "POST", "/room/332").await;
    assert_eq!(status, StatusCode::OK);
    let generation = state.begin_resolution(332).unwrap();
    state.apply_failure(generation, &ResolveError::Status(500)).unwrap();

    let (_, body) = call(app, "GET", "/status").await;
    assert_eq!(body["room"]["id"], 332);
    assert_eq!(body["error"], "読み込みエラー: HTTP 500");
    assert_eq!(body["placeholder"], "読み込みエラー: HTTP 500");
    assert!(body["reservation"].is_null());
    assert!(body["view"].is_null());
    assert!(state.target_tx.borrow().target_at.is_none());
}

#[tokio::test]
async fn selecting_rooms() {
    let (_, state) = app_state();
    let app = create_router(Arc::clone(&state));

    let (status, _) = call(app.clone(), "POST", "/room/331").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.selected_room(), 331);

    let (status, body) = call(app.clone(), "POST", "/room/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
    assert_eq!(state.selected_room(), 331);

    let (status, _) = call(app.clone(), "POST", "/room/not-a-number").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(app, "GET", "/rooms").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["selected"], 331);
    assert_eq!(body["rooms"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn completion_alert_can_be_dismissed() {
    let (clock, state) = app_state();
    state.retarget_countdown(CountdownTarget::initial()).unwrap();
    clock.advance(Duration::seconds(10));
    let Tick::Completed { epoch } = state.tick_countdown().unwrap() else {
        panic!("fallback countdown should be done");
    };
    assert!(state.complete_countdown(epoch).unwrap());

    let app = create_router(Arc::clone(&state));
    let (_, body) = call(app.clone(), "GET", "/status").await;
    assert_eq!(body["alert"]["title"], "まもなく会議が終了します");
    assert_eq!(body["countdown"]["completed"], true);
    assert_eq!(body["countdown"]["percent"], 0.0);

    let (status, _) = call(app.clone(), "POST", "/alert/dismiss").await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = call(app, "GET", "/status").await;
    assert!(body["alert"].is_null());
}

#[tokio::test]
async fn refresh_wakes_the_resolver() {
    let (_, state) = app_state();
    let (status, _) = call(create_router(Arc::clone(&state)), "POST", "/refresh").await;
    assert_eq!(status, StatusCode::OK);

    // The stored permit completes the next wait immediately.
    tokio::time::timeout(std::time::Duration::from_millis(100), state.refresh_requested.notified())
        .await
        .expect("refresh permit stored");
}
