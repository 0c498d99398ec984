//! `SpotifyClient` as the engine's transport, against a mock proxy.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use vibecontrol::{
    CommandKind, EngineConfig, EngineEvent, PlaybackEngine, RemoteTransport, TransportError,
};
use vibespotify::SpotifyClient;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn track_json(id: &str, name: &str, duration: u64) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "duration_ms": duration,
        "artists": [{"name": "Junko Yagami"}],
        "image": format!("https://i.scdn.co/image/{}", id),
        "external_url": format!("https://open.spotify.com/track/{}", id)
    })
}

fn client_for(server: &MockServer) -> SpotifyClient {
    SpotifyClient::builder()
        .api_base(format!("{}/api/spotify", server.uri()))
        .build()
        .unwrap()
}

async fn mount_current(server: &MockServer, status: u16, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/spotify/currently-playing"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_current_maps_snapshot() {
    let mock_server = MockServer::start().await;
    mount_current(
        &mock_server,
        200,
        json!({
            "is_playing": true,
            "progress_ms": 61000,
            "item": track_json("t1", "Bay City", 250000)
        }),
    )
    .await;

    let client = client_for(&mock_server);
    let snapshot = client.fetch_current().await.unwrap().unwrap();

    assert!(snapshot.is_playing);
    assert_eq!(snapshot.progress_ms, 61000);
    assert_eq!(snapshot.track.name, "Bay City");
}

#[tokio::test]
async fn test_fetch_current_nothing_playing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/spotify/currently-playing"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    assert!(client.fetch_current().await.unwrap().is_none());
}

#[tokio::test]
async fn test_fetch_queue_and_recently_played() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/spotify/queue"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "queue": [track_json("q1", "Purple Wind", 200000), track_json("q2", "Yellow Magic Carnival", 210000)]
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/spotify/recently-played"))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"played_at": "2024-05-01T21:14:03Z", "track": track_json("r1", "Mr. Brown", 230000)}]
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let queue = client.fetch_queue().await.unwrap();
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.head(1)[0].name, "Purple Wind");

    let history = client.fetch_recently_played(3).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].track.name, "Mr. Brown");
}

#[tokio::test]
async fn test_send_command_routes() {
    let mock_server = MockServer::start().await;
    for (verb, route) in [
        ("PUT", "/api/spotify/player/play"),
        ("PUT", "/api/spotify/player/pause"),
        ("POST", "/api/spotify/player/next"),
        ("POST", "/api/spotify/player/previous"),
    ] {
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let client = client_for(&mock_server);
    client.send_play().await.unwrap();
    client.send_pause().await.unwrap();
    client.send_command(CommandKind::Next).await.unwrap();
    client.send_command(CommandKind::Previous).await.unwrap();
}

#[tokio::test]
async fn test_error_taxonomy() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/spotify/player/play"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/spotify/player/pause"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/api/auth/login"))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/spotify/player/next"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"detail": "Missing permissions."})),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/spotify/player/previous"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    assert!(client.send_play().await.unwrap_err().is_unauthorized());
    assert!(client.send_pause().await.unwrap_err().is_unauthorized());
    assert!(matches!(
        client.send_next().await.unwrap_err(),
        TransportError::Transient(_)
    ));
    assert!(matches!(
        client.send_previous().await.unwrap_err(),
        TransportError::Transient(_)
    ));
}

#[tokio::test]
async fn test_connection_failure_is_transient() {
    let client = SpotifyClient::builder()
        .api_base("http://127.0.0.1:9/api/spotify")
        .timeout(Duration::from_secs(1))
        .build()
        .unwrap();

    let err = client.fetch_current().await.unwrap_err();
    assert!(!err.is_unauthorized());
}

#[tokio::test]
async fn test_engine_over_mock_proxy() {
    let mock_server = MockServer::start().await;
    mount_current(
        &mock_server,
        200,
        json!({
            "is_playing": true,
            "progress_ms": 5000,
            "item": track_json("t1", "Midnight Pretenders", 271000)
        }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/spotify/queue"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"queue": []})))
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/spotify/player/pause"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let engine = PlaybackEngine::new(Arc::new(client_for(&mock_server)), EngineConfig::default());
    engine.activate();
    engine.refresh_now().await.unwrap();

    let view = engine.view();
    assert_eq!(view.track.as_ref().unwrap().name, "Midnight Pretenders");
    assert!(view.is_playing);

    engine.pause().await.unwrap();
    assert!(!engine.view().is_playing);

    engine.deactivate();
}

#[tokio::test]
async fn test_engine_reports_expired_session() {
    let mock_server = MockServer::start().await;
    mount_current(&mock_server, 401, json!({"detail": "Not authenticated"})).await;
    Mock::given(method("GET"))
        .and(path("/api/spotify/queue"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let engine = PlaybackEngine::new(Arc::new(client_for(&mock_server)), EngineConfig::default());
    let mut events = engine.events();
    engine.activate();
    engine.refresh_now().await.unwrap();

    let mut unauthorized = 0;
    while let Ok(event) = events.try_recv() {
        if matches!(event, EngineEvent::Unauthorized { .. }) {
            unauthorized += 1;
        }
    }
    assert!(unauthorized >= 2, "one event per rejected read");
    assert!(engine.view().track.is_none());
}
