#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveTime;
use serde_json::{json, Value};

use portainer_restarter::config::{Config, Credentials};

pub const API_KEY: &str = "test-api-key";
pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "password123";
pub const JWT: &str = "test-jwt-token";

/// Recorded traffic and knobs for the mock Portainer server.
pub struct MockState {
    pub containers: Mutex<Value>,
    pub auth_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub restarts: Mutex<Vec<(String, String)>>,
    pub fail_restart: AtomicBool,
}

/// A running mock Portainer instance on a random port.
pub struct MockPortainer {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
}

impl MockPortainer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn auth_calls(&self) -> usize {
        self.state.auth_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.state.list_calls.load(Ordering::SeqCst)
    }

    /// (endpoint_id, container_id) pairs restarted so far.
    pub fn restarts(&self) -> Vec<(String, String)> {
        self.state.restarts.lock().unwrap().clone()
    }

    pub fn set_fail_restart(&self, fail: bool) {
        self.state.fail_restart.store(fail, Ordering::SeqCst);
    }
}

/// The listing used by most tests: two containers, names in Docker's `/name` form.
pub fn default_containers() -> Value {
    json!([
        {
            "Id": "4f66ad9a0b2e8c1d7f3a5e6b9c0d1e2f3a4b5c6d7e8f9a0b1c2d3e4f5a6b7c8d",
            "Names": ["/nginx"],
            "State": "running"
        },
        {
            "Id": "9c0d1e2f3a4b5c6d7e8f9a0b1c2d3e4f5a6b7c8d4f66ad9a0b2e8c1d7f3a5e6b",
            "Names": ["/webapp"],
            "State": "running"
        }
    ])
}

pub async fn spawn_mock() -> MockPortainer {
    spawn_mock_with(default_containers()).await
}

pub async fn spawn_mock_with(containers: Value) -> MockPortainer {
    let state = Arc::new(MockState {
        containers: Mutex::new(containers),
        auth_calls: AtomicUsize::new(0),
        list_calls: AtomicUsize::new(0),
        restarts: Mutex::new(Vec::new()),
        fail_restart: AtomicBool::new(false),
    });

    let app = Router::new()
        .route("/api/auth", post(auth))
        .route(
            "/api/endpoints/{endpoint_id}/docker/containers/json",
            get(list_containers),
        )
        .route(
            "/api/endpoints/{endpoint_id}/docker/containers/{container_id}/restart",
            post(restart_container),
        )
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockPortainer { addr, state }
}

pub fn api_key_config(url: &str, container_name: &str) -> Config {
    test_config(url, container_name, Credentials::ApiKey(API_KEY.to_string()))
}

pub fn password_config(url: &str, container_name: &str) -> Config {
    test_config(
        url,
        container_name,
        Credentials::Password {
            username: USERNAME.to_string(),
            password: PASSWORD.to_string(),
        },
    )
}

pub fn test_config(url: &str, container_name: &str, credentials: Credentials) -> Config {
    Config {
        portainer_url: url.to_string(),
        credentials,
        endpoint_id: "2".to_string(),
        container_name: container_name.to_string(),
        restart_time: NaiveTime::from_hms_opt(3, 0, 0).unwrap(),
        check_interval: 60,
        log_level: "warn".to_string(),
    }
}

type SharedMock = Arc<MockState>;

async fn auth(
    State(state): State<SharedMock>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    state.auth_calls.fetch_add(1, Ordering::SeqCst);

    if body["username"] == USERNAME && body["password"] == PASSWORD {
        Ok(Json(json!({ "jwt": JWT })))
    } else {
        Err(StatusCode::UNPROCESSABLE_ENTITY)
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    let api_key = headers.get("x-api-key").and_then(|v| v.to_str().ok());
    let bearer = headers.get("authorization").and_then(|v| v.to_str().ok());
    api_key == Some(API_KEY) || bearer.is_some_and(|b| b == format!("Bearer {JWT}"))
}

async fn list_containers(
    State(state): State<SharedMock>,
    Path(_endpoint_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    state.list_calls.fetch_add(1, Ordering::SeqCst);

    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(state.containers.lock().unwrap().clone()))
}

async fn restart_container(
    State(state): State<SharedMock>,
    Path((endpoint_id, container_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> StatusCode {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED;
    }
    if state.fail_restart.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }

    state
        .restarts
        .lock()
        .unwrap()
        .push((endpoint_id, container_id));
    StatusCode::NO_CONTENT
}
