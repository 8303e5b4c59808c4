#![allow(dead_code)]

use axum_test::TestServer;
use quiz_server::core::AppState;
use quiz_server::entities::User;
use quiz_server::repositories::Read;
use sqlx::SqlitePool;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

pub const JWT_SECRET: &str = "ilmiobellissimosegretochevaassolutamentecambiato";

/// Utenti dei fixtures
pub const ALICE: i64 = 1;
pub const BOB: i64 = 2;
pub const CAROL: i64 = 3;

/// Crea un AppState per i test
pub fn create_test_state(pool: SqlitePool) -> Arc<AppState> {
    Arc::new(AppState::new(pool, JWT_SECRET.to_string()))
}

/// Crea un TestServer per i test
pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    let app = quiz_server::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

/// Avvia il server su una porta libera, per i test che usano un client WebSocket reale
pub async fn spawn_server(state: Arc<AppState>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener without address");
    let app = quiz_server::create_router(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server failed");
    });
    addr
}

/// Genera un JWT token per testing, valido per 24 ore
pub fn create_test_jwt(user_id: i64, username: &str) -> String {
    quiz_server::auth::encode_jwt(username.to_string(), user_id, JWT_SECRET)
        .expect("Failed to create JWT token")
}

pub async fn load_user(state: &AppState, user_id: i64) -> User {
    state
        .user
        .read(&user_id)
        .await
        .expect("Database error")
        .expect("Fixture user missing")
}

/// Attende che l'utente abbia almeno `count` connessioni nel suo gruppo
pub async fn wait_for_connections(state: &AppState, user_id: i64, count: usize) {
    for _ in 0..200 {
        if state.users_online.connection_count(user_id) >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("user {user_id} never reached {count} connections");
}
