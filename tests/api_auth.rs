//! Integration tests per gli endpoints di autenticazione
//!
//! Test per:
//! - POST /auth/register
//! - POST /auth/login
//! - middleware di autenticazione

mod common;

#[cfg(test)]
mod auth_tests {
    use super::common::*;
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use sqlx::SqlitePool;

    #[sqlx::test]
    async fn test_register_then_login(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .post("/auth/register")
            .json(&json!({
                "username": "logintest",
                "display_name": "Login Test",
                "password": "TestLogin123"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["username"], "logintest");
        assert!(body.get("password").is_none());

        let response = server
            .post("/auth/login")
            .json(&json!({"username": "logintest", "password": "TestLogin123"}))
            .await;
        response.assert_status_ok();

        let headers = response.headers();
        assert!(headers.get("set-cookie").is_some());
        let authorization = headers
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .unwrap();
        assert!(authorization.starts_with("Bearer "));

        // il token ottenuto apre le rotte protette
        let token = authorization.trim_start_matches("Bearer ");
        server
            .get("/quizzes/creator")
            .authorization_bearer(token)
            .await
            .assert_status_ok();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_register_duplicate_username(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        server
            .post("/auth/register")
            .json(&json!({"username": "alice", "password": "Password123"}))
            .await
            .assert_status(StatusCode::CONFLICT);
        Ok(())
    }

    #[sqlx::test]
    async fn test_register_validates_payload(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        server
            .post("/auth/register")
            .json(&json!({"username": "ab", "password": "short"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[sqlx::test]
    async fn test_login_wrong_password(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        server
            .post("/auth/register")
            .json(&json!({"username": "dave", "password": "Password123"}))
            .await
            .assert_status(StatusCode::CREATED);

        server
            .post("/auth/login")
            .json(&json!({"username": "dave", "password": "Password124"}))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .post("/auth/login")
            .json(&json!({"username": "nobody", "password": "Password123"}))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_protected_routes_require_bearer(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        server
            .get("/quizzes")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .get("/quizzes")
            .authorization_bearer("not-a-token")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        // token firmato correttamente ma con username diverso da quello salvato
        server
            .get("/quizzes")
            .authorization_bearer(create_test_jwt(ALICE, "mallory"))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .get("/quizzes")
            .authorization_bearer(create_test_jwt(ALICE, "alice"))
            .await
            .assert_status_ok();
        Ok(())
    }

    #[sqlx::test]
    async fn test_root_health_check(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));
        server.get("/").await.assert_status_ok();
        Ok(())
    }
}
