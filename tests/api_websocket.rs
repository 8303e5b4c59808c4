//! Integration tests per il gateway WebSocket
//!
//! Il server viene avviato su una porta libera e i client si collegano con
//! tokio-tungstenite, come farebbe un client reale.

mod common;

#[cfg(test)]
mod ws_tests {
    use super::common::*;
    use futures_util::{SinkExt, StreamExt};
    use quiz_server::engine::InvitationStateMachine;
    use quiz_server::entities::InvitationStatus;
    use quiz_server::repositories::Read;
    use serde_json::{Value, json};
    use sqlx::SqlitePool;
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::net::TcpStream;
    use tokio_tungstenite::tungstenite::{Error as WsError, Message};
    use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

    type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

    async fn connect(addr: SocketAddr, user_id: i64, username: &str) -> Client {
        let token = create_test_jwt(user_id, username);
        let (client, _) = connect_async(format!("ws://{addr}/ws?token={token}"))
            .await
            .expect("WebSocket handshake failed");
        client
    }

    /// Prossimo frame di testo come JSON, ignorando ping e pong
    async fn next_json(client: &mut Client) -> Value {
        loop {
            let msg = tokio::time::timeout(Duration::from_secs(5), client.next())
                .await
                .expect("No message within timeout")
                .expect("Stream closed")
                .expect("WebSocket error");
            if let Message::Text(_) = msg {
                return serde_json::from_str(msg.to_text().unwrap()).unwrap();
            }
        }
    }

    async fn send_json(client: &mut Client, value: Value) {
        client
            .send(Message::Text(value.to_string().into()))
            .await
            .expect("Failed to send frame");
    }

    // ============================================================
    // Handshake
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_handshake_without_token_is_rejected(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let addr = spawn_server(state.clone()).await;

        for url in [
            format!("ws://{addr}/ws"),
            format!("ws://{addr}/ws?token=garbage"),
        ] {
            match connect_async(url).await {
                Err(WsError::Http(response)) => assert_eq!(response.status(), 401),
                Err(other) => panic!("unexpected error: {other}"),
                Ok(_) => panic!("handshake should fail"),
            }
        }
        assert_eq!(state.users_online.online_count(), 0);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_token_of_unknown_user_is_rejected(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let addr = spawn_server(state).await;
        let token = create_test_jwt(999, "ghost");

        match connect_async(format!("ws://{addr}/ws?token={token}")).await {
            Err(WsError::Http(response)) => assert_eq!(response.status(), 401),
            _ => panic!("handshake should fail"),
        }
        Ok(())
    }

    // ============================================================
    // Scenario 3 e 4 attraverso la connessione
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "quizzes")))]
    async fn test_invitation_round_trip(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let addr = spawn_server(state.clone()).await;

        let mut alice_ws = connect(addr, ALICE, "alice").await;
        let mut bob_ws = connect(addr, BOB, "bob").await;
        wait_for_connections(&state, ALICE, 1).await;
        wait_for_connections(&state, BOB, 1).await;

        let quiz = state.quiz.read(&1).await?.unwrap();
        let alice = load_user(&state, ALICE).await;
        let bob = load_user(&state, BOB).await;
        let invitation = InvitationStateMachine::new(&state)
            .invite(&quiz, &bob, &alice)
            .await
            .unwrap();

        let event = next_json(&mut bob_ws).await;
        assert_eq!(event["type"], "invitation");
        assert_eq!(event["quiz_id"], 1);
        assert_eq!(event["inviter"], "alice");
        assert_eq!(event["invitation_id"], invitation.invitation_id);

        send_json(
            &mut bob_ws,
            json!({
                "type": "invitation_response",
                "invitation_id": invitation.invitation_id,
                "status": "accept"
            }),
        )
        .await;

        let confirmation = next_json(&mut bob_ws).await;
        assert_eq!(
            confirmation,
            json!({
                "type": "response_confirmation",
                "invitation_id": invitation.invitation_id,
                "status": "accept",
                "message": "Your response has been recorded: accept"
            })
        );

        let response = next_json(&mut alice_ws).await;
        assert_eq!(response["type"], "invitation_response");
        assert_eq!(response["status"], "Accepted");
        assert_eq!(response["participant"], "bob");

        let stored = state.invitation.read(&invitation.invitation_id).await?.unwrap();
        assert_eq!(stored.status, InvitationStatus::Accepted);
        assert_eq!(state.attempt.find_many_by_quiz(&1).await?.len(), 1);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "quizzes", "invitations")))]
    async fn test_failed_response_returns_error_and_keeps_connection(
        pool: SqlitePool,
    ) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let addr = spawn_server(state.clone()).await;
        let mut carol_ws = connect(addr, CAROL, "carol").await;

        // l'invito 1 è di bob
        send_json(
            &mut carol_ws,
            json!({"type": "invitation_response", "invitation_id": 1, "status": "accept"}),
        )
        .await;
        let error = next_json(&mut carol_ws).await;
        assert_eq!(error["type"], "error");
        assert_eq!(error["invitation_id"], 1);
        assert_eq!(error["code"], 403);

        // invito inesistente
        send_json(
            &mut carol_ws,
            json!({"type": "invitation_response", "invitation_id": 77, "status": "decline"}),
        )
        .await;
        let error = next_json(&mut carol_ws).await;
        assert_eq!(error["code"], 404);

        // frame non valido
        carol_ws
            .send(Message::Text("not json".to_string().into()))
            .await
            .unwrap();
        let error = next_json(&mut carol_ws).await;
        assert_eq!(error["type"], "error");
        assert_eq!(error["code"], 400);
        assert!(error.get("invitation_id").is_none());

        assert_eq!(state.users_online.connection_count(CAROL), 1);
        assert_eq!(
            state.invitation.read(&1).await?.unwrap().status,
            InvitationStatus::Pending
        );
        Ok(())
    }

    // ============================================================
    // Più connessioni per utente
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "quizzes", "invitations")))]
    async fn test_every_connection_of_inviter_is_notified(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let addr = spawn_server(state.clone()).await;

        let mut first = connect(addr, ALICE, "alice").await;
        let mut second = connect(addr, ALICE, "alice").await;
        wait_for_connections(&state, ALICE, 2).await;

        let bob = load_user(&state, BOB).await;
        InvitationStateMachine::new(&state)
            .respond(1, InvitationStatus::Declined, &bob)
            .await
            .unwrap();
        let machine = InvitationStateMachine::new(&state);
        machine.expire(2).await.unwrap();

        // stesso ordine su entrambe le connessioni
        for client in [&mut first, &mut second] {
            let a = next_json(client).await;
            let b = next_json(client).await;
            assert_eq!(a["invitation_id"], 1);
            assert_eq!(a["status"], "Declined");
            assert_eq!(b["invitation_id"], 2);
            assert_eq!(b["status"], "Expired");
        }
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_closing_connection_leaves_group(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let addr = spawn_server(state.clone()).await;

        let mut first = connect(addr, BOB, "bob").await;
        let _second = connect(addr, BOB, "bob").await;
        wait_for_connections(&state, BOB, 2).await;

        first.close(None).await.unwrap();

        for _ in 0..200 {
            if state.users_online.connection_count(BOB) == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(state.users_online.connection_count(BOB), 1);
        assert!(state.users_online.is_user_online(BOB));
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_dropped_connection_leaves_group(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let addr = spawn_server(state.clone()).await;

        let client = connect(addr, BOB, "bob").await;
        wait_for_connections(&state, BOB, 1).await;

        // niente close frame: il socket TCP sparisce e basta
        drop(client);

        for _ in 0..200 {
            if state.users_online.connection_count(BOB) == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(state.users_online.connection_count(BOB), 0);
        assert!(!state.users_online.is_user_online(BOB));
        assert_eq!(state.users_online.online_count(), 0);
        Ok(())
    }
}
