//! WebSocket Event DTOs - Messaggi scambiati sulla connessione persistente
//!
//! Ogni frame è un oggetto JSON con un campo `type` che identifica la variante:
//! `{ "type": "invitation_response", "invitation_id": 3, "status": "accept" }`

use crate::entities::InvitationStatus;
use serde::{Deserialize, Serialize};

/// Comandi in ingresso dal client
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    InvitationResponse {
        invitation_id: i64,
        status: ResponseAction,
    },
}

/// Risposta del partecipante ad un invito
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseAction {
    Accept,
    Decline,
}

impl ResponseAction {
    pub fn target_status(self) -> InvitationStatus {
        match self {
            ResponseAction::Accept => InvitationStatus::Accepted,
            ResponseAction::Decline => InvitationStatus::Declined,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResponseAction::Accept => "accept",
            ResponseAction::Decline => "decline",
        }
    }

    /// Path segment of the HTTP fallback (`/invitations/{id}/accept`)
    pub fn from_path(action: &str) -> Option<Self> {
        match action {
            "accept" => Some(ResponseAction::Accept),
            "decline" => Some(ResponseAction::Decline),
            _ => None,
        }
    }
}

/// Eventi in uscita verso il client
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Inviato al partecipante quando viene invitato
    Invitation {
        invitation_id: i64,
        quiz_id: i64,
        quiz_title: String,
        inviter: String,
        message: String,
    },
    /// Inviato a chi ha invitato, dopo ogni transizione terminale
    InvitationResponse {
        invitation_id: i64,
        quiz_id: i64,
        quiz_title: String,
        participant: String,
        status: String,
        message: String,
    },
    /// Conferma al mittente di un `invitation_response` andato a buon fine
    ResponseConfirmation {
        invitation_id: i64,
        status: ResponseAction,
        message: String,
    },
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        invitation_id: Option<i64>,
        code: u16,
        message: String,
    },
}

impl ServerEvent {
    pub fn confirmation(invitation_id: i64, status: ResponseAction) -> Self {
        ServerEvent::ResponseConfirmation {
            invitation_id,
            status,
            message: format!("Your response has been recorded: {}", status.as_str()),
        }
    }

    pub fn error(invitation_id: Option<i64>, code: u16, message: impl Into<String>) -> Self {
        ServerEvent::Error {
            invitation_id,
            code,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_invitation_response_command() {
        let event: ClientEvent = serde_json::from_value(json!({
            "type": "invitation_response",
            "invitation_id": 12,
            "status": "decline"
        }))
        .unwrap();

        assert_eq!(
            event,
            ClientEvent::InvitationResponse {
                invitation_id: 12,
                status: ResponseAction::Decline
            }
        );
    }

    #[test]
    fn rejects_unknown_type_and_status() {
        assert!(serde_json::from_str::<ClientEvent>(r#"{"type":"chat","invitation_id":1}"#).is_err());
        assert!(
            serde_json::from_str::<ClientEvent>(
                r#"{"type":"invitation_response","invitation_id":1,"status":"maybe"}"#
            )
            .is_err()
        );
    }

    #[test]
    fn confirmation_serializes_with_type_tag() {
        let value = serde_json::to_value(ServerEvent::confirmation(4, ResponseAction::Accept)).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "response_confirmation",
                "invitation_id": 4,
                "status": "accept",
                "message": "Your response has been recorded: accept"
            })
        );
    }

    #[test]
    fn error_without_invitation_omits_the_field() {
        let value = serde_json::to_value(ServerEvent::error(None, 400, "Malformed message")).unwrap();
        assert_eq!(value["type"], "error");
        assert!(value.get("invitation_id").is_none());
    }

    #[test]
    fn actions_map_to_terminal_statuses() {
        assert_eq!(ResponseAction::Accept.target_status(), InvitationStatus::Accepted);
        assert_eq!(ResponseAction::from_path("decline"), Some(ResponseAction::Decline));
        assert_eq!(ResponseAction::from_path("expire"), None);
    }
}
