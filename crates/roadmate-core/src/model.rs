//! Wire and domain types exchanged with the RoadMateAssist backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Status of a roadside-assistance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestStatus {
    /// Raised by a driver, not yet taken by any mechanic.
    Pending,
    /// Accepted by the mechanic in `serviced_by`.
    InProgress,
    /// Paid and closed.
    Completed,
}

impl RequestStatus {
    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "inProgress",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// A roadside-assistance job raised by a driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    /// Server-assigned identifier.
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    /// Kind of help requested (e.g. "Flat Tire").
    #[serde(default)]
    pub request_type: String,

    /// Free-text description from the driver.
    #[serde(default)]
    pub details: String,

    pub status: RequestStatus,

    /// Mechanic currently holding the request, if any.
    #[serde(default)]
    pub serviced_by: Option<String>,

    /// Where the driver is.
    #[serde(default)]
    pub location: Option<Location>,

    /// Agreed fee, when the backend provides one.
    #[serde(default)]
    pub amount: Option<f64>,

    /// Last status change, server-assigned. Older records may lack it.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ServiceRequest {
    /// Whether `mechanic_id` holds this request.
    pub fn is_serviced_by(&self, mechanic_id: &str) -> bool {
        self.serviced_by.as_deref() == Some(mechanic_id)
    }

    /// Whether this request is in progress and held by `mechanic_id`.
    pub fn is_active_for(&self, mechanic_id: &str) -> bool {
        self.status == RequestStatus::InProgress && self.is_serviced_by(mechanic_id)
    }
}

/// Body of the status-transition PUTs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: RequestStatus,
    pub serviced_by: String,
}

impl StatusUpdate {
    pub fn new(status: RequestStatus, serviced_by: impl Into<String>) -> Self {
        Self {
            status,
            serviced_by: serviced_by.into(),
        }
    }
}

/// Online flag as sent to the presence endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnlineStatus {
    Online,
    Offline,
}

impl OnlineStatus {
    pub fn from_flag(online: bool) -> Self {
        if online {
            Self::Online
        } else {
            Self::Offline
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }
}

/// The signed-in mechanic as returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mechanic {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    /// Human-facing business key (e.g. "MECH-00123").
    #[serde(default)]
    pub personal_number: String,

    /// Availability for new requests. The backend sends either a boolean
    /// or the strings "online"/"offline".
    #[serde(default, deserialize_with = "deserialize_online_flag")]
    pub online: bool,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    /// Bearer token for the chat endpoints.
    #[serde(default)]
    pub token: Option<String>,
}

impl Mechanic {
    pub fn new(id: impl Into<String>, personal_number: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            personal_number: personal_number.into(),
            online: false,
            username: None,
            phone: None,
            token: None,
        }
    }

    /// Name to greet the mechanic with.
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.personal_number)
    }
}

fn deserialize_online_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Text(s)) => s.eq_ignore_ascii_case("online") || s.eq_ignore_ascii_case("true"),
        None => false,
    })
}

/// A two-party conversation between a mechanic and a driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    #[serde(default)]
    pub members: Vec<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub last_message: Option<String>,
}

impl Conversation {
    pub fn has_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m == user_id)
    }

    /// The participant that is not `me`.
    pub fn other_member(&self, me: &str) -> Option<&str> {
        self.members.iter().map(String::as_str).find(|m| *m != me)
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Driver Chat")
    }
}

/// A chat message, either persisted by the backend or received live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Present once the backend has persisted the message.
    #[serde(rename = "_id", alias = "id", default)]
    pub id: Option<String>,

    #[serde(default)]
    pub conversation_id: Option<String>,

    pub sender_id: String,

    pub message_text: String,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// A message received over the realtime channel, stamped locally.
    pub fn live(sender_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: None,
            conversation_id: None,
            sender_id: sender_id.into(),
            message_text: text.into(),
            created_at: Utc::now(),
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

/// Body of `POST /message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub conversation_id: String,
    pub message_text: String,
}

/// Public profile of a chat participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub email: Option<String>,
}

/// Body of `POST /stk/stkpush`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub phone: String,
    pub amount: String,
    pub request_id: String,
}

/// Response of the push-payment endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    /// Set by the gateway when the push was accepted.
    #[serde(rename = "ResponseDescription", default)]
    pub response_description: Option<String>,

    #[serde(rename = "CheckoutRequestID", default)]
    pub checkout_request_id: Option<String>,
}

impl PaymentReceipt {
    /// A push counts as accepted only with a non-blank description.
    pub fn is_accepted(&self) -> bool {
        self.response_description
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty())
    }
}

/// Login credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub personal_number: String,
    pub password: String,
    /// Identity-provider user id, when signed in there.
    #[serde(rename = "mechCLkId", skip_serializing_if = "Option::is_none")]
    pub identity_id: Option<String>,
}

/// Body of `POST /api/auth/verify-reset-code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetCode {
    pub personal_number: String,
    pub code: String,
}

/// Body of `POST /api/auth/reset-password`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordReset {
    pub personal_number: String,
    pub new_password: String,
}

/// Generic acknowledgement carrying an optional message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&RequestStatus::InProgress).unwrap(),
            "\"inProgress\""
        );
        let status: RequestStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(status, RequestStatus::Completed);
        assert_eq!(RequestStatus::Pending.to_string(), "pending");
    }

    #[test]
    fn test_request_from_backend_json() {
        let json = r#"{
            "_id": "R1",
            "requestType": "Flat Tire",
            "details": "rear left",
            "status": "inProgress",
            "servicedBy": "M1",
            "location": {"latitude": -1.28, "longitude": 36.82},
            "updatedAt": "2025-03-01T10:00:00.000Z"
        }"#;
        let request: ServiceRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.id, "R1");
        assert!(request.is_active_for("M1"));
        assert!(!request.is_active_for("M2"));
        assert!(request.amount.is_none());
    }

    #[test]
    fn test_pending_request_has_no_servicer() {
        let json = r#"{"id": "R2", "status": "pending", "servicedBy": null,
                       "updatedAt": "2025-03-01T10:00:00Z"}"#;
        let request: ServiceRequest = serde_json::from_str(json).unwrap();
        assert!(request.serviced_by.is_none());
        assert!(!request.is_serviced_by("M1"));
    }

    #[test]
    fn test_missing_timestamp_keeps_list_decodable() {
        let json = r#"[
            {"_id": "R1", "status": "pending"},
            {"_id": "R2", "status": "completed", "servicedBy": "M1",
             "updatedAt": "2025-03-01T10:00:00Z"}
        ]"#;
        let requests: Vec<ServiceRequest> = serde_json::from_str(json).unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].updated_at.is_none());
        assert!(requests[1].updated_at.is_some());
    }

    #[test]
    fn test_mechanic_online_flag_variants() {
        let m: Mechanic =
            serde_json::from_str(r#"{"_id": "M1", "personalNumber": "MECH-1", "online": "online"}"#)
                .unwrap();
        assert!(m.online);

        let m: Mechanic = serde_json::from_str(r#"{"_id": "M1", "online": false}"#).unwrap();
        assert!(!m.online);

        let m: Mechanic = serde_json::from_str(r#"{"_id": "M1"}"#).unwrap();
        assert!(!m.online);
        assert_eq!(m.display_name(), "");
    }

    #[test]
    fn test_conversation_other_member() {
        let conv = Conversation {
            id: "C1".to_string(),
            members: vec!["M1".to_string(), "D1".to_string()],
            title: None,
            last_message: None,
        };
        assert_eq!(conv.other_member("M1"), Some("D1"));
        assert!(conv.has_member("D1"));
        assert!(!conv.has_member("D2"));
        assert_eq!(conv.display_title(), "Driver Chat");
    }

    #[test]
    fn test_payment_receipt_acceptance() {
        let ok: PaymentReceipt =
            serde_json::from_str(r#"{"ResponseDescription": "Success. Request accepted"}"#).unwrap();
        assert!(ok.is_accepted());

        let blank: PaymentReceipt = serde_json::from_str(r#"{"ResponseDescription": "  "}"#).unwrap();
        assert!(!blank.is_accepted());

        let missing: PaymentReceipt = serde_json::from_str("{}").unwrap();
        assert!(!missing.is_accepted());
    }

    #[test]
    fn test_credentials_wire_names() {
        let creds = Credentials {
            personal_number: "MECH-1".to_string(),
            password: "pw".to_string(),
            identity_id: Some("user_abc".to_string()),
        };
        let value = serde_json::to_value(&creds).unwrap();
        assert_eq!(value["personalNumber"], "MECH-1");
        assert_eq!(value["mechCLkId"], "user_abc");
    }

    #[test]
    fn test_chat_message_without_timestamp_defaults_to_now() {
        let before = Utc::now();
        let msg: ChatMessage =
            serde_json::from_str(r#"{"senderId": "D1", "messageText": "hi"}"#).unwrap();
        assert!(msg.created_at >= before);
        assert!(!msg.is_persisted());
    }
}
