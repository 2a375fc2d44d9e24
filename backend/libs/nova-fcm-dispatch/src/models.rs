use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Marker the Flutter client uses to route taps on legacy notifications
pub const LEGACY_CLICK_ACTION: &str = "FLUTTER_NOTIFICATION_CLICK";

const DEFAULT_SOUND: &str = "default";
const HIGH_PRIORITY: &str = "high";

/// Inbound push request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushRequest {
    pub recipient_id: Option<String>,
    pub fcm_token: Option<String>,
    pub title: String,
    pub message: String,
    pub data: Option<Map<String, Value>>,
}

/// Platform-neutral push message, ready to be put on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    pub token: String,
    pub title: String,
    pub body: String,
    pub data: BTreeMap<String, String>,
}

impl PushMessage {
    pub fn new(token: String, request: &PushRequest) -> Self {
        Self {
            token,
            title: request.title.clone(),
            body: request.message.clone(),
            data: stringify_data(request.data.as_ref()),
        }
    }
}

/// FCM only accepts string data values. Strings pass through, nulls are
/// dropped, anything else becomes its compact JSON text.
pub fn stringify_data(data: Option<&Map<String, Value>>) -> BTreeMap<String, String> {
    data.map(|fields| {
        fields
            .iter()
            .filter_map(|(key, value)| match value {
                Value::Null => None,
                Value::String(s) => Some((key.clone(), s.clone())),
                other => Some((key.clone(), other.to_string())),
            })
            .collect()
    })
    .unwrap_or_default()
}

/// FCM HTTP v1 send request
#[derive(Debug, Serialize)]
pub struct FcmV1Request {
    pub message: FcmV1Message,
}

#[derive(Debug, Serialize)]
pub struct FcmV1Message {
    pub token: String,
    pub notification: FcmNotification,
    pub data: BTreeMap<String, String>,
    pub android: AndroidConfig,
    pub apns: ApnsConfig,
}

/// FCM Notification Payload
#[derive(Debug, Serialize)]
pub struct FcmNotification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct AndroidConfig {
    pub priority: String,
    pub notification: AndroidNotification,
}

#[derive(Debug, Serialize)]
pub struct AndroidNotification {
    pub sound: String,
    pub notification_count: u32,
}

#[derive(Debug, Serialize)]
pub struct ApnsConfig {
    pub payload: ApnsPayload,
}

#[derive(Debug, Serialize)]
pub struct ApnsPayload {
    pub aps: Aps,
}

#[derive(Debug, Serialize)]
pub struct Aps {
    pub badge: u32,
    pub sound: String,
}

impl From<&PushMessage> for FcmV1Request {
    // Both platform blocks go out on every message; the target platform is
    // not known here.
    fn from(message: &PushMessage) -> Self {
        Self {
            message: FcmV1Message {
                token: message.token.clone(),
                notification: FcmNotification {
                    title: message.title.clone(),
                    body: message.body.clone(),
                },
                data: message.data.clone(),
                android: AndroidConfig {
                    priority: HIGH_PRIORITY.to_string(),
                    notification: AndroidNotification {
                        sound: DEFAULT_SOUND.to_string(),
                        notification_count: 1,
                    },
                },
                apns: ApnsConfig {
                    payload: ApnsPayload {
                        aps: Aps {
                            badge: 1,
                            sound: DEFAULT_SOUND.to_string(),
                        },
                    },
                },
            },
        }
    }
}

/// FCM legacy HTTP send request
#[derive(Debug, Serialize)]
pub struct LegacyFcmRequest {
    pub to: String,
    pub notification: LegacyNotification,
    pub data: BTreeMap<String, String>,
    pub priority: String,
}

#[derive(Debug, Serialize)]
pub struct LegacyNotification {
    pub title: String,
    pub body: String,
    pub sound: String,
    pub badge: u32,
}

impl From<&PushMessage> for LegacyFcmRequest {
    fn from(message: &PushMessage) -> Self {
        let mut data = message.data.clone();
        data.insert("click_action".to_string(), LEGACY_CLICK_ACTION.to_string());

        Self {
            to: message.token.clone(),
            notification: LegacyNotification {
                title: message.title.clone(),
                body: message.body.clone(),
                sound: DEFAULT_SOUND.to_string(),
                badge: 1,
            },
            data,
            priority: HIGH_PRIORITY.to_string(),
        }
    }
}
