use serde_json::{Map, Value};

use crate::errors::DispatchError;

/// Firebase service account credential
///
/// Only the fields the assertion flow needs are kept. Loaded fresh for each
/// dispatch and never written anywhere.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceAccountCredential {
    pub client_email: String,
    pub private_key: String,
    pub project_id: String,
    pub private_key_id: Option<String>,
}

impl ServiceAccountCredential {
    /// Parse a service account key document (the JSON downloaded from the
    /// Firebase console).
    pub fn load(raw_json: &str) -> Result<Self, DispatchError> {
        let value: Value = serde_json::from_str(raw_json)
            .map_err(|e| DispatchError::CredentialMalformed(format!("not valid JSON: {}", e)))?;

        let fields = value.as_object().ok_or_else(|| {
            DispatchError::CredentialMalformed("expected a JSON object".to_string())
        })?;

        let client_email = required_string(fields, "client_email")?;
        let private_key = normalize_newlines(&required_string(fields, "private_key")?);

        let project_id = match fields.get("project_id") {
            None | Some(Value::Null) => return Err(DispatchError::ProjectIdentifierMissing),
            Some(Value::String(id)) if id.trim().is_empty() => {
                return Err(DispatchError::ProjectIdentifierMissing)
            }
            Some(Value::String(id)) => id.clone(),
            Some(_) => {
                return Err(DispatchError::CredentialMalformed(
                    "project_id must be a string".to_string(),
                ))
            }
        };

        let private_key_id = fields
            .get("private_key_id")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            client_email,
            private_key,
            project_id,
            private_key_id,
        })
    }
}

// Keeps key material out of logs.
impl std::fmt::Debug for ServiceAccountCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountCredential")
            .field("client_email", &self.client_email)
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

fn required_string(fields: &Map<String, Value>, name: &str) -> Result<String, DispatchError> {
    match fields.get(name) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(DispatchError::CredentialMalformed(format!(
            "{} is empty",
            name
        ))),
        Some(_) => Err(DispatchError::CredentialMalformed(format!(
            "{} must be a string",
            name
        ))),
        None => Err(DispatchError::CredentialMalformed(format!(
            "missing {}",
            name
        ))),
    }
}

/// Secrets often pass through layers that escape newlines, leaving a literal
/// backslash-n in the PEM body.
pub fn normalize_newlines(private_key: &str) -> String {
    private_key.replace("\\n", "\n")
}
