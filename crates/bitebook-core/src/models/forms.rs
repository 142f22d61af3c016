//! Request payloads for the auth endpoints.
//!
//! Registration and profile updates are role-shaped; the restaurant variants
//! travel as multipart forms with optional file attachments, which this crate
//! passes through untouched.

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Editable profile fields; unset fields are left out of the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An opaque file carried alongside form fields (restaurant logo, images).
#[derive(Debug, Clone)]
pub struct Attachment {
    pub field: String,
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

/// Field map plus attachments. Sent as JSON or multipart depending on the
/// endpoint.
#[derive(Debug, Clone, Default)]
pub struct FormPayload {
    pub fields: Map<String, Value>,
    pub attachments: Vec<Attachment>,
}

impl FormPayload {
    /// Build a payload from any struct that serializes to a JSON object.
    pub fn from_serialize<T: Serialize>(value: &T) -> serde_json::Result<Self> {
        let fields = match serde_json::to_value(value)? {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        Ok(Self {
            fields,
            attachments: Vec::new(),
        })
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn json_body(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    /// Flatten the field map into multipart text parts: arrays become one
    /// part per item and nulls are skipped.
    pub fn text_parts(&self) -> Vec<(String, String)> {
        let mut parts = Vec::new();
        for (key, value) in &self.fields {
            match value {
                Value::Null => {}
                Value::Array(items) => {
                    for item in items.iter().filter(|item| !item.is_null()) {
                        parts.push((key.clone(), text_value(item)));
                    }
                }
                other => parts.push((key.clone(), text_value(other))),
            }
        }
        parts
    }

    pub(crate) fn to_multipart(&self) -> reqwest::Result<Form> {
        let mut form = Form::new();
        for (key, value) in self.text_parts() {
            form = form.text(key, value);
        }
        for attachment in &self.attachments {
            let mut part = Part::bytes(attachment.bytes.clone()).file_name(attachment.file_name.clone());
            if let Some(ref mime) = attachment.mime {
                part = part.mime_str(mime)?;
            }
            form = form.part(attachment.field.clone(), part);
        }
        Ok(form)
    }
}

fn text_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_update_skips_unset_fields() {
        let update = ProfileUpdate {
            name: Some("Ann".to_string()),
            ..Default::default()
        };
        let payload = FormPayload::from_serialize(&update).unwrap();
        assert_eq!(payload.json_body(), json!({"name": "Ann"}));
    }

    #[test]
    fn test_text_parts_flatten_arrays_and_skip_nulls() {
        let payload = FormPayload::default()
            .field("name", "Pho 99")
            .field("seats", 40)
            .field("tags", json!(["noodles", null, "soup"]))
            .field("logo", Value::Null);

        let parts = payload.text_parts();
        assert_eq!(
            parts,
            vec![
                ("name".to_string(), "Pho 99".to_string()),
                ("seats".to_string(), "40".to_string()),
                ("tags".to_string(), "noodles".to_string()),
                ("tags".to_string(), "soup".to_string()),
            ]
        );
    }

    #[test]
    fn test_restaurant_registration_with_attachment() {
        let registration = RestaurantRegistration {
            name: "Pho 99".to_string(),
            email: "pho@x.com".to_string(),
            password: "secret".to_string(),
            phone: None,
            address: Some("1 Main St".to_string()),
            description: None,
        };
        let payload = FormPayload::from_serialize(&registration)
            .unwrap()
            .attach(Attachment {
                field: "logo".to_string(),
                file_name: "logo.png".to_string(),
                mime: Some("image/png".to_string()),
                bytes: vec![0x89, 0x50],
            });

        assert_eq!(payload.fields.len(), 4);
        assert_eq!(payload.attachments.len(), 1);
        assert!(payload.to_multipart().is_ok());
    }
}
