//! Serializable message snapshots for diagnostics.

use super::{normalize_part_name, Message, PropertyEntry};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::io;
use uuid::Uuid;

/// A point-in-time view of one part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartSnapshot {
    /// Part name as added to the message.
    pub name: String,
    /// Part identity.
    pub part_id: Uuid,
    /// Whether this part is the body.
    pub is_body: bool,
    /// Content type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Charset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    /// Stream content, base64 encoded. `None` if the part has no stream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_base64: Option<String>,
    /// Part properties in insertion order.
    #[serde(default)]
    pub properties: Vec<PropertyEntry>,
}

impl PartSnapshot {
    /// Decodes the captured stream content.
    ///
    /// # Errors
    ///
    /// Returns a decode error if `data_base64` is not valid base64.
    pub fn data(&self) -> Result<Option<Vec<u8>>, base64::DecodeError> {
        self.data_base64
            .as_deref()
            .map(|encoded| STANDARD.decode(encoded))
            .transpose()
    }
}

/// A point-in-time view of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSnapshot {
    /// Message identity.
    pub message_id: Uuid,
    /// Body part name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_part: Option<String>,
    /// Context properties in insertion order.
    #[serde(default)]
    pub context: Vec<PropertyEntry>,
    /// Parts in insertion order.
    #[serde(default)]
    pub parts: Vec<PartSnapshot>,
    /// Captured error text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MessageSnapshot {
    /// Captures a snapshot, reading every part stream from the start.
    ///
    /// Streams are left rewound.
    ///
    /// # Errors
    ///
    /// Returns an IO error if a part stream cannot be read.
    pub fn capture(message: &mut Message) -> io::Result<Self> {
        let body = message.body_part_name().map(normalize_part_name);
        let mut parts = Vec::with_capacity(message.part_count());

        for (name, part) in message.parts_mut() {
            let data_base64 = part.read_bytes()?.map(|bytes| STANDARD.encode(bytes));
            parts.push(PartSnapshot {
                name: name.to_string(),
                part_id: part.id(),
                is_body: body.as_deref() == Some(normalize_part_name(name).as_str()),
                content_type: part.content_type().map(String::from),
                charset: part.charset().map(String::from),
                data_base64,
                properties: part.properties().iter().cloned().collect(),
            });
        }

        Ok(Self {
            message_id: message.id(),
            body_part: message.body_part_name().map(String::from),
            context: message.context().iter().cloned().collect(),
            parts,
            error: message.error_info().map(ToString::to_string),
        })
    }

    /// Converts to a JSON value.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
