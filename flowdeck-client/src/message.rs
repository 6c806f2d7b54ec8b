//! Inbound stream message envelope.

use flowdeck_engine::adapter::StreamMessage;
use flowdeck_engine::entity::Entity;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ClientError;

/// The collection a message addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Flows,
    Events,
    Settings,
    State,
}

/// The mutation a message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamCmd {
    Add,
    Update,
    Remove,
    Reset,
}

/// Transport-agnostic message envelope.
///
/// `data` is an entity for `add`/`update`, an id string for `remove`, and
/// an entity list (or null, meaning empty) for `reset`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub resource: ResourceKind,
    pub cmd: StreamCmd,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    /// Parse an envelope from raw transport text.
    pub fn parse(text: &str) -> Result<Self, ClientError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Decode the payload into a typed engine message.
    pub fn into_message<T>(self) -> Result<StreamMessage<T>, ClientError>
    where
        T: Entity + DeserializeOwned,
    {
        match self.cmd {
            StreamCmd::Add => Ok(StreamMessage::Add(serde_json::from_value(self.data)?)),
            StreamCmd::Update => Ok(StreamMessage::Update(serde_json::from_value(self.data)?)),
            StreamCmd::Remove => {
                let id: String = serde_json::from_value(self.data)?;
                Ok(StreamMessage::Remove(id))
            }
            StreamCmd::Reset => {
                if self.data.is_null() {
                    Ok(StreamMessage::Reset(Vec::new()))
                } else {
                    Ok(StreamMessage::Reset(serde_json::from_value(self.data)?))
                }
            }
        }
    }
}
