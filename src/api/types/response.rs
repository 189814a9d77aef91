//! Response envelope

use serde::Serialize;

use crate::domain::MessageEntry;

pub const STATUS_SUCCESS: i32 = 0;
pub const STATUS_ERROR: i32 = 1;

/// Body returned for failures and for operations without a record to return
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_desc: Option<String>,
    pub message_list: Vec<MessageEntry>,
}

impl ResponseEnvelope {
    pub fn success(msg_desc: impl Into<String>) -> Self {
        Self {
            status_code: STATUS_SUCCESS,
            msg_desc: Some(msg_desc.into()),
            message_list: Vec::new(),
        }
    }

    pub fn error(msg_desc: impl Into<String>) -> Self {
        Self {
            status_code: STATUS_ERROR,
            msg_desc: Some(msg_desc.into()),
            message_list: Vec::new(),
        }
    }

    pub fn with_message(mut self, entry: MessageEntry) -> Self {
        self.message_list.push(entry);
        self
    }
}
