//! Call and chat transcript logging

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::IntegrationError;

/// Channel the transcript came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modality {
    Call,
    Chatbot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallLogEntry {
    pub modality: Modality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub transcript: String,
    /// Provider post-call analysis, when the event carried one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Value>,
}

impl CallLogEntry {
    pub fn chatbot(conversation_id: impl Into<String>, transcript: impl Into<String>) -> Self {
        Self {
            modality: Modality::Chatbot,
            conversation_id: Some(conversation_id.into()),
            phone_number: None,
            transcript: transcript.into(),
            analysis: None,
        }
    }

    pub fn call(phone_number: impl Into<String>, transcript: impl Into<String>) -> Self {
        Self {
            modality: Modality::Call,
            conversation_id: None,
            phone_number: Some(phone_number.into()),
            transcript: transcript.into(),
            analysis: None,
        }
    }

    pub fn with_conversation_id(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn with_analysis(mut self, analysis: Value) -> Self {
        self.analysis = Some(analysis);
        self
    }
}

/// Transcript sink. Callers treat failures as non-fatal.
#[async_trait]
pub trait CallLogger: Send + Sync {
    async fn log(&self, entry: &CallLogEntry) -> Result<(), IntegrationError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chatbot_entry_wire_shape() {
        let entry = CallLogEntry::chatbot("conv_1", "user: hi");
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({"modality": "Chatbot", "conversation_id": "conv_1", "transcript": "user: hi"})
        );
    }

    #[test]
    fn test_call_entry_with_analysis() {
        let entry = CallLogEntry::call("NA", "agent: hi")
            .with_analysis(json!({"call_successful": true}));
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({
                "modality": "Call",
                "phone_number": "NA",
                "transcript": "agent: hi",
                "analysis": {"call_successful": true}
            })
        );
    }
}
