//! Message types for the conversation sequence
//!
//! A conversation is an ordered list of [`Message`]s. Assistant messages may
//! carry [`ToolCall`] requests; each request is answered by exactly one
//! `tool`-role message that points back at the call through `tool_call_id`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions
    System,
    /// User message
    User,
    /// Assistant message
    Assistant,
    /// Result of a tool invocation
    Tool,
}

/// A model-requested tool invocation
///
/// `arguments` keeps the raw JSON text the model produced. Decoding happens at
/// dispatch time so a malformed payload becomes a data error for that one call
/// instead of failing the whole response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Opaque id, unique within one loop run
    pub id: String,
    /// Name of the requested tool
    pub name: String,
    /// Raw JSON argument payload
    pub arguments: String,
}

impl ToolCall {
    /// Create a tool call from raw argument text
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Create a tool call from an already structured payload
    pub fn with_json(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: &serde_json::Value,
    ) -> Self {
        Self::new(id, name, arguments.to_string())
    }

    /// Decode the arguments into a typed parameter struct
    ///
    /// An empty payload is treated as `{}`.
    pub fn decode_arguments<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        let raw = self.arguments.trim();
        serde_json::from_str(if raw.is_empty() { "{}" } else { raw })
    }
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message role
    pub role: Role,

    /// Text content (may be empty when only tool calls are carried)
    #[serde(default)]
    pub content: String,

    /// Tool calls requested by an assistant message
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,

    /// Id of the call a tool message answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    fn plain(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: text.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Create a system message with text
    pub fn system(text: impl Into<String>) -> Self {
        Self::plain(Role::System, text)
    }

    /// Create a user message with text
    pub fn user(text: impl Into<String>) -> Self {
        Self::plain(Role::User, text)
    }

    /// Create an assistant message with text
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::plain(Role::Assistant, text)
    }

    /// Create an assistant message that requests tool calls
    pub fn assistant_with_tool_calls(text: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::plain(Role::Assistant, text)
        }
    }

    /// Create a tool-result message answering `tool_call_id`
    pub fn tool_result(tool_call_id: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::plain(Role::Tool, result)
        }
    }

    /// Text content of the message
    pub fn text(&self) -> &str {
        &self.content
    }

    /// Check if this message requests any tool calls
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// User or assistant turn (the only roles kept in conversation history)
    pub fn is_conversational(&self) -> bool {
        matches!(self.role, Role::User | Role::Assistant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct TickerArgs {
        ticker: String,
    }

    #[test]
    fn test_user_message() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text(), "Hello");
        assert!(msg.is_conversational());
    }

    #[test]
    fn test_tool_result() {
        let msg = Message::tool_result("call_123", "result");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_123"));
        assert!(!msg.has_tool_calls());
        assert!(!msg.is_conversational());
    }

    #[test]
    fn test_assistant_with_tool_calls() {
        let call = ToolCall::with_json("call_1", "get_stock_price", &json!({"ticker": "AAPL"}));
        let msg = Message::assistant_with_tool_calls("", vec![call]);
        assert!(msg.has_tool_calls());
        assert_eq!(msg.text(), "");

        let args: TickerArgs = msg.tool_calls[0].decode_arguments().unwrap();
        assert_eq!(args.ticker, "AAPL");
    }

    #[test]
    fn test_decode_arguments_failure_is_data_error() {
        let call = ToolCall::new("call_1", "get_stock_price", "{not json");
        assert!(call.decode_arguments::<TickerArgs>().is_err());

        let missing = ToolCall::new("call_2", "get_stock_price", "");
        assert!(missing.decode_arguments::<TickerArgs>().is_err());
        assert!(missing.decode_arguments::<serde_json::Value>().is_ok());
    }

    #[test]
    fn test_message_serialization() {
        let msg = Message::user("Test");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("tool_calls"));
        let deserialized: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, msg);
    }

    #[test]
    fn test_history_entry_without_content_field() {
        let msg: Message = serde_json::from_value(json!({"role": "assistant"})).unwrap();
        assert_eq!(msg.role, Role::Assistant);
        assert!(msg.content.is_empty());
    }
}
