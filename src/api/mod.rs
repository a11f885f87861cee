use serde::{Deserialize, Serialize};

/// One entry of the bounded conversation context sent to the model backend.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct TurnMessage {
    pub role: String,
    pub text: String,
}

/// Request body for one streamed turn.
///
/// The backend owns transport details; this crate only promises the shape
/// of the body and that response chunks are consumed in arrival order.
#[derive(Serialize, Clone, Debug)]
pub struct TurnRequest {
    pub model: String,
    pub provider: String,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,
    pub messages: Vec<TurnMessage>,
    pub stream: bool,
}

/// A function invocation embedded in the model response stream.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FunctionCall {
    #[serde(rename = "actionId")]
    pub action_id: String,
}

/// One server-sent chunk of a streamed response: a text delta, a function
/// call payload, or both.
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct StreamChunk {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, rename = "functionCalls")]
    pub function_calls: Option<Vec<FunctionCall>>,
}
