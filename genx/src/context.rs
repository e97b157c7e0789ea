//! Model context for LLM conversations.
//!
//! This module provides types for building and managing conversation context
//! that can be passed to LLM generators.

use serde::{Deserialize, Serialize};

use crate::tool::{AnyTool, FuncTool, Tool};
use crate::types::{FuncCall, Message, Part, Payload, Role, ToolCall, ToolResult};

/// A prompt with a name and text content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    /// Name/identifier for this prompt
    pub name: String,
    /// Text content of the prompt
    pub text: String,
}

impl Prompt {
    /// Create a new prompt.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Parameters for model generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// Maximum number of tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i32>,

    /// Frequency penalty (0.0 to 2.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,

    /// Number of completions to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<i32>,

    /// Temperature (0.0 to 2.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Top-p sampling (0.0 to 1.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Presence penalty (0.0 to 2.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,

    /// Top-k sampling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<f32>,
}

impl ModelParams {
    /// Create new default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max tokens.
    pub fn with_max_tokens(mut self, max_tokens: i32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set top-p.
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Set top-k.
    pub fn with_top_k(mut self, top_k: f32) -> Self {
        self.top_k = Some(top_k);
        self
    }
}

/// Trait for accessing model context.
pub trait ModelContext: Send + Sync {
    /// Iterate over prompts.
    fn prompts(&self) -> Box<dyn Iterator<Item = &Prompt> + '_>;

    /// Iterate over messages.
    fn messages(&self) -> Box<dyn Iterator<Item = &Message> + '_>;

    /// Iterate over chain-of-thought entries.
    fn cots(&self) -> Box<dyn Iterator<Item = &str> + '_>;

    /// Iterate over tools.
    fn tools(&self) -> Box<dyn Iterator<Item = &dyn Tool> + '_>;

    /// Get model parameters.
    fn params(&self) -> Option<&ModelParams>;
}

/// Builder for constructing model context.
#[derive(Debug, Default)]
pub struct ModelContextBuilder {
    prompts: Vec<Prompt>,
    messages: Vec<Message>,
    cots: Vec<String>,
    tools: Vec<AnyTool>,
    params: Option<ModelParams>,
}

impl ModelContextBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the model context.
    pub fn build(self) -> impl ModelContext {
        BuiltModelContext {
            prompts: self.prompts,
            messages: self.messages,
            cots: self.cots,
            tools: self.tools,
            params: self.params,
        }
    }

    /// Set model parameters.
    pub fn set_params(&mut self, params: ModelParams) -> &mut Self {
        self.params = Some(params);
        self
    }

    /// Set chain-of-thought entries.
    pub fn set_cot(&mut self, cots: Vec<String>) -> &mut Self {
        self.cots = cots;
        self
    }

    /// Add a prompt.
    pub fn add_prompt(&mut self, prompt: Prompt) -> &mut Self {
        // Merge with last prompt if same name
        if let Some(last) = self.prompts.last_mut()
            && last.name == prompt.name {
                if !last.text.is_empty() {
                    last.text.push('\n');
                }
                last.text.push_str(&prompt.text);
                return self;
            }
        self.prompts.push(prompt);
        self
    }

    /// Add a prompt with name and text.
    pub fn prompt_text(&mut self, name: impl Into<String>, text: impl Into<String>) -> &mut Self {
        self.add_prompt(Prompt::new(name, text))
    }

    /// Add a message.
    pub fn add_message(&mut self, msg: Message) -> &mut Self {
        // Try to merge with last message if same role/name and both are contents
        if let Some(last) = self.messages.last_mut()
            && let (Payload::Contents(last_contents), Payload::Contents(new_contents)) =
                (&mut last.payload, &msg.payload)
                && last.role == msg.role && last.name == msg.name {
                    last_contents.extend(new_contents.clone());
                    return self;
                }
        self.messages.push(msg);
        self
    }

    /// Add a user text message.
    pub fn user_text(&mut self, name: impl Into<String>, text: impl Into<String>) -> &mut Self {
        self.add_message(Message::with_name(Role::User, name, Payload::text(text)))
    }

    /// Add a user blob message.
    pub fn user_blob(
        &mut self,
        name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> &mut Self {
        self.add_message(Message::with_name(
            Role::User,
            name,
            Payload::Contents(vec![Part::blob(mime_type, data)]),
        ))
    }

    /// Add a model text message.
    pub fn model_text(&mut self, name: impl Into<String>, text: impl Into<String>) -> &mut Self {
        self.add_message(Message::with_name(Role::Model, name, Payload::text(text)))
    }

    /// Add a model blob message.
    pub fn model_blob(
        &mut self,
        name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> &mut Self {
        self.add_message(Message::with_name(
            Role::Model,
            name,
            Payload::Contents(vec![Part::blob(mime_type, data)]),
        ))
    }

    /// Add a tool call message.
    pub fn tool_call(
        &mut self,
        name: impl Into<String>,
        id: impl Into<String>,
        fn_name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> &mut Self {
        self.messages.push(Message::with_name(
            Role::Model,
            name,
            Payload::ToolCall(ToolCall::new(
                id,
                FuncCall::new(fn_name, arguments),
            )),
        ));
        self
    }

    /// Add a tool result message.
    pub fn tool_result(
        &mut self,
        name: impl Into<String>,
        id: impl Into<String>,
        result: impl Into<String>,
    ) -> &mut Self {
        self.messages.push(Message::with_name(
            Role::Tool,
            name,
            Payload::ToolResult(ToolResult::new(id, result)),
        ));
        self
    }

    /// Add a tool call and its result.
    pub fn add_tool_call_result(
        &mut self,
        tool_name: impl Into<String>,
        arguments: impl Into<String>,
        result: impl Into<String>,
    ) -> &mut Self {
        let id = format!("call_{}", hex_string());
        let tool_name = tool_name.into();
        self.tool_call("", &id, &tool_name, arguments);
        self.tool_result("", &id, result);
        self
    }

    /// Add a function tool.
    pub fn add_tool(&mut self, tool: FuncTool) -> &mut Self {
        self.tools.push(AnyTool::Func(tool));
        self
    }

    /// Add any tool.
    pub fn add_any_tool(&mut self, tool: impl Into<AnyTool>) -> &mut Self {
        self.tools.push(tool.into());
        self
    }

    /// Get a reference to the tools.
    pub fn get_tools(&self) -> &[AnyTool] {
        &self.tools
    }

    /// Find a function tool by name.
    pub fn find_func_tool(&self, name: &str) -> Option<&FuncTool> {
        self.tools.iter().find_map(|t| match t {
            AnyTool::Func(f) if f.name == name => Some(f),
            _ => None,
        })
    }
}

/// Built model context.
struct BuiltModelContext {
    prompts: Vec<Prompt>,
    messages: Vec<Message>,
    cots: Vec<String>,
    tools: Vec<AnyTool>,
    params: Option<ModelParams>,
}

impl ModelContext for BuiltModelContext {
    fn prompts(&self) -> Box<dyn Iterator<Item = &Prompt> + '_> {
        Box::new(self.prompts.iter())
    }

    fn messages(&self) -> Box<dyn Iterator<Item = &Message> + '_> {
        Box::new(self.messages.iter())
    }

    fn cots(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.cots.iter().map(|s| s.as_str()))
    }

    fn tools(&self) -> Box<dyn Iterator<Item = &dyn Tool> + '_> {
        Box::new(self.tools.iter().map(|t| t as &dyn Tool))
    }

    fn params(&self) -> Option<&ModelParams> {
        self.params.as_ref()
    }
}

/// Multiple model contexts combined.
pub struct MultiModelContext {
    contexts: Vec<Box<dyn ModelContext>>,
}

impl MultiModelContext {
    /// Create from multiple contexts.
    pub fn new(contexts: Vec<Box<dyn ModelContext>>) -> Self {
        Self { contexts }
    }
}

impl ModelContext for MultiModelContext {
    fn prompts(&self) -> Box<dyn Iterator<Item = &Prompt> + '_> {
        Box::new(self.contexts.iter().flat_map(|c| c.prompts()))
    }

    fn messages(&self) -> Box<dyn Iterator<Item = &Message> + '_> {
        Box::new(self.contexts.iter().flat_map(|c| c.messages()))
    }

    fn cots(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.contexts.iter().flat_map(|c| c.cots()))
    }

    fn tools(&self) -> Box<dyn Iterator<Item = &dyn Tool> + '_> {
        Box::new(self.contexts.iter().flat_map(|c| c.tools()))
    }

    fn params(&self) -> Option<&ModelParams> {
        self.contexts.iter().find_map(|c| c.params())
    }
}

/// Generate a random hex string for IDs.
fn hex_string() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{:016x}", now)
}
