//! LLM worker adapter (C8): facade over [`wyoming_genx::Generator`]
//! presenting the chat-messages-in, chunk-stream-out contract used by both
//! the HTTP/SSE surface and (indirectly) conversational sessions.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use wyoming_genx::context::{ModelContextBuilder, ModelParams};
use wyoming_genx::stream::Stream as GenxStream;
use wyoming_genx::types::{Part, Payload, Role};
use wyoming_genx::{FuncTool, Generator, GenxError};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("generator error: {0}")]
    Generator(#[from] GenxError),
    #[error("cancelled")]
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct LlmRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f64>,
    pub repetition_penalty: Option<f64>,
    pub additional_context: HashMap<String, String>,
    pub tools: Vec<FuncTool>,
}

/// One item of the LLM worker's lazy output sequence.
#[derive(Debug, Clone)]
pub enum LlmChunk {
    Chunk(String),
    ToolCall { name: String, arguments_json: String },
    Info(String),
}

/// A live, still-generating sequence of [`LlmChunk`]s.
///
/// Each call to [`next`](Self::next) drives the underlying generator stream
/// by exactly one item, so a caller forwarding chunks to an HTTP response can
/// emit each one as it arrives instead of waiting for generation to finish.
pub struct LlmChunkStream {
    stream: Box<dyn GenxStream>,
    cancel: CancellationToken,
}

impl LlmChunkStream {
    /// Returns the next chunk, cancellation error, or `None` once the
    /// generator is done. Cancellation is checked before and during the
    /// underlying read so a disconnected client stops generation promptly.
    pub async fn next(&mut self) -> Option<Result<LlmChunk, LlmError>> {
        loop {
            if self.cancel.is_cancelled() {
                return Some(Err(LlmError::Cancelled));
            }
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Some(Err(LlmError::Cancelled)),
                result = self.stream.next() => result,
            };

            match next {
                Ok(Some(msg_chunk)) => {
                    if let Some(tc) = msg_chunk.tool_call {
                        return Some(Ok(LlmChunk::ToolCall {
                            name: tc.func_call.name,
                            arguments_json: tc.func_call.arguments,
                        }));
                    } else if let Some(Part::Text(text)) = msg_chunk.part {
                        return Some(Ok(LlmChunk::Chunk(text)));
                    }
                    // Neither a tool call nor a text part: nothing to surface
                    // for this item, keep reading the next one.
                }
                Ok(None) => return None,
                Err(GenxError::Done(_)) => return None,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

pub struct LlmWorker {
    generator: Arc<dyn Generator>,
}

impl LlmWorker {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Starts one generation and returns a live chunk stream.
    ///
    /// `cancel` is owned by the returned [`LlmChunkStream`] so a caller can
    /// cancel mid-generation (e.g. on client disconnect) regardless of how
    /// many chunks have already been read.
    pub async fn generate(
        &self,
        model: &str,
        request: &LlmRequest,
        cancel: CancellationToken,
    ) -> Result<LlmChunkStream, LlmError> {
        if cancel.is_cancelled() {
            return Err(LlmError::Cancelled);
        }

        let mut builder = ModelContextBuilder::new();
        for (key, value) in &request.additional_context {
            builder.prompt_text(key, value);
        }
        for tool in &request.tools {
            builder.add_tool(tool.clone());
        }
        for msg in &request.messages {
            builder.add_message(wyoming_genx::types::Message::new(
                msg.role,
                Payload::text(msg.text.clone()),
            ));
        }

        let mut params = ModelParams::new();
        if let Some(temperature) = request.temperature {
            params.temperature = Some(temperature as f32);
        }
        if let Some(max_tokens) = request.max_tokens {
            params.max_tokens = Some(max_tokens as i32);
        }
        if let Some(top_p) = request.top_p {
            params.top_p = Some(top_p as f32);
        }
        if let Some(repetition_penalty) = request.repetition_penalty {
            // ModelParams has no dedicated repetition-penalty field; frequency
            // penalty is the closest analogue generators read from it.
            params.frequency_penalty = Some(repetition_penalty as f32);
        }
        builder.set_params(params);

        let ctx = builder.build();
        let stream = self.generator.generate_stream(model, &ctx).await?;
        Ok(LlmChunkStream { stream, cancel })
    }
}
