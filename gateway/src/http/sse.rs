//! OpenAI-compatible `/v1/chat/completions`: non-streaming JSON envelope and
//! SSE streaming, including the quirky tool-call encoding (C7, §4.7).
//!
//! The SSE consumer this gateway was built against expects
//! `choices[].delta.tool_calls[].function` to be a JSON *string* encoding
//! `{name, arguments}`, not the nested object OpenAI itself returns. Every
//! chunk we emit here follows that shape.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use wyoming_genx::types::Role;

use crate::context::GatewayContext;
use crate::worker::{ChatMessage, LlmChunk, LlmChunkStream, LlmError, LlmRequest};

#[derive(Debug, Deserialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<IncomingMessage>,
    #[serde(default)]
    stream: bool,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
    top_p: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct IncomingMessage {
    role: String,
    content: String,
}

fn map_role(role: &str) -> Role {
    match role {
        "assistant" => Role::Model,
        "tool" => Role::Tool,
        _ => Role::User,
    }
}

#[derive(Debug, Serialize)]
struct ToolCallFrame {
    index: usize,
    id: String,
    #[serde(rename = "type")]
    kind: &'static str,
    function: String,
}

/// Serializes `{name, arguments}` into the JSON *string* the downstream
/// consumer expects in place of a nested object.
fn tool_call_function_string(name: &str, arguments_json: &str) -> String {
    serde_json::to_string(&json!({ "name": name, "arguments": arguments_json }))
        .expect("name/arguments serialize infallibly")
}

pub async fn chat_completion(ctx: Arc<GatewayContext>, raw: Value) -> Response {
    let request: ChatCompletionRequest = match serde_json::from_value(raw) {
        Ok(r) => r,
        Err(e) => {
            return (
                axum::http::StatusCode::BAD_REQUEST,
                axum::Json(json!({ "error": { "message": e.to_string() } })),
            )
                .into_response();
        }
    };

    let completion_id = format!("chatcmpl-{}", Uuid::new_v4());
    let model = request.model.clone();
    let stream = request.stream;

    let llm_request = LlmRequest {
        messages: request
            .messages
            .iter()
            .map(|m| ChatMessage {
                role: map_role(&m.role),
                text: m.content.clone(),
            })
            .collect(),
        temperature: request.temperature,
        max_tokens: request.max_tokens,
        top_p: request.top_p,
        ..Default::default()
    };

    let cancel = CancellationToken::new();
    let chunk_stream = match ctx.llm_worker.generate(&model, &llm_request, cancel).await {
        Ok(chunk_stream) => chunk_stream,
        Err(e) => {
            return (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(json!({ "error": { "message": e.to_string() } })),
            )
                .into_response();
        }
    };

    if stream {
        streaming_response(completion_id, model, chunk_stream)
    } else {
        match collect(chunk_stream).await {
            Ok(chunks) => non_streaming_response(completion_id, model, chunks),
            Err(e) => (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(json!({ "error": { "message": e.to_string() } })),
            )
                .into_response(),
        }
    }
}

async fn collect(mut chunks: LlmChunkStream) -> Result<Vec<LlmChunk>, LlmError> {
    let mut out = Vec::new();
    while let Some(item) = chunks.next().await {
        out.push(item?);
    }
    Ok(out)
}

fn non_streaming_response(id: String, model: String, chunks: Vec<LlmChunk>) -> Response {
    let mut content = String::new();
    let mut tool_calls = Vec::new();

    for (index, chunk) in chunks.into_iter().enumerate() {
        match chunk {
            LlmChunk::Chunk(text) => content.push_str(&text),
            LlmChunk::ToolCall { name, arguments_json } => {
                tool_calls.push(json!({
                    "index": index,
                    "id": format!("call_{}", Uuid::new_v4()),
                    "type": "function",
                    "function": tool_call_function_string(&name, &arguments_json),
                }));
            }
            LlmChunk::Info(_) => {}
        }
    }

    let finish_reason = if tool_calls.is_empty() { "stop" } else { "tool_calls" };
    let message = if tool_calls.is_empty() {
        json!({ "role": "assistant", "content": content })
    } else {
        json!({ "role": "assistant", "content": Value::Null, "tool_calls": tool_calls })
    };

    axum::Json(json!({
        "id": id,
        "object": "chat.completion",
        "created": chrono::Utc::now().timestamp(),
        "model": model,
        "choices": [{
            "index": 0,
            "message": message,
            "finish_reason": finish_reason,
        }],
    }))
    .into_response()
}

/// State driving the SSE frame-by-frame unfold in [`streaming_response`].
enum FrameState {
    /// Still reading chunks off the live generator stream.
    Chunks { chunks: LlmChunkStream, saw_tool_call: bool, index: usize },
    /// The chunk stream ended (or errored); one finish-reason frame left.
    Finish { saw_tool_call: bool },
    Done,
}

/// Forwards each [`LlmChunk`] as it arrives off the generator as its own SSE
/// frame, so first-token latency is the generator's, not the full
/// completion's, and a dropped client connection (which tears down the
/// stream being polled) cancels generation promptly rather than running it
/// to completion in the background.
fn streaming_response(id: String, model: String, chunks: LlmChunkStream) -> Response {
    let created = chrono::Utc::now().timestamp();
    let id = Arc::<str>::from(id);
    let model = Arc::<str>::from(model);
    let state = FrameState::Chunks { chunks, saw_tool_call: false, index: 0 };

    let events = stream::unfold(state, move |state| {
        let id = id.clone();
        let model = model.clone();
        async move {
            match state {
                FrameState::Chunks { mut chunks, mut saw_tool_call, index } => loop {
                    match chunks.next().await {
                        Some(Ok(LlmChunk::Chunk(text))) => {
                            let frame = envelope(&id, &model, created, json!({ "content": text }), None);
                            let next = FrameState::Chunks { chunks, saw_tool_call, index: index + 1 };
                            return Some((Ok(SseEvent::default().data(frame.to_string())), next));
                        }
                        Some(Ok(LlmChunk::ToolCall { name, arguments_json })) => {
                            saw_tool_call = true;
                            let delta = json!({
                                "tool_calls": [ToolCallFrame {
                                    index,
                                    id: format!("call_{}", Uuid::new_v4()),
                                    kind: "function",
                                    function: tool_call_function_string(&name, &arguments_json),
                                }],
                            });
                            let frame = envelope(&id, &model, created, delta, None);
                            let next = FrameState::Chunks { chunks, saw_tool_call, index: index + 1 };
                            return Some((Ok(SseEvent::default().data(frame.to_string())), next));
                        }
                        Some(Ok(LlmChunk::Info(_))) => continue,
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "llm generation failed mid-stream");
                            let finish_reason = if saw_tool_call { "tool_calls" } else { "stop" };
                            let frame = envelope(&id, &model, created, json!({}), Some(finish_reason));
                            return Some((Ok(SseEvent::default().data(frame.to_string())), FrameState::Finish { saw_tool_call }));
                        }
                        None => {
                            let finish_reason = if saw_tool_call { "tool_calls" } else { "stop" };
                            let frame = envelope(&id, &model, created, json!({}), Some(finish_reason));
                            return Some((Ok(SseEvent::default().data(frame.to_string())), FrameState::Finish { saw_tool_call }));
                        }
                    }
                },
                FrameState::Finish { .. } => Some((Ok(SseEvent::default().data("[DONE]")), FrameState::Done)),
                FrameState::Done => None,
            }
        }
    });

    sse_response(events)
}

fn envelope(id: &str, model: &str, created: i64, delta: Value, finish_reason: Option<&str>) -> Value {
    json!({
        "id": id,
        "object": "chat.completion.chunk",
        "created": created,
        "model": model,
        "choices": [{
            "index": 0,
            "delta": delta,
            "finish_reason": finish_reason,
        }],
    })
}

fn sse_response<S>(stream: S) -> Response
where
    S: Stream<Item = Result<SseEvent, Infallible>> + Send + 'static,
{
    Sse::new(stream)
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::to_bytes;
    use wyoming_genx::context::ModelContext;
    use wyoming_genx::error::{GenxError, Usage};
    use wyoming_genx::generators::Mux;
    use wyoming_genx::stream::{Stream as GenxStream, StreamBuilder};
    use wyoming_genx::types::{FuncCall, MessageChunk, ToolCall};
    use wyoming_genx::Generator;
    use crate::logs::LogStore;
    use crate::metrics::Metrics;
    use crate::settings::SettingsStore;
    use crate::worker::{LlmWorker, SttWorker, TtsWorker};
    use wyoming_speech::{AsrMux, TtsMux};

    struct ScriptedGenerator;

    #[async_trait]
    impl Generator for ScriptedGenerator {
        async fn generate_stream(&self, _model: &str, _ctx: &dyn ModelContext) -> Result<Box<dyn GenxStream>, GenxError> {
            let builder = StreamBuilder::with_tools(8, vec![]);
            builder
                .add(&[
                    MessageChunk::text(Role::Model, "hi "),
                    MessageChunk::text(Role::Model, "there"),
                ])
                .unwrap();
            builder.done(Usage::default()).unwrap();
            Ok(Box::new(builder.stream()))
        }

        async fn invoke(&self, _model: &str, _ctx: &dyn ModelContext, _tool: &wyoming_genx::FuncTool) -> Result<(Usage, FuncCall), GenxError> {
            unimplemented!()
        }
    }

    struct ToolCallingGenerator;

    #[async_trait]
    impl Generator for ToolCallingGenerator {
        async fn generate_stream(&self, _model: &str, _ctx: &dyn ModelContext) -> Result<Box<dyn GenxStream>, GenxError> {
            let builder = StreamBuilder::with_tools(8, vec![]);
            builder
                .add(&[MessageChunk::tool_call(
                    Role::Model,
                    ToolCall::new("call_1", FuncCall::new("get_weather", r#"{"city":"Paris"}"#)),
                )])
                .unwrap();
            builder.done(Usage::default()).unwrap();
            Ok(Box::new(builder.stream()))
        }

        async fn invoke(&self, _model: &str, _ctx: &dyn ModelContext, _tool: &wyoming_genx::FuncTool) -> Result<(Usage, FuncCall), GenxError> {
            unimplemented!()
        }
    }

    fn context_with(generator: Arc<dyn Generator>) -> Arc<GatewayContext> {
        let mut mux = Mux::new();
        let _ = mux.handle("default".to_string(), generator);
        Arc::new(GatewayContext {
            settings: Arc::new(SettingsStore::new()),
            metrics: Arc::new(Metrics::new()),
            logs: Arc::new(LogStore::new(100)),
            tts_worker: Arc::new(TtsWorker::new(Arc::new(TtsMux::new()))),
            stt_worker: Arc::new(SttWorker::new(Arc::new(AsrMux::new()))),
            llm_worker: Arc::new(LlmWorker::new(Arc::new(mux))),
            voices: Vec::new(),
            stt_languages: Vec::new(),
            llm_models: Vec::new(),
            connections: crate::connections::ConnectionRegistry::new(),
        })
    }

    async fn body_json(resp: Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn non_streaming_request_returns_assistant_message() {
        let ctx = context_with(Arc::new(ScriptedGenerator));
        let request = json!({
            "model": "default",
            "messages": [{"role": "user", "content": "hello"}],
        });
        let resp = chat_completion(ctx, request).await;
        assert_eq!(resp.status(), axum::http::StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["object"], "chat.completion");
        assert_eq!(body["choices"][0]["message"]["content"], "hi there");
        assert_eq!(body["choices"][0]["finish_reason"], "stop");
    }

    #[tokio::test]
    async fn non_streaming_tool_call_is_encoded_as_json_string() {
        let ctx = context_with(Arc::new(ToolCallingGenerator));
        let request = json!({
            "model": "default",
            "messages": [{"role": "user", "content": "weather in Paris?"}],
        });
        let resp = chat_completion(ctx, request).await;
        let body = body_json(resp).await;
        assert_eq!(body["choices"][0]["finish_reason"], "tool_calls");
        assert!(body["choices"][0]["message"]["content"].is_null());

        let function = body["choices"][0]["message"]["tool_calls"][0]["function"].as_str().unwrap();
        let decoded: Value = serde_json::from_str(function).unwrap();
        assert_eq!(decoded["name"], "get_weather");
        assert_eq!(decoded["arguments"], r#"{"city":"Paris"}"#);
    }

    #[tokio::test]
    async fn streaming_request_emits_sse_frames_and_done_sentinel() {
        let ctx = context_with(Arc::new(ScriptedGenerator));
        let request = json!({
            "model": "default",
            "messages": [{"role": "user", "content": "hello"}],
            "stream": true,
        });
        let resp = chat_completion(ctx, request).await;
        assert_eq!(resp.status(), axum::http::StatusCode::OK);
        let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
        assert!(content_type.starts_with("text/event-stream"));

        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("chat.completion.chunk"));
        assert!(body.trim_end().ends_with("data: [DONE]"));
    }

    #[tokio::test]
    async fn unknown_model_surfaces_as_internal_server_error() {
        let ctx = context_with(Arc::new(ScriptedGenerator));
        let request = json!({
            "model": "no-such-model",
            "messages": [{"role": "user", "content": "hello"}],
        });
        let resp = chat_completion(ctx, request).await;
        assert_eq!(resp.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
