//! Worker adapters (C8): thin, uniform facades over the backend registries
//! in `wyoming_speech` and `wyoming_genx` that the session machines and the
//! HTTP surface depend on instead of talking to those crates directly.

mod llm_worker;
mod stt_worker;
mod tts_worker;

pub use llm_worker::{ChatMessage, LlmChunk, LlmChunkStream, LlmError, LlmRequest, LlmWorker};
pub use stt_worker::SttWorker;
pub use tts_worker::{drain_stream, TtsWorker};
