//! Transformer trait for stream-to-stream conversion.
//!
//! # Contract
//!
//! Transformers may modify any field of MessageChunk:
//!   - Role: e.g., realtime model changes user -> model
//!   - Name: e.g., set to model name
//!   - Part: e.g., TTS converts Text -> Blob, ASR converts Blob -> Text
//!   - Ctrl: preserve or modify as needed
//!
//! # Lifecycle
//!
//! The `transform` method handles initialization only. Once it returns, the
//! background task's lifetime is governed entirely by the input Stream:
//! `input.next()` returning `None` or `Err` terminates the task.
//!
//! To cancel a running transformer, drop the input Stream.
//!
//! # EOF vs EoS
//!
//! - **EOF** (`input.next()` returns `Ok(None)`): Stream is physically done.
//!   Transformer flushes, emits results, returns. No EoS marker fabricated.
//! - **EoS marker** (`ctrl.end_of_stream == true`): Logical sub-stream boundary.
//!   Transformer flushes, emits results, emits translated EoS marker, continues.

use async_trait::async_trait;

use crate::error::GenxError;
use crate::stream::Stream;

/// Transformer converts an input Stream into an output Stream.
#[async_trait]
pub trait Transformer: Send + Sync {
    /// Create an output Stream from an input Stream.
    ///
    /// The `pattern` identifies the model/voice/resource (e.g., "doubao/vv",
    /// "minimax/shaonv"). Concrete implementations may ignore the pattern.
    ///
    /// This method should complete initialization (connection, handshake)
    /// before returning. Processing errors are returned via `Stream::next()`.
    async fn transform(
        &self,
        pattern: &str,
        input: Box<dyn Stream>,
    ) -> Result<Box<dyn Stream>, GenxError>;
}
