//! Interfaces for voice and speech processing.
//!
//! This crate provides interfaces for:
//! - [`AudioFormat`]: shared PCM layout description
//! - [`Synthesizer`] and [`TtsMux`]: text-to-speech synthesis
//! - [`Transcriber`] and [`AsrMux`]: automatic speech recognition
//!
//! # Example
//!
//! ```rust,ignore
//! use wyoming_speech::{TtsMux, Synthesizer};
//!
//! // Register a TTS synthesizer
//! let tts = TtsMux::new();
//! tts.handle("voice/en-US", my_synthesizer).await?;
//!
//! // Synthesize speech
//! let stream = tts.synthesize("voice/en-US", "hello").await?;
//! ```

mod asr;
mod format;
mod tts;

pub use asr::{AsrError, AsrMux, PartialCallback, Transcriber};
pub use format::{AudioFormat, FormatError};
pub use tts::{SynthesisEvent, SynthesisStream, Synthesizer, TtsError, TtsMux};
