//! TTS session machine (C4) and its supporting chunkers (C6).

pub mod sentence;
mod session;
pub mod ssml;

pub use session::{TtsSession, TtsSessionState};
