//! On-device voice-AI gateway: a Wyoming TCP protocol engine (C1-C6) fronted
//! by an OpenAI-compatible HTTP/SSE surface (C7) and advertised over mDNS.

pub mod connection;
pub mod connections;
pub mod context;
pub mod error;
pub mod event;
pub mod frame;
pub mod http;
pub mod listener;
pub mod logs;
pub mod mdns;
pub mod metrics;
pub mod settings;
pub mod stt;
pub mod tts;
pub mod worker;
