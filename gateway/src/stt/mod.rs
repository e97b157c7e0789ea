//! STT session state machine (C5).

mod session;

pub use session::{SttSession, SttSessionState};
