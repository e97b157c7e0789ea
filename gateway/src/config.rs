//! CLI arguments for the gateway binary.

use clap::Parser;

/// On-device voice-AI gateway: Wyoming TCP protocol + OpenAI-compatible HTTP/SSE surface.
#[derive(Parser, Debug)]
#[command(name = "wyoming-gateway")]
#[command(about = "Wyoming protocol gateway for TTS/STT/LLM backends")]
pub struct Args {
    /// Address the Wyoming TCP listener binds to.
    #[arg(long, default_value = "0.0.0.0:10200")]
    pub wyoming_addr: String,

    /// Address the HTTP/SSE surface binds to.
    #[arg(long, default_value = "0.0.0.0:10100")]
    pub http_addr: String,

    /// Program name advertised over mDNS.
    #[arg(long, default_value = "wyoming-gateway")]
    pub program_name: String,

    /// Disable mDNS advertisement entirely.
    #[arg(long)]
    pub no_mdns: bool,

    /// Number of recent log entries retained for `/api/logs`.
    #[arg(long, default_value_t = 1000)]
    pub log_capacity: usize,

    /// Verbose (debug-level) logging.
    #[arg(short = 'v', long)]
    pub verbose: bool,
}
