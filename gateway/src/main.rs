//! Gateway binary: wires up settings/metrics/logs, the worker adapters, the
//! Wyoming TCP listener, the HTTP/SSE surface, and mDNS advertisement, then
//! runs all three concurrently until interrupted.

mod config;

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use wyoming_genx::generators::Mux as GeneratorMux;
use wyoming_genx::openai::{OpenAIConfig, OpenAIGenerator};
use wyoming_speech::{AsrMux, TtsMux};
use wyoming_gateway::connections::ConnectionRegistry;
use wyoming_gateway::context::GatewayContext;
use wyoming_gateway::logs::LogStore;
use wyoming_gateway::metrics::Metrics;
use wyoming_gateway::settings::SettingsStore;
use wyoming_gateway::worker::{LlmWorker, SttWorker, TtsWorker};
use wyoming_gateway::{http, listener, mdns};

const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = config::Args::parse();

    let level = if args.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).with_target(false).init();

    let ctx = Arc::new(build_context(&args));

    let shutdown = CancellationToken::new();
    let wyoming_addr = args.wyoming_addr.clone();
    let wyoming_shutdown = shutdown.clone();
    let wyoming_ctx = ctx.clone();
    let wyoming_task = tokio::spawn(async move { listener::serve(wyoming_ctx, &wyoming_addr, wyoming_shutdown).await });

    let http_addr = args.http_addr.clone();
    let http_ctx = ctx.clone();
    let http_task = tokio::spawn(async move {
        let app = http::router(http_ctx);
        let listener = tokio::net::TcpListener::bind(&http_addr).await?;
        tracing::info!(addr = %http_addr, "http surface started");
        axum::serve(listener, app).await
    });

    let mdns_daemon = if args.no_mdns {
        None
    } else {
        let wyoming_port = args
            .wyoming_addr
            .rsplit(':')
            .next()
            .and_then(|p| p.parse().ok())
            .unwrap_or(10200);
        let hostname = hostname_short();
        mdns::advertise(&args.program_name, &hostname, wyoming_port)
    };

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");
    shutdown.cancel();
    drop(mdns_daemon);

    let _ = wyoming_task.await?;
    http_task.abort();

    Ok(())
}

fn build_context(args: &config::Args) -> GatewayContext {
    let mut generator_mux = GeneratorMux::new();
    if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
        let model = std::env::var("WYOMING_LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string());
        let generator = OpenAIGenerator::new(OpenAIConfig {
            api_key,
            model: model.clone(),
            ..Default::default()
        });
        let _ = generator_mux.handle(model, Arc::new(generator));
    }

    GatewayContext {
        settings: Arc::new(SettingsStore::new()),
        metrics: Arc::new(Metrics::new()),
        logs: Arc::new(LogStore::new(args.log_capacity)),
        tts_worker: Arc::new(TtsWorker::new(Arc::new(TtsMux::new()))),
        stt_worker: Arc::new(SttWorker::new(Arc::new(AsrMux::new()))),
        llm_worker: Arc::new(LlmWorker::new(Arc::new(generator_mux))),
        voices: Vec::new(),
        stt_languages: Vec::new(),
        llm_models: Vec::new(),
        connections: ConnectionRegistry::new(),
    }
}

fn hostname_short() -> String {
    hostname_from_env().unwrap_or_else(|| "gateway".to_string())
}

fn hostname_from_env() -> Option<String> {
    std::env::var("HOSTNAME").ok().map(|h| h.split('.').next().unwrap_or(&h).to_string())
}
