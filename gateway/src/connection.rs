//! Per-connection handler (C3): owns the receive buffer and both session
//! machines for one TCP client, and is the single writer of its outbound
//! frames so `audio-start / chunks / audio-stop` can never interleave with
//! another worker's frames on the same connection.

use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_util::sync::CancellationToken;

use crate::context::GatewayContext;
use crate::error::GatewayError;
use crate::event::Event;
use crate::frame;
use crate::stt::SttSession;
use crate::tts::TtsSession;

const READ_CHUNK_SIZE: usize = 4096;

/// Runs one connection to completion, deregistering it from `ctx`'s
/// connection set on exit regardless of how it ended (clean close, I/O
/// error, or the passed-in `shutdown` token firing).
pub async fn handle_connection(
    ctx: Arc<GatewayContext>,
    stream: TcpStream,
    conn_id: u64,
    shutdown: CancellationToken,
) {
    ctx.metrics.connections_active.inc();
    let result = run(ctx.clone(), stream, shutdown).await;
    ctx.metrics.connections_active.dec();
    ctx.connections.deregister(conn_id);

    if let Err(e) = result {
        ctx.metrics.connection_errors.inc();
        ctx.logs.push("error", "connection", e.to_string());
        tracing::debug!(error = %e, "connection closed with error");
    }
}

async fn run(
    ctx: Arc<GatewayContext>,
    stream: TcpStream,
    shutdown: CancellationToken,
) -> Result<(), GatewayError> {
    let (mut reader, mut writer) = stream.into_split();
    let mut read_buf = BytesMut::with_capacity(READ_CHUNK_SIZE);
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Event>();

    let mut tts_session = TtsSession::new(ctx.tts_worker.clone(), out_tx.clone());
    let mut stt_session = SttSession::new(ctx.stt_worker.clone(), out_tx.clone());

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                return Ok(());
            }

            outbound = out_rx.recv() => {
                let Some(event) = outbound else { break };
                let bytes = frame::encode(&event.into_frame());
                writer.write_all(&bytes).await?;
                writer.flush().await?;
            }

            read_result = reader.read_buf(&mut read_buf) => {
                let n = read_result?;
                if n == 0 {
                    return Ok(());
                }
                drain_frames(&ctx, &mut read_buf, &mut tts_session, &mut stt_session, &out_tx).await?;
            }
        }
    }

    Ok(())
}

async fn drain_frames(
    ctx: &GatewayContext,
    read_buf: &mut BytesMut,
    tts_session: &mut TtsSession,
    stt_session: &mut SttSession,
    out_tx: &UnboundedSender<Event>,
) -> Result<(), GatewayError> {
    loop {
        match frame::decode(read_buf) {
            Ok(Some((frame, consumed))) => {
                ctx.metrics.frames_decoded.inc();
                let _ = read_buf.split_to(consumed);
                let event = Event::from_frame(&frame)?;
                dispatch(ctx, tts_session, stt_session, event, out_tx).await?;
            }
            Ok(None) => return Ok(()),
            Err(e) => return Err(e.into()),
        }
    }
}

async fn dispatch(
    ctx: &GatewayContext,
    tts_session: &mut TtsSession,
    stt_session: &mut SttSession,
    event: Event,
    out_tx: &UnboundedSender<Event>,
) -> Result<(), GatewayError> {
    match event {
        Event::Describe => {
            let _ = out_tx.send(Event::Info(ctx.describe()));
            Ok(())
        }
        Event::Synthesize(_) | Event::SynthesizeStart { .. } => {
            ctx.metrics.synthesize_requests.inc();
            let settings = ctx.settings.wyoming().await;
            tts_session.handle(event, &settings, &ctx.voice_pairs()).await
        }
        Event::SynthesizeChunk { .. } | Event::SynthesizeStop => {
            let settings = ctx.settings.wyoming().await;
            tts_session.handle(event, &settings, &ctx.voice_pairs()).await
        }
        Event::Transcribe(_) => {
            ctx.metrics.transcribe_requests.inc();
            stt_session.handle(event).await
        }
        Event::AudioStart(_) | Event::AudioChunk(..) | Event::AudioStop => stt_session.handle(event).await,
        _ => Ok(()),
    }
}
