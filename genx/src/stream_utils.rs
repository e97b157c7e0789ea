//! Stream utility functions: split, merge, composite.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{GenxError, Usage};
use crate::stream::{Stream, StreamResult};
use crate::types::MessageChunk;

/// A function that determines if a MessageChunk matches a criteria.
pub type Matcher = Box<dyn Fn(&MessageChunk) -> bool + Send + Sync>;

/// Returns a Matcher that matches chunks with the given MIME type prefix.
pub fn mime_type_matcher(prefix: String) -> Matcher {
    Box::new(move |chunk: &MessageChunk| {
        chunk
            .part
            .as_ref()
            .and_then(|p| p.as_blob())
            .is_some_and(|b| b.mime_type.starts_with(&prefix))
    })
}

/// Split a stream into two based on a matcher.
/// Chunks matching go to the first stream, others to the second.
pub fn split(
    mut input: Box<dyn Stream>,
    matcher: Matcher,
) -> (Box<dyn Stream>, Box<dyn Stream>) {
    let (matched_tx, matched_rx) = mpsc::channel(100);
    let (rest_tx, rest_rx) = mpsc::channel(100);

    tokio::spawn(async move {
        let mut matched_tx = Some(matched_tx);
        let mut rest_tx = Some(rest_tx);

        loop {
            if matched_tx.is_none() && rest_tx.is_none() {
                break;
            }
            match input.next().await {
                Ok(Some(chunk)) => {
                    if matcher(&chunk) {
                        if let Some(tx) = &matched_tx {
                            if tx.send(Ok(chunk)).await.is_err() {
                                matched_tx = None;
                            }
                        }
                    } else if let Some(tx) = &rest_tx {
                        if tx.send(Ok(chunk)).await.is_err() {
                            rest_tx = None;
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    let msg = e.to_string();
                    if let Some(tx) = &matched_tx {
                        let _ = tx.send(Err(msg.clone())).await;
                    }
                    if let Some(tx) = &rest_tx {
                        let _ = tx.send(Err(msg)).await;
                    }
                    break;
                }
            }
        }
    });

    (
        Box::new(ChannelStream { rx: matched_rx }),
        Box::new(ChannelStream { rx: rest_rx }),
    )
}

/// Combine multiple streams sequentially.
/// After each stream ends (except the last), an EoS marker is emitted.
pub fn composite_seq(streams: Vec<Box<dyn Stream>>) -> Box<dyn Stream> {
    if streams.is_empty() {
        return Box::new(EmptyStream);
    }
    if streams.len() == 1 {
        return streams.into_iter().next().unwrap();
    }

    let (tx, rx) = mpsc::channel(100);

    tokio::spawn(async move {
        let count = streams.len();
        for (i, mut stream) in streams.into_iter().enumerate() {
            let mut last_mime = String::new();
            loop {
                match stream.next().await {
                    Ok(Some(chunk)) => {
                        if let Some(ref part) = chunk.part {
                            if let Some(blob) = part.as_blob() {
                                last_mime = blob.mime_type.clone();
                            } else if part.is_text() {
                                last_mime = "text/plain".into();
                            }
                        }
                        if tx.send(Ok(chunk)).await.is_err() {
                            return;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        let _ = tx.send(Err(e.to_string())).await;
                        return;
                    }
                }
            }
            if i < count - 1 && !last_mime.is_empty() {
                let eos = if last_mime == "text/plain" {
                    MessageChunk::new_text_end_of_stream()
                } else {
                    MessageChunk::new_end_of_stream(&last_mime)
                };
                if tx.send(Ok(eos)).await.is_err() {
                    return;
                }
            }
        }
    });

    Box::new(ChannelStream { rx })
}

/// Merge multiple streams sequentially (all chunks from first, then second, etc.).
pub fn merge(streams: Vec<Box<dyn Stream>>) -> Box<dyn Stream> {
    if streams.is_empty() {
        return Box::new(EmptyStream);
    }
    if streams.len() == 1 {
        return streams.into_iter().next().unwrap();
    }
    Box::new(MergeStream {
        streams,
        idx: 0,
    })
}

/// Merge multiple streams by interleaving chunks round-robin.
pub fn merge_interleaved(streams: Vec<Box<dyn Stream>>) -> Box<dyn Stream> {
    if streams.is_empty() {
        return Box::new(EmptyStream);
    }
    if streams.len() == 1 {
        return streams.into_iter().next().unwrap();
    }

    let (tx, rx) = mpsc::channel(100);

    tokio::spawn(async move {
        let mut streams = streams;
        let mut active: Vec<bool> = vec![true; streams.len()];
        let mut active_count = streams.len();

        while active_count > 0 {
            for i in 0..streams.len() {
                if !active[i] {
                    continue;
                }
                match streams[i].next().await {
                    Ok(Some(chunk)) => {
                        if tx.send(Ok(chunk)).await.is_err() {
                            return;
                        }
                    }
                    Ok(None) => {
                        active[i] = false;
                        active_count -= 1;
                    }
                    Err(e) => {
                        let _ = tx.send(Err(e.to_string())).await;
                        return;
                    }
                }
            }
        }
    });

    Box::new(ChannelStream { rx })
}

struct ChannelStream {
    rx: mpsc::Receiver<Result<MessageChunk, String>>,
}

#[async_trait]
impl Stream for ChannelStream {
    async fn next(&mut self) -> Result<Option<MessageChunk>, GenxError> {
        match self.rx.recv().await {
            Some(Ok(chunk)) => Ok(Some(chunk)),
            Some(Err(e)) => Err(GenxError::Other(anyhow::anyhow!("{}", e))),
            None => Ok(None),
        }
    }
    fn result(&self) -> Option<StreamResult> {
        None
    }
    async fn close(&mut self) -> Result<(), GenxError> {
        self.rx.close();
        Ok(())
    }
    async fn close_with_error(&mut self, _error: GenxError) -> Result<(), GenxError> {
        self.rx.close();
        Ok(())
    }
}

struct EmptyStream;

#[async_trait]
impl Stream for EmptyStream {
    async fn next(&mut self) -> Result<Option<MessageChunk>, GenxError> {
        Ok(None)
    }
    fn result(&self) -> Option<StreamResult> {
        Some(StreamResult::done(Usage::default()))
    }
    async fn close(&mut self) -> Result<(), GenxError> {
        Ok(())
    }
    async fn close_with_error(&mut self, _: GenxError) -> Result<(), GenxError> {
        Ok(())
    }
}

struct MergeStream {
    streams: Vec<Box<dyn Stream>>,
    idx: usize,
}

#[async_trait]
impl Stream for MergeStream {
    async fn next(&mut self) -> Result<Option<MessageChunk>, GenxError> {
        while self.idx < self.streams.len() {
            match self.streams[self.idx].next().await {
                Ok(Some(chunk)) => return Ok(Some(chunk)),
                Ok(None) => {
                    self.idx += 1;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }
    fn result(&self) -> Option<StreamResult> {
        None
    }
    async fn close(&mut self) -> Result<(), GenxError> {
        for s in &mut self.streams {
            let _ = s.close().await;
        }
        Ok(())
    }
    async fn close_with_error(&mut self, error: GenxError) -> Result<(), GenxError> {
        for s in &mut self.streams {
            let _ = s.close_with_error(GenxError::Other(anyhow::anyhow!("{}", error))).await;
        }
        Ok(())
    }
}
