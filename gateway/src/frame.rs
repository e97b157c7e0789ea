//! Wyoming wire frame codec (C1).
//!
//! Wire layout: `header_json\n [data_json_bytes] [binary_payload]`. The
//! header advertises the exact byte lengths of the two tail segments so the
//! decoder never has to guess where one ends and the next begins.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One logical protocol message, fully decoded off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub type_: String,
    pub version: Option<String>,
    pub data: Option<Vec<u8>>,
    pub payload: Option<Vec<u8>>,
}

impl Frame {
    pub fn new(type_: impl Into<String>) -> Self {
        Self {
            type_: type_.into(),
            version: None,
            data: None,
            payload: None,
        }
    }

    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = Some(payload);
        self
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("header is not valid JSON: {0}")]
    InvalidHeader(String),
    #[error("header is missing required field `type`")]
    MissingType,
    #[error("header advertises a negative length")]
    NegativeLength,
}

#[derive(Serialize, Deserialize)]
struct Header {
    #[serde(rename = "type")]
    type_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_length: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload_length: Option<i64>,
}

/// Attempts to decode one frame from the front of `buf`.
///
/// Returns `Ok(None)` when the buffer doesn't yet hold a complete frame
/// (need-more, never consumes); `Ok(Some((frame, consumed)))` on success,
/// where `consumed` is the exact byte count the caller must drop from the
/// front of its receive buffer; `Err` on a malformed header, which is fatal
/// to the connection.
pub fn decode(buf: &[u8]) -> Result<Option<(Frame, usize)>, FrameError> {
    let Some(newline_pos) = buf.iter().position(|&b| b == b'\n') else {
        return Ok(None);
    };

    let header_bytes = &buf[..newline_pos];
    let header: Header = serde_json::from_slice(header_bytes)
        .map_err(|e| FrameError::InvalidHeader(e.to_string()))?;
    let type_ = header.type_.ok_or(FrameError::MissingType)?;

    let data_len = non_negative(header.data_length)?;
    let payload_len = non_negative(header.payload_length)?;

    let header_len = newline_pos + 1;
    let total_len = header_len + data_len + payload_len;
    if buf.len() < total_len {
        return Ok(None);
    }

    let data = if data_len > 0 {
        Some(buf[header_len..header_len + data_len].to_vec())
    } else {
        None
    };
    let payload_start = header_len + data_len;
    let payload = if payload_len > 0 {
        Some(buf[payload_start..payload_start + payload_len].to_vec())
    } else {
        None
    };

    Ok(Some((
        Frame {
            type_,
            version: header.version,
            data,
            payload,
        },
        total_len,
    )))
}

fn non_negative(len: Option<i64>) -> Result<usize, FrameError> {
    match len {
        None => Ok(0),
        Some(n) if n < 0 => Err(FrameError::NegativeLength),
        Some(n) => Ok(n as usize),
    }
}

/// Serializes a frame back into its wire form. Never emits a trailing
/// newline after the payload.
pub fn encode(frame: &Frame) -> Vec<u8> {
    let header = Header {
        type_: Some(frame.type_.clone()),
        version: frame.version.clone(),
        data_length: frame.data.as_ref().filter(|d| !d.is_empty()).map(|d| d.len() as i64),
        payload_length: frame.payload.as_ref().filter(|p| !p.is_empty()).map(|p| p.len() as i64),
    };

    let mut out = serde_json::to_vec(&header).expect("header always serializes");
    out.push(b'\n');
    if let Some(data) = &frame.data {
        out.extend_from_slice(data);
    }
    if let Some(payload) = &frame.payload {
        out.extend_from_slice(payload);
    }
    out
}
