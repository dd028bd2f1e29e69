//! Request payloads and their encoding into an outbound body.
//!
//! # Responsibilities
//! - Represent the accepted payload shapes as one closed enum
//! - Encode a payload into a body, its length and a content type hint
//! - Report unserializable structured values as `EncodingFailed`
//!
//! # Design Decisions
//! - Structured values are serialized lazily, by the encoder, so the failure
//!   surfaces from `execute` before any network I/O
//! - JSON key order is whatever the value's `Serialize` impl emits: struct
//!   fields in declaration order, `BTreeMap` and `serde_json::Value` maps sorted
//! - Streams are handed to the transport untouched and drained exactly once

use std::fmt;
use std::io;

use bytes::{Bytes, BytesMut};
use futures_util::stream::{self, BoxStream, Stream, StreamExt, TryStreamExt};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::Frame;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::RequestError;

/// Media type sent with structured payloads.
pub const JSON_CONTENT_TYPE: &str = "application/json";

const READ_CHUNK: usize = 8 * 1024;

/// Outbound body type handed to hyper.
pub type OutboundBody = UnsyncBoxBody<Bytes, io::Error>;

type EncodeFn = Box<dyn FnOnce() -> serde_json::Result<Vec<u8>> + Send>;

/// A request body value.
#[derive(Debug, Default)]
pub enum Payload {
    /// No body.
    #[default]
    Absent,
    /// Raw text, sent byte for byte.
    Text(String),
    /// Bytes pulled from a source while sending.
    Stream(ByteSource),
    /// A serializable value, sent as compact JSON.
    Structured(Structured),
}

impl Payload {
    pub fn text(text: impl Into<String>) -> Self {
        Payload::Text(text.into())
    }

    /// Stream the contents of an async reader.
    pub fn reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Payload::Stream(ByteSource::from_reader(reader))
    }

    pub fn json<T>(value: T) -> Self
    where
        T: Serialize + Send + 'static,
    {
        Payload::Structured(Structured::new(value))
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<ByteSource> for Payload {
    fn from(source: ByteSource) -> Self {
        Payload::Stream(source)
    }
}

/// A byte stream with an optional declared length.
pub struct ByteSource {
    stream: BoxStream<'static, io::Result<Bytes>>,
    length: Option<u64>,
}

impl ByteSource {
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Self {
            stream: stream.boxed(),
            length: None,
        }
    }

    /// Read the source in chunks until EOF.
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        let reader = Box::pin(reader);
        let chunks = stream::try_unfold(reader, |mut reader| async move {
            let mut buf = BytesMut::with_capacity(READ_CHUNK);
            let read = reader.read_buf(&mut buf).await?;
            let next = if read == 0 {
                None
            } else {
                Some((buf.freeze(), reader))
            };
            Ok::<_, io::Error>(next)
        });
        Self::from_stream(chunks)
    }

    /// Declare the total length, sent as `Content-Length` instead of chunking.
    pub fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    pub fn length(&self) -> Option<u64> {
        self.length
    }
}

impl fmt::Debug for ByteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteSource")
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

/// A serializable value waiting to be encoded.
pub struct Structured {
    encode: EncodeFn,
}

impl Structured {
    pub fn new<T>(value: T) -> Self
    where
        T: Serialize + Send + 'static,
    {
        Self {
            encode: Box::new(move || serde_json::to_vec(&value)),
        }
    }
}

impl fmt::Debug for Structured {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Structured").finish_non_exhaustive()
    }
}

/// An encoded payload, ready to send.
pub struct EncodedBody {
    pub body: OutboundBody,
    /// Known length, or `None` for chunked transfer.
    pub content_length: Option<u64>,
    pub content_type: Option<&'static str>,
}

impl fmt::Debug for EncodedBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedBody")
            .field("content_length", &self.content_length)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Turn a payload into an outbound body. Touches no network.
pub fn encode(payload: Payload) -> Result<EncodedBody, RequestError> {
    match payload {
        Payload::Absent => Ok(EncodedBody {
            body: Empty::<Bytes>::new().map_err(|never| match never {}).boxed_unsync(),
            content_length: Some(0),
            content_type: None,
        }),
        Payload::Text(text) => Ok(full(Bytes::from(text), None)),
        Payload::Structured(Structured { encode: to_json }) => {
            let json = to_json().map_err(RequestError::encoding)?;
            Ok(full(Bytes::from(json), Some(JSON_CONTENT_TYPE)))
        }
        Payload::Stream(ByteSource { stream, length }) => Ok(EncodedBody {
            body: StreamBody::new(stream.map_ok(Frame::data)).boxed_unsync(),
            content_length: length,
            content_type: None,
        }),
    }
}

fn full(bytes: Bytes, content_type: Option<&'static str>) -> EncodedBody {
    let length = bytes.len() as u64;
    EncodedBody {
        body: Full::new(bytes).map_err(|never| match never {}).boxed_unsync(),
        content_length: Some(length),
        content_type,
    }
}
