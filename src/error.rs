//! HTTP/2 errors (RFC 9113 Section 5.4 and 7).
//!
//! Every protocol violation is an [`H2Error`] carrying a severity: connection
//! errors end the whole connection with GOAWAY, stream errors end a single
//! stream with RST_STREAM. [`H2Error::to_frame`] builds the frame to send.

use std::fmt;
use std::io;

use crate::frame::{Frame, GoAway, RstStream};

/// HTTP/2 error codes (RFC 9113 Section 7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ErrorCode {
    NoError = 0x0,
    ProtocolError = 0x1,
    InternalError = 0x2,
    FlowControlError = 0x3,
    SettingsTimeout = 0x4,
    StreamClosed = 0x5,
    FrameSizeError = 0x6,
    RefusedStream = 0x7,
    Cancel = 0x8,
    CompressionError = 0x9,
    ConnectError = 0xa,
    EnhanceYourCalm = 0xb,
    InadequateSecurity = 0xc,
    Http11Required = 0xd,
}

impl ErrorCode {
    /// Unknown codes MUST NOT trigger special behavior; they map to INTERNAL_ERROR.
    pub fn from_u32(v: u32) -> Self {
        match v {
            0x0 => Self::NoError,
            0x1 => Self::ProtocolError,
            0x2 => Self::InternalError,
            0x3 => Self::FlowControlError,
            0x4 => Self::SettingsTimeout,
            0x5 => Self::StreamClosed,
            0x6 => Self::FrameSizeError,
            0x7 => Self::RefusedStream,
            0x8 => Self::Cancel,
            0x9 => Self::CompressionError,
            0xa => Self::ConnectError,
            0xb => Self::EnhanceYourCalm,
            0xc => Self::InadequateSecurity,
            0xd => Self::Http11Required,
            _ => Self::InternalError,
        }
    }

    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoError => "NO_ERROR",
            Self::ProtocolError => "PROTOCOL_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
            Self::FlowControlError => "FLOW_CONTROL_ERROR",
            Self::SettingsTimeout => "SETTINGS_TIMEOUT",
            Self::StreamClosed => "STREAM_CLOSED",
            Self::FrameSizeError => "FRAME_SIZE_ERROR",
            Self::RefusedStream => "REFUSED_STREAM",
            Self::Cancel => "CANCEL",
            Self::CompressionError => "COMPRESSION_ERROR",
            Self::ConnectError => "CONNECT_ERROR",
            Self::EnhanceYourCalm => "ENHANCE_YOUR_CALM",
            Self::InadequateSecurity => "INADEQUATE_SECURITY",
            Self::Http11Required => "HTTP_1_1_REQUIRED",
        };
        f.write_str(name)
    }
}

/// Whether an error terminates the connection or a single stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorLevel {
    Connection,
    Stream,
}

impl fmt::Display for ErrorLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection => f.write_str("connection"),
            Self::Stream => f.write_str("stream"),
        }
    }
}

/// A protocol violation detected by the codec layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{level} error {code} (stream {stream_id}): {message}")]
pub struct H2Error {
    level: ErrorLevel,
    code: ErrorCode,
    stream_id: u32,
    message: String,
}

impl H2Error {
    /// A connection error; the connection must be closed with GOAWAY.
    pub fn connection(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            level: ErrorLevel::Connection,
            code,
            stream_id: 0,
            message: message.into(),
        }
    }

    /// A stream error, or a connection error when `stream_id` is 0.
    pub fn stream(code: ErrorCode, message: impl Into<String>, stream_id: u32) -> Self {
        let level = if stream_id == 0 {
            ErrorLevel::Connection
        } else {
            ErrorLevel::Stream
        };
        Self {
            level,
            code,
            stream_id,
            message: message.into(),
        }
    }

    pub fn level(&self) -> ErrorLevel {
        self.level
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn stream_id(&self) -> u32 {
        self.stream_id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_connection_error(&self) -> bool {
        self.level == ErrorLevel::Connection
    }

    /// The frame that reports this error to the peer: GOAWAY carrying
    /// `last_stream_id` for connection errors, RST_STREAM otherwise.
    pub fn to_frame(&self, last_stream_id: u32) -> Frame {
        match self.level {
            ErrorLevel::Connection => Frame::GoAway(GoAway::new(last_stream_id, self.code)),
            ErrorLevel::Stream => Frame::RstStream(RstStream::new(self.stream_id, self.code)),
        }
    }
}

/// A request rejected at the HTTP level while its field block stayed valid HPACK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HeaderRejection {
    #[error("414 URI Too Long")]
    UriTooLong,
    #[error("431 Request Header Fields Too Large")]
    HeadersTooLarge,
}

impl HeaderRejection {
    /// The HTTP status the caller should answer with.
    pub fn status(&self) -> u16 {
        match self {
            Self::UriTooLong => 414,
            Self::HeadersTooLarge => 431,
        }
    }
}

/// Errors surfaced by operations that also touch I/O or HTTP-level limits.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP/2 protocol violation.
    #[error(transparent)]
    H2(#[from] H2Error),

    /// The header list was decoded but exceeds a configured limit.
    #[error("stream {stream_id} rejected: {rejection}")]
    Rejected {
        stream_id: u32,
        rejection: HeaderRejection,
    },

    /// I/O error from the byte source or sink.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// The protocol error, if this is one.
    pub fn as_h2(&self) -> Option<&H2Error> {
        match self {
            Self::H2(e) => Some(e),
            _ => None,
        }
    }
}
