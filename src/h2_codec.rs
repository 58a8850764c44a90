//! HTTP/2 frame codec.
//!
//! A sans-I/O HTTP/2 frame processor: feed raw bytes in, get events out. It
//! handles:
//! 1. Frame header validation against the negotiated limits
//! 2. HEADERS + CONTINUATION reassembly and HPACK decoding
//! 3. DATA payloads as zero-copy slices of the receive buffer
//! 4. Connection-level control frames (SETTINGS, PING, GOAWAY, WINDOW_UPDATE)
//!
//! Reference: RFC 9113 (HTTP/2)

use std::collections::HashMap;

use bytes::{Buf, Bytes, BytesMut};

use crate::config::CodecConfig;
use crate::error::{Error, ErrorCode, H2Error, HeaderRejection};
use crate::frame::{
    ContinuationFrame, DataFrame, Frame, GoAway, HeadersFragment, HeadersFrame, Ping, Priority,
    RstStream, WindowUpdate,
};
use crate::hpack::{FieldBlock, FieldBlockDecoder, FieldBlockEncoder};
use crate::settings::{Http2Settings, SettingsDelta, SettingsFrame};

/// Size of the fixed frame header.
pub const FRAME_HEADER_LEN: usize = 9;

/// HTTP/2 frame flags
pub mod flags {
    pub const END_STREAM: u8 = 0x1;
    pub const ACK: u8 = 0x1;
    pub const END_HEADERS: u8 = 0x4;
    pub const PADDED: u8 = 0x8;
    pub const PRIORITY: u8 = 0x20;
}

/// HTTP/2 SETTINGS identifiers (RFC 9113 Section 6.5.2)
pub mod settings_id {
    pub const HEADER_TABLE_SIZE: u16 = 0x1;
    pub const ENABLE_PUSH: u16 = 0x2;
    pub const MAX_CONCURRENT_STREAMS: u16 = 0x3;
    pub const INITIAL_WINDOW_SIZE: u16 = 0x4;
    pub const MAX_FRAME_SIZE: u16 = 0x5;
    pub const MAX_HEADER_LIST_SIZE: u16 = 0x6;
}

/// HTTP/2 frame types (RFC 9113 Section 6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameType {
    Data,
    Headers,
    Priority,
    RstStream,
    Settings,
    PushPromise,
    Ping,
    GoAway,
    WindowUpdate,
    Continuation,
    /// Unrecognised type code; such frames are ignored.
    Unknown(u8),
}

impl FrameType {
    pub fn from_u8(code: u8) -> Self {
        match code {
            0x0 => Self::Data,
            0x1 => Self::Headers,
            0x2 => Self::Priority,
            0x3 => Self::RstStream,
            0x4 => Self::Settings,
            0x5 => Self::PushPromise,
            0x6 => Self::Ping,
            0x7 => Self::GoAway,
            0x8 => Self::WindowUpdate,
            0x9 => Self::Continuation,
            other => Self::Unknown(other),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Data => 0x0,
            Self::Headers => 0x1,
            Self::Priority => 0x2,
            Self::RstStream => 0x3,
            Self::Settings => 0x4,
            Self::PushPromise => 0x5,
            Self::Ping => 0x6,
            Self::GoAway => 0x7,
            Self::WindowUpdate => 0x8,
            Self::Continuation => 0x9,
            Self::Unknown(code) => code,
        }
    }

    /// Whether the payload carries (part of) an HPACK field block.
    pub fn has_field_block(self) -> bool {
        matches!(self, Self::Headers | Self::PushPromise | Self::Continuation)
    }

    /// `Some(true)` if a stream ID is required, `Some(false)` if forbidden,
    /// `None` if either is allowed.
    pub fn stream_required(self) -> Option<bool> {
        match self {
            Self::Data
            | Self::Headers
            | Self::Priority
            | Self::RstStream
            | Self::PushPromise
            | Self::Continuation => Some(true),
            Self::Settings | Self::Ping | Self::GoAway => Some(false),
            Self::WindowUpdate | Self::Unknown(_) => None,
        }
    }

    /// Exact payload length for fixed-size frame types.
    pub fn fixed_size(self) -> Option<u32> {
        match self {
            Self::Priority => Some(5),
            Self::RstStream => Some(4),
            Self::Ping => Some(8),
            Self::WindowUpdate => Some(4),
            _ => None,
        }
    }
}

/// A parsed HTTP/2 frame header (9 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct H2FrameHeader {
    pub length: u32,      // 24 bits
    pub frame_type: FrameType,
    pub flags: u8,
    pub stream_id: u32,   // 31 bits (high bit reserved)
}

impl H2FrameHeader {
    pub fn new(length: u32, frame_type: FrameType, flags: u8, stream_id: u32) -> Self {
        Self {
            length,
            frame_type,
            flags,
            stream_id,
        }
    }

    /// Parse a 9-byte frame header
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < FRAME_HEADER_LEN {
            return None;
        }

        let length = ((data[0] as u32) << 16) | ((data[1] as u32) << 8) | (data[2] as u32);
        let frame_type = FrameType::from_u8(data[3]);
        let flags = data[4];
        let stream_id = u32::from_be_bytes([data[5], data[6], data[7], data[8]]) & 0x7FFFFFFF; // Clear reserved bit

        Some(Self {
            length,
            frame_type,
            flags,
            stream_id,
        })
    }

    /// Parse and validate a frame header against `max_frame_size`.
    ///
    /// An oversized frame is a connection error when it carries a field block,
    /// has an unknown type or no stream; otherwise only its stream fails.
    pub fn read(data: &[u8], max_frame_size: u32) -> Result<Self, H2Error> {
        let header = Self::parse(data).ok_or_else(|| {
            H2Error::connection(ErrorCode::FrameSizeError, "Incomplete frame header")
        })?;
        let has_stream = header.stream_id != 0;

        if header.length > max_frame_size {
            let message = format!(
                "Frame of {} bytes exceeds max frame size {}",
                header.length, max_frame_size
            );
            let connection_level = !has_stream
                || header.frame_type.has_field_block()
                || matches!(header.frame_type, FrameType::Unknown(_));
            return Err(if connection_level {
                H2Error::connection(ErrorCode::FrameSizeError, message)
            } else {
                H2Error::stream(ErrorCode::FrameSizeError, message, header.stream_id)
            });
        }

        if let Some(fixed) = header.frame_type.fixed_size() {
            if fixed != header.length {
                return Err(H2Error::connection(
                    ErrorCode::FrameSizeError,
                    format!(
                        "{:?} frame must be {} bytes, got {}",
                        header.frame_type, fixed, header.length
                    ),
                ));
            }
        }

        if let Some(required) = header.frame_type.stream_required() {
            if required != has_stream {
                return Err(H2Error::connection(
                    ErrorCode::ProtocolError,
                    format!(
                        "Stream ID {}present for {:?}",
                        if has_stream { "" } else { "not " },
                        header.frame_type
                    ),
                ));
            }
        }

        Ok(header)
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        out.push((self.length >> 16) as u8);
        out.push((self.length >> 8) as u8);
        out.push(self.length as u8);
        out.push(self.frame_type.as_u8());
        out.push(self.flags);
        out.extend_from_slice(&(self.stream_id & 0x7FFFFFFF).to_be_bytes());
    }

    /// Total frame size including header
    pub fn total_size(&self) -> usize {
        FRAME_HEADER_LEN + self.length as usize
    }

    /// Check if END_STREAM flag is set
    pub fn is_end_stream(&self) -> bool {
        self.flags & flags::END_STREAM != 0
    }

    /// Check if END_HEADERS flag is set
    pub fn is_end_headers(&self) -> bool {
        self.flags & flags::END_HEADERS != 0
    }

    pub fn is_padded(&self) -> bool {
        self.flags & flags::PADDED != 0
    }

    pub fn has_priority(&self) -> bool {
        self.flags & flags::PRIORITY != 0
    }
}

/// Events emitted by the H2 codec when parsing frames
#[derive(Debug)]
pub enum H2Event {
    /// A complete, decoded header list (request headers or trailers)
    Headers {
        stream_id: u32,
        headers: FieldBlock,
        end_stream: bool,
        priority: Option<Priority>,
    },
    /// Header list decoded but over a configured limit; answer with `rejection.status()`
    HeadersRejected {
        stream_id: u32,
        rejection: HeaderRejection,
        end_stream: bool,
    },
    /// Data for a stream, padding removed
    Data {
        stream_id: u32,
        data: Bytes,
        end_stream: bool,
    },
    /// Stream was reset (RST_STREAM)
    StreamReset {
        stream_id: u32,
        error_code: u32,
    },
    /// Connection-level GOAWAY
    GoAway {
        last_stream_id: u32,
        error_code: u32,
        debug_data: Bytes,
    },
    /// Settings frame (connection-level)
    Settings(SettingsFrame),
    /// Window update
    WindowUpdate {
        stream_id: u32,
        increment: u32,
    },
    /// Ping (connection-level)
    Ping {
        ack: bool,
        data: [u8; 8],
    },
    /// Stream reprioritisation; informational only
    Priority {
        stream_id: u32,
        priority: Priority,
    },
    /// A stream-level protocol error; reset that stream and carry on
    StreamError(H2Error),
}

/// State for a single HTTP/2 stream (lifecycle tracking only).
/// Data payloads are returned directly via H2Event, not accumulated here.
#[derive(Debug, Default)]
pub struct StreamState {
    /// True if we've seen END_HEADERS
    pub headers_complete: bool,
    /// True if we've seen END_STREAM
    pub stream_ended: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrefaceState {
    Pending,
    Received,
    /// The peer started with frames (client-side use).
    Absent,
}

/// HTTP/2 frame processor for one connection.
///
/// Owns the connection's HPACK decoder and encoder, so frames must be fed
/// and built in wire order.
#[derive(Debug)]
pub struct H2Codec {
    /// Buffer for incomplete frames
    buffer: BytesMut,
    /// Bytes of an oversized stream frame still to be skipped
    discard: usize,
    /// State per stream
    streams: HashMap<u32, StreamState>,
    preface: PrefaceState,
    /// HEADERS frame waiting for CONTINUATION + END_HEADERS
    pending_headers: Option<HeadersFragment>,
    /// Accumulated header block data across HEADERS + CONTINUATION frames
    pending_header_block: Vec<u8>,
    decoder: FieldBlockDecoder,
    encoder: FieldBlockEncoder,
    max_frame_size: u32,
    max_header_block_size: usize,
    peer_settings: Http2Settings,
    last_stream_id: u32,
}

/// Maximum accumulated header block size (256 KB).
/// Prevents unbounded memory growth from malicious/buggy CONTINUATION floods.
pub const MAX_HEADER_BLOCK_SIZE: usize = 256 * 1024;

/// The HTTP/2 connection preface (24 bytes)
pub const CONNECTION_PREFACE: &[u8] = b"PRI * HTTP/2.0\r\n\r\nSM\r\n\r\n";

/// Check if data starts with HTTP/2 connection preface (h2c detection)
pub fn is_h2c_preface(data: &[u8]) -> bool {
    data.starts_with(CONNECTION_PREFACE)
}

impl Default for H2Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl H2Codec {
    pub fn new() -> Self {
        Self::with_config(&CodecConfig::default())
    }

    pub fn with_config(config: &CodecConfig) -> Self {
        Self {
            buffer: BytesMut::new(),
            discard: 0,
            streams: HashMap::new(),
            preface: PrefaceState::Pending,
            pending_headers: None,
            pending_header_block: Vec::new(),
            decoder: FieldBlockDecoder::from_config(config),
            encoder: FieldBlockEncoder::from_config(config),
            max_frame_size: config.max_frame_size,
            max_header_block_size: config.max_header_block_size,
            peer_settings: Http2Settings::client_defaults(),
            last_stream_id: 0,
        }
    }

    /// True once the connection preface has been consumed.
    pub fn preface_received(&self) -> bool {
        self.preface == PrefaceState::Received
    }

    /// Skip preface detection, e.g. after a [`Handshaker`](crate::handshake::Handshaker) consumed it.
    pub fn set_preface_received(&mut self, received: bool) {
        self.preface = if received {
            PrefaceState::Received
        } else {
            PrefaceState::Pending
        };
    }

    /// Settings the peer has announced so far, applied over the client defaults.
    pub fn peer_settings(&self) -> &Http2Settings {
        &self.peer_settings
    }

    /// Use settings already negotiated elsewhere, e.g. by a [`Handshaker`](crate::handshake::Handshaker).
    pub fn set_peer_settings(&mut self, settings: Http2Settings) {
        self.encoder
            .change_table_size(settings.header_table_size as usize);
        self.peer_settings = settings;
    }

    /// Highest stream ID that carried HEADERS, for GOAWAY.
    pub fn last_stream_id(&self) -> u32 {
        self.last_stream_id
    }

    pub fn decoder(&self) -> &FieldBlockDecoder {
        &self.decoder
    }

    pub fn stream(&self, stream_id: u32) -> Option<&StreamState> {
        self.streams.get(&stream_id)
    }

    /// Process incoming data and return parsed events.
    ///
    /// This is the main entry point - feed raw bytes and get back events.
    /// An `Err` is a connection error: send [`H2Error::to_frame`] and close.
    pub fn process(&mut self, data: &[u8]) -> Result<Vec<H2Event>, H2Error> {
        self.buffer.extend_from_slice(data);
        let mut events = Vec::new();

        // Check for connection preface (client sends this first)
        if self.preface == PrefaceState::Pending {
            if self.buffer.len() < CONNECTION_PREFACE.len()
                && CONNECTION_PREFACE.starts_with(&self.buffer)
            {
                return Ok(events);
            }
            if is_h2c_preface(&self.buffer) {
                self.buffer.advance(CONNECTION_PREFACE.len());
                self.preface = PrefaceState::Received;
            } else {
                self.preface = PrefaceState::Absent;
            }
        }

        loop {
            if self.discard > 0 {
                let n = self.discard.min(self.buffer.len());
                self.buffer.advance(n);
                self.discard -= n;
                if self.discard > 0 {
                    break;
                }
            }

            // Need at least 9 bytes for frame header
            if self.buffer.len() < FRAME_HEADER_LEN {
                break;
            }

            let header = match H2FrameHeader::read(&self.buffer, self.max_frame_size) {
                Ok(h) => h,
                Err(e) if !e.is_connection_error() => {
                    // oversized frame on a stream: skip it
                    self.discard = H2FrameHeader::parse(&self.buffer)
                        .map_or(FRAME_HEADER_LEN, |raw| raw.total_size());
                    tracing::debug!(error = %e, "stream error");
                    events.push(H2Event::StreamError(e));
                    continue;
                }
                Err(e) => return Err(Self::fail(e)),
            };

            // Check if we have the complete frame
            if self.buffer.len() < header.total_size() {
                break;
            }

            let mut frame = self.buffer.split_to(header.total_size());
            frame.advance(FRAME_HEADER_LEN);
            let payload = frame.freeze();

            match self.parse_frame(&header, payload) {
                Ok(Some(event)) => events.push(event),
                Ok(None) => {}
                Err(e) if !e.is_connection_error() => {
                    tracing::debug!(error = %e, "stream error");
                    events.push(H2Event::StreamError(e));
                }
                Err(e) => return Err(Self::fail(e)),
            }
        }

        Ok(events)
    }

    fn fail(error: H2Error) -> H2Error {
        tracing::debug!(error = %error, "connection error");
        error
    }

    /// Parse a single frame and return an event if applicable
    fn parse_frame(&mut self, header: &H2FrameHeader, payload: Bytes) -> Result<Option<H2Event>, H2Error> {
        if let Some(pending) = &self.pending_headers {
            if header.frame_type != FrameType::Continuation {
                return Err(H2Error::connection(
                    ErrorCode::ProtocolError,
                    format!(
                        "{:?} frame while header block on stream {} is incomplete",
                        header.frame_type, pending.stream_id
                    ),
                ));
            }
            if header.stream_id != pending.stream_id {
                return Err(H2Error::connection(
                    ErrorCode::ProtocolError,
                    format!(
                        "CONTINUATION for stream {} but pending headers on stream {}",
                        header.stream_id, pending.stream_id
                    ),
                ));
            }
        }

        let frame = match Frame::decode(header, payload, &mut self.decoder) {
            Ok(frame) => frame,
            Err(Error::Rejected { stream_id, rejection }) => {
                return Ok(Some(self.rejected(stream_id, rejection, header.is_end_stream())));
            }
            Err(Error::H2(e)) => return Err(e),
            Err(Error::Io(e)) => return Err(H2Error::connection(ErrorCode::InternalError, e.to_string())),
        };

        let event = match frame {
            Frame::Data(data) => self.on_data(data),
            Frame::Headers(headers) => Some(self.on_headers(headers)),
            Frame::PartialHeaders(fragment) => {
                // Headers span multiple frames - accumulate and wait for CONTINUATION
                self.check_block_size(fragment.fragment.len())?;
                self.pending_header_block = fragment.fragment.to_vec();
                self.pending_headers = Some(fragment);
                None
            }
            Frame::Continuation(continuation) => self.on_continuation(continuation)?,
            Frame::Priority(p) => Some(H2Event::Priority {
                stream_id: p.stream_id,
                priority: p.priority,
            }),
            Frame::Settings(settings) => Some(self.on_settings(settings)),
            Frame::WindowUpdate(w) => Some(H2Event::WindowUpdate {
                stream_id: w.stream_id,
                increment: w.increment,
            }),
            Frame::GoAway(g) => Some(H2Event::GoAway {
                last_stream_id: g.last_stream_id,
                error_code: g.error_code,
                debug_data: g.debug_data,
            }),
            Frame::RstStream(r) => {
                self.streams.remove(&r.stream_id);
                Some(H2Event::StreamReset {
                    stream_id: r.stream_id,
                    error_code: r.error_code,
                })
            }
            Frame::Ping(p) => Some(H2Event::Ping {
                ack: p.ack,
                data: p.data,
            }),
            Frame::Unknown(u) => {
                tracing::trace!(frame_type = u.frame_type, stream_id = u.stream_id, "ignoring unknown frame");
                None
            }
        };
        Ok(event)
    }

    fn on_data(&mut self, data: DataFrame) -> Option<H2Event> {
        let stream = self.streams.entry(data.stream_id).or_default();
        if data.end_stream {
            stream.stream_ended = true;
        }
        Some(H2Event::Data {
            stream_id: data.stream_id,
            data: data.data,
            end_stream: data.end_stream,
        })
    }

    fn open_stream(&mut self, stream_id: u32, end_stream: bool) {
        self.last_stream_id = self.last_stream_id.max(stream_id);
        let stream = self.streams.entry(stream_id).or_default();
        stream.headers_complete = true;
        if end_stream {
            stream.stream_ended = true;
        }
    }

    fn on_headers(&mut self, headers: HeadersFrame) -> H2Event {
        self.open_stream(headers.stream_id, headers.end_stream);
        H2Event::Headers {
            stream_id: headers.stream_id,
            headers: headers.fields,
            end_stream: headers.end_stream,
            priority: headers.priority,
        }
    }

    fn rejected(&mut self, stream_id: u32, rejection: HeaderRejection, end_stream: bool) -> H2Event {
        self.open_stream(stream_id, end_stream);
        H2Event::HeadersRejected {
            stream_id,
            rejection,
            end_stream,
        }
    }

    fn check_block_size(&self, size: usize) -> Result<(), H2Error> {
        if size > self.max_header_block_size {
            return Err(H2Error::connection(
                ErrorCode::EnhanceYourCalm,
                format!(
                    "Header block too large ({} bytes, max {})",
                    size, self.max_header_block_size
                ),
            ));
        }
        Ok(())
    }

    fn on_continuation(&mut self, continuation: ContinuationFrame) -> Result<Option<H2Event>, H2Error> {
        if self.pending_headers.is_none() {
            return Err(H2Error::connection(
                ErrorCode::ProtocolError,
                format!("Unexpected CONTINUATION frame for stream {}", continuation.stream_id),
            ));
        }

        // Guard against unbounded header block accumulation
        let new_size = self.pending_header_block.len() + continuation.fragment.len();
        if let Err(e) = self.check_block_size(new_size) {
            self.pending_headers = None;
            self.pending_header_block.clear();
            return Err(e);
        }
        self.pending_header_block.extend_from_slice(&continuation.fragment);
        if !continuation.end_headers {
            return Ok(None);
        }

        let Some(first) = self.pending_headers.take() else {
            return Ok(None);
        };
        let block = std::mem::take(&mut self.pending_header_block);
        let end_stream = first.end_stream;
        match HeadersFrame::from_fragments(first, &block, &mut self.decoder) {
            Ok(headers) => Ok(Some(self.on_headers(headers))),
            Err(Error::Rejected { stream_id, rejection }) => {
                Ok(Some(self.rejected(stream_id, rejection, end_stream)))
            }
            Err(Error::H2(e)) => Err(e),
            Err(Error::Io(e)) => Err(H2Error::connection(ErrorCode::InternalError, e.to_string())),
        }
    }

    fn on_settings(&mut self, settings: SettingsFrame) -> H2Event {
        if let SettingsFrame::Update(delta) = &settings {
            self.peer_settings = self.peer_settings.copy_if_changed(delta);
            if let Some(size) = delta.header_table_size {
                self.encoder.change_table_size(size as usize);
            }
            tracing::debug!(settings = ?self.peer_settings, "peer settings updated");
        }
        H2Event::Settings(settings)
    }

    /// Remove a stream (e.g., after completing a flow)
    pub fn remove_stream(&mut self, stream_id: u32) {
        self.streams.remove(&stream_id);
    }

    /// Reset codec state (e.g., after upstream reconnect)
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.discard = 0;
        self.streams.clear();
        self.preface = PrefaceState::Pending;
        self.pending_headers = None;
        self.pending_header_block.clear();
        self.last_stream_id = 0;
    }

    /// Encode a header list for `stream_id`, split to the peer's max frame size.
    pub fn encode_headers(&mut self, stream_id: u32, headers: &FieldBlock, end_stream: bool) -> Vec<u8> {
        let frame = HeadersFrame::new(stream_id, headers.clone(), end_stream);
        let mut out = Vec::new();
        frame.encode(&mut self.encoder, self.peer_settings.max_frame_size, &mut out);
        out
    }

    /// Encode any frame with this connection's HPACK encoder.
    pub fn encode_frame(&mut self, frame: &Frame) -> Vec<u8> {
        let mut out = Vec::new();
        frame.encode(&mut self.encoder, self.peer_settings.max_frame_size, &mut out);
        out
    }

    /// Create a RST_STREAM frame
    pub fn create_rst_stream(stream_id: u32, code: ErrorCode) -> Vec<u8> {
        let mut frame = Vec::with_capacity(13);
        RstStream::new(stream_id, code).encode(&mut frame);
        frame
    }

    /// Create a GOAWAY frame
    pub fn create_goaway(last_stream_id: u32, code: ErrorCode) -> Vec<u8> {
        let mut frame = Vec::with_capacity(17);
        GoAway::new(last_stream_id, code).encode(&mut frame);
        frame
    }

    /// Create a SETTINGS ACK frame
    pub fn create_settings_ack() -> Vec<u8> {
        let mut frame = Vec::with_capacity(FRAME_HEADER_LEN);
        SettingsFrame::Ack.encode(&mut frame);
        frame
    }

    /// Create the SETTINGS frame announcing `settings`
    /// This is sent by the server to the client at connection start
    pub fn create_settings(settings: &Http2Settings) -> Vec<u8> {
        let mut frame = Vec::new();
        settings.to_frame().encode(&mut frame);
        frame
    }

    /// Create a SETTINGS frame carrying only SETTINGS_INITIAL_WINDOW_SIZE
    pub fn create_settings_with_window(initial_window_size: u32) -> Vec<u8> {
        let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + 6);
        SettingsFrame::Update(SettingsDelta {
            initial_window_size: Some(initial_window_size),
            ..Default::default()
        })
        .encode(&mut frame);
        frame
    }

    /// Create a PING ACK frame
    pub fn create_ping_ack(data: [u8; 8]) -> Vec<u8> {
        let mut frame = Vec::with_capacity(17);
        Ping::new(data).ack().encode(&mut frame);
        frame
    }

    /// Create a WINDOW_UPDATE frame to replenish flow control window
    /// stream_id=0 updates connection-level window, otherwise stream-level
    pub fn create_window_update(stream_id: u32, increment: u32) -> Vec<u8> {
        let mut frame = Vec::with_capacity(13);
        WindowUpdate::new(stream_id, increment).encode(&mut frame);
        frame
    }

    /// Create a CONTINUATION frame to continue a header block
    /// end_headers: true if this is the final frame in the header block sequence
    pub fn create_continuation_frame(stream_id: u32, payload: &[u8], end_headers: bool) -> Vec<u8> {
        let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
        ContinuationFrame {
            stream_id,
            end_headers,
            fragment: Bytes::copy_from_slice(payload),
        }
        .encode(&mut frame);
        frame
    }
}
