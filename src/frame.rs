//! Logical HTTP/2 frames (RFC 9113 Section 6).
//!
//! A [`Frame`] is decoded from a validated [`H2FrameHeader`] plus its payload,
//! and encoded back to wire bytes. HEADERS frames go through the connection's
//! HPACK decoder or encoder; everything else is plain bytes.
//!
//! A HEADERS frame without END_HEADERS decodes to [`Frame::PartialHeaders`]:
//! its fragment has to be joined with the following CONTINUATION fragments
//! before the field block can be decoded (see [`HeadersFrame::from_fragments`]).

use bytes::Bytes;

use crate::error::{Error, ErrorCode, H2Error};
use crate::h2_codec::{flags, FrameType, H2FrameHeader, FRAME_HEADER_LEN};
use crate::hpack::{FieldBlock, FieldBlockDecoder, FieldBlockEncoder};
pub use crate::settings::{SettingsDelta, SettingsFrame};

/// A decoded HTTP/2 frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Data(DataFrame),
    Headers(HeadersFrame),
    /// First fragment of a field block still waiting for CONTINUATION frames.
    PartialHeaders(HeadersFragment),
    Continuation(ContinuationFrame),
    Priority(PriorityFrame),
    Settings(SettingsFrame),
    WindowUpdate(WindowUpdate),
    GoAway(GoAway),
    RstStream(RstStream),
    Ping(Ping),
    Unknown(UnknownFrame),
}

impl Frame {
    /// Decode the payload of a frame whose header has already been validated.
    ///
    /// Complete HEADERS frames are run through `decoder`, so a rejected field
    /// block surfaces as [`Error::Rejected`].
    pub fn decode(
        header: &H2FrameHeader,
        payload: Bytes,
        decoder: &mut FieldBlockDecoder,
    ) -> Result<Frame, Error> {
        if payload.len() != header.length as usize {
            return Err(H2Error::connection(
                ErrorCode::FrameSizeError,
                format!(
                    "payload of {} bytes for a frame of length {}",
                    payload.len(),
                    header.length
                ),
            )
            .into());
        }

        let frame = match header.frame_type {
            FrameType::Data => Frame::Data(DataFrame::decode(header, payload)?),
            FrameType::Headers => {
                let fragment = HeadersFragment::decode(header, payload)?;
                if fragment.end_headers {
                    let block = fragment.fragment.clone();
                    Frame::Headers(HeadersFrame::from_fragments(fragment, &block, decoder)?)
                } else {
                    Frame::PartialHeaders(fragment)
                }
            }
            FrameType::Continuation => Frame::Continuation(ContinuationFrame::decode(header, payload)),
            FrameType::Priority => Frame::Priority(PriorityFrame::decode(header, &payload)?),
            FrameType::Settings => Frame::Settings(SettingsFrame::decode(header, &payload)?),
            FrameType::WindowUpdate => Frame::WindowUpdate(WindowUpdate::decode(header, &payload)?),
            FrameType::GoAway => Frame::GoAway(GoAway::decode(&payload)?),
            FrameType::RstStream => Frame::RstStream(RstStream::decode(header, &payload)?),
            FrameType::Ping => Frame::Ping(Ping::decode(header, &payload)?),
            FrameType::PushPromise => {
                return Err(H2Error::connection(
                    ErrorCode::ProtocolError,
                    "PUSH_PROMISE received from a client",
                )
                .into())
            }
            FrameType::Unknown(frame_type) => Frame::Unknown(UnknownFrame {
                frame_type,
                flags: header.flags,
                stream_id: header.stream_id,
                payload,
            }),
        };
        Ok(frame)
    }

    /// Append the wire form of this frame to `out`.
    ///
    /// HEADERS frames whose encoded block exceeds `max_frame_size` are split
    /// into HEADERS + CONTINUATION frames.
    pub fn encode(&self, encoder: &mut FieldBlockEncoder, max_frame_size: u32, out: &mut Vec<u8>) {
        match self {
            Frame::Data(f) => f.encode(out),
            Frame::Headers(f) => f.encode(encoder, max_frame_size, out),
            Frame::PartialHeaders(f) => f.encode(out),
            Frame::Continuation(f) => f.encode(out),
            Frame::Priority(f) => f.encode(out),
            Frame::Settings(f) => f.encode(out),
            Frame::WindowUpdate(f) => f.encode(out),
            Frame::GoAway(f) => f.encode(out),
            Frame::RstStream(f) => f.encode(out),
            Frame::Ping(f) => f.encode(out),
            Frame::Unknown(f) => f.encode(out),
        }
    }

    pub fn frame_type(&self) -> FrameType {
        match self {
            Frame::Data(_) => FrameType::Data,
            Frame::Headers(_) | Frame::PartialHeaders(_) => FrameType::Headers,
            Frame::Continuation(_) => FrameType::Continuation,
            Frame::Priority(_) => FrameType::Priority,
            Frame::Settings(_) => FrameType::Settings,
            Frame::WindowUpdate(_) => FrameType::WindowUpdate,
            Frame::GoAway(_) => FrameType::GoAway,
            Frame::RstStream(_) => FrameType::RstStream,
            Frame::Ping(_) => FrameType::Ping,
            Frame::Unknown(f) => FrameType::Unknown(f.frame_type),
        }
    }

    /// Stream the frame belongs to; 0 for connection-level frames.
    pub fn stream_id(&self) -> u32 {
        match self {
            Frame::Data(f) => f.stream_id,
            Frame::Headers(f) => f.stream_id,
            Frame::PartialHeaders(f) => f.stream_id,
            Frame::Continuation(f) => f.stream_id,
            Frame::Priority(f) => f.stream_id,
            Frame::WindowUpdate(f) => f.stream_id,
            Frame::RstStream(f) => f.stream_id,
            Frame::Unknown(f) => f.stream_id,
            Frame::Settings(_) | Frame::GoAway(_) | Frame::Ping(_) => 0,
        }
    }
}

fn protocol_error(message: impl Into<String>) -> H2Error {
    H2Error::connection(ErrorCode::ProtocolError, message)
}

fn fixed<const N: usize>(payload: &[u8], what: &str) -> Result<[u8; N], H2Error> {
    payload.try_into().map_err(|_| {
        H2Error::connection(
            ErrorCode::FrameSizeError,
            format!("{what} payload must be {N} bytes, got {}", payload.len()),
        )
    })
}

// ============================================================================
// DATA
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFrame {
    pub stream_id: u32,
    pub end_stream: bool,
    pub data: Bytes,
    /// Number of padding bytes to write after the data, if any.
    pub padding: Option<u8>,
}

impl DataFrame {
    pub fn new(stream_id: u32, data: impl Into<Bytes>, end_stream: bool) -> Self {
        Self {
            stream_id,
            end_stream,
            data: data.into(),
            padding: None,
        }
    }

    pub fn with_padding(mut self, padding: u8) -> Self {
        self.padding = Some(padding);
        self
    }

    /// Bytes charged against the flow-control windows: the data only, padding excluded.
    pub fn flow_controlled_len(&self) -> usize {
        self.data.len()
    }

    pub fn decode(header: &H2FrameHeader, payload: Bytes) -> Result<Self, H2Error> {
        let (data, padding) = if header.is_padded() {
            let Some(&pad_length) = payload.first() else {
                return Err(protocol_error("PADDED DATA frame with no payload"));
            };
            if pad_length as usize >= payload.len() {
                return Err(protocol_error("Invalid padding length in DATA frame"));
            }
            (
                payload.slice(1..payload.len() - pad_length as usize),
                Some(pad_length),
            )
        } else {
            (payload, None)
        };
        Ok(Self {
            stream_id: header.stream_id,
            end_stream: header.is_end_stream(),
            data,
            padding,
        })
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        let mut frame_flags = 0;
        if self.end_stream {
            frame_flags |= flags::END_STREAM;
        }
        let mut length = self.data.len();
        if let Some(padding) = self.padding {
            frame_flags |= flags::PADDED;
            length += 1 + padding as usize;
        }
        H2FrameHeader::new(length as u32, FrameType::Data, frame_flags, self.stream_id).encode(out);
        if let Some(padding) = self.padding {
            out.push(padding);
            out.extend_from_slice(&self.data);
            out.resize(out.len() + padding as usize, 0);
        } else {
            out.extend_from_slice(&self.data);
        }
    }
}

// ============================================================================
// HEADERS / CONTINUATION
// ============================================================================

/// Stream dependency and weight, as carried by HEADERS and PRIORITY frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Priority {
    pub exclusive: bool,
    pub dependency: u32,
    /// Weight as sent on the wire; the effective weight is one more.
    pub weight: u8,
}

impl Priority {
    fn decode(bytes: [u8; 5]) -> Self {
        let raw = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        Self {
            exclusive: raw & 0x8000_0000 != 0,
            dependency: raw & 0x7fff_ffff,
            weight: bytes[4],
        }
    }

    fn encode(&self, out: &mut Vec<u8>) {
        let mut raw = self.dependency & 0x7fff_ffff;
        if self.exclusive {
            raw |= 0x8000_0000;
        }
        out.extend_from_slice(&raw.to_be_bytes());
        out.push(self.weight);
    }
}

/// The first frame of a field block, with the block fragment still encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadersFragment {
    pub stream_id: u32,
    pub end_stream: bool,
    pub end_headers: bool,
    pub priority: Option<Priority>,
    pub fragment: Bytes,
}

impl HeadersFragment {
    pub fn decode(header: &H2FrameHeader, payload: Bytes) -> Result<Self, H2Error> {
        let mut offset = 0;
        let mut pad_length = 0;

        if header.is_padded() {
            let Some(&pad) = payload.first() else {
                return Err(protocol_error("PADDED HEADERS frame with no payload"));
            };
            pad_length = pad as usize;
            offset = 1;
        }

        let priority = if header.has_priority() {
            let bytes = payload
                .get(offset..offset + 5)
                .ok_or_else(|| protocol_error("PRIORITY HEADERS frame with insufficient data"))?;
            offset += 5;
            let mut raw = [0u8; 5];
            raw.copy_from_slice(bytes);
            Some(Priority::decode(raw))
        } else {
            None
        };

        if pad_length > payload.len() - offset {
            return Err(protocol_error("Invalid padding length in HEADERS frame"));
        }

        Ok(Self {
            stream_id: header.stream_id,
            end_stream: header.is_end_stream(),
            end_headers: header.is_end_headers(),
            priority,
            fragment: payload.slice(offset..payload.len() - pad_length),
        })
    }

    /// Write the fragment as a HEADERS frame, unchanged.
    pub fn encode(&self, out: &mut Vec<u8>) {
        let mut frame_flags = 0;
        if self.end_stream {
            frame_flags |= flags::END_STREAM;
        }
        if self.end_headers {
            frame_flags |= flags::END_HEADERS;
        }
        let mut length = self.fragment.len();
        if self.priority.is_some() {
            frame_flags |= flags::PRIORITY;
            length += 5;
        }
        H2FrameHeader::new(length as u32, FrameType::Headers, frame_flags, self.stream_id).encode(out);
        if let Some(p) = &self.priority {
            p.encode(out);
        }
        out.extend_from_slice(&self.fragment);
    }
}

/// A HEADERS frame with its complete, decoded field block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadersFrame {
    pub stream_id: u32,
    pub end_stream: bool,
    pub priority: Option<Priority>,
    pub fields: FieldBlock,
}

impl HeadersFrame {
    pub fn new(stream_id: u32, fields: FieldBlock, end_stream: bool) -> Self {
        Self {
            stream_id,
            end_stream,
            priority: None,
            fields,
        }
    }

    /// Decode the field block assembled from `first` and any CONTINUATION fragments.
    ///
    /// The block is always decoded, even when the frame turns out to be a
    /// stream error, so the HPACK table stays in step with the peer.
    pub fn from_fragments(
        first: HeadersFragment,
        block: &[u8],
        decoder: &mut FieldBlockDecoder,
    ) -> Result<Self, Error> {
        let fields = decoder.decode(first.stream_id, block)?;
        if let Some(p) = first.priority {
            if p.dependency == first.stream_id {
                return Err(H2Error::stream(
                    ErrorCode::ProtocolError,
                    "Stream cannot depend on itself",
                    first.stream_id,
                )
                .into());
            }
        }
        Ok(Self {
            stream_id: first.stream_id,
            end_stream: first.end_stream,
            priority: first.priority,
            fields,
        })
    }

    pub fn encode(&self, encoder: &mut FieldBlockEncoder, max_frame_size: u32, out: &mut Vec<u8>) {
        let start = out.len();
        let mut frame_flags = flags::END_HEADERS;
        if self.end_stream {
            frame_flags |= flags::END_STREAM;
        }
        if self.priority.is_some() {
            frame_flags |= flags::PRIORITY;
        }

        // placeholder header, length patched below
        H2FrameHeader::new(0, FrameType::Headers, frame_flags, self.stream_id).encode(out);
        if let Some(p) = &self.priority {
            p.encode(out);
        }
        encoder.encode(&self.fields, out);

        let max = (max_frame_size as usize).max(1);
        let payload_len = out.len() - start - FRAME_HEADER_LEN;
        if payload_len <= max {
            patch_length(&mut out[start..], payload_len);
            return;
        }

        let rest = out.split_off(start + FRAME_HEADER_LEN + max);
        patch_length(&mut out[start..], max);
        out[start + 4] &= !flags::END_HEADERS;

        let mut chunks = rest.chunks(max).peekable();
        while let Some(chunk) = chunks.next() {
            let frame_flags = if chunks.peek().is_none() {
                flags::END_HEADERS
            } else {
                0
            };
            H2FrameHeader::new(chunk.len() as u32, FrameType::Continuation, frame_flags, self.stream_id)
                .encode(out);
            out.extend_from_slice(chunk);
        }
    }
}

fn patch_length(frame: &mut [u8], length: usize) {
    frame[0] = (length >> 16) as u8;
    frame[1] = (length >> 8) as u8;
    frame[2] = length as u8;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationFrame {
    pub stream_id: u32,
    pub end_headers: bool,
    pub fragment: Bytes,
}

impl ContinuationFrame {
    pub fn decode(header: &H2FrameHeader, payload: Bytes) -> Self {
        Self {
            stream_id: header.stream_id,
            end_headers: header.is_end_headers(),
            fragment: payload,
        }
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        let frame_flags = if self.end_headers {
            flags::END_HEADERS
        } else {
            0
        };
        H2FrameHeader::new(
            self.fragment.len() as u32,
            FrameType::Continuation,
            frame_flags,
            self.stream_id,
        )
        .encode(out);
        out.extend_from_slice(&self.fragment);
    }
}

// ============================================================================
// Control frames
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityFrame {
    pub stream_id: u32,
    pub priority: Priority,
}

impl PriorityFrame {
    pub fn decode(header: &H2FrameHeader, payload: &[u8]) -> Result<Self, H2Error> {
        let priority = Priority::decode(fixed::<5>(payload, "PRIORITY")?);
        if priority.dependency == header.stream_id {
            return Err(H2Error::stream(
                ErrorCode::ProtocolError,
                "Stream cannot depend on itself",
                header.stream_id,
            ));
        }
        Ok(Self {
            stream_id: header.stream_id,
            priority,
        })
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        H2FrameHeader::new(5, FrameType::Priority, 0, self.stream_id).encode(out);
        self.priority.encode(out);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowUpdate {
    pub stream_id: u32,
    pub increment: u32,
}

impl WindowUpdate {
    pub fn new(stream_id: u32, increment: u32) -> Self {
        Self {
            stream_id,
            increment,
        }
    }

    pub fn decode(header: &H2FrameHeader, payload: &[u8]) -> Result<Self, H2Error> {
        let increment = u32::from_be_bytes(fixed::<4>(payload, "WINDOW_UPDATE")?) & 0x7fff_ffff;
        if increment == 0 {
            return Err(H2Error::stream(
                ErrorCode::ProtocolError,
                "Window update with zero increment",
                header.stream_id,
            ));
        }
        Ok(Self::new(header.stream_id, increment))
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        H2FrameHeader::new(4, FrameType::WindowUpdate, 0, self.stream_id).encode(out);
        out.extend_from_slice(&(self.increment & 0x7fff_ffff).to_be_bytes());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoAway {
    pub last_stream_id: u32,
    pub error_code: u32,
    pub debug_data: Bytes,
}

impl GoAway {
    pub fn new(last_stream_id: u32, code: ErrorCode) -> Self {
        Self {
            last_stream_id,
            error_code: code.as_u32(),
            debug_data: Bytes::new(),
        }
    }

    pub fn with_debug_data(mut self, debug_data: impl Into<Bytes>) -> Self {
        self.debug_data = debug_data.into();
        self
    }

    pub fn code(&self) -> ErrorCode {
        ErrorCode::from_u32(self.error_code)
    }

    pub fn decode(payload: &[u8]) -> Result<Self, H2Error> {
        if payload.len() < 8 {
            return Err(H2Error::connection(
                ErrorCode::FrameSizeError,
                "GOAWAY frame too short",
            ));
        }
        Ok(Self {
            last_stream_id: u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]])
                & 0x7fff_ffff,
            error_code: u32::from_be_bytes([payload[4], payload[5], payload[6], payload[7]]),
            debug_data: Bytes::copy_from_slice(&payload[8..]),
        })
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        H2FrameHeader::new(8 + self.debug_data.len() as u32, FrameType::GoAway, 0, 0).encode(out);
        out.extend_from_slice(&(self.last_stream_id & 0x7fff_ffff).to_be_bytes());
        out.extend_from_slice(&self.error_code.to_be_bytes());
        out.extend_from_slice(&self.debug_data);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RstStream {
    pub stream_id: u32,
    pub error_code: u32,
}

impl RstStream {
    pub fn new(stream_id: u32, code: ErrorCode) -> Self {
        Self {
            stream_id,
            error_code: code.as_u32(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        ErrorCode::from_u32(self.error_code)
    }

    pub fn decode(header: &H2FrameHeader, payload: &[u8]) -> Result<Self, H2Error> {
        Ok(Self {
            stream_id: header.stream_id,
            error_code: u32::from_be_bytes(fixed::<4>(payload, "RST_STREAM")?),
        })
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        H2FrameHeader::new(4, FrameType::RstStream, 0, self.stream_id).encode(out);
        out.extend_from_slice(&self.error_code.to_be_bytes());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ping {
    pub ack: bool,
    pub data: [u8; 8],
}

impl Ping {
    pub fn new(data: [u8; 8]) -> Self {
        Self { ack: false, data }
    }

    /// The acknowledgement echoing this ping's payload.
    pub fn ack(&self) -> Self {
        Self {
            ack: true,
            data: self.data,
        }
    }

    pub fn decode(header: &H2FrameHeader, payload: &[u8]) -> Result<Self, H2Error> {
        Ok(Self {
            ack: header.flags & flags::ACK != 0,
            data: fixed::<8>(payload, "PING")?,
        })
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        let frame_flags = if self.ack { flags::ACK } else { 0 };
        H2FrameHeader::new(8, FrameType::Ping, frame_flags, 0).encode(out);
        out.extend_from_slice(&self.data);
    }
}

/// A frame of an unrecognised type, kept as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFrame {
    pub frame_type: u8,
    pub flags: u8,
    pub stream_id: u32,
    pub payload: Bytes,
}

impl UnknownFrame {
    pub fn encode(&self, out: &mut Vec<u8>) {
        H2FrameHeader::new(
            self.payload.len() as u32,
            FrameType::Unknown(self.frame_type),
            self.flags,
            self.stream_id,
        )
        .encode(out);
        out.extend_from_slice(&self.payload);
    }
}
