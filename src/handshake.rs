//! Connection preface and initial SETTINGS exchange (RFC 9113 Section 3.4).
//!
//! The client opens with the 24-byte preface followed by a SETTINGS frame.
//! The server answers with its own SETTINGS and acknowledges the client's.
//!
//! [`handshake`] does this over blocking `Read`/`Write`; [`Handshaker`] does
//! the same on bytes fed incrementally, for callers driving [`H2Codec`](crate::H2Codec).

use std::io::{Read, Write};

use crate::error::{Error, ErrorCode, H2Error};
use crate::h2_codec::{flags, FrameType, H2FrameHeader, CONNECTION_PREFACE, FRAME_HEADER_LEN};
use crate::settings::{Http2Settings, SettingsFrame};

fn check_preface(bytes: &[u8]) -> Result<(), H2Error> {
    if bytes != CONNECTION_PREFACE {
        return Err(H2Error::connection(
            ErrorCode::ProtocolError,
            "Invalid HTTP/2 connection preface",
        ));
    }
    Ok(())
}

fn read_settings_header(bytes: &[u8], max_frame_size: u32) -> Result<H2FrameHeader, H2Error> {
    let header = H2FrameHeader::read(bytes, max_frame_size)?;
    if header.frame_type != FrameType::Settings || header.flags & flags::ACK != 0 {
        return Err(H2Error::connection(
            ErrorCode::ProtocolError,
            format!("Expected SETTINGS as first frame, got {:?}", header.frame_type),
        ));
    }
    Ok(header)
}

fn apply_client_settings(
    header: &H2FrameHeader,
    payload: &[u8],
    client_defaults: &Http2Settings,
) -> Result<Http2Settings, H2Error> {
    match SettingsFrame::decode(header, payload)? {
        SettingsFrame::Update(delta) => Ok(client_defaults.copy_if_changed(&delta)),
        SettingsFrame::Ack => Err(H2Error::connection(
            ErrorCode::ProtocolError,
            "Expected SETTINGS as first frame, got SETTINGS ACK",
        )),
    }
}

/// Our SETTINGS followed by the ACK of the client's.
fn response(server: &Http2Settings) -> Vec<u8> {
    let mut out = Vec::with_capacity(2 * FRAME_HEADER_LEN + 30);
    server.to_frame().encode(&mut out);
    SettingsFrame::Ack.encode(&mut out);
    out
}

/// Run the server side of the handshake on a blocking stream.
///
/// Returns the client's settings, i.e. `client_defaults` with whatever the
/// client's first SETTINGS frame carried applied on top.
pub fn handshake<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    server: &Http2Settings,
    client_defaults: &Http2Settings,
    max_frame_size: u32,
) -> Result<Http2Settings, Error> {
    let mut preface = [0u8; 24];
    reader.read_exact(&mut preface)?;
    check_preface(&preface)?;
    tracing::debug!("connection preface received");

    let mut raw_header = [0u8; FRAME_HEADER_LEN];
    reader.read_exact(&mut raw_header)?;
    let header = read_settings_header(&raw_header, max_frame_size)?;

    let mut payload = vec![0u8; header.length as usize];
    reader.read_exact(&mut payload)?;
    let client = apply_client_settings(&header, &payload, client_defaults)?;
    tracing::debug!(settings = ?client, "client settings received");

    writer.write_all(&response(server))?;
    writer.flush()?;
    tracing::debug!(settings = ?server, "server settings sent");

    Ok(client)
}

/// Result of a completed [`Handshaker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeOutcome {
    pub client_settings: Http2Settings,
    /// Bytes to send to the client: our SETTINGS and the ACK.
    pub response: Vec<u8>,
    /// Bytes received after the client's SETTINGS frame, to be fed to the codec.
    pub remaining: Vec<u8>,
}

/// Sans-I/O server handshake.
#[derive(Debug)]
pub struct Handshaker {
    server: Http2Settings,
    client_defaults: Http2Settings,
    max_frame_size: u32,
    buffer: Vec<u8>,
    preface_checked: bool,
}

impl Handshaker {
    pub fn new(server: Http2Settings, client_defaults: Http2Settings, max_frame_size: u32) -> Self {
        Self {
            server,
            client_defaults,
            max_frame_size,
            buffer: Vec::new(),
            preface_checked: false,
        }
    }

    /// Feed received bytes. Returns `Ok(None)` until the client's preface and
    /// first SETTINGS frame are complete.
    pub fn feed(&mut self, data: &[u8]) -> Result<Option<HandshakeOutcome>, H2Error> {
        self.buffer.extend_from_slice(data);

        if !self.preface_checked {
            let len = self.buffer.len().min(CONNECTION_PREFACE.len());
            if self.buffer[..len] != CONNECTION_PREFACE[..len] {
                return Err(H2Error::connection(
                    ErrorCode::ProtocolError,
                    "Invalid HTTP/2 connection preface",
                ));
            }
            if len < CONNECTION_PREFACE.len() {
                return Ok(None);
            }
            self.buffer.drain(..len);
            self.preface_checked = true;
            tracing::debug!("connection preface received");
        }

        if self.buffer.len() < FRAME_HEADER_LEN {
            return Ok(None);
        }
        let header = read_settings_header(&self.buffer, self.max_frame_size)?;
        if self.buffer.len() < header.total_size() {
            return Ok(None);
        }

        let client = apply_client_settings(
            &header,
            &self.buffer[FRAME_HEADER_LEN..header.total_size()],
            &self.client_defaults,
        )?;
        tracing::debug!(settings = ?client, "client settings received");

        let remaining = self.buffer.split_off(header.total_size());
        self.buffer.clear();
        Ok(Some(HandshakeOutcome {
            client_settings: client,
            response: response(&self.server),
            remaining,
        }))
    }
}
