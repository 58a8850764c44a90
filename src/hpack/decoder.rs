//! Field block decoder (RFC 7541 Section 6).

use bytes::Bytes;

use crate::config::CodecConfig;
use crate::error::{Error, ErrorCode, H2Error, HeaderRejection};
use crate::hpack::field::{FieldBlock, FieldLine, HeaderString, KnownName};
use crate::hpack::huffman;
use crate::hpack::integer::{read_int, Cursor};
use crate::hpack::table::HpackTable;

/// Decodes complete field blocks against a connection's HPACK table.
///
/// Two running budgets are kept per block: the total `:path` length and the
/// header list size. Lines past either budget are dropped, but every table
/// update they carry is still applied so the table stays in sync with the
/// peer's encoder.
#[derive(Debug, Clone)]
pub struct FieldBlockDecoder {
    table: HpackTable,
    max_table_size: usize,
    max_uri_length: usize,
    max_header_list_size: usize,
}

impl FieldBlockDecoder {
    pub fn new(header_table_size: usize, max_uri_length: usize, max_header_list_size: usize) -> Self {
        Self {
            table: HpackTable::new(header_table_size),
            max_table_size: header_table_size,
            max_uri_length,
            max_header_list_size,
        }
    }

    pub fn from_config(config: &CodecConfig) -> Self {
        Self::new(
            config.header_table_size as usize,
            config.max_uri_length,
            config.max_header_list_size as usize,
        )
    }

    pub fn table(&self) -> &HpackTable {
        &self.table
    }

    /// The SETTINGS_HEADER_TABLE_SIZE we advertised; table size updates may not exceed it.
    pub fn set_max_table_size(&mut self, size: usize) {
        self.max_table_size = size;
        if self.table.max_size() > size {
            self.table.change_max_size(size);
        }
    }

    /// Decode one complete field block received on `stream_id`.
    ///
    /// HPACK violations are connection errors. A block that decodes cleanly
    /// but breaks a size budget yields [`Error::Rejected`].
    pub fn decode(&mut self, stream_id: u32, block: &[u8]) -> Result<FieldBlock, Error> {
        let mut cursor = Cursor::new(block);
        let mut fields = FieldBlock::new();
        let mut uri_length = 0usize;
        let mut list_size = 0usize;
        let mut uri_too_long = false;
        let mut too_large = false;
        let mut seen_line = false;

        while !cursor.is_empty() {
            let first = cursor.next_byte()?;

            let line = if first & 0x80 != 0 {
                let index = read_int(7, first, &mut cursor)?;
                self.table.get(index as usize)?.clone()
            } else if first & 0xc0 == 0x40 {
                let line = self.read_literal(6, first, &mut cursor)?;
                self.table.insert(line.clone());
                line
            } else if first & 0xe0 == 0x20 {
                if seen_line {
                    return Err(compression_error("Table size update after a field line").into());
                }
                let size = read_int(5, first, &mut cursor)? as usize;
                if size > self.max_table_size {
                    return Err(compression_error(format!(
                        "Table size update {size} exceeds limit {}",
                        self.max_table_size
                    ))
                    .into());
                }
                self.table.change_max_size(size);
                continue;
            } else if first & 0xf0 == 0x10 {
                let line = self.read_literal(4, first, &mut cursor)?;
                self.table.mark_never_index(line.clone());
                line
            } else {
                self.read_literal(4, first, &mut cursor)?
            };
            seen_line = true;

            if line.name().as_known() == Some(KnownName::Path) {
                uri_length += line.value().len();
                uri_too_long |= uri_length > self.max_uri_length;
            }
            list_size += line.size();
            too_large |= list_size > self.max_header_list_size;

            if !uri_too_long && !too_large {
                fields.push(line);
            }
        }

        let rejection = if uri_too_long {
            Some(HeaderRejection::UriTooLong)
        } else if too_large {
            Some(HeaderRejection::HeadersTooLarge)
        } else {
            None
        };
        if let Some(rejection) = rejection {
            tracing::debug!(stream_id, uri_length, list_size, %rejection, "field block rejected");
            return Err(Error::Rejected {
                stream_id,
                rejection,
            });
        }
        Ok(fields)
    }

    fn read_literal(&self, n: u8, first: u8, cursor: &mut Cursor<'_>) -> Result<FieldLine, H2Error> {
        let index = read_int(n, first, cursor)?;
        let name = if index == 0 {
            HeaderString::name(read_string(cursor)?)
        } else {
            self.table.get(index as usize)?.name().clone()
        };
        let value = HeaderString::value(Bytes::from(read_string(cursor)?));
        Ok(FieldLine::from_parts(name, value))
    }
}

fn read_string(cursor: &mut Cursor<'_>) -> Result<Vec<u8>, H2Error> {
    let first = cursor.next_byte()?;
    let len = read_int(7, first, cursor)? as usize;
    let data = cursor.take(len)?;
    if first & 0x80 != 0 {
        huffman::decode(data)
    } else {
        Ok(data.to_vec())
    }
}

fn compression_error(message: impl Into<String>) -> H2Error {
    H2Error::connection(ErrorCode::CompressionError, message)
}
