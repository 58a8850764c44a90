//! Field block encoder.

use crate::config::CodecConfig;
use crate::hpack::field::{FieldBlock, FieldLine};
use crate::hpack::huffman;
use crate::hpack::integer::write_int;
use crate::hpack::table::HpackTable;

/// Encodes field blocks without adding entries to the dynamic table.
///
/// Each line is written as an indexed field when the table holds the exact
/// line, otherwise as a literal that is never added to the peer's table.
#[derive(Debug, Clone)]
pub struct FieldBlockEncoder {
    table: HpackTable,
    huffman: bool,
    pending_size_update: Option<usize>,
}

impl FieldBlockEncoder {
    pub fn new(max_table_size: usize) -> Self {
        Self {
            table: HpackTable::new(max_table_size),
            huffman: false,
            pending_size_update: None,
        }
    }

    pub fn from_config(config: &CodecConfig) -> Self {
        Self::new(config.header_table_size as usize).with_huffman(config.huffman_encode)
    }

    /// Huffman-code string literals when that makes them shorter.
    pub fn with_huffman(mut self, enabled: bool) -> Self {
        self.huffman = enabled;
        self
    }

    pub fn table(&self) -> &HpackTable {
        &self.table
    }

    /// Lines marked here are always sent as never-indexed literals.
    pub fn mark_never_index(&mut self, line: FieldLine) {
        self.table.mark_never_index(line);
    }

    /// Resize the table, e.g. after the peer changes SETTINGS_HEADER_TABLE_SIZE.
    ///
    /// The new size is announced at the start of the next block.
    pub fn change_table_size(&mut self, size: usize) {
        if size != self.table.max_size() {
            self.table.change_max_size(size);
            self.pending_size_update = Some(size);
        }
    }

    pub fn encode(&mut self, block: &FieldBlock, out: &mut Vec<u8>) {
        if let Some(size) = self.pending_size_update.take() {
            write_int(5, 0x20, clamp(size), out);
        }
        for line in block {
            self.encode_line(line, out);
        }
    }

    fn encode_line(&self, line: &FieldLine, out: &mut Vec<u8>) {
        if let Some(index) = self.table.index_of(line) {
            write_int(7, 0x80, clamp(index), out);
            return;
        }

        let designation = if self.table.is_never_index(line) {
            0x10
        } else {
            0x00
        };
        match self.table.index_of_name(line.name()) {
            Some(index) => write_int(4, designation, clamp(index), out),
            None => {
                out.push(designation);
                self.write_string(line.name().as_bytes(), out);
            }
        }
        self.write_string(line.value().as_bytes(), out);
    }

    fn write_string(&self, data: &[u8], out: &mut Vec<u8>) {
        if self.huffman {
            let len = huffman::encoded_len(data);
            if len < data.len() {
                write_int(7, 0x80, clamp(len), out);
                huffman::encode(data, out);
                return;
            }
        }
        write_int(7, 0x00, clamp(data.len()), out);
        out.extend_from_slice(data);
    }
}

fn clamp(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
