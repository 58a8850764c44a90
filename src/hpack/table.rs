//! HPACK indexing tables (RFC 7541 Section 2.3).
//!
//! Index space: `1..=61` is the static table, `62..` the dynamic table with
//! the newest entry first.

use std::collections::{HashSet, VecDeque};
use std::sync::OnceLock;

use crate::error::{ErrorCode, H2Error};
use crate::hpack::field::{FieldLine, HeaderString};

/// Byte budget (name + value + 32 per line) for never-index marks; oldest marks go first.
pub const MAX_NEVER_INDEX_SIZE: usize = 16 * 1024;

/// Number of entries in the static table.
pub const STATIC_TABLE_LEN: usize = 61;

/// RFC 7541 Appendix A.
const STATIC_ENTRIES: [(&str, &str); STATIC_TABLE_LEN] = [
    (":authority", ""),
    (":method", "GET"),
    (":method", "POST"),
    (":path", "/"),
    (":path", "/index.html"),
    (":scheme", "http"),
    (":scheme", "https"),
    (":status", "200"),
    (":status", "204"),
    (":status", "206"),
    (":status", "304"),
    (":status", "400"),
    (":status", "404"),
    (":status", "500"),
    ("accept-charset", ""),
    ("accept-encoding", "gzip, deflate"),
    ("accept-language", ""),
    ("accept-ranges", ""),
    ("accept", ""),
    ("access-control-allow-origin", ""),
    ("age", ""),
    ("allow", ""),
    ("authorization", ""),
    ("cache-control", ""),
    ("content-disposition", ""),
    ("content-encoding", ""),
    ("content-language", ""),
    ("content-length", ""),
    ("content-location", ""),
    ("content-range", ""),
    ("content-type", ""),
    ("cookie", ""),
    ("date", ""),
    ("etag", ""),
    ("expect", ""),
    ("expires", ""),
    ("from", ""),
    ("host", ""),
    ("if-match", ""),
    ("if-modified-since", ""),
    ("if-none-match", ""),
    ("if-range", ""),
    ("if-unmodified-since", ""),
    ("last-modified", ""),
    ("link", ""),
    ("location", ""),
    ("max-forwards", ""),
    ("proxy-authenticate", ""),
    ("proxy-authorization", ""),
    ("range", ""),
    ("referer", ""),
    ("refresh", ""),
    ("retry-after", ""),
    ("server", ""),
    ("set-cookie", ""),
    ("strict-transport-security", ""),
    ("transfer-encoding", ""),
    ("user-agent", ""),
    ("vary", ""),
    ("via", ""),
    ("www-authenticate", ""),
];

fn static_table() -> &'static [FieldLine] {
    static TABLE: OnceLock<Vec<FieldLine>> = OnceLock::new();
    TABLE.get_or_init(|| {
        STATIC_ENTRIES
            .iter()
            .map(|(name, value)| FieldLine::new(name, value))
            .collect()
    })
}

/// Static plus dynamic table, with the set of lines marked never-index.
#[derive(Debug, Clone)]
pub struct HpackTable {
    dynamic: VecDeque<FieldLine>,
    size: usize,
    max_size: usize,
    never_index: HashSet<FieldLine>,
    never_index_order: VecDeque<FieldLine>,
    never_index_size: usize,
}

impl HpackTable {
    pub fn new(max_size: usize) -> Self {
        Self {
            dynamic: VecDeque::new(),
            size: 0,
            max_size,
            never_index: HashSet::new(),
            never_index_order: VecDeque::new(),
            never_index_size: 0,
        }
    }

    /// Look up an entry by its 1-based HPACK index.
    pub fn get(&self, index: usize) -> Result<&FieldLine, H2Error> {
        if index == 0 {
            return Err(H2Error::connection(
                ErrorCode::CompressionError,
                "Index 0 is not a valid HPACK index",
            ));
        }
        if index <= STATIC_TABLE_LEN {
            return Ok(&static_table()[index - 1]);
        }
        self.dynamic
            .get(index - STATIC_TABLE_LEN - 1)
            .ok_or_else(|| {
                H2Error::connection(
                    ErrorCode::CompressionError,
                    format!("Index {index} beyond table length"),
                )
            })
    }

    /// Index of an exact `(name, value)` match, static table first.
    pub fn index_of(&self, line: &FieldLine) -> Option<usize> {
        static_table()
            .iter()
            .position(|l| l == line)
            .map(|i| i + 1)
            .or_else(|| {
                self.dynamic
                    .iter()
                    .position(|l| l == line)
                    .map(|i| i + STATIC_TABLE_LEN + 1)
            })
    }

    /// Index of the first entry with this name, static table first.
    pub fn index_of_name(&self, name: &HeaderString) -> Option<usize> {
        static_table()
            .iter()
            .position(|l| l.name() == name)
            .map(|i| i + 1)
            .or_else(|| {
                self.dynamic
                    .iter()
                    .position(|l| l.name() == name)
                    .map(|i| i + STATIC_TABLE_LEN + 1)
            })
    }

    /// Add an entry at the front of the dynamic table, evicting from the back.
    ///
    /// An entry larger than the maximum size empties the table and is not stored.
    pub fn insert(&mut self, line: FieldLine) {
        let entry_size = line.size();
        if entry_size > self.max_size {
            tracing::trace!(entry_size, max_size = self.max_size, "hpack entry larger than table, clearing");
            self.dynamic.clear();
            self.size = 0;
            return;
        }
        self.evict_to(self.max_size - entry_size);
        self.size += entry_size;
        self.dynamic.push_front(line);
    }

    /// Apply a new maximum size, evicting as needed.
    pub fn change_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
        self.evict_to(max_size);
    }

    fn evict_to(&mut self, target: usize) {
        while self.size > target {
            let Some(evicted) = self.dynamic.pop_back() else {
                break;
            };
            self.size -= evicted.size();
            tracing::trace!(name = %evicted.name(), size = self.size, "hpack eviction");
        }
    }

    /// Remember `line` as never-index, forgetting the oldest marks past
    /// [`MAX_NEVER_INDEX_SIZE`].
    pub fn mark_never_index(&mut self, line: FieldLine) {
        let size = line.size();
        if size > MAX_NEVER_INDEX_SIZE || self.never_index.contains(&line) {
            return;
        }
        while self.never_index_size + size > MAX_NEVER_INDEX_SIZE {
            let Some(oldest) = self.never_index_order.pop_front() else {
                break;
            };
            self.never_index_size -= oldest.size();
            self.never_index.remove(&oldest);
        }
        self.never_index_size += size;
        self.never_index_order.push_back(line.clone());
        self.never_index.insert(line);
    }

    pub fn never_index_len(&self) -> usize {
        self.never_index.len()
    }

    pub fn is_never_index(&self, line: &FieldLine) -> bool {
        self.never_index.contains(line)
    }

    /// Sum of `name + value + 32` over the dynamic entries.
    pub fn dynamic_size(&self) -> usize {
        self.size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn dynamic_len(&self) -> usize {
        self.dynamic.len()
    }

    /// Dynamic entries, newest first.
    pub fn dynamic_entries(&self) -> impl Iterator<Item = &FieldLine> {
        self.dynamic.iter()
    }
}

impl PartialEq for HpackTable {
    fn eq(&self, other: &Self) -> bool {
        self.max_size == other.max_size && self.size == other.size && self.dynamic == other.dynamic
    }
}
