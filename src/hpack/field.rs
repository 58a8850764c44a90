//! Header strings, field lines and field blocks.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use bytes::Bytes;

/// Per-entry overhead used in table and header list accounting (RFC 7541 Section 4.1).
pub const ENTRY_OVERHEAD: usize = 32;

macro_rules! known_names {
    ($($variant:ident => $text:literal,)+) => {
        /// Well-known header names, interned so they compare by identity.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum KnownName {
            $($variant,)+
        }

        impl KnownName {
            pub const ALL: &'static [KnownName] = &[$(KnownName::$variant,)+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(KnownName::$variant => $text,)+
                }
            }
        }
    };
}

known_names! {
    Authority => ":authority",
    Method => ":method",
    Path => ":path",
    Scheme => ":scheme",
    Status => ":status",
    AcceptCharset => "accept-charset",
    AcceptEncoding => "accept-encoding",
    AcceptLanguage => "accept-language",
    AcceptRanges => "accept-ranges",
    Accept => "accept",
    AccessControlAllowOrigin => "access-control-allow-origin",
    Age => "age",
    Allow => "allow",
    Authorization => "authorization",
    CacheControl => "cache-control",
    ContentDisposition => "content-disposition",
    ContentEncoding => "content-encoding",
    ContentLanguage => "content-language",
    ContentLength => "content-length",
    ContentLocation => "content-location",
    ContentRange => "content-range",
    ContentType => "content-type",
    Cookie => "cookie",
    Date => "date",
    Etag => "etag",
    Expect => "expect",
    Expires => "expires",
    From => "from",
    Host => "host",
    IfMatch => "if-match",
    IfModifiedSince => "if-modified-since",
    IfNoneMatch => "if-none-match",
    IfRange => "if-range",
    IfUnmodifiedSince => "if-unmodified-since",
    LastModified => "last-modified",
    Link => "link",
    Location => "location",
    MaxForwards => "max-forwards",
    ProxyAuthenticate => "proxy-authenticate",
    ProxyAuthorization => "proxy-authorization",
    Range => "range",
    Referer => "referer",
    Refresh => "refresh",
    RetryAfter => "retry-after",
    Server => "server",
    SetCookie => "set-cookie",
    StrictTransportSecurity => "strict-transport-security",
    TransferEncoding => "transfer-encoding",
    UserAgent => "user-agent",
    Vary => "vary",
    Via => "via",
    WwwAuthenticate => "www-authenticate",
}

impl KnownName {
    /// Look up an already-lowercased name.
    pub fn from_bytes(name: &[u8]) -> Option<Self> {
        static INTERNED: OnceLock<HashMap<&'static [u8], KnownName>> = OnceLock::new();
        INTERNED
            .get_or_init(|| {
                KnownName::ALL
                    .iter()
                    .map(|k| (k.as_str().as_bytes(), *k))
                    .collect()
            })
            .get(name)
            .copied()
    }

    pub fn is_pseudo(self) -> bool {
        self.as_str().starts_with(':')
    }
}

/// Whether a [`HeaderString`] is a field name or a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderKind {
    Name,
    Value,
}

#[derive(Clone)]
enum Repr {
    Known(KnownName),
    Owned(Bytes),
}

/// An immutable header name or value.
///
/// Names are lowercased on construction and well-known names are interned.
#[derive(Clone)]
pub struct HeaderString {
    repr: Repr,
    kind: HeaderKind,
}

impl HeaderString {
    /// A header name; ASCII uppercase is folded to lowercase.
    pub fn name(bytes: impl AsRef<[u8]>) -> Self {
        let bytes = bytes.as_ref();
        let repr = if bytes.iter().any(u8::is_ascii_uppercase) {
            let lower = bytes.to_ascii_lowercase();
            match KnownName::from_bytes(&lower) {
                Some(known) => Repr::Known(known),
                None => Repr::Owned(Bytes::from(lower)),
            }
        } else {
            match KnownName::from_bytes(bytes) {
                Some(known) => Repr::Known(known),
                None => Repr::Owned(Bytes::copy_from_slice(bytes)),
            }
        };
        Self {
            repr,
            kind: HeaderKind::Name,
        }
    }

    /// A header value, stored as given.
    pub fn value(bytes: impl Into<Bytes>) -> Self {
        Self {
            repr: Repr::Owned(bytes.into()),
            kind: HeaderKind::Value,
        }
    }

    pub const fn known(name: KnownName) -> Self {
        Self {
            repr: Repr::Known(name),
            kind: HeaderKind::Name,
        }
    }

    pub const fn empty_value() -> Self {
        Self {
            repr: Repr::Owned(Bytes::new()),
            kind: HeaderKind::Value,
        }
    }

    pub fn kind(&self) -> HeaderKind {
        self.kind
    }

    /// The interned name, if this is a well-known header name.
    pub fn as_known(&self) -> Option<KnownName> {
        match self.repr {
            Repr::Known(k) => Some(k),
            Repr::Owned(_) => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match &self.repr {
            Repr::Known(k) => k.as_str().as_bytes(),
            Repr::Owned(b) => b,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(self.as_bytes()).ok()
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    pub fn is_pseudo(&self) -> bool {
        self.kind == HeaderKind::Name && self.as_bytes().first() == Some(&b':')
    }
}

impl PartialEq for HeaderString {
    fn eq(&self, other: &Self) -> bool {
        if self.kind != other.kind {
            return false;
        }
        match (&self.repr, &other.repr) {
            (Repr::Known(a), Repr::Known(b)) => a == b,
            _ => self.as_bytes() == other.as_bytes(),
        }
    }
}

impl Eq for HeaderString {}

impl Hash for HeaderString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.as_bytes().hash(state);
    }
}

impl PartialEq<str> for HeaderString {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for HeaderString {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl fmt::Debug for HeaderString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(self.as_bytes()))
    }
}

impl fmt::Display for HeaderString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}

/// A single `(name, value)` header line.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FieldLine {
    name: HeaderString,
    value: HeaderString,
}

impl FieldLine {
    pub fn new(name: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Self {
        Self {
            name: HeaderString::name(name),
            value: HeaderString::value(Bytes::copy_from_slice(value.as_ref())),
        }
    }

    pub fn from_parts(name: HeaderString, value: HeaderString) -> Self {
        debug_assert_eq!(name.kind(), HeaderKind::Name);
        debug_assert_eq!(value.kind(), HeaderKind::Value);
        Self { name, value }
    }

    pub fn name(&self) -> &HeaderString {
        &self.name
    }

    pub fn value(&self) -> &HeaderString {
        &self.value
    }

    /// Entry size for table and header list accounting: name + value + 32.
    pub fn size(&self) -> usize {
        self.name.len() + self.value.len() + ENTRY_OVERHEAD
    }
}

impl fmt::Debug for FieldLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

/// An ordered header list, as carried by one logical HEADERS frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldBlock {
    lines: Vec<FieldLine>,
}

impl FieldBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, line: FieldLine) {
        self.lines.push(line);
    }

    /// Append a line built from a name and value.
    pub fn add(&mut self, name: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> &mut Self {
        self.lines.push(FieldLine::new(name, value));
        self
    }

    /// The first value for `name`, which is matched case-insensitively.
    pub fn get(&self, name: impl AsRef<[u8]>) -> Option<&HeaderString> {
        let name = HeaderString::name(name);
        self.lines
            .iter()
            .find(|l| *l.name() == name)
            .map(FieldLine::value)
    }

    pub fn get_all(&self, name: impl AsRef<[u8]>) -> Vec<&HeaderString> {
        let name = HeaderString::name(name);
        self.lines
            .iter()
            .filter(|l| *l.name() == name)
            .map(FieldLine::value)
            .collect()
    }

    pub fn contains(&self, name: impl AsRef<[u8]>) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldLine> {
        self.lines.iter()
    }

    pub fn lines(&self) -> &[FieldLine] {
        &self.lines
    }

    /// Header list size as defined for SETTINGS_MAX_HEADER_LIST_SIZE.
    pub fn header_list_size(&self) -> usize {
        self.lines.iter().map(FieldLine::size).sum()
    }
}

impl FromIterator<FieldLine> for FieldBlock {
    fn from_iter<I: IntoIterator<Item = FieldLine>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for FieldBlock {
    type Item = FieldLine;
    type IntoIter = std::vec::IntoIter<FieldLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldBlock {
    type Item = &'a FieldLine;
    type IntoIter = std::slice::Iter<'a, FieldLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}
