//! Removal of protocol-reserved parameters from a raw query string

use std::borrow::Cow;

use percent_encoding::{percent_decode, percent_decode_str};
use url::form_urlencoded;

use crate::protocol::ProtocolParameterNames;

/// Decode and encode switches for [`filter_query`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Percent-decode the whole query once before splitting
    pub decode: bool,
    /// Percent-encode surviving values, space as `+`
    pub encode: bool,
}

impl FilterOptions {
    pub const fn encoded(encode: bool) -> Self {
        Self {
            decode: false,
            encode,
        }
    }
}

/// Reserved names plus options, fixed at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParameterFilter {
    names: ProtocolParameterNames,
    options: FilterOptions,
}

impl QueryParameterFilter {
    pub fn new(names: ProtocolParameterNames, options: FilterOptions) -> Self {
        Self { names, options }
    }

    pub fn names(&self) -> &ProtocolParameterNames {
        &self.names
    }

    pub fn options(&self) -> FilterOptions {
        self.options
    }

    pub fn filter(&self, raw: &str) -> String {
        filter_query(raw, &self.names, self.options)
    }
}

/// One `name[=value]` segment, borrowed from the query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueryPair<'a> {
    raw: &'a str,
    name: &'a str,
    value: Option<&'a str>,
}

impl<'a> QueryPair<'a> {
    /// Splits on the first `=` only; a segment without one is a bare name.
    fn parse(raw: &'a str) -> Self {
        match raw.split_once('=') {
            Some((name, value)) => Self {
                raw,
                name,
                value: Some(value),
            },
            None => Self {
                raw,
                name: raw,
                value: None,
            },
        }
    }

    /// Value form-decoded to bytes and re-encoded; bare names as is
    fn render_encoded(&self) -> Cow<'a, str> {
        match self.value {
            Some(value) => {
                let decoded = form_decode(value);
                let encoded: String = form_urlencoded::byte_serialize(&decoded).collect();
                Cow::Owned(format!("{}={}", self.name, encoded))
            }
            None => Cow::Borrowed(self.raw),
        }
    }
}

/// Strip every parameter whose name is reserved.
///
/// Order and (unless `options.encode`) bytes of the surviving parameters are
/// preserved. Returns an empty string when nothing survives. A result that
/// still looks double-encoded is decoded and filtered again, so feeding the
/// output back in leaves it unchanged.
pub fn filter_query(raw: &str, names: &ProtocolParameterNames, options: FilterOptions) -> String {
    let raw = raw.strip_prefix('?').unwrap_or(raw);

    let mut kept = if options.decode {
        strip_reserved(&percent_decode_str(raw).decode_utf8_lossy(), names)
    } else {
        strip_reserved(raw, names)
    };

    // Each round removes at least one encoded `&` or `=`, so this terminates.
    while looks_double_encoded(&kept) {
        let decoded = strip_reserved(&percent_decode_str(&kept).decode_utf8_lossy(), names);
        kept = decoded;
    }

    if !options.encode {
        return kept;
    }

    kept.split('&')
        .filter(|segment| !segment.is_empty())
        .map(QueryPair::parse)
        .map(|pair| pair.render_encoded())
        .collect::<Vec<_>>()
        .join("&")
}

fn strip_reserved(query: &str, names: &ProtocolParameterNames) -> String {
    query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(QueryPair::parse)
        .filter(|pair| !names.is_reserved(pair.name))
        .map(|pair| pair.raw)
        .collect::<Vec<_>>()
        .join("&")
}

/// A whole query encoded a second time arrives as a single opaque segment:
/// no literal `&`, and an encoded `=` or `&` inside what would be the first
/// parameter name.
fn looks_double_encoded(raw: &str) -> bool {
    if raw.contains('&') {
        return false;
    }

    let leading_name = raw.split_once('=').map_or(raw, |(name, _)| name);
    let upper = leading_name.to_ascii_uppercase();
    upper.contains("%26") || upper.contains("%3D")
}

/// `+` as space, then percent-decoding to raw bytes
fn form_decode(value: &str) -> Vec<u8> {
    let spaced = value.replace('+', " ");
    percent_decode(spaced.as_bytes()).collect()
}
