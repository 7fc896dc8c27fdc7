// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Text encodings for query/form values and response bodies
//!
//! Names are resolved through the WHATWG Encoding Standard label table, so
//! `"gbk"`, `"GB2312"`, `"latin1"` and `"utf8"` all resolve the way a browser
//! resolves them.

use std::fmt;

use url::form_urlencoded;

use crate::error::{Error, Result};

/// A character encoding from the WHATWG registry
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TextEncoding(&'static encoding_rs::Encoding);

impl TextEncoding {
    /// UTF-8
    pub const UTF_8: TextEncoding = TextEncoding(encoding_rs::UTF_8);

    /// GB18030 (superset of GBK/GB2312)
    pub const GB18030: TextEncoding = TextEncoding(encoding_rs::GB18030);

    /// Resolve an encoding label
    pub fn for_label(label: &str) -> Result<Self> {
        encoding_rs::Encoding::for_label(label.trim().as_bytes())
            .map(TextEncoding)
            .ok_or_else(|| Error::UnknownEncoding(label.to_string()))
    }

    /// Canonical name of the encoding
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Encode text into this charset; unmappable characters become numeric
    /// character references
    pub fn encode(&self, text: &str) -> Vec<u8> {
        let (bytes, _, _) = self.0.encode(text);
        bytes.into_owned()
    }

    /// Decode bytes from this charset; malformed sequences become U+FFFD
    pub fn decode(&self, bytes: &[u8]) -> String {
        let (text, _, _) = self.0.decode(bytes);
        text.into_owned()
    }
}

impl fmt::Debug for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TextEncoding").field(&self.name()).finish()
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Percent-encode one component, first converting it to `encoding` when set
pub fn encode_component(value: &str, encoding: Option<TextEncoding>) -> String {
    match encoding {
        Some(enc) => form_urlencoded::byte_serialize(&enc.encode(value)).collect(),
        None => form_urlencoded::byte_serialize(value.as_bytes()).collect(),
    }
}

/// Join key/value pairs as `k=v&k=v` with no trailing separator
pub fn encode_pairs<'a, I>(pairs: I, encoding: Option<TextEncoding>) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                encode_component(k, encoding),
                encode_component(v, encoding)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}
