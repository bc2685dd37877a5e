//! Named open options accepted by the file and JSON caches.
//!
//! Options only shape how text is decoded; they are validated before the
//! file is opened so a bad option never costs a read.
//!
//! | name       | values                                           | default     |
//! |------------|--------------------------------------------------|-------------|
//! | `encoding` | any WHATWG label, `utf-8-sig`, `ascii`           | `utf-8`     |
//! | `errors`   | `strict`, `replace`                              | `strict`    |
//! | `newline`  | `""`, `"\n"`, `"\r"`, `"\r\n"`                   | universal   |
//!
//! Encoding labels are resolved by `encoding_rs`, after trying the label with
//! `_` turned into `-` and then with both removed, so `latin-1`, `utf_8` and
//! `shift_jis` all resolve.

use std::fs;
use std::path::Path;

use encoding_rs::{DecoderResult, UTF_8, UTF_16BE, UTF_16LE};

use crate::error::{FileCacheError, Result};
use crate::key::{NamedArgs, canonical_named_args};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// An `encoding_rs` codec. UTF-16 input has its BOM sniffed and removed.
    Codec(&'static encoding_rs::Encoding),
    /// UTF-8 with a leading byte-order mark stripped if present.
    Utf8Sig,
    /// 7-bit ASCII; bytes above 0x7f are decoding errors.
    Ascii,
}

impl Default for Encoding {
    fn default() -> Self {
        Encoding::Codec(UTF_8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeErrors {
    #[default]
    Strict,
    /// Invalid sequences become U+FFFD.
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Newline {
    /// `\r\n` and lone `\r` are translated to `\n`.
    #[default]
    Universal,
    Untranslated,
}

/// Parsed text-mode open options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextOptions {
    pub encoding: Encoding,
    pub errors: DecodeErrors,
    pub newline: Newline,
}

impl TextOptions {
    /// Parses named options, rejecting unknown names and unsupported values.
    pub fn from_named(named: &NamedArgs<String>) -> Result<Self> {
        let mut options = Self::default();
        // Sorted so the reported option is deterministic.
        for (name, value) in canonical_named_args(named) {
            match name.as_str() {
                "encoding" => options.encoding = parse_encoding(&value)?,
                "errors" => {
                    options.errors = match value.as_str() {
                        "strict" => DecodeErrors::Strict,
                        "replace" => DecodeErrors::Replace,
                        other => {
                            return Err(FileCacheError::invalid_option(
                                name,
                                format!("unsupported error policy {:?}", other),
                            ));
                        },
                    }
                },
                "newline" => {
                    options.newline = match value.as_str() {
                        "" | "\n" | "\r" | "\r\n" => Newline::Untranslated,
                        other => {
                            return Err(FileCacheError::invalid_option(
                                name,
                                format!("illegal newline value {:?}", other),
                            ));
                        },
                    }
                },
                _ => return Err(FileCacheError::invalid_option(name, "unknown option")),
            }
        }
        Ok(options)
    }

    /// Decodes raw file bytes into text.
    pub fn decode(&self, path: &Path, bytes: Vec<u8>) -> Result<String> {
        let text = match self.encoding {
            Encoding::Ascii => self.decode_ascii(path, &bytes)?,
            Encoding::Utf8Sig => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
                self.decode_codec(path, UTF_8, body)?
            },
            Encoding::Codec(codec) => self.decode_codec(path, codec, &bytes)?,
        };
        Ok(self.apply_newlines(text))
    }

    fn decode_codec(
        &self,
        path: &Path,
        codec: &'static encoding_rs::Encoding,
        bytes: &[u8],
    ) -> Result<String> {
        let sniff_bom = codec == UTF_16LE || codec == UTF_16BE;
        match self.errors {
            DecodeErrors::Replace if sniff_bom => Ok(codec.decode(bytes).0.into_owned()),
            DecodeErrors::Replace => Ok(codec.decode_without_bom_handling(bytes).0.into_owned()),
            DecodeErrors::Strict => {
                decode_strict(codec, bytes, sniff_bom).map_err(|offset| FileCacheError::Decode {
                    path: path.to_path_buf(),
                    encoding: codec.name(),
                    offset,
                })
            },
        }
    }

    fn decode_ascii(&self, path: &Path, bytes: &[u8]) -> Result<String> {
        match (self.errors, bytes.iter().position(|b| !b.is_ascii())) {
            (_, None) => Ok(bytes.iter().map(|&b| b as char).collect()),
            (DecodeErrors::Replace, Some(_)) => Ok(bytes
                .iter()
                .map(|&b| if b.is_ascii() { b as char } else { char::REPLACEMENT_CHARACTER })
                .collect()),
            (DecodeErrors::Strict, Some(offset)) => Err(FileCacheError::Decode {
                path: path.to_path_buf(),
                encoding: "ASCII",
                offset,
            }),
        }
    }

    fn apply_newlines(&self, text: String) -> String {
        match self.newline {
            Newline::Universal => translate_newlines(text),
            Newline::Untranslated => text,
        }
    }
}

/// Decodes without replacement; on malformed input returns the byte offset
/// where the bad sequence starts.
fn decode_strict(
    codec: &'static encoding_rs::Encoding,
    bytes: &[u8],
    sniff_bom: bool,
) -> std::result::Result<String, usize> {
    let mut decoder = if sniff_bom {
        codec.new_decoder()
    } else {
        codec.new_decoder_without_bom_handling()
    };
    let mut text = String::with_capacity(bytes.len());
    let mut input = bytes;
    let mut consumed = 0usize;
    loop {
        let (result, read) = decoder.decode_to_string_without_replacement(input, &mut text, true);
        consumed += read;
        input = &input[read..];
        match result {
            DecoderResult::InputEmpty => return Ok(text),
            DecoderResult::OutputFull => {
                let needed = decoder
                    .max_utf8_buffer_length_without_replacement(input.len())
                    .unwrap_or(input.len());
                text.reserve(needed.max(4));
            },
            DecoderResult::Malformed(bad, extra) => {
                return Err(consumed.saturating_sub(usize::from(bad) + usize::from(extra)));
            },
        }
    }
}

fn parse_encoding(value: &str) -> Result<Encoding> {
    let lowered = value.trim().to_ascii_lowercase();
    let dashed = lowered.replace('_', "-");
    match dashed.as_str() {
        "utf-8-sig" | "utf8-sig" => return Ok(Encoding::Utf8Sig),
        "ascii" | "us-ascii" => return Ok(Encoding::Ascii),
        _ => {},
    }
    let bare = lowered.replace(['_', '-'], "");
    [lowered.as_str(), dashed.as_str(), bare.as_str()]
        .into_iter()
        .find_map(|label| encoding_rs::Encoding::for_label(label.as_bytes()))
        .filter(|codec| *codec != encoding_rs::REPLACEMENT)
        .map(Encoding::Codec)
        .ok_or_else(|| {
            FileCacheError::invalid_option("encoding", format!("unsupported encoding {:?}", value))
        })
}

fn translate_newlines(text: String) -> String {
    if !text.contains('\r') {
        return text;
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Binary reads take no options at all.
pub(crate) fn reject_binary_options(named: &NamedArgs<String>) -> Result<()> {
    match named.keys().min() {
        Some(name) => Err(FileCacheError::invalid_option(
            name.clone(),
            "not accepted in binary mode",
        )),
        None => Ok(()),
    }
}

pub(crate) fn read_text(path: &Path, options: &TextOptions) -> Result<String> {
    let bytes = fs::read(path).map_err(|err| FileCacheError::access(path, err))?;
    options.decode(path, bytes)
}
