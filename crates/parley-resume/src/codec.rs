//! Wire codec for [`ResumptionToken`].
//!
//! A token travels as `base64(deflate(record))`, where the record is a
//! versioned, tagged binary layout owned by this module:
//!
//! - one version byte (currently `0x01`);
//! - nine fields in ascending tag order, each a tag byte followed by its
//!   payload. Strings are a little-endian `u16` length plus UTF-8 bytes;
//!   optional strings carry a one-byte presence flag first; booleans are
//!   a single `0`/`1` byte.
//!
//! The layout is internal. It is pinned here so stored tokens survive
//! library upgrades, not for interop with any other serializer.

use std::io::{Read, Write};

use base64::{engine::general_purpose::STANDARD, Engine};
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use parley_core::{ChannelAddress, ParleyError, ParleyResult};
use tracing::debug;

use crate::ResumptionToken;

const FORMAT_VERSION: u8 = 1;

const TAG_USER_ID: u8 = 1;
const TAG_BOT_ID: u8 = 2;
const TAG_CONVERSATION_ID: u8 = 3;
const TAG_CHANNEL_ID: u8 = 4;
const TAG_SERVICE_URL: u8 = 5;
const TAG_USER_NAME: u8 = 6;
const TAG_IS_TRUSTED: u8 = 7;
const TAG_IS_GROUP: u8 = 8;
const TAG_LOCALE: u8 = 9;

/// Upper bound on the decoded record, enforced before field decoding so
/// a crafted deflate stream cannot balloon memory.
const MAX_RECORD_LEN: usize = 64 * 1024;

/// Encodes a token as a compact transportable string.
pub fn serialize(token: &ResumptionToken) -> ParleyResult<String> {
    let record = encode_record(token)?;
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&record)?;
    let compressed = encoder.finish()?;
    let encoded = STANDARD.encode(compressed);
    debug!(
        record_len = record.len(),
        encoded_len = encoded.len(),
        "serialized resumption token"
    );
    Ok(encoded)
}

/// Decodes a string produced by [`serialize`] back into a token.
///
/// Fails with [`ParleyError::Decode`] on bad base64, a corrupt or
/// truncated deflate stream, an unknown format version, or a record that
/// does not match the expected field layout. Never yields a default
/// token for malformed input.
pub fn deserialize(encoded: &str) -> ParleyResult<ResumptionToken> {
    let compressed = STANDARD
        .decode(encoded)
        .map_err(|e| ParleyError::Decode(format!("bad base64: {e}")))?;

    let mut record = Vec::new();
    let decoder = DeflateDecoder::new(compressed.as_slice());
    decoder
        .take(MAX_RECORD_LEN as u64 + 1)
        .read_to_end(&mut record)
        .map_err(|e| ParleyError::Decode(format!("bad deflate stream: {e}")))?;
    if record.len() > MAX_RECORD_LEN {
        return Err(ParleyError::Decode(format!(
            "record exceeds {MAX_RECORD_LEN} bytes"
        )));
    }

    let token = decode_record(&record)?;
    debug!(record_len = record.len(), "deserialized resumption token");
    Ok(token)
}

fn encode_record(token: &ResumptionToken) -> ParleyResult<Vec<u8>> {
    let address = token.address();
    let mut record = Vec::new();
    record.push(FORMAT_VERSION);
    put_string(&mut record, TAG_USER_ID, &address.user_id)?;
    put_string(&mut record, TAG_BOT_ID, &address.bot_id)?;
    put_string(&mut record, TAG_CONVERSATION_ID, &address.conversation_id)?;
    put_string(&mut record, TAG_CHANNEL_ID, &address.channel_id)?;
    put_string(&mut record, TAG_SERVICE_URL, &address.service_url)?;
    put_opt_string(&mut record, TAG_USER_NAME, token.user_name.as_deref())?;
    put_bool(&mut record, TAG_IS_TRUSTED, token.is_trusted_service_url());
    put_bool(&mut record, TAG_IS_GROUP, token.is_group);
    put_opt_string(&mut record, TAG_LOCALE, token.locale.as_deref())?;
    Ok(record)
}

fn decode_record(record: &[u8]) -> ParleyResult<ResumptionToken> {
    let mut reader = Reader::new(record);

    let version = reader.u8("format version")?;
    if version != FORMAT_VERSION {
        return Err(ParleyError::Decode(format!(
            "unsupported format version {version}"
        )));
    }

    reader.tag(TAG_USER_ID)?;
    let user_id = reader.string()?;
    reader.tag(TAG_BOT_ID)?;
    let bot_id = reader.string()?;
    reader.tag(TAG_CONVERSATION_ID)?;
    let conversation_id = reader.string()?;
    reader.tag(TAG_CHANNEL_ID)?;
    let channel_id = reader.string()?;
    reader.tag(TAG_SERVICE_URL)?;
    let service_url = reader.string()?;
    reader.tag(TAG_USER_NAME)?;
    let user_name = reader.opt_string()?;
    reader.tag(TAG_IS_TRUSTED)?;
    let is_trusted_service_url = reader.bool()?;
    reader.tag(TAG_IS_GROUP)?;
    let is_group = reader.bool()?;
    reader.tag(TAG_LOCALE)?;
    let locale = reader.opt_string()?;
    reader.finish()?;

    let address =
        ChannelAddress::new(bot_id, channel_id, user_id, conversation_id, service_url);
    Ok(ResumptionToken::from_parts(
        address,
        user_name,
        is_trusted_service_url,
        is_group,
        locale,
    ))
}

fn put_string(record: &mut Vec<u8>, tag: u8, value: &str) -> ParleyResult<()> {
    let len = u16::try_from(value.len()).map_err(|_| {
        ParleyError::InvalidArgument(format!("field {tag} exceeds {} bytes", u16::MAX))
    })?;
    record.push(tag);
    record.extend_from_slice(&len.to_le_bytes());
    record.extend_from_slice(value.as_bytes());
    Ok(())
}

fn put_opt_string(record: &mut Vec<u8>, tag: u8, value: Option<&str>) -> ParleyResult<()> {
    match value {
        Some(value) => {
            // Presence flag sits between the tag and the string payload.
            let len = u16::try_from(value.len()).map_err(|_| {
                ParleyError::InvalidArgument(format!("field {tag} exceeds {} bytes", u16::MAX))
            })?;
            record.push(tag);
            record.push(1);
            record.extend_from_slice(&len.to_le_bytes());
            record.extend_from_slice(value.as_bytes());
        }
        None => {
            record.push(tag);
            record.push(0);
        }
    }
    Ok(())
}

fn put_bool(record: &mut Vec<u8>, tag: u8, value: bool) {
    record.push(tag);
    record.push(u8::from(value));
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn u8(&mut self, what: &str) -> ParleyResult<u8> {
        let byte = self
            .buf
            .get(self.pos)
            .copied()
            .ok_or_else(|| ParleyError::Decode(format!("record truncated reading {what}")))?;
        self.pos += 1;
        Ok(byte)
    }

    fn take(&mut self, len: usize) -> ParleyResult<&'a [u8]> {
        let end = self.pos.checked_add(len).filter(|end| *end <= self.buf.len());
        let end = end.ok_or_else(|| {
            ParleyError::Decode("record truncated reading string payload".to_string())
        })?;
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn tag(&mut self, expected: u8) -> ParleyResult<()> {
        let found = self.u8("field tag")?;
        if found != expected {
            return Err(ParleyError::Decode(format!(
                "unexpected field tag {found}, expected {expected}"
            )));
        }
        Ok(())
    }

    fn string(&mut self) -> ParleyResult<String> {
        let low = self.u8("string length")?;
        let high = self.u8("string length")?;
        let len = u16::from_le_bytes([low, high]) as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| ParleyError::Decode("invalid UTF-8 in string field".to_string()))
    }

    fn opt_string(&mut self) -> ParleyResult<Option<String>> {
        match self.u8("presence flag")? {
            0 => Ok(None),
            1 => Ok(Some(self.string()?)),
            other => Err(ParleyError::Decode(format!("bad presence flag {other}"))),
        }
    }

    fn bool(&mut self) -> ParleyResult<bool> {
        match self.u8("boolean")? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(ParleyError::Decode(format!("bad boolean value {other}"))),
        }
    }

    fn finish(&self) -> ParleyResult<()> {
        if self.pos != self.buf.len() {
            return Err(ParleyError::Decode(format!(
                "{} trailing bytes after record",
                self.buf.len() - self.pos
            )));
        }
        Ok(())
    }
}
