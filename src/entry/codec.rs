//! Internal entry codec
//!
//! Encoding into caller-supplied buffers and zero-copy decoding.

use bytes::{Bytes, BytesMut};

use super::{pack_trailer, unpack_trailer, OpType, MAX_SEQUENCE, TRAILER_SIZE};
use crate::coding::{get_fixed64, get_varint32, put_fixed64, put_varint32, varint32_len};
use crate::error::{Result, TableError};

// =============================================================================
// Encoding
// =============================================================================

/// Exact number of bytes `encode` writes for this mutation
///
/// Lengths above `u32::MAX` are measured as five-byte prefixes; `encode`
/// rejects them.
pub fn encoded_len(key: &[u8], value: &[u8], op: OpType) -> usize {
    let key_part = prefix_len(key.len()) + key.len() + TRAILER_SIZE;
    match op {
        OpType::Insert => key_part + prefix_len(value.len()) + value.len(),
        OpType::Delete => key_part,
    }
}

fn prefix_len(len: usize) -> usize {
    u32::try_from(len).map(varint32_len).unwrap_or(5)
}

fn checked_len(len: usize, what: &str) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        TableError::Encoding(format!(
            "{} length {} exceeds the representable maximum {}",
            what,
            len,
            u32::MAX
        ))
    })
}

/// Encode a mutation into `dst`
///
/// `dst` must be exactly `encoded_len(key, value, op)` bytes. Tombstones
/// carry no value, so `value` must be empty for `OpType::Delete`.
pub fn encode(key: &[u8], value: &[u8], sequence: u64, op: OpType, dst: &mut [u8]) -> Result<()> {
    let key_len = checked_len(key.len(), "key")?;

    if sequence > MAX_SEQUENCE {
        return Err(TableError::Encoding(format!(
            "sequence {} exceeds maximum {}",
            sequence, MAX_SEQUENCE
        )));
    }

    if op == OpType::Delete && !value.is_empty() {
        return Err(TableError::Encoding(
            "tombstone cannot carry a value".to_string(),
        ));
    }

    let expected = encoded_len(key, value, op);
    if dst.len() != expected {
        return Err(TableError::Encoding(format!(
            "buffer is {} bytes, entry needs exactly {}",
            dst.len(),
            expected
        )));
    }

    let mut pos = write(dst, 0, |buf| put_varint32(buf, key_len))?;
    dst[pos..pos + key.len()].copy_from_slice(key);
    pos += key.len();
    pos = write(dst, pos, |buf| put_fixed64(buf, pack_trailer(sequence, op)))?;

    if op == OpType::Insert {
        let value_len = checked_len(value.len(), "value")?;
        pos = write(dst, pos, |buf| put_varint32(buf, value_len))?;
        dst[pos..pos + value.len()].copy_from_slice(value);
    }

    Ok(())
}

fn write(dst: &mut [u8], pos: usize, put: impl FnOnce(&mut [u8]) -> Option<usize>) -> Result<usize> {
    put(&mut dst[pos..])
        .map(|written| pos + written)
        .ok_or_else(|| TableError::Encoding("buffer too short".to_string()))
}

// =============================================================================
// Decoding
// =============================================================================

/// Zero-copy view over an encoded internal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InternalEntry<'a> {
    user_key: &'a [u8],
    sequence: u64,
    op_type: OpType,
    value: &'a [u8],
    encoded_len: usize,
}

impl<'a> InternalEntry<'a> {
    /// Parse an entry from the start of `buf`
    pub fn parse(buf: &'a [u8]) -> Result<Self> {
        let (key_len, mut pos) = get_varint32(buf)
            .ok_or_else(|| TableError::Corruption("bad key length prefix".to_string()))?;

        let key_end = pos + key_len as usize;
        let user_key = buf
            .get(pos..key_end)
            .ok_or_else(|| TableError::Corruption("truncated user key".to_string()))?;
        pos = key_end;

        let trailer = get_fixed64(&buf[pos..])
            .ok_or_else(|| TableError::Corruption("truncated trailer".to_string()))?;
        pos += TRAILER_SIZE;

        let (sequence, tag) = unpack_trailer(trailer);
        let op_type = OpType::from_tag(tag)
            .ok_or_else(|| TableError::Corruption(format!("unknown op tag 0x{:02x}", tag)))?;

        let value = match op_type {
            OpType::Delete => &buf[pos..pos],
            OpType::Insert => {
                let (value_len, used) = get_varint32(&buf[pos..]).ok_or_else(|| {
                    TableError::Corruption("bad value length prefix".to_string())
                })?;
                pos += used;
                let value_end = pos + value_len as usize;
                let value = buf
                    .get(pos..value_end)
                    .ok_or_else(|| TableError::Corruption("truncated value".to_string()))?;
                pos = value_end;
                value
            }
        };

        Ok(Self {
            user_key,
            sequence,
            op_type,
            value,
            encoded_len: pos,
        })
    }

    pub fn user_key(&self) -> &'a [u8] {
        self.user_key
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn op_type(&self) -> OpType {
        self.op_type
    }

    /// Value bytes; empty for tombstones
    pub fn value(&self) -> &'a [u8] {
        self.value
    }

    /// Number of bytes the entry occupies in its buffer
    pub fn encoded_len(&self) -> usize {
        self.encoded_len
    }
}

/// User key of an encoded entry, without looking past the key
pub fn user_key_of(buf: &[u8]) -> Option<&[u8]> {
    let (key_len, pos) = get_varint32(buf)?;
    buf.get(pos..pos + key_len as usize)
}

/// Packed sequence/tag trailer of an encoded entry
pub fn trailer_of(buf: &[u8]) -> Option<u64> {
    let (key_len, pos) = get_varint32(buf)?;
    get_fixed64(buf.get(pos + key_len as usize..)?)
}

// =============================================================================
// Lookup Keys
// =============================================================================

/// An owned query record for looking a key up as of a sequence number
///
/// Encoded as a tombstone so it sorts ahead of every real entry of the same
/// key whose sequence is less than or equal to its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupKey {
    encoded: Bytes,
}

impl LookupKey {
    /// Query record seeing every mutation up to and including `sequence`
    pub fn new(key: &[u8], sequence: u64) -> Result<Self> {
        let mut buf = BytesMut::zeroed(encoded_len(key, &[], OpType::Delete));
        encode(key, &[], sequence, OpType::Delete, &mut buf)?;
        Ok(Self {
            encoded: buf.freeze(),
        })
    }

    /// Query record seeing the latest mutation of `key`
    pub fn latest(key: &[u8]) -> Result<Self> {
        Self::new(key, MAX_SEQUENCE)
    }

    /// The encoded internal entry
    pub fn as_bytes(&self) -> &[u8] {
        &self.encoded
    }

    pub fn user_key(&self) -> &[u8] {
        user_key_of(&self.encoded).unwrap_or_default()
    }
}

impl AsRef<[u8]> for LookupKey {
    fn as_ref(&self) -> &[u8] {
        &self.encoded
    }
}
