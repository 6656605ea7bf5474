//! Log record definitions
//!
//! Defines the binary layout of one log entry.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{DbError, Result};

/// Header size: key_len (4) + value_len (4) + mark (2)
pub const HEADER_SIZE: usize = 10;

/// Whether a record establishes or removes a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Put = 0,
    Delete = 1,
}

impl Mark {
    fn from_u16(raw: u16) -> Option<Self> {
        match raw {
            0 => Some(Mark::Put),
            1 => Some(Mark::Delete),
            _ => None,
        }
    }
}

/// A single record in the log
///
/// Immutable once built; it is written exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    mark: Mark,
    key: Vec<u8>,
    value: Vec<u8>,
}

impl Record {
    /// A record that sets `key` to `value`
    pub fn put(key: Vec<u8>, value: Vec<u8>) -> Self {
        Self {
            mark: Mark::Put,
            key,
            value,
        }
    }

    /// A tombstone for `key`
    pub fn delete(key: Vec<u8>) -> Self {
        Self {
            mark: Mark::Delete,
            key,
            value: Vec::new(),
        }
    }

    pub fn mark(&self) -> Mark {
        self.mark
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn is_tombstone(&self) -> bool {
        self.mark == Mark::Delete
    }

    /// Take the key out of the record
    pub fn into_key(self) -> Vec<u8> {
        self.key
    }

    /// Take the value out of the record
    pub fn into_value(self) -> Vec<u8> {
        self.value
    }

    /// Total bytes this record occupies on disk
    pub fn encoded_size(&self) -> u64 {
        (HEADER_SIZE + self.key.len() + self.value.len()) as u64
    }

    /// Serialize to header + key + value
    ///
    /// Fails if the key or value length does not fit the 32-bit header fields.
    pub fn encode(&self) -> Result<Bytes> {
        let key_len = u32::try_from(self.key.len()).map_err(|_| DbError::RecordTooLarge {
            field: "key",
            len: self.key.len(),
        })?;
        let value_len =
            u32::try_from(self.value.len()).map_err(|_| DbError::RecordTooLarge {
                field: "value",
                len: self.value.len(),
            })?;

        let mut buf = BytesMut::with_capacity(self.encoded_size() as usize);
        buf.put_u32(key_len);
        buf.put_u32(value_len);
        buf.put_u16(self.mark as u16);
        buf.put_slice(&self.key);
        buf.put_slice(&self.value);

        Ok(buf.freeze())
    }

    /// Decode one record from the front of `bytes`
    ///
    /// `at` is the log offset the bytes were read from and only appears in
    /// error reports. Returns the record and the number of bytes it spans.
    pub fn decode(bytes: &[u8], at: u64) -> Result<(Self, u64)> {
        let header = RecordHeader::decode(bytes, at)?;
        let size = header.encoded_size();

        if (bytes.len() as u64) < size {
            return Err(DbError::TruncatedRecord {
                offset: at,
                needed: size,
                available: bytes.len() as u64,
            });
        }

        let body = bytes[HEADER_SIZE..size as usize].to_vec();
        Ok((header.into_record(body), size))
    }
}

/// Fixed-size prefix of every record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub key_len: u32,
    pub value_len: u32,
    pub mark: Mark,
}

impl RecordHeader {
    /// Parse the header at the front of `bytes`
    pub fn decode(bytes: &[u8], at: u64) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(DbError::TruncatedRecord {
                offset: at,
                needed: HEADER_SIZE as u64,
                available: bytes.len() as u64,
            });
        }

        let mut buf = &bytes[..HEADER_SIZE];
        let key_len = buf.get_u32();
        let value_len = buf.get_u32();
        let raw_mark = buf.get_u16();

        let mark = Mark::from_u16(raw_mark).ok_or_else(|| DbError::Corruption {
            offset: at,
            reason: format!("unknown mark 0x{:04x}", raw_mark),
        })?;

        if key_len == 0 {
            return Err(DbError::Corruption {
                offset: at,
                reason: "zero-length key".to_string(),
            });
        }

        Ok(Self {
            key_len,
            value_len,
            mark,
        })
    }

    /// Bytes following the header
    pub fn body_len(&self) -> u64 {
        self.key_len as u64 + self.value_len as u64
    }

    /// Header plus body, i.e. the distance to the next record
    pub fn encoded_size(&self) -> u64 {
        HEADER_SIZE as u64 + self.body_len()
    }

    /// Build the record from its body bytes (key followed by value)
    fn into_record(self, mut body: Vec<u8>) -> Record {
        let value = body.split_off(self.key_len as usize);
        Record {
            mark: self.mark,
            key: body,
            value,
        }
    }
}
