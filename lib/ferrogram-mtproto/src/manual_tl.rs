// Copyright 2024 - developers of the `ferrogram` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Manual structures for the TL types whose layout is too irregular for
//! the generated-style definitions (raw framing, nested messages, and
//! compressed payloads).
use crate::mtp::DeserializeError;
use ferrogram_tl::deserialize::{self, Cursor};
use ferrogram_tl::{Deserializable, Identifiable, Serializable};
use flate2::write::{GzDecoder, GzEncoder};
use flate2::Compression;
use std::io::Write;

/// This struct represents the following TL definition:
///
/// ```tl
/// message msg_id:long seqno:int bytes:int body:Object = Message;
/// ```
///
/// Each message has its own unique identifier, and the body is simply
/// the serialized request that should be executed on the server, or
/// the response object from Telegram.
pub(crate) struct Message {
    pub msg_id: i64,
    pub seq_no: i32,
    pub body: Vec<u8>,
}

impl Message {
    // msg_id (8 bytes) + seq_no (4 bytes) + bytes (4 bytes)
    pub const SIZE_OVERHEAD: usize = 16;

    /// Peek the constructor identifier from the body.
    pub fn constructor_id(&self) -> Result<u32, deserialize::Error> {
        u32::from_bytes(&self.body)
    }

    /// Whether the server expects an acknowledgment for this message.
    ///
    /// > A message requiring an explicit acknowledgment. These include
    /// > all the user and many service messages, virtually all with the
    /// > exception of containers and acknowledgments.
    pub fn requires_ack(&self) -> bool {
        self.seq_no % 2 == 1
    }
}

impl Serializable for Message {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.msg_id.serialize(buf);
        self.seq_no.serialize(buf);
        (self.body.len() as i32).serialize(buf);
        buf.extend(self.body.iter().copied());
    }
}

impl Deserializable for Message {
    fn deserialize(buf: &mut Cursor) -> deserialize::Result<Self> {
        let msg_id = i64::deserialize(buf)?;
        let seq_no = i32::deserialize(buf)?;

        let len = i32::deserialize(buf)?;
        if len < 0 || len as usize > MessageContainer::MAXIMUM_SIZE {
            return Err(deserialize::Error::UnexpectedEof);
        }
        let mut body = vec![0; len as usize];
        buf.read_exact(&mut body)?;

        Ok(Message {
            msg_id,
            seq_no,
            body,
        })
    }
}

/// This struct represents the following TL definition:
///
/// ```tl
/// rpc_result#f35c6d01 req_msg_id:long result:Object = RpcResult;
/// ```
pub(crate) struct RpcResult {
    pub req_msg_id: i64,
    pub result: Vec<u8>,
}

impl RpcResult {
    /// Peek the constructor identifier from the result.
    pub fn inner_constructor(&self) -> Result<u32, deserialize::Error> {
        u32::from_bytes(&self.result)
    }
}

impl Identifiable for RpcResult {
    const CONSTRUCTOR_ID: u32 = 0xf35c6d01;
}

impl Deserializable for RpcResult {
    fn deserialize(buf: &mut Cursor) -> deserialize::Result<Self> {
        let constructor_id = u32::deserialize(buf)?;
        if constructor_id != Self::CONSTRUCTOR_ID {
            return Err(deserialize::Error::UnexpectedConstructor { id: constructor_id });
        }

        let req_msg_id = i64::deserialize(buf)?;
        let mut result = Vec::new();
        buf.read_to_end(&mut result);

        Ok(Self { req_msg_id, result })
    }
}

/// This struct represents the following TL definition:
///
/// ```tl
/// msg_container#73f1f8dc messages:vector<message> = MessageContainer;
/// ```
///
/// All messages in a container must have a `msg_id` lower than that of
/// the container itself, and a container may not carry other containers.
pub(crate) struct MessageContainer {
    pub messages: Vec<Message>,
}

impl MessageContainer {
    // constructor id (4 bytes) + inner vec len (4 bytes)
    pub const SIZE_OVERHEAD: usize = 8;

    /// Maximum size in bytes for the inner payload of the container.
    /// Telegram will close the connection if the payload is bigger.
    pub const MAXIMUM_SIZE: usize = 1_044_456 - Self::SIZE_OVERHEAD;

    /// Maximum amount of messages that can be sent inside a single
    /// container, inclusive. Beyond this limit Telegram will respond
    /// with `BAD_MESSAGE` 64 (invalid container).
    pub const MAXIMUM_LENGTH: usize = 100;
}

impl Identifiable for MessageContainer {
    const CONSTRUCTOR_ID: u32 = 0x73f1f8dc;
}

impl Deserializable for MessageContainer {
    fn deserialize(buf: &mut Cursor) -> deserialize::Result<Self> {
        let constructor_id = u32::deserialize(buf)?;
        if constructor_id != Self::CONSTRUCTOR_ID {
            return Err(deserialize::Error::UnexpectedConstructor { id: constructor_id });
        }

        let len = i32::deserialize(buf)?;
        let mut messages = Vec::with_capacity((len.max(0) as usize).min(Self::MAXIMUM_LENGTH));
        for _ in 0..len {
            messages.push(Message::deserialize(buf)?);
        }

        Ok(Self { messages })
    }
}

/// This struct represents the following TL definition:
///
/// ```tl
/// gzip_packed#3072cfa1 packed_data:bytes = Object;
/// ```
pub(crate) struct GzipPacked {
    pub packed_data: Vec<u8>,
}

impl GzipPacked {
    pub fn new(unpacked_data: &[u8]) -> Self {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
        // Safe to unwrap, in-memory data should not fail.
        encoder.write_all(unpacked_data).unwrap();
        let packed_data = encoder.finish().unwrap();
        Self { packed_data }
    }

    pub fn decompress(&self) -> Result<Vec<u8>, DeserializeError> {
        let mut decoder = GzDecoder::new(Vec::new());
        decoder
            .write_all(&self.packed_data[..])
            .map_err(|_| DeserializeError::DecompressionFailed)?;
        decoder
            .finish()
            .map_err(|_| DeserializeError::DecompressionFailed)
    }
}

impl Identifiable for GzipPacked {
    const CONSTRUCTOR_ID: u32 = 0x3072cfa1;
}

impl Serializable for GzipPacked {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        self.packed_data.serialize(buf);
    }
}

impl Deserializable for GzipPacked {
    fn deserialize(buf: &mut Cursor) -> deserialize::Result<Self> {
        let constructor_id = u32::deserialize(buf)?;
        if constructor_id != Self::CONSTRUCTOR_ID {
            return Err(deserialize::Error::UnexpectedConstructor { id: constructor_id });
        }

        let packed_data = Vec::<u8>::deserialize(buf)?;
        Ok(Self { packed_data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_round_trip() {
        let message = Message {
            msg_id: 0x0123_4567_89ab_cdef,
            seq_no: 3,
            body: vec![1, 2, 3, 4],
        };
        let bytes = message.to_bytes();
        assert_eq!(bytes.len(), Message::SIZE_OVERHEAD + 4);

        let parsed = Message::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.msg_id, message.msg_id);
        assert_eq!(parsed.seq_no, message.seq_no);
        assert_eq!(parsed.body, message.body);
    }

    #[test]
    fn ack_requirement_follows_parity() {
        let mut message = Message {
            msg_id: 0,
            seq_no: 1,
            body: vec![],
        };
        assert!(message.requires_ack());
        message.seq_no = 4;
        assert!(!message.requires_ack());
    }

    #[test]
    fn gzip_round_trip() {
        let data = vec![7u8; 16 * 1024];
        let packed = GzipPacked::new(&data);
        assert!(packed.packed_data.len() < data.len());
        assert_eq!(packed.decompress().unwrap(), data);
    }

    #[test]
    fn gzip_rejects_garbage() {
        let packed = GzipPacked {
            packed_data: vec![1, 2, 3],
        };
        assert_eq!(
            packed.decompress().unwrap_err(),
            DeserializeError::DecompressionFailed
        );
    }
}
