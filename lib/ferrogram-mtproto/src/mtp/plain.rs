// Copyright 2024 - developers of the `ferrogram` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use super::{Deserialization, DeserializeError, Mtp, RpcResult};
use crate::utils::check_message_buffer;
use crate::MsgId;
use ferrogram_crypto::DequeBuffer;
use ferrogram_tl::{Cursor, Deserializable, Serializable};

/// An implementation of the [Mobile Transport Protocol] for plaintext
/// (unencrypted) messages.
///
/// The reason to separate the plaintext and encrypted implementations
/// for serializing messages is that, even though they are similar, the
/// benefits outweigh some minor code reuse.
///
/// This way, the encryption key for [`super::Encrypted`] is mandatory,
/// so errors for trying to encrypt data without a key are completely
/// eliminated. The plaintext part of the protocol also does not need to
/// deal with the complexity of the full protocol.
///
/// [Mobile Transport Protocol]: https://core.telegram.org/mtproto/description#unencrypted-message
#[non_exhaustive]
pub struct Plain {
    pending: bool,
}

#[allow(clippy::new_without_default)]
impl Plain {
    pub fn new() -> Self {
        Self { pending: false }
    }
}

impl Mtp for Plain {
    /// Wraps a request's data into a plain message (also known as an
    /// [unencrypted message]).
    ///
    /// Plain messages are only used for requests that do not require an
    /// authorization key to be present, that is, those needed to
    /// generate the authorization key itself.
    ///
    /// Only one request may be in flight at a time; pushing a second one
    /// before finalizing returns `None`.
    ///
    /// [unencrypted message]: https://core.telegram.org/mtproto/description#unencrypted-message
    fn push(&mut self, buffer: &mut DequeBuffer<u8>, request: &[u8]) -> Option<MsgId> {
        if self.pending {
            return None;
        }

        buffer.clear();
        buffer.extend(request);
        self.pending = true;
        Some(MsgId(0))
    }

    fn finalize(&mut self, buffer: &mut DequeBuffer<u8>) -> Option<MsgId> {
        if !self.pending {
            return None;
        }
        self.pending = false;

        let mut header = Vec::with_capacity(super::PLAIN_PACKET_HEADER_LEN);
        0i64.serialize(&mut header); // auth_key_id = 0

        // Even though the protocol states the `msg_id` must follow
        // certain rules, the server accepts 0 during the handshake, and
        // using it keeps the authentication steps free of clock state.
        0i64.serialize(&mut header); // message_id
        (buffer.len() as i32).serialize(&mut header); // message_data_length
        buffer.extend_front(&header);

        Some(MsgId(0))
    }

    /// Validates that the response is a correct plain message and, if it
    /// is, returns its inner contents.
    fn deserialize(&mut self, payload: &[u8]) -> Result<Vec<Deserialization>, DeserializeError> {
        check_message_buffer(payload)?;

        let mut buf = Cursor::from_slice(payload);
        let auth_key_id = i64::deserialize(&mut buf)?;
        if auth_key_id != 0 {
            return Err(DeserializeError::BadAuthKey {
                got: auth_key_id,
                expected: 0,
            });
        }

        // We can't validate the message ID against our system time
        // because the time offset is not known yet. However:
        //
        // > server message identifiers modulo 4 yield 1 if the message
        // > is a response to a client message
        let msg_id = i64::deserialize(&mut buf)?;
        if msg_id <= 0 || (msg_id % 4) != 1 {
            return Err(DeserializeError::BadMessageId { got: msg_id });
        }

        let len = i32::deserialize(&mut buf)?;
        if len <= 0 {
            return Err(DeserializeError::NegativeMessageLength { got: len });
        }
        if (20 + len) as usize > payload.len() {
            return Err(DeserializeError::TooLongMessageLength {
                got: len as usize,
                max_length: payload.len() - 20,
            });
        }

        Ok(vec![Deserialization::RpcResult(RpcResult {
            msg_id: MsgId(0),
            body: payload[20..20 + len as usize].into(),
        })])
    }

    fn requires_keepalive(&self) -> bool {
        false
    }

    fn reset(&mut self) {
        self.pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finalized_header_layout() {
        let mut mtp = Plain::new();
        let mut buffer = DequeBuffer::with_capacity(16, 20);
        assert_eq!(mtp.push(&mut buffer, b"Hey!"), Some(MsgId(0)));
        assert!(mtp.finalize(&mut buffer).is_some());

        assert_eq!(buffer.len(), 24);
        assert_eq!(&buffer[..8], &[0; 8]); // auth_key_id
        assert_eq!(&buffer[8..16], &[0; 8]); // msg_id
        assert_eq!(&buffer[16..20], &[4, 0, 0, 0]); // length
        assert_eq!(&buffer[20..], b"Hey!");
    }

    #[test]
    fn only_one_request_at_a_time() {
        let mut mtp = Plain::new();
        let mut buffer = DequeBuffer::with_capacity(16, 20);
        assert!(mtp.push(&mut buffer, b"Hey!").is_some());
        assert!(mtp.push(&mut buffer, b"Bye!").is_none());
    }

    #[test]
    fn deserialize_checks_header() {
        let mut mtp = Plain::new();

        let mut payload = Vec::new();
        1i64.serialize(&mut payload);
        payload.extend_from_slice(&[0; 12]);
        assert!(matches!(
            mtp.deserialize(&payload),
            Err(DeserializeError::BadAuthKey { got: 1, .. })
        ));

        let mut payload = Vec::new();
        0i64.serialize(&mut payload);
        4i64.serialize(&mut payload); // msg_id % 4 == 0 is invalid
        payload.extend_from_slice(&[0; 4]);
        assert!(matches!(
            mtp.deserialize(&payload),
            Err(DeserializeError::BadMessageId { got: 4 })
        ));
    }

    #[test]
    fn deserialize_extracts_body() {
        let mut mtp = Plain::new();

        let mut payload = Vec::new();
        0i64.serialize(&mut payload);
        5i64.serialize(&mut payload);
        4i32.serialize(&mut payload);
        payload.extend_from_slice(b"data");

        let mut results = mtp.deserialize(&payload).unwrap();
        assert_eq!(results.len(), 1);
        match results.pop().unwrap() {
            Deserialization::RpcResult(result) => {
                assert_eq!(result.msg_id, MsgId(0));
                assert_eq!(result.body, b"data");
            }
            _ => panic!("expected a rpc result"),
        }
    }
}
