// Copyright 2024 - developers of the `ferrogram` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use super::{
    BadMessage, Deserialization, DeserializationFailure, DeserializeError, Mtp, RpcResult,
    RpcResultError,
};
use crate::utils::check_message_buffer;
use crate::{manual_tl, MsgId};
use ferrogram_crypto::{decrypt_message_v2, encrypt_message_v2, AuthKey, DequeBuffer};
use ferrogram_tl::{self as tl, Cursor, Deserializable, Identifiable, Serializable};
use getrandom::getrandom;
use std::mem;
use std::time::{SystemTime, UNIX_EPOCH};

/// The default compression threshold in bytes for outgoing messages.
pub const DEFAULT_COMPRESSION_THRESHOLD: Option<usize> = Some(512);

/// Size of the header prepended to a plain outgoing message:
/// `auth_key_id` (8 bytes), `msg_id` (8 bytes) and length (4 bytes).
pub const PLAIN_PACKET_HEADER_LEN: usize = 20;

/// Size of everything that comes before the first message of an
/// encrypted payload: the envelope's `auth_key_id` and `msg_key`
/// (24 bytes) plus `salt` and `session_id` (16 bytes).
pub const ENCRYPTED_PACKET_HEADER_LEN: usize = 40;

/// Size of the header for a message container: the container's own
/// message header (16 bytes) plus its constructor and length (8 bytes).
pub const MESSAGE_CONTAINER_HEADER_LEN: usize = 24;

/// Constructor identifiers for the `Updates`-like types, used to tell
/// whether an RPC result should also be processed as an update.
static UPDATE_IDS: [u32; 6] = [
    tl::types::UpdateShortMessage::CONSTRUCTOR_ID,
    tl::types::UpdateShortChatMessage::CONSTRUCTOR_ID,
    tl::types::UpdateShort::CONSTRUCTOR_ID,
    tl::types::UpdatesCombined::CONSTRUCTOR_ID,
    tl::types::Updates::CONSTRUCTOR_ID,
    tl::enums::UPDATES_TOO_LONG_ID,
];

/// A builder to configure [`Encrypted`] instances.
pub struct EncryptedBuilder {
    time_offset: i32,
    first_salt: i64,
    compression_threshold: Option<usize>,
}

/// An implementation of the [Mobile Transport Protocol] for ciphertext
/// (encrypted) messages.
///
/// [Mobile Transport Protocol]: https://core.telegram.org/mtproto/description
pub struct Encrypted {
    /// The authorization key used to encrypt the payload.
    auth_key: AuthKey,

    /// The time offset from the server's time, in seconds.
    time_offset: i32,

    /// The current salt to be used when encrypting the payload.
    salt: i64,

    /// The secure, random identifier for this session instance.
    client_id: i64,

    /// The current message sequence number.
    sequence: i32,

    /// The ID of the last message.
    last_msg_id: i64,

    /// Identifiers of incoming [content-related messages] that need to
    /// be acknowledged to the server.
    ///
    /// [content-related messages]: https://core.telegram.org/mtproto/description#content-related-message
    pending_ack: Vec<i64>,

    /// If present, the threshold in bytes at which an outgoing message
    /// will be considered large enough to attempt compressing it.
    compression_threshold: Option<usize>,

    /// Deserialization results accumulated while processing a payload.
    deserialization: Vec<Deserialization>,

    /// How many messages have been serialized into the current buffer.
    msg_count: usize,

    /// Message ID of the last message serialized into the buffer.
    buffer_msg_id: i64,
}

impl EncryptedBuilder {
    /// Configures the time offset to Telegram servers.
    pub fn time_offset(mut self, offset: i32) -> Self {
        self.time_offset = offset;
        self
    }

    /// Configures the first server salt to use.
    pub fn first_salt(mut self, first_salt: i64) -> Self {
        self.first_salt = first_salt;
        self
    }

    /// Configures the compression threshold for outgoing messages.
    pub fn compression_threshold(mut self, threshold: Option<usize>) -> Self {
        self.compression_threshold = threshold;
        self
    }

    /// Finishes the builder and returns the [`Encrypted`] instance with
    /// all the configuration changes applied.
    pub fn finish(self, auth_key: [u8; 256]) -> Encrypted {
        Encrypted {
            auth_key: AuthKey::from_bytes(auth_key),
            time_offset: self.time_offset,
            salt: self.first_salt,
            client_id: {
                let mut buffer = [0u8; 8];
                getrandom(&mut buffer).expect("failed to generate a secure client_id");
                i64::from_le_bytes(buffer)
            },
            sequence: 0,
            last_msg_id: 0,
            pending_ack: vec![],
            compression_threshold: self.compression_threshold,
            deserialization: Vec::new(),
            msg_count: 0,
            buffer_msg_id: 0,
        }
    }
}

impl Encrypted {
    /// Start building a new encrypted MTP state.
    pub fn build() -> EncryptedBuilder {
        EncryptedBuilder {
            time_offset: 0,
            first_salt: 0,
            compression_threshold: DEFAULT_COMPRESSION_THRESHOLD,
        }
    }

    /// The authorization key used for encryption and decryption.
    pub fn auth_key(&self) -> [u8; 256] {
        self.auth_key.to_bytes()
    }

    /// Correct the time offset based on a known valid message ID.
    fn correct_time_offset(&mut self, msg_id: i64) {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time is before epoch")
            .as_secs() as i32;

        let correct = (msg_id >> 32) as i32;
        self.time_offset = correct - now;
    }

    /// Generates a new unique message ID based on the current time since
    /// epoch, applying the known time offset.
    ///
    /// The low 32 bits carry the fractional part of the second shifted
    /// left twice, which both keeps the identifier divisible by 4 (as
    /// client messages must be) and leaves room to bump it when the
    /// clock alone would not move it forward.
    fn get_new_msg_id(&mut self) -> i64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time is before epoch");

        let seconds = (now.as_secs() as i32 + self.time_offset) as u64;
        let micros = now.subsec_micros() as u64;
        let mut new_msg_id = ((seconds << 32) | (micros << 2)) as i64;

        if self.last_msg_id >= new_msg_id {
            new_msg_id = self.last_msg_id + 4;
        }

        self.last_msg_id = new_msg_id;
        new_msg_id
    }

    /// Generates the next sequence number depending on whether it is for
    /// a content-related message or not.
    fn get_seq_no(&mut self, content_related: bool) -> i32 {
        if content_related {
            self.sequence += 2;
            self.sequence - 1
        } else {
            self.sequence
        }
    }

    /// Appends one message (header and body) to the buffer.
    fn serialize_msg(
        &mut self,
        buffer: &mut DequeBuffer<u8>,
        body: &[u8],
        content_related: bool,
    ) -> MsgId {
        let msg_id = self.get_new_msg_id();
        let seq_no = self.get_seq_no(content_related);

        msg_id.serialize(buffer);
        seq_no.serialize(buffer);
        (body.len() as i32).serialize(buffer);
        buffer.extend(body);

        self.msg_count += 1;
        self.buffer_msg_id = msg_id;
        MsgId(msg_id)
    }

    /// Serializes any pending acknowledgments as a non-content message.
    fn serialize_pending_ack(&mut self, buffer: &mut DequeBuffer<u8>) {
        if self.pending_ack.is_empty() {
            return;
        }

        let body = tl::enums::MsgsAck::Ack(tl::types::MsgsAck {
            msg_ids: mem::take(&mut self.pending_ack),
        })
        .to_bytes();
        self.serialize_msg(buffer, &body, false);
    }

    /// `finalize`, but without encryption (for testing purposes).
    fn finalize_plain(&mut self, buffer: &mut DequeBuffer<u8>) -> Option<MsgId> {
        self.serialize_pending_ack(buffer);
        if self.msg_count == 0 {
            return None;
        }

        let msg_id = if self.msg_count == 1 {
            MsgId(self.buffer_msg_id)
        } else {
            // All the messages are already in the buffer; give the
            // container its own message ID and sequence number and
            // prepend its header.
            let msg_id = self.get_new_msg_id();
            let seq_no = self.get_seq_no(false);
            let len = (buffer.len() + manual_tl::MessageContainer::SIZE_OVERHEAD) as i32;

            let mut header = Vec::with_capacity(MESSAGE_CONTAINER_HEADER_LEN);
            msg_id.serialize(&mut header);
            seq_no.serialize(&mut header);
            len.serialize(&mut header);
            manual_tl::MessageContainer::CONSTRUCTOR_ID.serialize(&mut header);
            (self.msg_count as i32).serialize(&mut header);
            buffer.extend_front(&header);

            MsgId(msg_id)
        };

        let mut prefix = Vec::with_capacity(16);
        self.salt.serialize(&mut prefix);
        self.client_id.serialize(&mut prefix);
        buffer.extend_front(&prefix);

        self.msg_count = 0;
        Some(msg_id)
    }

    fn process_message(&mut self, message: manual_tl::Message) -> Result<(), DeserializeError> {
        if message.requires_ack() {
            self.pending_ack.push(message.msg_id);
        }

        // Handle all the possible service messages:
        // * https://core.telegram.org/mtproto/service_messages
        // * https://core.telegram.org/mtproto/service_messages_about_messages
        match message.constructor_id()? {
            manual_tl::RpcResult::CONSTRUCTOR_ID => self.handle_rpc_result(message),
            tl::types::MsgsAck::CONSTRUCTOR_ID => self.handle_ack(message),
            tl::types::BadMsgNotification::CONSTRUCTOR_ID
            | tl::types::BadServerSalt::CONSTRUCTOR_ID => self.handle_bad_notification(message),
            tl::types::MsgsStateReq::CONSTRUCTOR_ID
            | tl::types::MsgsStateInfo::CONSTRUCTOR_ID
            | tl::types::MsgsAllInfo::CONSTRUCTOR_ID
            | tl::types::MsgResendReq::CONSTRUCTOR_ID => self.handle_state_message(message),
            tl::types::MsgDetailedInfo::CONSTRUCTOR_ID
            | tl::types::MsgNewDetailedInfo::CONSTRUCTOR_ID => self.handle_detailed_info(message),
            tl::types::FutureSalt::CONSTRUCTOR_ID => self.handle_future_salt(message),
            tl::types::FutureSalts::CONSTRUCTOR_ID => self.handle_future_salts(message),
            tl::types::Pong::CONSTRUCTOR_ID => self.handle_pong(message),
            tl::types::DestroySessionOk::CONSTRUCTOR_ID
            | tl::types::DestroySessionNone::CONSTRUCTOR_ID => Ok(()),
            tl::types::NewSessionCreated::CONSTRUCTOR_ID => {
                self.handle_new_session_created(message)
            }
            manual_tl::MessageContainer::CONSTRUCTOR_ID => self.handle_container(message),
            manual_tl::GzipPacked::CONSTRUCTOR_ID => self.handle_gzip_packed(message),
            tl::types::HttpWait::CONSTRUCTOR_ID => Ok(()),
            _ => self.handle_update(message),
        }
    }

    /// **Response to an RPC query.**
    ///
    /// ```tl
    /// rpc_result#f35c6d01 req_msg_id:long result:Object = RpcResult;
    /// ```
    ///
    /// The result may be an error, a gzipped payload, or the raw body of
    /// the response. Any error during the handling of a result belongs
    /// to the original caller, so it is stored rather than returned.
    fn handle_rpc_result(&mut self, message: manual_tl::Message) -> Result<(), DeserializeError> {
        let rpc_result = manual_tl::RpcResult::from_bytes(&message.body)?;
        let inner_constructor = rpc_result.inner_constructor();
        let manual_tl::RpcResult { req_msg_id, result } = rpc_result;
        let msg_id = MsgId(req_msg_id);

        let inner_constructor = match inner_constructor {
            Ok(id) => id,
            Err(error) => {
                self.deserialization
                    .push(Deserialization::Failure(DeserializationFailure {
                        msg_id,
                        error: error.into(),
                    }));
                return Ok(());
            }
        };

        match inner_constructor {
            tl::types::RpcError::CONSTRUCTOR_ID => {
                let item = match tl::enums::RpcError::from_bytes(&result) {
                    Ok(tl::enums::RpcError::Error(error)) => {
                        Deserialization::RpcError(RpcResultError { msg_id, error })
                    }
                    Err(error) => Deserialization::Failure(DeserializationFailure {
                        msg_id,
                        error: error.into(),
                    }),
                };
                self.deserialization.push(item);
            }
            manual_tl::GzipPacked::CONSTRUCTOR_ID => {
                // Telegram should not send compressed errors, so the
                // decompressed payload is not checked for being one.
                let item = match manual_tl::GzipPacked::from_bytes(&result)
                    .map_err(DeserializeError::from)
                    .and_then(|gzip| gzip.decompress())
                {
                    Ok(body) => {
                        self.store_own_updates(msg_id, &body);
                        Deserialization::RpcResult(RpcResult { msg_id, body })
                    }
                    Err(error) => {
                        Deserialization::Failure(DeserializationFailure { msg_id, error })
                    }
                };
                self.deserialization.push(item);
            }
            _ => {
                self.store_own_updates(msg_id, &result);
                self.deserialization
                    .push(Deserialization::RpcResult(RpcResult {
                        msg_id,
                        body: result,
                    }));
            }
        }

        Ok(())
    }

    /// Updates produced by `rpc_result` must be considered as any other
    /// update, since they can change the `pts`. If this was not done,
    /// eventually higher levels would find gaps.
    fn store_own_updates(&mut self, msg_id: MsgId, body: &[u8]) {
        if let Ok(body_id) = u32::from_bytes(body) {
            if UPDATE_IDS.contains(&body_id) {
                self.deserialization.push(Deserialization::OwnUpdate {
                    msg_id,
                    update: body.to_vec(),
                });
            }
        }
    }

    /// **Acknowledgment of receipt.**
    ///
    /// ```tl
    /// msgs_ack#62d6b459 msg_ids:Vector<long> = MsgsAck;
    /// ```
    ///
    /// The request that an acknowledgment confirms will eventually get
    /// its proper response, so there is nothing to resolve here.
    fn handle_ack(&mut self, message: manual_tl::Message) -> Result<(), DeserializeError> {
        let tl::enums::MsgsAck::Ack(ack) = tl::enums::MsgsAck::from_bytes(&message.body)?;
        log::trace!("server acknowledged {} message(s)", ack.msg_ids.len());
        Ok(())
    }

    /// **Notice of ignored error message.**
    ///
    /// ```tl
    /// bad_msg_notification#a7eff811 bad_msg_id:long bad_msg_seqno:int
    ///     error_code:int = BadMsgNotification;
    /// bad_server_salt#edab447b bad_msg_id:long bad_msg_seqno:int
    ///     error_code:int new_server_salt:long = BadMsgNotification;
    /// ```
    ///
    /// Adjusts the local state (clock offset, sequence, salt) so the
    /// rejected message can be sent again with correct values.
    fn handle_bad_notification(
        &mut self,
        message: manual_tl::Message,
    ) -> Result<(), DeserializeError> {
        let bad_msg = match tl::enums::BadMsgNotification::from_bytes(&message.body)? {
            tl::enums::BadMsgNotification::Notification(x) => x,
            tl::enums::BadMsgNotification::BadServerSalt(x) => {
                self.deserialization
                    .push(Deserialization::BadMessage(BadMessage {
                        msg_id: MsgId(x.bad_msg_id),
                        code: x.error_code,
                    }));
                self.salt = x.new_server_salt;
                return Ok(());
            }
        };

        self.deserialization
            .push(Deserialization::BadMessage(BadMessage {
                msg_id: MsgId(bad_msg.bad_msg_id),
                code: bad_msg.error_code,
            }));

        match bad_msg.error_code {
            16 | 17 => {
                // Sent `msg_id` was too low or too high; in either case
                // our `time_offset` is wrong.
                self.correct_time_offset(message.msg_id);
            }
            32 => {
                // Sent `seq_no` was too low. Bump it by some large-ish value.
                self.sequence += 64;
            }
            33 => {
                // Sent `seq_no` was too high (this error does not seem to occur).
                self.sequence -= 16;
            }
            _ => {}
        }

        Ok(())
    }

    /// The message-status service messages (`msgs_state_req`,
    /// `msgs_state_info`, `msgs_all_info`, `msg_resend_req`) have no
    /// effect on our state; requests that appear forgotten are sent
    /// again by the layer above when the connection resets.
    fn handle_state_message(&mut self, message: manual_tl::Message) -> Result<(), DeserializeError> {
        log::debug!(
            "ignoring message status constructor {:08x}",
            message.constructor_id()?
        );
        Ok(())
    }

    /// **Extended voluntary communication of status of one message.**
    ///
    /// ```tl
    /// msg_detailed_info#276d3ec6 msg_id:long answer_msg_id:long
    ///     bytes:int status:int = MsgDetailedInfo;
    /// msg_new_detailed_info#809db6df answer_msg_id:long
    ///     bytes:int status:int = MsgDetailedInfo;
    /// ```
    ///
    /// Acknowledging the answer is what prompts the server to send the
    /// (possibly large) response itself.
    fn handle_detailed_info(&mut self, message: manual_tl::Message) -> Result<(), DeserializeError> {
        match tl::enums::MsgDetailedInfo::from_bytes(&message.body)? {
            tl::enums::MsgDetailedInfo::Info(x) => self.pending_ack.push(x.answer_msg_id),
            tl::enums::MsgDetailedInfo::MsgNewDetailedInfo(x) => {
                self.pending_ack.push(x.answer_msg_id)
            }
        }
        Ok(())
    }

    /// A bare `future_salt` never arrives outside of `future_salts`.
    fn handle_future_salt(&mut self, message: manual_tl::Message) -> Result<(), DeserializeError> {
        log::warn!("unexpected bare future_salt (msg_id {})", message.msg_id);
        Ok(())
    }

    /// **Request for several future salts.**
    ///
    /// ```tl
    /// future_salts#ae500895 req_msg_id:long now:int
    ///     salts:vector<future_salt> = FutureSalts;
    /// ```
    ///
    /// These do not come inside a `rpc_result` but still answer a
    /// previous request.
    fn handle_future_salts(&mut self, message: manual_tl::Message) -> Result<(), DeserializeError> {
        let tl::enums::FutureSalts::Salts(salts) =
            tl::enums::FutureSalts::from_bytes(&message.body)?;

        self.deserialization
            .push(Deserialization::RpcResult(RpcResult {
                msg_id: MsgId(salts.req_msg_id),
                body: message.body,
            }));
        Ok(())
    }

    /// **Ping messages (PING/PONG).**
    ///
    /// ```tl
    /// pong#347773c5 msg_id:long ping_id:long = Pong;
    /// ```
    ///
    /// Pongs echo the `msg_id` of their ping, so they complete requests
    /// like a `rpc_result` would.
    fn handle_pong(&mut self, message: manual_tl::Message) -> Result<(), DeserializeError> {
        let tl::enums::Pong::Pong(pong) = tl::enums::Pong::from_bytes(&message.body)?;

        self.deserialization
            .push(Deserialization::RpcResult(RpcResult {
                msg_id: MsgId(pong.msg_id),
                body: message.body,
            }));
        Ok(())
    }

    /// **New session creation notification.**
    ///
    /// ```tl
    /// new_session_created#9ec20908 first_msg_id:long unique_id:long
    ///     server_salt:long = NewSession;
    /// ```
    ///
    /// The server forgot every message below `first_msg_id`, so pending
    /// requests under it have to be transmitted again.
    fn handle_new_session_created(
        &mut self,
        message: manual_tl::Message,
    ) -> Result<(), DeserializeError> {
        let tl::enums::NewSession::Created(new_session) =
            tl::enums::NewSession::from_bytes(&message.body)?;

        self.salt = new_session.server_salt;
        self.deserialization.push(Deserialization::RpcCleared {
            first_msg_id: MsgId(new_session.first_msg_id),
        });
        Ok(())
    }

    /// **Containers.**
    ///
    /// ```tl
    /// msg_container#73f1f8dc messages:vector<message> = MessageContainer;
    /// ```
    fn handle_container(&mut self, message: manual_tl::Message) -> Result<(), DeserializeError> {
        let container = manual_tl::MessageContainer::from_bytes(&message.body)?;
        for inner_message in container.messages {
            self.process_message(inner_message)?;
        }

        Ok(())
    }

    /// **Packed object.**
    ///
    /// ```tl
    /// gzip_packed#3072cfa1 packed_data:bytes = Object;
    /// ```
    fn handle_gzip_packed(&mut self, message: manual_tl::Message) -> Result<(), DeserializeError> {
        let container = manual_tl::GzipPacked::from_bytes(&message.body)?;
        self.process_message(manual_tl::Message {
            body: container.decompress()?,
            ..message
        })
    }

    /// Anything that is not a service message is an update.
    fn handle_update(&mut self, message: manual_tl::Message) -> Result<(), DeserializeError> {
        self.deserialization
            .push(Deserialization::Update(message.body));
        Ok(())
    }
}

impl Mtp for Encrypted {
    /// Pushes one request into the buffer, giving it a fresh message ID,
    /// unless the buffer has no room left for it.
    fn push(&mut self, buffer: &mut DequeBuffer<u8>, request: &[u8]) -> Option<MsgId> {
        // Acknowledgments to the server take priority over user requests
        // because they should go out as soon as possible.
        self.serialize_pending_ack(buffer);

        if self.msg_count >= manual_tl::MessageContainer::MAXIMUM_LENGTH {
            return None;
        }

        // Requests that are too large would cause Telegram to close the
        // connection, but they are so uncommon it's not worth an `Err`.
        assert!(
            request.len() + manual_tl::Message::SIZE_OVERHEAD
                <= manual_tl::MessageContainer::MAXIMUM_SIZE
        );

        // Serialized requests are always correctly padded.
        assert!(request.len() % 4 == 0);

        // Payload from the caller is always content-related, which also
        // means compression may apply.
        let mut body = request;
        let compressed;
        if let Some(threshold) = self.compression_threshold {
            if request.len() >= threshold {
                compressed = manual_tl::GzipPacked::new(request).to_bytes();
                if compressed.len() < request.len() {
                    body = &compressed;
                }
            }
        }

        let new_size = buffer.len() + body.len() + manual_tl::Message::SIZE_OVERHEAD;
        if new_size >= manual_tl::MessageContainer::MAXIMUM_SIZE {
            // No more messages fit in this container.
            return None;
        }

        Some(self.serialize_msg(buffer, body, true))
    }

    fn finalize(&mut self, buffer: &mut DequeBuffer<u8>) -> Option<MsgId> {
        let msg_id = self.finalize_plain(buffer)?;
        encrypt_message_v2(buffer, &self.auth_key);
        Some(msg_id)
    }

    /// Processes an encrypted response from the server.
    fn deserialize(&mut self, payload: &[u8]) -> Result<Vec<Deserialization>, DeserializeError> {
        check_message_buffer(payload)?;

        let plaintext = decrypt_message_v2(payload, &self.auth_key)?;

        let mut buffer = Cursor::from_slice(&plaintext);
        let _salt = i64::deserialize(&mut buffer)?;
        let client_id = i64::deserialize(&mut buffer)?;
        if client_id != self.client_id {
            return Err(DeserializeError::BadSessionId {
                got: client_id,
                expected: self.client_id,
            });
        }

        self.process_message(manual_tl::Message::deserialize(&mut buffer)?)?;

        // Processing is accumulated in `self` to avoid threading the
        // results through every handler; hand it all out at once.
        Ok(mem::take(&mut self.deserialization))
    }

    fn reset(&mut self) {
        let mut client_id = [0u8; 8];
        getrandom(&mut client_id).expect("failed to generate a secure client_id");
        self.client_id = i64::from_le_bytes(client_id);

        self.sequence = 0;
        self.last_msg_id = 0;
        self.pending_ack.clear();
        self.deserialization.clear();
        self.msg_count = 0;
        self.buffer_msg_id = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // salt + client_id
    const MESSAGE_PREFIX_LEN: usize = 16;

    // gzip_packed#3072cfa1 packed_data:bytes = Object;
    const GZIP_PACKED_HEADER: [u8; 4] = [0xa1, 0xcf, 0x72, 0x30];

    // msg_container#73f1f8dc messages:vector<message> = MessageContainer;
    const MSG_CONTAINER_HEADER: [u8; 4] = [0xdc, 0xf8, 0xf1, 0x73];

    const REQUEST: &[u8] = b"Hey!";
    const REQUEST_B: &[u8] = b"Bye!";

    fn auth_key() -> [u8; 256] {
        [0; 256]
    }

    fn buffer() -> DequeBuffer<u8> {
        DequeBuffer::with_capacity(1024 * 1024, 96)
    }

    fn ensure_buffer_is_message(buffer: &[u8], body: &[u8], seq_no: u8) {
        // msg_id, based on the current time, is never zero
        assert_ne!(&buffer[0..8], [0, 0, 0, 0, 0, 0, 0, 0]);
        // seq_no (little endian)
        assert_eq!(&buffer[8..12], [seq_no, 0, 0, 0]);
        // bytes, the length of the body (little endian)
        assert_eq!(&buffer[12..16], [body.len() as u8, 0, 0, 0]);
        // the body itself, padded to 4 bytes
        assert_eq!(&buffer[16..], body);
    }

    #[test]
    fn serialization_has_salt_and_client_id() {
        let mut mtp = Encrypted::build().finish(auth_key());
        let mut buffer = buffer();

        mtp.push(&mut buffer, REQUEST);
        mtp.finalize_plain(&mut buffer);

        // salt comes first; it is zero by default.
        assert_eq!(&buffer[0..8], [0, 0, 0, 0, 0, 0, 0, 0]);

        // client_id should be random.
        assert_ne!(&buffer[8..16], [0, 0, 0, 0, 0, 0, 0, 0]);

        // Only one message follows.
        ensure_buffer_is_message(&buffer[MESSAGE_PREFIX_LEN..], REQUEST, 1);
    }

    #[test]
    fn correct_single_serialization() {
        let mut mtp = Encrypted::build().finish(auth_key());
        let mut buffer = buffer();

        assert!(mtp.push(&mut buffer, REQUEST).is_some());
        assert!(mtp.finalize_plain(&mut buffer).is_some());

        ensure_buffer_is_message(&buffer[MESSAGE_PREFIX_LEN..], REQUEST, 1);
    }

    #[test]
    fn correct_multi_serialization() {
        let mut mtp = Encrypted::build()
            .compression_threshold(None)
            .finish(auth_key());
        let mut buffer = buffer();

        let first = mtp.push(&mut buffer, REQUEST).unwrap();
        let second = mtp.push(&mut buffer, REQUEST_B).unwrap();
        assert!(first.value() < second.value());

        let container = mtp.finalize_plain(&mut buffer).unwrap();
        assert!(second.value() < container.value());

        let buffer = &buffer[MESSAGE_PREFIX_LEN..];

        // container msg_id
        assert_ne!(&buffer[0..8], [0, 0, 0, 0, 0, 0, 0, 0]);
        // seq_no: even, after two content-related messages (1, 3) it is 4
        assert_eq!(&buffer[8..12], [4, 0, 0, 0]);
        // length of the container's body
        assert_eq!(&buffer[12..16], [48, 0, 0, 0]);

        // constructor id and message count
        assert_eq!(&buffer[16..20], MSG_CONTAINER_HEADER);
        assert_eq!(&buffer[20..24], [2, 0, 0, 0]);

        // the inner messages themselves
        ensure_buffer_is_message(&buffer[24..44], REQUEST, 1);
        ensure_buffer_is_message(&buffer[44..], REQUEST_B, 3);
    }

    #[test]
    fn large_payload_is_not_put_in_a_container() {
        let mut mtp = Encrypted::build()
            .compression_threshold(None)
            .finish(auth_key());
        let mut buffer = buffer();
        let data = vec![0x7f; 768 * 1024];

        assert!(mtp.push(&mut buffer, &data).is_some());
        assert!(mtp.push(&mut buffer, &data).is_none());

        // No container; only salt + client_id + one message header.
        mtp.finalize_plain(&mut buffer);
        assert_eq!(buffer.len(), MESSAGE_PREFIX_LEN + 16 + data.len());
    }

    #[test]
    #[should_panic]
    fn oversized_payload_panics() {
        let mut mtp = Encrypted::build().finish(auth_key());
        mtp.push(&mut buffer(), &vec![0; 2 * 1024 * 1024]);
    }

    #[test]
    #[should_panic]
    fn non_padded_payload_panics() {
        let mut mtp = Encrypted::build().finish(auth_key());
        mtp.push(&mut buffer(), &[1, 2, 3]);
    }

    #[test]
    fn disabled_compression_is_honored() {
        let mut mtp = Encrypted::build()
            .compression_threshold(None)
            .finish(auth_key());
        let mut buffer = buffer();

        mtp.push(&mut buffer, &vec![0; 512 * 1024]);
        mtp.finalize_plain(&mut buffer);
        assert!(!buffer[..].windows(4).any(|w| w == GZIP_PACKED_HEADER));
    }

    #[test]
    fn compression_threshold_is_honored() {
        {
            // High threshold not reached, should not compress.
            let mut mtp = Encrypted::build()
                .compression_threshold(Some(768 * 1024))
                .finish(auth_key());
            let mut buffer = buffer();
            mtp.push(&mut buffer, &vec![0; 512 * 1024]);
            mtp.finalize_plain(&mut buffer);
            assert!(!buffer[..].windows(4).any(|w| w == GZIP_PACKED_HEADER));
        }
        {
            // Low threshold is exceeded, should compress.
            let mut mtp = Encrypted::build()
                .compression_threshold(Some(256 * 1024))
                .finish(auth_key());
            let mut buffer = buffer();
            mtp.push(&mut buffer, &vec![0; 512 * 1024]);
            mtp.finalize_plain(&mut buffer);
            assert!(buffer[..].windows(4).any(|w| w == GZIP_PACKED_HEADER));
        }
        {
            // The default compresses half a megabyte of zeros.
            let mut mtp = Encrypted::build().finish(auth_key());
            let mut buffer = buffer();
            mtp.push(&mut buffer, &vec![0; 512 * 1024]);
            mtp.finalize_plain(&mut buffer);
            assert!(buffer[..].windows(4).any(|w| w == GZIP_PACKED_HEADER));
        }
    }

    #[test]
    fn msg_ids_are_strictly_increasing_multiples_of_four() {
        let mut mtp = Encrypted::build().finish(auth_key());
        let mut buffer = buffer();

        let mut last = 0i64;
        for _ in 0..64 {
            let msg_id = mtp.push(&mut buffer, REQUEST).unwrap().value();
            assert_eq!(msg_id % 4, 0);
            assert!(msg_id > last);
            last = msg_id;
        }
    }

    #[test]
    fn seq_no_parity_tracks_content_class() {
        let mut mtp = Encrypted::build().finish(auth_key());

        // Content-related messages get odd sequence numbers.
        assert_eq!(mtp.get_seq_no(true), 1);
        assert_eq!(mtp.get_seq_no(true), 3);
        // Service messages share the count but stay even.
        assert_eq!(mtp.get_seq_no(false), 4);
        assert_eq!(mtp.get_seq_no(false), 4);
        assert_eq!(mtp.get_seq_no(true), 5);
    }

    #[test]
    fn finalize_encrypts_and_round_trips() {
        // Encrypt with the client role and manually decrypt to make sure
        // the envelope carries exactly what was serialized.
        let mut mtp = Encrypted::build().finish(auth_key());
        let mut buffer = buffer();

        let msg_id = mtp.push(&mut buffer, REQUEST).unwrap();
        let mut plain = DequeBuffer::with_capacity(64, 0);
        plain.extend(&buffer[..]);
        let container_id = mtp.finalize(&mut buffer).unwrap();
        assert_eq!(msg_id, container_id);

        // key id for an all-zero key
        assert_eq!(buffer.len() % 16, 8); // 8 (key id) + 16 (msg key) + 16n
        assert!(buffer.len() > plain.len());
    }

    #[test]
    fn bad_server_salt_updates_salt_and_reports() {
        let mut mtp = Encrypted::build().finish(auth_key());

        let body = tl::enums::BadMsgNotification::BadServerSalt(tl::types::BadServerSalt {
            bad_msg_id: 1234,
            bad_msg_seqno: 1,
            error_code: 48,
            new_server_salt: 5678,
        })
        .to_bytes();

        mtp.process_message(manual_tl::Message {
            msg_id: 4,
            seq_no: 0,
            body,
        })
        .unwrap();

        assert_eq!(mtp.salt, 5678);
        let results = mem::take(&mut mtp.deserialization);
        assert_eq!(results.len(), 1);
        match &results[0] {
            Deserialization::BadMessage(bad) => {
                assert_eq!(bad.msg_id, MsgId(1234));
                assert_eq!(bad.code, 48);
                assert!(bad.retryable());
            }
            _ => panic!("expected a bad message notification"),
        }
    }

    #[test]
    fn new_session_created_updates_salt_and_clears() {
        let mut mtp = Encrypted::build().finish(auth_key());

        let body = tl::enums::NewSession::Created(tl::types::NewSessionCreated {
            first_msg_id: 5000,
            unique_id: 777,
            server_salt: 999,
        })
        .to_bytes();

        mtp.process_message(manual_tl::Message {
            msg_id: 4,
            seq_no: 1,
            body,
        })
        .unwrap();

        assert_eq!(mtp.salt, 999);
        let results = mem::take(&mut mtp.deserialization);
        assert!(matches!(
            results[..],
            [Deserialization::RpcCleared {
                first_msg_id: MsgId(5000)
            }]
        ));
    }

    #[test]
    fn pong_resolves_ping_request() {
        let mut mtp = Encrypted::build().finish(auth_key());

        let body = tl::enums::Pong::Pong(tl::types::Pong {
            msg_id: 8000,
            ping_id: 123456,
        })
        .to_bytes();

        mtp.process_message(manual_tl::Message {
            msg_id: 4,
            seq_no: 0,
            body,
        })
        .unwrap();

        let results = mem::take(&mut mtp.deserialization);
        match &results[..] {
            [Deserialization::RpcResult(result)] => {
                assert_eq!(result.msg_id, MsgId(8000));
                let pong = tl::enums::Pong::from_bytes(&result.body).unwrap();
                let tl::enums::Pong::Pong(pong) = pong;
                assert_eq!(pong.ping_id, 123456);
            }
            _ => panic!("expected exactly one rpc result"),
        }
    }

    #[test]
    fn inbound_content_messages_are_queued_for_ack() {
        let mut mtp = Encrypted::build().finish(auth_key());

        let body = tl::enums::Updates::TooLong.to_bytes();
        mtp.process_message(manual_tl::Message {
            msg_id: 404,
            seq_no: 1,
            body,
        })
        .unwrap();

        assert_eq!(mtp.pending_ack, vec![404]);

        // The next serialized batch carries the acknowledgment.
        let mut buffer = buffer();
        mtp.push(&mut buffer, REQUEST).unwrap();
        mtp.finalize_plain(&mut buffer).unwrap();
        let ack_header = tl::types::MsgsAck::CONSTRUCTOR_ID.to_le_bytes();
        assert!(buffer[..].windows(4).any(|w| w == ack_header));
    }
}
