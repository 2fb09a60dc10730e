// Copyright 2024 - developers of the `ferrogram` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use crate::{Error, Session, User};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ferrogram_tl::{Cursor, Deserializable, Serializable};

/// Version byte prepended to the encoded payload, bumped whenever the
/// field set changes.
const STRING_VERSION: u8 = 1;

/// A compact, copy-pasteable representation of the minimum a client
/// needs to log in without going through the full authorization flow
/// again: `{dc_id, api_id, test_mode, auth_key, user_id, is_bot}`.
#[derive(Clone, Debug, PartialEq)]
pub struct StringSession {
    pub dc_id: i32,
    pub api_id: i32,
    pub test_mode: bool,
    pub auth_key: [u8; 256],
    pub user_id: i64,
    pub is_bot: bool,
}

impl StringSession {
    /// Encode into the portable base64 form.
    pub fn encode(&self) -> String {
        let mut buffer = Vec::with_capacity(1 + 4 + 4 + 4 + 256 + 8 + 4);
        buffer.push(STRING_VERSION);
        self.dc_id.serialize(&mut buffer);
        self.api_id.serialize(&mut buffer);
        self.test_mode.serialize(&mut buffer);
        buffer.extend(self.auth_key);
        self.user_id.serialize(&mut buffer);
        self.is_bot.serialize(&mut buffer);

        URL_SAFE_NO_PAD.encode(buffer)
    }

    /// Decode from the portable base64 form.
    pub fn decode(encoded: &str) -> Result<Self, Error> {
        let buffer = URL_SAFE_NO_PAD
            .decode(encoded.trim())
            .map_err(|e| Error::Malformed(format!("invalid base64: {e}")))?;

        match buffer.first() {
            Some(&STRING_VERSION) => {}
            Some(&version) => {
                return Err(Error::Malformed(format!(
                    "unknown session string version {version}"
                )))
            }
            None => return Err(Error::Malformed("empty session string".into())),
        }

        let mut cursor = Cursor::from_slice(&buffer[1..]);
        let read = || Error::Malformed("session string is truncated".into());

        let dc_id = i32::deserialize(&mut cursor).map_err(|_| read())?;
        let api_id = i32::deserialize(&mut cursor).map_err(|_| read())?;
        let test_mode = bool::deserialize(&mut cursor).map_err(|_| read())?;
        let mut auth_key = [0u8; 256];
        cursor.read_exact(&mut auth_key).map_err(|_| read())?;
        let user_id = i64::deserialize(&mut cursor).map_err(|_| read())?;
        let is_bot = bool::deserialize(&mut cursor).map_err(|_| read())?;

        Ok(Self {
            dc_id,
            api_id,
            test_mode,
            auth_key,
            user_id,
            is_bot,
        })
    }

    /// Capture the string-session fields from an existing store.
    ///
    /// Fails when the store has no authorization key for its home
    /// datacenter yet, since the resulting string could never log in.
    pub fn export(session: &dyn Session) -> Result<Self, Error> {
        let dc_id = session.home_dc_id();
        let auth_key = session
            .auth_key_for_dc(dc_id)
            .ok_or_else(|| Error::Malformed("no auth key for the home datacenter".into()))?;
        let user = session.user().unwrap_or(User { id: 0, bot: false });

        Ok(Self {
            dc_id,
            api_id: session.api_id().unwrap_or(0),
            test_mode: session.test_mode(),
            auth_key,
            user_id: user.id,
            is_bot: user.bot,
        })
    }

    /// Populate a store with the fields of this session string, as an
    /// alternate bootstrap path equivalent to having logged in before.
    pub fn import(&self, session: &dyn Session) -> Result<(), Error> {
        session.set_home_dc_id(self.dc_id)?;
        session.set_api_id(self.api_id)?;
        session.set_test_mode(self.test_mode)?;
        session.set_auth_key_for_dc(self.dc_id, &self.auth_key)?;
        session.set_user(User {
            id: self.user_id,
            bot: self.is_bot,
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storages::MemorySession;

    fn sample() -> StringSession {
        StringSession {
            dc_id: 4,
            api_id: 123456,
            test_mode: false,
            auth_key: {
                let mut key = [0u8; 256];
                key.iter_mut().enumerate().for_each(|(i, x)| *x = i as u8);
                key
            },
            user_id: 987654321,
            is_bot: true,
        }
    }

    #[test]
    fn encode_decode_round_trip() {
        let session = sample();
        let encoded = session.encode();
        assert!(!encoded.contains('='));
        assert_eq!(StringSession::decode(&encoded).unwrap(), session);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(StringSession::decode("not base64 at all!").is_err());
        assert!(StringSession::decode("").is_err());
        // Valid base64, wrong version byte.
        assert!(StringSession::decode(&URL_SAFE_NO_PAD.encode([9u8; 300])).is_err());
        // Valid version, truncated payload.
        assert!(StringSession::decode(&URL_SAFE_NO_PAD.encode([1u8; 10])).is_err());
    }

    #[test]
    fn import_then_export_is_identity() {
        let string = sample();
        let store = MemorySession::new();
        string.import(&store).unwrap();

        assert_eq!(store.home_dc_id(), 4);
        assert_eq!(store.auth_key_for_dc(4), Some(string.auth_key));
        assert_eq!(StringSession::export(&store).unwrap(), string);
    }

    #[test]
    fn export_requires_an_auth_key() {
        let store = MemorySession::new();
        assert!(StringSession::export(&store).is_err());
    }
}
