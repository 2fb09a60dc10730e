// Copyright 2024 - developers of the `ferrogram` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use crate::sha1;
use std::fmt;

/// A Telegram [authorization key]: the 256-byte shared secret produced by
/// the Diffie-Hellman exchange, along with the identifiers derived from
/// its SHA-1.
///
/// [authorization key]: https://core.telegram.org/mtproto/auth_key
#[derive(Clone)]
pub struct AuthKey {
    pub(crate) data: [u8; 256],
    pub(crate) aux_hash: [u8; 8],
    pub(crate) key_id: [u8; 8],
}

impl PartialEq for AuthKey {
    fn eq(&self, other: &Self) -> bool {
        self.key_id == other.key_id
    }
}

impl AuthKey {
    /// Creates an authorization key from its raw binary data.
    pub fn from_bytes(data: [u8; 256]) -> Self {
        let sha = sha1!(&data);

        // aux_hash is the first 8 bytes of the SHA-1, key_id the last 8.
        let mut aux_hash = [0; 8];
        aux_hash.copy_from_slice(&sha[..8]);
        let mut key_id = [0; 8];
        key_id.copy_from_slice(&sha[12..]);

        Self {
            data,
            aux_hash,
            key_id,
        }
    }

    /// The raw binary data, suitable for persisting the key.
    pub fn to_bytes(&self) -> [u8; 256] {
        self.data
    }

    /// The low 64 bits of the key's SHA-1, as carried in the header of
    /// every encrypted message.
    pub fn key_id(&self) -> [u8; 8] {
        self.key_id
    }

    /// The high 64 bits of the key's SHA-1, used as `retry_id` when the
    /// key exchange has to repeat its last round.
    pub fn aux_hash(&self) -> [u8; 8] {
        self.aux_hash
    }

    /// Calculates the new nonce hash that the server is expected to echo
    /// back at the end of the key exchange. `number` identifies whether
    /// the answer was ok (1), retry (2) or fail (3).
    pub fn calc_new_nonce_hash(&self, new_nonce: &[u8; 32], number: u8) -> [u8; 16] {
        let mut data = Vec::with_capacity(new_nonce.len() + 1 + self.aux_hash.len());
        data.extend(new_nonce);
        data.push(number);
        data.extend(&self.aux_hash);

        let mut result = [0; 16];
        result.copy_from_slice(&sha1!(data)[4..]);
        result
    }
}

impl fmt::Debug for AuthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthKey")
            .field("key_id", &u64::from_le_bytes(self.key_id))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequential_key() -> AuthKey {
        let mut buffer = [0u8; 256];
        buffer.iter_mut().enumerate().for_each(|(i, x)| *x = i as u8);
        AuthKey::from_bytes(buffer)
    }

    #[test]
    fn derived_identifiers() {
        let key = sequential_key();
        assert_eq!(key.aux_hash, [73, 22, 214, 189, 183, 247, 142, 104]);
        assert_eq!(key.key_id, [50, 209, 88, 110, 164, 87, 223, 200]);
    }

    #[test]
    fn new_nonce_hash_per_answer() {
        let key = sequential_key();
        let mut nonce = [0u8; 32];
        nonce.iter_mut().enumerate().for_each(|(i, x)| *x = i as u8);

        assert_eq!(
            key.calc_new_nonce_hash(&nonce, 1),
            [194, 206, 210, 179, 62, 89, 58, 85, 210, 127, 74, 93, 171, 238, 124, 103]
        );
        assert_eq!(
            key.calc_new_nonce_hash(&nonce, 2),
            [244, 49, 142, 133, 189, 47, 243, 190, 132, 217, 254, 252, 227, 220, 227, 159]
        );
        assert_eq!(
            key.calc_new_nonce_hash(&nonce, 3),
            [75, 249, 215, 179, 125, 180, 19, 238, 67, 29, 40, 81, 118, 49, 203, 61]
        );
    }

    #[test]
    fn equality_is_by_key_id() {
        assert_eq!(sequential_key(), sequential_key());
        assert_ne!(sequential_key(), AuthKey::from_bytes([0; 256]));
    }
}
