// Copyright 2024 - developers of the `ferrogram` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{KeyIvInit, StreamCipher};

/// AES-256-CTR cipher used to [decrypt files] served by CDN datacenters.
///
/// The server hands out a fixed key and IV per file; the low 4 bytes of
/// the IV are replaced with the big-endian block offset (`offset / 16`)
/// of each chunk, so chunks can be decrypted out of order.
///
/// [decrypt files]: https://core.telegram.org/cdn#decrypting-files
#[derive(Clone)]
pub struct CdnCipher {
    key: [u8; 32],
    iv: [u8; 16],
}

impl CdnCipher {
    pub fn new(key: [u8; 32], iv: [u8; 16]) -> Self {
        Self { key, iv }
    }

    /// Decrypt a chunk that starts `offset` bytes into the file, in place.
    ///
    /// Panics unless the offset is aligned to the 16-byte block size.
    pub fn decrypt_chunk(&self, offset: u64, data: &mut [u8]) {
        assert_eq!(offset % 16, 0);

        let mut iv = self.iv;
        iv[12..].copy_from_slice(&((offset / 16) as u32).to_be_bytes());

        let mut cipher = ctr::Ctr128BE::<aes::Aes256>::new(
            GenericArray::from_slice(&self.key),
            GenericArray::from_slice(&iv),
        );
        cipher.apply_keystream(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> CdnCipher {
        let mut key = [0u8; 32];
        key.iter_mut().enumerate().for_each(|(i, x)| *x = i as u8);
        CdnCipher::new(key, [0xab; 16])
    }

    #[test]
    fn chunks_decrypt_independently() {
        let cipher = cipher();
        let mut whole = vec![0x55u8; 64];
        cipher.decrypt_chunk(0, &mut whole);

        // Decrypting the second half alone must match the second half of
        // the whole, since only offset / 16 participates in the IV.
        let mut tail = vec![0x55u8; 32];
        cipher.decrypt_chunk(32, &mut tail);
        assert_eq!(tail, whole[32..]);
    }

    #[test]
    fn ctr_is_an_involution() {
        let cipher = cipher();
        let original = b"16 bytes of data16 bytes of data".to_vec();
        let mut data = original.clone();
        cipher.decrypt_chunk(16, &mut data);
        assert_ne!(data, original);
        cipher.decrypt_chunk(16, &mut data);
        assert_eq!(data, original);
    }

    #[test]
    #[should_panic]
    fn unaligned_offsets_panic() {
        cipher().decrypt_chunk(3, &mut [0; 16]);
    }
}
