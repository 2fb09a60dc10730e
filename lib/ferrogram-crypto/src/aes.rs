// Copyright 2024 - developers of the `ferrogram` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};

fn xor_assign(block: &mut [u8], mask: &[u8; 16]) {
    block.iter_mut().zip(mask).for_each(|(b, m)| *b ^= m);
}

/// Encrypt the input buffer in-place using AES-256 in IGE mode.
///
/// The 32-byte IV holds the ciphertext chain in its first half and the
/// plaintext chain in its second half.
///
/// Panics if the buffer is not divisible into 16-byte blocks.
pub fn ige_encrypt(buffer: &mut [u8], key: &[u8; 32], iv: &[u8; 32]) {
    assert_eq!(buffer.len() % 16, 0);

    let cipher = aes::Aes256::new(GenericArray::from_slice(key));

    let mut cipher_chain = [0; 16];
    let mut plain_chain = [0; 16];
    cipher_chain.copy_from_slice(&iv[..16]);
    plain_chain.copy_from_slice(&iv[16..]);

    for block in buffer.chunks_exact_mut(16) {
        // y[i] = E(x[i] ^ y[i-1]) ^ x[i-1]
        let plain: [u8; 16] = block.try_into().unwrap();

        xor_assign(block, &cipher_chain);
        cipher.encrypt_block(GenericArray::from_mut_slice(block));
        xor_assign(block, &plain_chain);

        cipher_chain.copy_from_slice(block);
        plain_chain = plain;
    }
}

/// Decrypt the input ciphertext using AES-256 in IGE mode.
///
/// Panics if the ciphertext is not divisible into 16-byte blocks.
pub fn ige_decrypt(ciphertext: &[u8], key: &[u8; 32], iv: &[u8; 32]) -> Vec<u8> {
    assert_eq!(ciphertext.len() % 16, 0);

    let cipher = aes::Aes256::new(GenericArray::from_slice(key));

    let mut cipher_chain = [0; 16];
    let mut plain_chain = [0; 16];
    cipher_chain.copy_from_slice(&iv[..16]);
    plain_chain.copy_from_slice(&iv[16..]);

    let mut plaintext = vec![0; ciphertext.len()];
    for (encrypted, block) in ciphertext.chunks_exact(16).zip(plaintext.chunks_exact_mut(16)) {
        // x[i] = D(y[i] ^ x[i-1]) ^ y[i-1]
        block.copy_from_slice(encrypted);

        xor_assign(block, &plain_chain);
        cipher.decrypt_block(GenericArray::from_mut_slice(block));
        xor_assign(block, &cipher_chain);

        cipher_chain.copy_from_slice(encrypted);
        plain_chain.copy_from_slice(block);
    }

    plaintext
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequential_bytes() -> [u8; 32] {
        let mut buffer = [0u8; 32];
        buffer.iter_mut().enumerate().for_each(|(i, x)| *x = i as u8);
        buffer
    }

    #[test]
    fn ige_known_answer_encrypt() {
        let mut buffer = sequential_bytes();
        let key = sequential_bytes();
        let iv = sequential_bytes();
        ige_encrypt(&mut buffer, &key, &iv);
        assert_eq!(
            buffer.to_vec(),
            vec![
                226, 129, 18, 165, 62, 92, 137, 199, 177, 234, 128, 113, 193, 51, 105, 159, 212,
                232, 107, 38, 196, 186, 201, 252, 90, 241, 171, 140, 226, 122, 68, 164,
            ]
        );
    }

    #[test]
    fn ige_known_answer_decrypt() {
        let buffer = sequential_bytes();
        let key = sequential_bytes();
        let iv = sequential_bytes();
        assert_eq!(
            ige_decrypt(&buffer, &key, &iv),
            vec![
                229, 119, 122, 250, 205, 123, 44, 22, 247, 172, 64, 202, 230, 30, 246, 3, 254, 230,
                9, 143, 184, 168, 134, 10, 185, 238, 103, 44, 215, 229, 186, 204,
            ]
        );
    }

    #[test]
    fn ige_round_trip() {
        let key = sequential_bytes();
        let iv = sequential_bytes();
        let original: Vec<u8> = (0..64).map(|x| (x * 3) as u8).collect();

        let mut buffer = original.clone();
        ige_encrypt(&mut buffer, &key, &iv);
        assert_ne!(buffer, original);
        assert_eq!(ige_decrypt(&buffer, &key, &iv), original);
    }

    #[test]
    #[should_panic]
    fn ige_rejects_partial_blocks() {
        let mut buffer = [0; 10];
        ige_encrypt(&mut buffer, &sequential_bytes(), &sequential_bytes());
    }
}
