// Copyright 2024 - developers of the `ferrogram` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use super::{Error, Transport, UnpackedOffset, MAXIMUM_PACKET_LEN};
use ferrogram_crypto::DequeBuffer;

/// A light MTProto transport protocol which guarantees data padded to
/// 4 bytes. This is an implementation of the [intermediate transport].
///
/// * Overhead: small.
/// * Minimum envelope length: 4 bytes.
/// * Maximum envelope length: 4 bytes.
///
/// It serializes the input payload as follows:
///
/// ```text
/// +----+----...----+
/// | len|  payload  |
/// +----+----...----+
///  ^^^^ 4 bytes
/// ```
///
/// [intermediate transport]: https://core.telegram.org/mtproto/mtproto-transports#intermediate
pub struct Intermediate {
    init: bool,
}

#[allow(clippy::new_without_default)]
impl Intermediate {
    /// The first bytes sent on a fresh connection, signalling this mode.
    const TAG: [u8; 4] = 0xee_ee_ee_ee_u32.to_le_bytes();

    pub fn new() -> Self {
        Self { init: false }
    }
}

impl Transport for Intermediate {
    fn pack(&mut self, buffer: &mut DequeBuffer<u8>) {
        let len = buffer.len();
        assert_eq!(len % 4, 0);

        buffer.extend_front(&(len as i32).to_le_bytes());

        if !self.init {
            buffer.extend_front(&Self::TAG);
            self.init = true;
        }
    }

    fn unpack(&mut self, buffer: &[u8]) -> Result<UnpackedOffset, Error> {
        if buffer.len() < 4 {
            return Err(Error::MissingBytes);
        }

        let len = i32::from_le_bytes(buffer[0..4].try_into().unwrap());
        if len <= 4 || len as usize > MAXIMUM_PACKET_LEN {
            if len == 4 && buffer.len() >= 8 {
                let status = i32::from_le_bytes(buffer[4..8].try_into().unwrap());
                return Err(Error::BadStatus {
                    status: (-status) as u32,
                });
            }
            return Err(Error::BadLen { got: len });
        }

        let len = len as usize;
        if buffer.len() < 4 + len {
            return Err(Error::MissingBytes);
        }

        Ok(UnpackedOffset {
            data_start: 4,
            data_end: 4 + len,
            next_offset: 4 + len,
        })
    }

    fn reset(&mut self) {
        log::info!("resetting sending of header in intermediate transport");
        self.init = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns an intermediate transport and `n` bytes of input data.
    fn setup_pack(n: usize) -> (Intermediate, DequeBuffer<u8>) {
        let mut buffer = DequeBuffer::with_capacity(n, 8);
        buffer.extend((0..n).map(|x| (x & 0xff) as u8));
        (Intermediate::new(), buffer)
    }

    #[test]
    fn pack_empty() {
        let (mut transport, mut buffer) = setup_pack(0);
        transport.pack(&mut buffer);
        assert_eq!(&buffer[..], &[0xee, 0xee, 0xee, 0xee, 0, 0, 0, 0]);
    }

    #[test]
    #[should_panic]
    fn pack_non_padded() {
        let (mut transport, mut buffer) = setup_pack(7);
        transport.pack(&mut buffer);
    }

    #[test]
    fn pack_normal() {
        let (mut transport, mut buffer) = setup_pack(128);
        let orig: Vec<u8> = buffer[..].to_vec();
        transport.pack(&mut buffer);
        assert_eq!(&buffer[..8], &[0xee, 0xee, 0xee, 0xee, 128, 0, 0, 0]);
        assert_eq!(&buffer[8..], &orig[..]);
    }

    #[test]
    fn pack_only_tags_once() {
        let (mut transport, mut buffer) = setup_pack(4);
        transport.pack(&mut buffer);
        buffer.clear();
        buffer.extend([1, 2, 3, 4]);
        transport.pack(&mut buffer);
        assert_eq!(&buffer[..], &[4, 0, 0, 0, 1, 2, 3, 4]);
    }

    #[test]
    fn unpack_small() {
        let transport = &mut Intermediate::new();
        assert_eq!(transport.unpack(&[1]), Err(Error::MissingBytes));
    }

    #[test]
    fn unpack_normal() {
        let (mut transport, mut buffer) = setup_pack(128);
        let orig: Vec<u8> = buffer[..].to_vec();
        transport.pack(&mut buffer);
        // Skip the init tag when unpacking.
        let offset = transport.unpack(&buffer[4..]).unwrap();
        assert_eq!(&buffer[4..][offset.data_start..offset.data_end], &orig[..]);
    }

    #[test]
    fn unpack_two_at_once() {
        let (mut transport, mut buffer) = setup_pack(128);
        let orig: Vec<u8> = buffer[..].to_vec();
        transport.pack(&mut buffer);

        let mut joined: Vec<u8> = buffer[4..].to_vec();
        let single_size = joined.len();
        joined.extend_from_slice(&buffer[4..]);

        let offset = transport.unpack(&joined).unwrap();
        assert_eq!(&joined[offset.data_start..offset.data_end], &orig[..]);
        assert_eq!(offset.next_offset, single_size);

        let offset = transport.unpack(&joined[single_size..]).unwrap();
        assert_eq!(
            &joined[single_size..][offset.data_start..offset.data_end],
            &orig[..]
        );
    }

    #[test]
    fn unpack_bad_status() {
        let mut transport = Intermediate::new();
        let mut data = Vec::new();
        data.extend(4i32.to_le_bytes());
        data.extend((-404i32).to_le_bytes());
        assert_eq!(
            transport.unpack(&data),
            Err(Error::BadStatus { status: 404 })
        );
    }

    #[test]
    fn unpack_oversized_frame() {
        let mut transport = Intermediate::new();
        let data = ((MAXIMUM_PACKET_LEN + 1) as i32).to_le_bytes();
        assert_eq!(
            transport.unpack(&data),
            Err(Error::BadLen {
                got: (MAXIMUM_PACKET_LEN + 1) as i32
            })
        );
    }
}
