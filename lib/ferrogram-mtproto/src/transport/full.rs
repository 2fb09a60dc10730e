// Copyright 2024 - developers of the `ferrogram` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use super::{Error, Transport, UnpackedOffset, MAXIMUM_PACKET_LEN};
use crc32fast::Hasher;
use ferrogram_crypto::DequeBuffer;

/// The basic MTProto transport protocol. This is an implementation of the
/// [full transport].
///
/// * Overhead: medium.
/// * Minimum envelope length: 12 bytes.
/// * Maximum envelope length: 12 bytes.
///
/// It serializes the input payload as follows:
///
/// ```text
/// +----+----+----...----+----+
/// | len| seq|  payload  | crc|
/// +----+----+----...----+----+
///  ^^^^ 4 bytes
/// ```
///
/// The sequence and checksum here are maintained by the transport itself
/// and have nothing to do with the MTP sequence numbers.
///
/// [full transport]: https://core.telegram.org/mtproto/mtproto-transports#full
pub struct Full {
    send_seq: i32,
    recv_seq: i32,
}

#[allow(clippy::new_without_default)]
impl Full {
    pub fn new() -> Self {
        Self {
            send_seq: 0,
            recv_seq: 0,
        }
    }
}

impl Transport for Full {
    fn pack(&mut self, buffer: &mut DequeBuffer<u8>) {
        assert_eq!(buffer.len() % 4, 0);

        // payload len + length itself (4 bytes) + send counter (4 bytes) + crc32 (4 bytes)
        let len = (buffer.len() as i32) + 4 + 4 + 4;

        let mut header = [0; 8];
        header[..4].copy_from_slice(&len.to_le_bytes());
        header[4..].copy_from_slice(&self.send_seq.to_le_bytes());
        buffer.extend_front(&header);

        let crc = {
            let mut hasher = Hasher::new();
            hasher.update(&buffer[..]);
            hasher.finalize()
        };
        buffer.extend(crc.to_le_bytes());

        self.send_seq += 1;
    }

    fn unpack(&mut self, buffer: &[u8]) -> Result<UnpackedOffset, Error> {
        if buffer.len() < 4 {
            return Err(Error::MissingBytes);
        }

        let len = i32::from_le_bytes(buffer[0..4].try_into().unwrap());
        if len < 12 || len as usize > MAXIMUM_PACKET_LEN {
            return Err(Error::BadLen { got: len });
        }

        let len = len as usize;
        if buffer.len() < len {
            return Err(Error::MissingBytes);
        }

        let seq = i32::from_le_bytes(buffer[4..8].try_into().unwrap());
        if seq != self.recv_seq {
            return Err(Error::BadSeq {
                expected: self.recv_seq,
                got: seq,
            });
        }

        let crc = u32::from_le_bytes(buffer[len - 4..len].try_into().unwrap());
        let valid_crc = {
            let mut hasher = Hasher::new();
            hasher.update(&buffer[..len - 4]);
            hasher.finalize()
        };
        if crc != valid_crc {
            return Err(Error::BadCrc {
                expected: valid_crc,
                got: crc,
            });
        }

        self.recv_seq += 1;
        Ok(UnpackedOffset {
            data_start: 8,
            data_end: len - 4,
            next_offset: len,
        })
    }

    fn reset(&mut self) {
        self.send_seq = 0;
        self.recv_seq = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns a full transport and `n` bytes of input data for it.
    fn setup_pack(n: usize) -> (Full, DequeBuffer<u8>) {
        let mut buffer = DequeBuffer::with_capacity(n, 8);
        buffer.extend((0..n).map(|x| (x & 0xff) as u8));
        (Full::new(), buffer)
    }

    #[test]
    fn pack_empty() {
        let (mut transport, mut buffer) = setup_pack(0);
        transport.pack(&mut buffer);
        assert_eq!(&buffer[..], &[12, 0, 0, 0, 0, 0, 0, 0, 38, 202, 141, 50]);
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

        assert_eq!(&buffer[..4], &[140, 0, 0, 0]);
        assert_eq!(&buffer[4..8], &[0, 0, 0, 0]);
        assert_eq!(&buffer[8..8 + orig.len()], &orig[..]);
        assert_eq!(&buffer[8 + orig.len()..], &[134, 115, 149, 55]);
    }

    #[test]
    fn pack_twice_increments_seq() {
        let (mut transport, mut buffer) = setup_pack(128);
        let orig: Vec<u8> = buffer[..].to_vec();
        transport.pack(&mut buffer);

        buffer.clear();
        buffer.extend(&orig);
        transport.pack(&mut buffer);

        assert_eq!(&buffer[..4], &[140, 0, 0, 0]);
        assert_eq!(&buffer[4..8], &[1, 0, 0, 0]);
        assert_eq!(&buffer[8..8 + orig.len()], &orig[..]);
        assert_eq!(&buffer[8 + orig.len()..], &[150, 9, 240, 74]);
    }

    #[test]
    fn unpack_small() {
        let mut transport = Full::new();
        assert_eq!(transport.unpack(&[0, 1, 3]), Err(Error::MissingBytes));
    }

    #[test]
    fn unpack_normal() {
        let (mut transport, mut buffer) = setup_pack(128);
        let orig: Vec<u8> = buffer[..].to_vec();
        transport.pack(&mut buffer);
        let offset = transport.unpack(&buffer[..]).unwrap();
        assert_eq!(&buffer[offset.data_start..offset.data_end], &orig[..]);
    }

    #[test]
    fn unpack_two_at_once() {
        let (mut transport, mut buffer) = setup_pack(128);
        let orig: Vec<u8> = buffer[..].to_vec();
        transport.pack(&mut buffer);

        let mut joined: Vec<u8> = buffer[..].to_vec();
        let single_size = joined.len();

        buffer.clear();
        buffer.extend(&orig);
        transport.pack(&mut buffer);
        joined.extend_from_slice(&buffer[..]);

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
    fn unpack_bad_seq() {
        let (mut transport, mut buffer) = setup_pack(128);
        transport.pack(&mut buffer);
        buffer[4] = 1;

        assert_eq!(
            transport.unpack(&buffer[..]),
            Err(Error::BadSeq {
                expected: 0,
                got: 1,
            })
        );
    }

    #[test]
    fn unpack_bad_crc() {
        let (mut transport, mut buffer) = setup_pack(128);
        transport.pack(&mut buffer);
        let len = buffer.len();
        buffer[len - 1] ^= 0xff;

        assert_eq!(
            transport.unpack(&buffer[..]),
            Err(Error::BadCrc {
                expected: 932541318,
                got: 3365237638,
            })
        );
    }

    #[test]
    fn reset_restarts_both_counters() {
        let (mut transport, mut buffer) = setup_pack(16);
        let orig: Vec<u8> = buffer[..].to_vec();
        transport.pack(&mut buffer);
        transport.unpack(&buffer[..]).unwrap();

        transport.reset();

        buffer.clear();
        buffer.extend(&orig);
        transport.pack(&mut buffer);
        assert_eq!(&buffer[4..8], &[0, 0, 0, 0]);
        assert!(transport.unpack(&buffer[..]).is_ok());
    }
}
