// Copyright 2024 - developers of the `ferrogram` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Implementation of the several [MTProto transports]. This layer is
//! responsible for taking serialized messages from the MTP and packing
//! them in a format that can be sent over a protocol such as TCP.
//!
//! [MTProto transports]: https://core.telegram.org/mtproto#mtproto-transport
mod full;
mod intermediate;

pub use full::Full;
pub use intermediate::Intermediate;

use ferrogram_crypto::DequeBuffer;
use std::fmt;

/// No transport packet may exceed this size.
///
/// Anything larger cannot be a legitimate frame, so the connection is
/// treated as corrupt rather than buffering unbounded data.
pub const MAXIMUM_PACKET_LEN: usize = 1 << 24;

/// The largest header any transport prepends to a packet (the full
/// transport's length and sequence, or the intermediate's tag and
/// length). Useful to reserve buffer space in advance.
pub const MAX_HEADER_LEN: usize = 8;

/// The error type reported by the different transports when something is
/// wrong. Unless the variant is [`Error::MissingBytes`], the connection
/// should not continue.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// Not enough bytes are provided.
    MissingBytes,

    /// The length is either too short or too long to represent a valid
    /// packet.
    BadLen { got: i32 },

    /// The sequence number received does not match the expected value.
    BadSeq { expected: i32, got: i32 },

    /// The checksum of the packet does not match its expected value.
    BadCrc { expected: u32, got: u32 },

    /// The server sent a negative HTTP-like status in place of a packet,
    /// for example `404` when the authorization key is unknown.
    BadStatus { status: u32 },
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transport error: ")?;
        match self {
            Error::MissingBytes => write!(f, "need more bytes"),
            Error::BadLen { got } => write!(f, "bad len (got {})", got),
            Error::BadSeq { expected, got } => {
                write!(f, "bad seq (expected {}, got {})", expected, got)
            }
            Error::BadCrc { expected, got } => {
                write!(f, "bad crc (expected {}, got {})", expected, got)
            }
            Error::BadStatus { status } => write!(f, "bad status (negative {})", status),
        }
    }
}

/// Where the payload of a successfully unpacked frame lives within the
/// input buffer, and where the next frame begins.
#[derive(Clone, Debug, PartialEq)]
pub struct UnpackedOffset {
    pub data_start: usize,
    pub data_end: usize,
    pub next_offset: usize,
}

/// The trait shared by all transports.
pub trait Transport {
    /// Packs the payload in `buffer` in-place.
    ///
    /// Panics if the buffer length is not divisible by 4.
    fn pack(&mut self, buffer: &mut DequeBuffer<u8>);

    /// Unpacks the frame at the head of `buffer`, if one is complete.
    fn unpack(&mut self, buffer: &[u8]) -> Result<UnpackedOffset, Error>;

    /// Reset the state, as if a fresh instance was just created.
    fn reset(&mut self);
}
