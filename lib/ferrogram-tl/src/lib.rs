// Copyright 2024 - developers of the `ferrogram` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Rust definitions for the portion of Telegram's [Type Language] schema
//! that the client core needs, in the form of `struct` and `enum`, along
//! with the binary (de)serialization they must follow.
//!
//! The layout mirrors what a schema code generator would emit: bare
//! constructors live in [`types`], boxed types in [`enums`], and requests
//! in [`functions`]. The rest of the workspace only relies on the traits
//! defined here, so swapping this crate for a fully generated layer is a
//! drop-in change.
//!
//! [Type Language]: https://core.telegram.org/mtproto/TL
pub mod deserialize;
pub mod enums;
pub mod functions;
mod serialize;
pub mod types;

pub use deserialize::{Cursor, Deserializable};
pub use serialize::Serializable;

/// The schema layer against which [`functions`] are defined.
pub const LAYER: i32 = 158;

/// This struct represents the concrete type of a vector, that is,
/// `vector` as opposed to the type `Vector`. This bare type is less
/// common, so instead of creating a enum for `Vector` wrapping `vector`
/// as Rust's `Vec`, a new-type for `vector` is used instead.
#[derive(Clone, Debug, PartialEq)]
pub struct RawVec<T>(pub Vec<T>);

/// This struct represents an unparsed blob, which should not be treated
/// as a length-prefixed byte string. Used by functions returning generic
/// objects which pass the underlying result without interpretation.
#[derive(Clone, Debug, PartialEq)]
pub struct Blob(pub Vec<u8>);

impl From<Vec<u8>> for Blob {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

/// Anything implementing this trait is identifiable by both ends
/// (client-server) when performing Remote Procedure Calls (RPC) and
/// transmission of objects.
pub trait Identifiable {
    /// The unique identifier for the type.
    const CONSTRUCTOR_ID: u32;
}

/// Structures implementing this trait indicate that they are suitable
/// for use to perform Remote Procedure Calls (RPC), and know what the
/// type of the response will be.
pub trait RemoteCall: Serializable {
    /// The type of the "return" value coming from the other end of the
    /// connection.
    type Return: Deserializable;
}

/// Return the name of a known constructor for its identifier, or
/// `"(unknown)"` when the identifier does not belong to this subset of
/// the schema. Only used to make log lines readable.
pub fn name_for_id(id: u32) -> &'static str {
    match id {
        0x05162463 => "resPQ",
        0x83c95aec => "p_q_inner_data",
        0xd0e8075c => "server_DH_params_ok",
        0x79cb045d => "server_DH_params_fail",
        0xb5890dba => "server_DH_inner_data",
        0x6643b654 => "client_DH_inner_data",
        0x3bcbf734 => "dh_gen_ok",
        0x46dc1fb9 => "dh_gen_retry",
        0xa69dae02 => "dh_gen_fail",
        0xbe7e8ef1 => "req_pq_multi",
        0xd712e4be => "req_DH_params",
        0xf5045f1f => "set_client_DH_params",
        0x2144ca19 => "rpc_error",
        0x347773c5 => "pong",
        0xa7eff811 => "bad_msg_notification",
        0xedab447b => "bad_server_salt",
        0x62d6b459 => "msgs_ack",
        0x9ec20908 => "new_session_created",
        0x0949d9dc => "future_salt",
        0xae500895 => "future_salts",
        0x276d3ec6 => "msg_detailed_info",
        0x809db6df => "msg_new_detailed_info",
        0xda69fb52 => "msgs_state_req",
        0x04deb57d => "msgs_state_info",
        0x8cc0d131 => "msgs_all_info",
        0x7d861a08 => "msg_resend_req",
        0xe22045fc => "destroy_session_ok",
        0x62d350c9 => "destroy_session_none",
        0x9299359f => "http_wait",
        0x73f1f8dc => "msg_container",
        0x3072cfa1 => "gzip_packed",
        0xf35c6d01 => "rpc_result",
        0x7abe77ec => "ping",
        0xf3427b8c => "ping_delay_disconnect",
        0xb921bd04 => "get_future_salts",
        0xe7512126 => "destroy_session",
        0xda9b0d0d => "invokeWithLayer",
        0xc1cd5ea9 => "initConnection",
        0xcb9f372d => "invokeAfterMsg",
        0xc4f9186b => "help.getConfig",
        0xcc1a241e => "config",
        0x18b7a10d => "dcOption",
        0xe5bfffcd => "auth.exportAuthorization",
        0xb434e2b8 => "auth.exportedAuthorization",
        0xa57a7dad => "auth.importAuthorization",
        0x2ea2c0d4 => "auth.authorization",
        0xbe5335be => "upload.getFile",
        0x096a18d5 => "upload.file",
        0xf18cda44 => "upload.fileCdnRedirect",
        0x395f69da => "upload.getCdnFile",
        0xa99fca4f => "upload.cdnFile",
        0xeea8e46e => "upload.cdnFileReuploadNeeded",
        0x9b2754a8 => "upload.reuploadCdnFile",
        0x91dc3f31 => "upload.getCdnFileHashes",
        0xf39b035c => "fileHash",
        0xedd4882a => "updates.getState",
        0xa56c2a3e => "updates.state",
        0x03173d78 => "updates.getChannelDifference",
        0x3e11affb => "updates.channelDifferenceEmpty",
        0x2064674e => "updates.channelDifference",
        0xa4bcc6fe => "updates.channelDifferenceTooLong",
        0xe317af7e => "updatesTooLong",
        0x78d4dec1 => "updateShort",
        0x74ae4240 => "updates",
        0x725b04c3 => "updatesCombined",
        0x313bc7f8 => "updateShortMessage",
        0x4d6deea5 => "updateShortChatMessage",
        0x1f2b0afd => "updateNewMessage",
        0x62ba04d9 => "updateNewChannelMessage",
        0xe40370a3 => "updateEditMessage",
        0x1b3f4df7 => "updateEditChannelMessage",
        0xa20db0e5 => "updateDeleteMessages",
        0xc32d5b12 => "updateDeleteChannelMessages",
        0x108d941f => "updateChannelTooLong",
        _ => "(unknown)",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_have_names() {
        assert_eq!(name_for_id(0xf35c6d01), "rpc_result");
        assert_eq!(name_for_id(0x7abe77ec), "ping");
        assert_eq!(name_for_id(0xdeadbeef), "(unknown)");
    }
}
