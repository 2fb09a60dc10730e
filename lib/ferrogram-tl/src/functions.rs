// Copyright 2024 - developers of the `ferrogram` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Request definitions. Unlike bare [`crate::types`], serializing a
//! function always begins with its constructor identifier, and every
//! function knows the type of its response via [`RemoteCall`].
use crate::{enums, Identifiable, RemoteCall, Serializable};

/// `req_pq_multi#be7e8ef1 nonce:int128 = ResPQ;`
#[derive(Clone, Debug, PartialEq)]
pub struct ReqPqMulti {
    pub nonce: [u8; 16],
}

impl Identifiable for ReqPqMulti {
    const CONSTRUCTOR_ID: u32 = 0xbe7e8ef1;
}

impl Serializable for ReqPqMulti {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        self.nonce.serialize(buf);
    }
}

impl RemoteCall for ReqPqMulti {
    type Return = enums::ResPq;
}

/// `req_DH_params#d712e4be nonce:int128 server_nonce:int128 p:bytes q:bytes
/// public_key_fingerprint:long encrypted_data:bytes = Server_DH_Params;`
#[derive(Clone, Debug, PartialEq)]
pub struct ReqDhParams {
    pub nonce: [u8; 16],
    pub server_nonce: [u8; 16],
    pub p: Vec<u8>,
    pub q: Vec<u8>,
    pub public_key_fingerprint: i64,
    pub encrypted_data: Vec<u8>,
}

impl Identifiable for ReqDhParams {
    const CONSTRUCTOR_ID: u32 = 0xd712e4be;
}

impl Serializable for ReqDhParams {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        self.nonce.serialize(buf);
        self.server_nonce.serialize(buf);
        self.p.serialize(buf);
        self.q.serialize(buf);
        self.public_key_fingerprint.serialize(buf);
        self.encrypted_data.serialize(buf);
    }
}

impl RemoteCall for ReqDhParams {
    type Return = enums::ServerDhParams;
}

/// `set_client_DH_params#f5045f1f nonce:int128 server_nonce:int128
/// encrypted_data:bytes = Set_client_DH_params_answer;`
#[derive(Clone, Debug, PartialEq)]
pub struct SetClientDhParams {
    pub nonce: [u8; 16],
    pub server_nonce: [u8; 16],
    pub encrypted_data: Vec<u8>,
}

impl Identifiable for SetClientDhParams {
    const CONSTRUCTOR_ID: u32 = 0xf5045f1f;
}

impl Serializable for SetClientDhParams {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        self.nonce.serialize(buf);
        self.server_nonce.serialize(buf);
        self.encrypted_data.serialize(buf);
    }
}

impl RemoteCall for SetClientDhParams {
    type Return = enums::SetClientDhParamsAnswer;
}

/// `ping#7abe77ec ping_id:long = Pong;`
#[derive(Clone, Debug, PartialEq)]
pub struct Ping {
    pub ping_id: i64,
}

impl Identifiable for Ping {
    const CONSTRUCTOR_ID: u32 = 0x7abe77ec;
}

impl Serializable for Ping {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        self.ping_id.serialize(buf);
    }
}

impl RemoteCall for Ping {
    type Return = enums::Pong;
}

/// `ping_delay_disconnect#f3427b8c ping_id:long disconnect_delay:int = Pong;`
#[derive(Clone, Debug, PartialEq)]
pub struct PingDelayDisconnect {
    pub ping_id: i64,
    pub disconnect_delay: i32,
}

impl Identifiable for PingDelayDisconnect {
    const CONSTRUCTOR_ID: u32 = 0xf3427b8c;
}

impl Serializable for PingDelayDisconnect {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        self.ping_id.serialize(buf);
        self.disconnect_delay.serialize(buf);
    }
}

impl RemoteCall for PingDelayDisconnect {
    type Return = enums::Pong;
}

/// `get_future_salts#b921bd04 num:int = FutureSalts;`
#[derive(Clone, Debug, PartialEq)]
pub struct GetFutureSalts {
    pub num: i32,
}

impl Identifiable for GetFutureSalts {
    const CONSTRUCTOR_ID: u32 = 0xb921bd04;
}

impl Serializable for GetFutureSalts {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        self.num.serialize(buf);
    }
}

impl RemoteCall for GetFutureSalts {
    type Return = enums::FutureSalts;
}

/// `destroy_session#e7512126 session_id:long = DestroySessionRes;`
#[derive(Clone, Debug, PartialEq)]
pub struct DestroySession {
    pub session_id: i64,
}

impl Identifiable for DestroySession {
    const CONSTRUCTOR_ID: u32 = 0xe7512126;
}

impl Serializable for DestroySession {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        self.session_id.serialize(buf);
    }
}

impl RemoteCall for DestroySession {
    type Return = enums::DestroySessionRes;
}

/// `invokeAfterMsg#cb9f372d {X:Type} msg_id:long query:!X = X;`
#[derive(Clone, Debug, PartialEq)]
pub struct InvokeAfterMsg<Q> {
    pub msg_id: i64,
    pub query: Q,
}

impl<Q> Identifiable for InvokeAfterMsg<Q> {
    const CONSTRUCTOR_ID: u32 = 0xcb9f372d;
}

impl<Q: Serializable> Serializable for InvokeAfterMsg<Q> {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        self.msg_id.serialize(buf);
        self.query.serialize(buf);
    }
}

impl<Q: RemoteCall> RemoteCall for InvokeAfterMsg<Q> {
    type Return = Q::Return;
}

/// `invokeWithLayer#da9b0d0d {X:Type} layer:int query:!X = X;`
#[derive(Clone, Debug, PartialEq)]
pub struct InvokeWithLayer<Q> {
    pub layer: i32,
    pub query: Q,
}

impl<Q> Identifiable for InvokeWithLayer<Q> {
    const CONSTRUCTOR_ID: u32 = 0xda9b0d0d;
}

impl<Q: Serializable> Serializable for InvokeWithLayer<Q> {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        self.layer.serialize(buf);
        self.query.serialize(buf);
    }
}

impl<Q: RemoteCall> RemoteCall for InvokeWithLayer<Q> {
    type Return = Q::Return;
}

/// `initConnection#c1cd5ea9 {X:Type} flags:# api_id:int
/// device_model:string system_version:string app_version:string
/// system_lang_code:string lang_pack:string lang_code:string
/// proxy:flags.0?InputClientProxy params:flags.1?JSONValue
/// query:!X = X;`
///
/// Neither `proxy` nor `params` are used by this client, so the flags
/// are always zero.
#[derive(Clone, Debug, PartialEq)]
pub struct InitConnection<Q> {
    pub api_id: i32,
    pub device_model: String,
    pub system_version: String,
    pub app_version: String,
    pub system_lang_code: String,
    pub lang_pack: String,
    pub lang_code: String,
    pub query: Q,
}

impl<Q> Identifiable for InitConnection<Q> {
    const CONSTRUCTOR_ID: u32 = 0xc1cd5ea9;
}

impl<Q: Serializable> Serializable for InitConnection<Q> {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        Self::CONSTRUCTOR_ID.serialize(buf);
        0u32.serialize(buf);
        self.api_id.serialize(buf);
        self.device_model.serialize(buf);
        self.system_version.serialize(buf);
        self.app_version.serialize(buf);
        self.system_lang_code.serialize(buf);
        self.lang_pack.serialize(buf);
        self.lang_code.serialize(buf);
        self.query.serialize(buf);
    }
}

impl<Q: RemoteCall> RemoteCall for InitConnection<Q> {
    type Return = Q::Return;
}

pub mod help {
    //! Functions under the `help.` namespace.
    use super::*;

    /// `help.getConfig#c4f9186b = Config;`
    #[derive(Clone, Debug, PartialEq)]
    pub struct GetConfig;

    impl Identifiable for GetConfig {
        const CONSTRUCTOR_ID: u32 = 0xc4f9186b;
    }

    impl Serializable for GetConfig {
        fn serialize(&self, buf: &mut impl Extend<u8>) {
            Self::CONSTRUCTOR_ID.serialize(buf);
        }
    }

    impl RemoteCall for GetConfig {
        type Return = enums::Config;
    }
}

pub mod auth {
    //! Functions under the `auth.` namespace.
    use super::*;

    /// `auth.exportAuthorization#e5bfffcd dc_id:int
    /// = auth.ExportedAuthorization;`
    #[derive(Clone, Debug, PartialEq)]
    pub struct ExportAuthorization {
        pub dc_id: i32,
    }

    impl Identifiable for ExportAuthorization {
        const CONSTRUCTOR_ID: u32 = 0xe5bfffcd;
    }

    impl Serializable for ExportAuthorization {
        fn serialize(&self, buf: &mut impl Extend<u8>) {
            Self::CONSTRUCTOR_ID.serialize(buf);
            self.dc_id.serialize(buf);
        }
    }

    impl RemoteCall for ExportAuthorization {
        type Return = enums::auth::ExportedAuthorization;
    }

    /// `auth.importAuthorization#a57a7dad id:long bytes:bytes
    /// = auth.Authorization;`
    #[derive(Clone, Debug, PartialEq)]
    pub struct ImportAuthorization {
        pub id: i64,
        pub bytes: Vec<u8>,
    }

    impl Identifiable for ImportAuthorization {
        const CONSTRUCTOR_ID: u32 = 0xa57a7dad;
    }

    impl Serializable for ImportAuthorization {
        fn serialize(&self, buf: &mut impl Extend<u8>) {
            Self::CONSTRUCTOR_ID.serialize(buf);
            self.id.serialize(buf);
            self.bytes.serialize(buf);
        }
    }

    impl RemoteCall for ImportAuthorization {
        type Return = enums::auth::Authorization;
    }
}

pub mod upload {
    //! Functions under the `upload.` namespace.
    use super::*;

    /// `upload.getFile#be5335be flags:# precise:flags.0?true
    /// cdn_supported:flags.1?true location:InputFileLocation offset:long
    /// limit:int = upload.File;`
    #[derive(Clone, Debug, PartialEq)]
    pub struct GetFile {
        pub precise: bool,
        pub cdn_supported: bool,
        pub location: enums::InputFileLocation,
        pub offset: i64,
        pub limit: i32,
    }

    impl Identifiable for GetFile {
        const CONSTRUCTOR_ID: u32 = 0xbe5335be;
    }

    impl Serializable for GetFile {
        fn serialize(&self, buf: &mut impl Extend<u8>) {
            Self::CONSTRUCTOR_ID.serialize(buf);
            (0u32
                | if self.precise { 1 } else { 0 }
                | if self.cdn_supported { 2 } else { 0 })
            .serialize(buf);
            self.location.serialize(buf);
            self.offset.serialize(buf);
            self.limit.serialize(buf);
        }
    }

    impl RemoteCall for GetFile {
        type Return = enums::upload::File;
    }

    /// `upload.getCdnFile#395f69da file_token:bytes offset:long
    /// limit:int = upload.CdnFile;`
    #[derive(Clone, Debug, PartialEq)]
    pub struct GetCdnFile {
        pub file_token: Vec<u8>,
        pub offset: i64,
        pub limit: i32,
    }

    impl Identifiable for GetCdnFile {
        const CONSTRUCTOR_ID: u32 = 0x395f69da;
    }

    impl Serializable for GetCdnFile {
        fn serialize(&self, buf: &mut impl Extend<u8>) {
            Self::CONSTRUCTOR_ID.serialize(buf);
            self.file_token.serialize(buf);
            self.offset.serialize(buf);
            self.limit.serialize(buf);
        }
    }

    impl RemoteCall for GetCdnFile {
        type Return = enums::upload::CdnFile;
    }

    /// `upload.reuploadCdnFile#9b2754a8 file_token:bytes
    /// request_token:bytes = Vector<FileHash>;`
    #[derive(Clone, Debug, PartialEq)]
    pub struct ReuploadCdnFile {
        pub file_token: Vec<u8>,
        pub request_token: Vec<u8>,
    }

    impl Identifiable for ReuploadCdnFile {
        const CONSTRUCTOR_ID: u32 = 0x9b2754a8;
    }

    impl Serializable for ReuploadCdnFile {
        fn serialize(&self, buf: &mut impl Extend<u8>) {
            Self::CONSTRUCTOR_ID.serialize(buf);
            self.file_token.serialize(buf);
            self.request_token.serialize(buf);
        }
    }

    impl RemoteCall for ReuploadCdnFile {
        type Return = Vec<enums::FileHash>;
    }

    /// `upload.getCdnFileHashes#91dc3f31 file_token:bytes offset:long
    /// = Vector<FileHash>;`
    #[derive(Clone, Debug, PartialEq)]
    pub struct GetCdnFileHashes {
        pub file_token: Vec<u8>,
        pub offset: i64,
    }

    impl Identifiable for GetCdnFileHashes {
        const CONSTRUCTOR_ID: u32 = 0x91dc3f31;
    }

    impl Serializable for GetCdnFileHashes {
        fn serialize(&self, buf: &mut impl Extend<u8>) {
            Self::CONSTRUCTOR_ID.serialize(buf);
            self.file_token.serialize(buf);
            self.offset.serialize(buf);
        }
    }

    impl RemoteCall for GetCdnFileHashes {
        type Return = Vec<enums::FileHash>;
    }
}

pub mod updates {
    //! Functions under the `updates.` namespace.
    use super::*;

    /// `updates.getState#edd4882a = updates.State;`
    #[derive(Clone, Debug, PartialEq)]
    pub struct GetState;

    impl Identifiable for GetState {
        const CONSTRUCTOR_ID: u32 = 0xedd4882a;
    }

    impl Serializable for GetState {
        fn serialize(&self, buf: &mut impl Extend<u8>) {
            Self::CONSTRUCTOR_ID.serialize(buf);
        }
    }

    impl RemoteCall for GetState {
        type Return = enums::updates::State;
    }

    /// `updates.getChannelDifference#03173d78 flags:# force:flags.0?true
    /// channel:InputChannel filter:ChannelMessagesFilter pts:int
    /// limit:int = updates.ChannelDifference;`
    #[derive(Clone, Debug, PartialEq)]
    pub struct GetChannelDifference {
        pub force: bool,
        pub channel: enums::InputChannel,
        pub filter: enums::ChannelMessagesFilter,
        pub pts: i32,
        pub limit: i32,
    }

    impl Identifiable for GetChannelDifference {
        const CONSTRUCTOR_ID: u32 = 0x03173d78;
    }

    impl Serializable for GetChannelDifference {
        fn serialize(&self, buf: &mut impl Extend<u8>) {
            Self::CONSTRUCTOR_ID.serialize(buf);
            (if self.force { 1u32 } else { 0 }).serialize(buf);
            self.channel.serialize(buf);
            self.filter.serialize(buf);
            self.pts.serialize(buf);
            self.limit.serialize(buf);
        }
    }

    impl RemoteCall for GetChannelDifference {
        type Return = enums::updates::ChannelDifference;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Deserializable;

    #[test]
    fn function_serialization_leads_with_id() {
        let bytes = ReqPqMulti { nonce: [7; 16] }.to_bytes();
        assert_eq!(&bytes[..4], &0xbe7e8ef1u32.to_le_bytes());
        assert_eq!(&bytes[4..], &[7; 16]);
    }

    #[test]
    fn wrapped_queries_nest() {
        let bytes = InvokeWithLayer {
            layer: crate::LAYER,
            query: help::GetConfig,
        }
        .to_bytes();
        assert_eq!(&bytes[..4], &0xda9b0d0du32.to_le_bytes());
        assert_eq!(
            i32::from_bytes(&bytes[4..8]).unwrap(),
            crate::LAYER
        );
        assert_eq!(&bytes[8..12], &0xc4f9186bu32.to_le_bytes());
    }

    #[test]
    fn get_file_flags() {
        let request = upload::GetFile {
            precise: false,
            cdn_supported: true,
            location: enums::InputFileLocation::Document(
                crate::types::InputDocumentFileLocation {
                    id: 1,
                    access_hash: 2,
                    file_reference: vec![],
                    thumb_size: String::new(),
                },
            ),
            offset: 0,
            limit: 1024,
        };
        let bytes = request.to_bytes();
        assert_eq!(&bytes[4..8], &2u32.to_le_bytes());
    }
}
