// Copyright 2024 - developers of the `ferrogram` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Bare type definitions. Serialization of a bare type does not include
//! its constructor identifier; the boxed [`crate::enums`] counterparts do.
use crate::deserialize::{Cursor, Result};
use crate::{enums, Deserializable, Identifiable, RawVec, Serializable};

/// `resPQ#05162463 nonce:int128 server_nonce:int128 pq:bytes
/// server_public_key_fingerprints:Vector<long> = ResPQ;`
#[derive(Clone, Debug, PartialEq)]
pub struct ResPq {
    pub nonce: [u8; 16],
    pub server_nonce: [u8; 16],
    pub pq: Vec<u8>,
    pub server_public_key_fingerprints: Vec<i64>,
}

impl Identifiable for ResPq {
    const CONSTRUCTOR_ID: u32 = 0x05162463;
}

impl Serializable for ResPq {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.nonce.serialize(buf);
        self.server_nonce.serialize(buf);
        self.pq.serialize(buf);
        self.server_public_key_fingerprints.serialize(buf);
    }
}

impl Deserializable for ResPq {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            nonce: <[u8; 16]>::deserialize(buf)?,
            server_nonce: <[u8; 16]>::deserialize(buf)?,
            pq: Vec::<u8>::deserialize(buf)?,
            server_public_key_fingerprints: Vec::<i64>::deserialize(buf)?,
        })
    }
}

/// `p_q_inner_data#83c95aec pq:bytes p:bytes q:bytes nonce:int128
/// server_nonce:int128 new_nonce:int256 = P_Q_inner_data;`
#[derive(Clone, Debug, PartialEq)]
pub struct PqInnerData {
    pub pq: Vec<u8>,
    pub p: Vec<u8>,
    pub q: Vec<u8>,
    pub nonce: [u8; 16],
    pub server_nonce: [u8; 16],
    pub new_nonce: [u8; 32],
}

impl Identifiable for PqInnerData {
    const CONSTRUCTOR_ID: u32 = 0x83c95aec;
}

impl Serializable for PqInnerData {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.pq.serialize(buf);
        self.p.serialize(buf);
        self.q.serialize(buf);
        self.nonce.serialize(buf);
        self.server_nonce.serialize(buf);
        self.new_nonce.serialize(buf);
    }
}

impl Deserializable for PqInnerData {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            pq: Vec::<u8>::deserialize(buf)?,
            p: Vec::<u8>::deserialize(buf)?,
            q: Vec::<u8>::deserialize(buf)?,
            nonce: <[u8; 16]>::deserialize(buf)?,
            server_nonce: <[u8; 16]>::deserialize(buf)?,
            new_nonce: <[u8; 32]>::deserialize(buf)?,
        })
    }
}

/// `server_DH_params_ok#d0e8075c nonce:int128 server_nonce:int128
/// encrypted_answer:bytes = Server_DH_Params;`
#[derive(Clone, Debug, PartialEq)]
pub struct ServerDhParamsOk {
    pub nonce: [u8; 16],
    pub server_nonce: [u8; 16],
    pub encrypted_answer: Vec<u8>,
}

impl Identifiable for ServerDhParamsOk {
    const CONSTRUCTOR_ID: u32 = 0xd0e8075c;
}

impl Serializable for ServerDhParamsOk {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.nonce.serialize(buf);
        self.server_nonce.serialize(buf);
        self.encrypted_answer.serialize(buf);
    }
}

impl Deserializable for ServerDhParamsOk {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            nonce: <[u8; 16]>::deserialize(buf)?,
            server_nonce: <[u8; 16]>::deserialize(buf)?,
            encrypted_answer: Vec::<u8>::deserialize(buf)?,
        })
    }
}

/// `server_DH_params_fail#79cb045d nonce:int128 server_nonce:int128
/// new_nonce_hash:int128 = Server_DH_Params;`
#[derive(Clone, Debug, PartialEq)]
pub struct ServerDhParamsFail {
    pub nonce: [u8; 16],
    pub server_nonce: [u8; 16],
    pub new_nonce_hash: [u8; 16],
}

impl Identifiable for ServerDhParamsFail {
    const CONSTRUCTOR_ID: u32 = 0x79cb045d;
}

impl Serializable for ServerDhParamsFail {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.nonce.serialize(buf);
        self.server_nonce.serialize(buf);
        self.new_nonce_hash.serialize(buf);
    }
}

impl Deserializable for ServerDhParamsFail {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            nonce: <[u8; 16]>::deserialize(buf)?,
            server_nonce: <[u8; 16]>::deserialize(buf)?,
            new_nonce_hash: <[u8; 16]>::deserialize(buf)?,
        })
    }
}

/// `server_DH_inner_data#b5890dba nonce:int128 server_nonce:int128 g:int
/// dh_prime:bytes g_a:bytes server_time:int = Server_DH_inner_data;`
#[derive(Clone, Debug, PartialEq)]
pub struct ServerDhInnerData {
    pub nonce: [u8; 16],
    pub server_nonce: [u8; 16],
    pub g: i32,
    pub dh_prime: Vec<u8>,
    pub g_a: Vec<u8>,
    pub server_time: i32,
}

impl Identifiable for ServerDhInnerData {
    const CONSTRUCTOR_ID: u32 = 0xb5890dba;
}

impl Serializable for ServerDhInnerData {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.nonce.serialize(buf);
        self.server_nonce.serialize(buf);
        self.g.serialize(buf);
        self.dh_prime.serialize(buf);
        self.g_a.serialize(buf);
        self.server_time.serialize(buf);
    }
}

impl Deserializable for ServerDhInnerData {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            nonce: <[u8; 16]>::deserialize(buf)?,
            server_nonce: <[u8; 16]>::deserialize(buf)?,
            g: i32::deserialize(buf)?,
            dh_prime: Vec::<u8>::deserialize(buf)?,
            g_a: Vec::<u8>::deserialize(buf)?,
            server_time: i32::deserialize(buf)?,
        })
    }
}

/// `client_DH_inner_data#6643b654 nonce:int128 server_nonce:int128
/// retry_id:long g_b:bytes = Client_DH_Inner_Data;`
#[derive(Clone, Debug, PartialEq)]
pub struct ClientDhInnerData {
    pub nonce: [u8; 16],
    pub server_nonce: [u8; 16],
    pub retry_id: i64,
    pub g_b: Vec<u8>,
}

impl Identifiable for ClientDhInnerData {
    const CONSTRUCTOR_ID: u32 = 0x6643b654;
}

impl Serializable for ClientDhInnerData {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.nonce.serialize(buf);
        self.server_nonce.serialize(buf);
        self.retry_id.serialize(buf);
        self.g_b.serialize(buf);
    }
}

impl Deserializable for ClientDhInnerData {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            nonce: <[u8; 16]>::deserialize(buf)?,
            server_nonce: <[u8; 16]>::deserialize(buf)?,
            retry_id: i64::deserialize(buf)?,
            g_b: Vec::<u8>::deserialize(buf)?,
        })
    }
}

/// `dh_gen_ok#3bcbf734 nonce:int128 server_nonce:int128
/// new_nonce_hash1:int128 = Set_client_DH_params_answer;`
#[derive(Clone, Debug, PartialEq)]
pub struct DhGenOk {
    pub nonce: [u8; 16],
    pub server_nonce: [u8; 16],
    pub new_nonce_hash1: [u8; 16],
}

impl Identifiable for DhGenOk {
    const CONSTRUCTOR_ID: u32 = 0x3bcbf734;
}

impl Serializable for DhGenOk {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.nonce.serialize(buf);
        self.server_nonce.serialize(buf);
        self.new_nonce_hash1.serialize(buf);
    }
}

impl Deserializable for DhGenOk {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            nonce: <[u8; 16]>::deserialize(buf)?,
            server_nonce: <[u8; 16]>::deserialize(buf)?,
            new_nonce_hash1: <[u8; 16]>::deserialize(buf)?,
        })
    }
}

/// `dh_gen_retry#46dc1fb9 nonce:int128 server_nonce:int128
/// new_nonce_hash2:int128 = Set_client_DH_params_answer;`
#[derive(Clone, Debug, PartialEq)]
pub struct DhGenRetry {
    pub nonce: [u8; 16],
    pub server_nonce: [u8; 16],
    pub new_nonce_hash2: [u8; 16],
}

impl Identifiable for DhGenRetry {
    const CONSTRUCTOR_ID: u32 = 0x46dc1fb9;
}

impl Serializable for DhGenRetry {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.nonce.serialize(buf);
        self.server_nonce.serialize(buf);
        self.new_nonce_hash2.serialize(buf);
    }
}

impl Deserializable for DhGenRetry {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            nonce: <[u8; 16]>::deserialize(buf)?,
            server_nonce: <[u8; 16]>::deserialize(buf)?,
            new_nonce_hash2: <[u8; 16]>::deserialize(buf)?,
        })
    }
}

/// `dh_gen_fail#a69dae02 nonce:int128 server_nonce:int128
/// new_nonce_hash3:int128 = Set_client_DH_params_answer;`
#[derive(Clone, Debug, PartialEq)]
pub struct DhGenFail {
    pub nonce: [u8; 16],
    pub server_nonce: [u8; 16],
    pub new_nonce_hash3: [u8; 16],
}

impl Identifiable for DhGenFail {
    const CONSTRUCTOR_ID: u32 = 0xa69dae02;
}

impl Serializable for DhGenFail {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.nonce.serialize(buf);
        self.server_nonce.serialize(buf);
        self.new_nonce_hash3.serialize(buf);
    }
}

impl Deserializable for DhGenFail {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            nonce: <[u8; 16]>::deserialize(buf)?,
            server_nonce: <[u8; 16]>::deserialize(buf)?,
            new_nonce_hash3: <[u8; 16]>::deserialize(buf)?,
        })
    }
}

/// `rpc_error#2144ca19 error_code:int error_message:string = RpcError;`
#[derive(Clone, Debug, PartialEq)]
pub struct RpcError {
    pub error_code: i32,
    pub error_message: String,
}

impl Identifiable for RpcError {
    const CONSTRUCTOR_ID: u32 = 0x2144ca19;
}

impl Serializable for RpcError {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.error_code.serialize(buf);
        self.error_message.serialize(buf);
    }
}

impl Deserializable for RpcError {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            error_code: i32::deserialize(buf)?,
            error_message: String::deserialize(buf)?,
        })
    }
}

/// `pong#347773c5 msg_id:long ping_id:long = Pong;`
#[derive(Clone, Debug, PartialEq)]
pub struct Pong {
    pub msg_id: i64,
    pub ping_id: i64,
}

impl Identifiable for Pong {
    const CONSTRUCTOR_ID: u32 = 0x347773c5;
}

impl Serializable for Pong {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.msg_id.serialize(buf);
        self.ping_id.serialize(buf);
    }
}

impl Deserializable for Pong {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            msg_id: i64::deserialize(buf)?,
            ping_id: i64::deserialize(buf)?,
        })
    }
}

/// `bad_msg_notification#a7eff811 bad_msg_id:long bad_msg_seqno:int
/// error_code:int = BadMsgNotification;`
#[derive(Clone, Debug, PartialEq)]
pub struct BadMsgNotification {
    pub bad_msg_id: i64,
    pub bad_msg_seqno: i32,
    pub error_code: i32,
}

impl Identifiable for BadMsgNotification {
    const CONSTRUCTOR_ID: u32 = 0xa7eff811;
}

impl Serializable for BadMsgNotification {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.bad_msg_id.serialize(buf);
        self.bad_msg_seqno.serialize(buf);
        self.error_code.serialize(buf);
    }
}

impl Deserializable for BadMsgNotification {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            bad_msg_id: i64::deserialize(buf)?,
            bad_msg_seqno: i32::deserialize(buf)?,
            error_code: i32::deserialize(buf)?,
        })
    }
}

/// `bad_server_salt#edab447b bad_msg_id:long bad_msg_seqno:int
/// error_code:int new_server_salt:long = BadMsgNotification;`
#[derive(Clone, Debug, PartialEq)]
pub struct BadServerSalt {
    pub bad_msg_id: i64,
    pub bad_msg_seqno: i32,
    pub error_code: i32,
    pub new_server_salt: i64,
}

impl Identifiable for BadServerSalt {
    const CONSTRUCTOR_ID: u32 = 0xedab447b;
}

impl Serializable for BadServerSalt {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.bad_msg_id.serialize(buf);
        self.bad_msg_seqno.serialize(buf);
        self.error_code.serialize(buf);
        self.new_server_salt.serialize(buf);
    }
}

impl Deserializable for BadServerSalt {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            bad_msg_id: i64::deserialize(buf)?,
            bad_msg_seqno: i32::deserialize(buf)?,
            error_code: i32::deserialize(buf)?,
            new_server_salt: i64::deserialize(buf)?,
        })
    }
}

/// `msgs_ack#62d6b459 msg_ids:Vector<long> = MsgsAck;`
#[derive(Clone, Debug, PartialEq)]
pub struct MsgsAck {
    pub msg_ids: Vec<i64>,
}

impl Identifiable for MsgsAck {
    const CONSTRUCTOR_ID: u32 = 0x62d6b459;
}

impl Serializable for MsgsAck {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.msg_ids.serialize(buf);
    }
}

impl Deserializable for MsgsAck {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            msg_ids: Vec::<i64>::deserialize(buf)?,
        })
    }
}

/// `new_session_created#9ec20908 first_msg_id:long unique_id:long
/// server_salt:long = NewSession;`
#[derive(Clone, Debug, PartialEq)]
pub struct NewSessionCreated {
    pub first_msg_id: i64,
    pub unique_id: i64,
    pub server_salt: i64,
}

impl Identifiable for NewSessionCreated {
    const CONSTRUCTOR_ID: u32 = 0x9ec20908;
}

impl Serializable for NewSessionCreated {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.first_msg_id.serialize(buf);
        self.unique_id.serialize(buf);
        self.server_salt.serialize(buf);
    }
}

impl Deserializable for NewSessionCreated {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            first_msg_id: i64::deserialize(buf)?,
            unique_id: i64::deserialize(buf)?,
            server_salt: i64::deserialize(buf)?,
        })
    }
}

/// `future_salt#0949d9dc valid_since:int valid_until:int salt:long = FutureSalt;`
#[derive(Clone, Debug, PartialEq)]
pub struct FutureSalt {
    pub valid_since: i32,
    pub valid_until: i32,
    pub salt: i64,
}

impl Identifiable for FutureSalt {
    const CONSTRUCTOR_ID: u32 = 0x0949d9dc;
}

impl Serializable for FutureSalt {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.valid_since.serialize(buf);
        self.valid_until.serialize(buf);
        self.salt.serialize(buf);
    }
}

impl Deserializable for FutureSalt {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            valid_since: i32::deserialize(buf)?,
            valid_until: i32::deserialize(buf)?,
            salt: i64::deserialize(buf)?,
        })
    }
}

/// `future_salts#ae500895 req_msg_id:long now:int
/// salts:vector<future_salt> = FutureSalts;`
#[derive(Clone, Debug, PartialEq)]
pub struct FutureSalts {
    pub req_msg_id: i64,
    pub now: i32,
    pub salts: Vec<FutureSalt>,
}

impl Identifiable for FutureSalts {
    const CONSTRUCTOR_ID: u32 = 0xae500895;
}

impl Serializable for FutureSalts {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.req_msg_id.serialize(buf);
        self.now.serialize(buf);
        RawVec(self.salts.clone()).serialize(buf);
    }
}

impl Deserializable for FutureSalts {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            req_msg_id: i64::deserialize(buf)?,
            now: i32::deserialize(buf)?,
            salts: RawVec::<FutureSalt>::deserialize(buf)?.0,
        })
    }
}

/// `msg_detailed_info#276d3ec6 msg_id:long answer_msg_id:long bytes:int
/// status:int = MsgDetailedInfo;`
#[derive(Clone, Debug, PartialEq)]
pub struct MsgDetailedInfo {
    pub msg_id: i64,
    pub answer_msg_id: i64,
    pub bytes: i32,
    pub status: i32,
}

impl Identifiable for MsgDetailedInfo {
    const CONSTRUCTOR_ID: u32 = 0x276d3ec6;
}

impl Serializable for MsgDetailedInfo {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.msg_id.serialize(buf);
        self.answer_msg_id.serialize(buf);
        self.bytes.serialize(buf);
        self.status.serialize(buf);
    }
}

impl Deserializable for MsgDetailedInfo {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            msg_id: i64::deserialize(buf)?,
            answer_msg_id: i64::deserialize(buf)?,
            bytes: i32::deserialize(buf)?,
            status: i32::deserialize(buf)?,
        })
    }
}

/// `msg_new_detailed_info#809db6df answer_msg_id:long bytes:int
/// status:int = MsgDetailedInfo;`
#[derive(Clone, Debug, PartialEq)]
pub struct MsgNewDetailedInfo {
    pub answer_msg_id: i64,
    pub bytes: i32,
    pub status: i32,
}

impl Identifiable for MsgNewDetailedInfo {
    const CONSTRUCTOR_ID: u32 = 0x809db6df;
}

impl Serializable for MsgNewDetailedInfo {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.answer_msg_id.serialize(buf);
        self.bytes.serialize(buf);
        self.status.serialize(buf);
    }
}

impl Deserializable for MsgNewDetailedInfo {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            answer_msg_id: i64::deserialize(buf)?,
            bytes: i32::deserialize(buf)?,
            status: i32::deserialize(buf)?,
        })
    }
}

/// `msgs_state_req#da69fb52 msg_ids:Vector<long> = MsgsStateReq;`
#[derive(Clone, Debug, PartialEq)]
pub struct MsgsStateReq {
    pub msg_ids: Vec<i64>,
}

impl Identifiable for MsgsStateReq {
    const CONSTRUCTOR_ID: u32 = 0xda69fb52;
}

impl Serializable for MsgsStateReq {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.msg_ids.serialize(buf);
    }
}

impl Deserializable for MsgsStateReq {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            msg_ids: Vec::<i64>::deserialize(buf)?,
        })
    }
}

/// `msgs_state_info#04deb57d req_msg_id:long info:bytes = MsgsStateInfo;`
#[derive(Clone, Debug, PartialEq)]
pub struct MsgsStateInfo {
    pub req_msg_id: i64,
    pub info: Vec<u8>,
}

impl Identifiable for MsgsStateInfo {
    const CONSTRUCTOR_ID: u32 = 0x04deb57d;
}

impl Serializable for MsgsStateInfo {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.req_msg_id.serialize(buf);
        self.info.serialize(buf);
    }
}

impl Deserializable for MsgsStateInfo {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            req_msg_id: i64::deserialize(buf)?,
            info: Vec::<u8>::deserialize(buf)?,
        })
    }
}

/// `msgs_all_info#8cc0d131 msg_ids:Vector<long> info:bytes = MsgsAllInfo;`
#[derive(Clone, Debug, PartialEq)]
pub struct MsgsAllInfo {
    pub msg_ids: Vec<i64>,
    pub info: Vec<u8>,
}

impl Identifiable for MsgsAllInfo {
    const CONSTRUCTOR_ID: u32 = 0x8cc0d131;
}

impl Serializable for MsgsAllInfo {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.msg_ids.serialize(buf);
        self.info.serialize(buf);
    }
}

impl Deserializable for MsgsAllInfo {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            msg_ids: Vec::<i64>::deserialize(buf)?,
            info: Vec::<u8>::deserialize(buf)?,
        })
    }
}

/// `msg_resend_req#7d861a08 msg_ids:Vector<long> = MsgResendReq;`
#[derive(Clone, Debug, PartialEq)]
pub struct MsgResendReq {
    pub msg_ids: Vec<i64>,
}

impl Identifiable for MsgResendReq {
    const CONSTRUCTOR_ID: u32 = 0x7d861a08;
}

impl Serializable for MsgResendReq {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.msg_ids.serialize(buf);
    }
}

impl Deserializable for MsgResendReq {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            msg_ids: Vec::<i64>::deserialize(buf)?,
        })
    }
}

/// `destroy_session_ok#e22045fc session_id:long = DestroySessionRes;`
#[derive(Clone, Debug, PartialEq)]
pub struct DestroySessionOk {
    pub session_id: i64,
}

impl Identifiable for DestroySessionOk {
    const CONSTRUCTOR_ID: u32 = 0xe22045fc;
}

impl Serializable for DestroySessionOk {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.session_id.serialize(buf);
    }
}

impl Deserializable for DestroySessionOk {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            session_id: i64::deserialize(buf)?,
        })
    }
}

/// `destroy_session_none#62d350c9 session_id:long = DestroySessionRes;`
#[derive(Clone, Debug, PartialEq)]
pub struct DestroySessionNone {
    pub session_id: i64,
}

impl Identifiable for DestroySessionNone {
    const CONSTRUCTOR_ID: u32 = 0x62d350c9;
}

impl Serializable for DestroySessionNone {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.session_id.serialize(buf);
    }
}

impl Deserializable for DestroySessionNone {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            session_id: i64::deserialize(buf)?,
        })
    }
}

/// `http_wait#9299359f max_delay:int wait_after:int max_wait:int = HttpWait;`
#[derive(Clone, Debug, PartialEq)]
pub struct HttpWait {
    pub max_delay: i32,
    pub wait_after: i32,
    pub max_wait: i32,
}

impl Identifiable for HttpWait {
    const CONSTRUCTOR_ID: u32 = 0x9299359f;
}

impl Serializable for HttpWait {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.max_delay.serialize(buf);
        self.wait_after.serialize(buf);
        self.max_wait.serialize(buf);
    }
}

impl Deserializable for HttpWait {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            max_delay: i32::deserialize(buf)?,
            wait_after: i32::deserialize(buf)?,
            max_wait: i32::deserialize(buf)?,
        })
    }
}

/// Reduced `config` carrying the fields the client consumes.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub date: i32,
    pub expires: i32,
    pub test_mode: bool,
    pub this_dc: i32,
    pub dc_options: Vec<enums::DcOption>,
    pub dc_txt_domain_name: String,
}

impl Identifiable for Config {
    const CONSTRUCTOR_ID: u32 = 0xcc1a241e;
}

impl Serializable for Config {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.date.serialize(buf);
        self.expires.serialize(buf);
        self.test_mode.serialize(buf);
        self.this_dc.serialize(buf);
        self.dc_options.serialize(buf);
        self.dc_txt_domain_name.serialize(buf);
    }
}

impl Deserializable for Config {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            date: i32::deserialize(buf)?,
            expires: i32::deserialize(buf)?,
            test_mode: bool::deserialize(buf)?,
            this_dc: i32::deserialize(buf)?,
            dc_options: Vec::<enums::DcOption>::deserialize(buf)?,
            dc_txt_domain_name: String::deserialize(buf)?,
        })
    }
}

/// `dcOption#18b7a10d flags:# ipv6:flags.0?true media_only:flags.1?true
/// tcpo_only:flags.2?true cdn:flags.3?true static:flags.4?true
/// id:int ip_address:string port:int = DcOption;`
#[derive(Clone, Debug, PartialEq)]
pub struct DcOption {
    pub ipv6: bool,
    pub media_only: bool,
    pub tcpo_only: bool,
    pub cdn: bool,
    pub r#static: bool,
    pub id: i32,
    pub ip_address: String,
    pub port: i32,
}

impl Identifiable for DcOption {
    const CONSTRUCTOR_ID: u32 = 0x18b7a10d;
}

impl Serializable for DcOption {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        (0u32
            | if self.ipv6 { 1 } else { 0 }
            | if self.media_only { 2 } else { 0 }
            | if self.tcpo_only { 4 } else { 0 }
            | if self.cdn { 8 } else { 0 }
            | if self.r#static { 16 } else { 0 })
        .serialize(buf);
        self.id.serialize(buf);
        self.ip_address.serialize(buf);
        self.port.serialize(buf);
    }
}

impl Deserializable for DcOption {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            ipv6: flags & 1 != 0,
            media_only: flags & 2 != 0,
            tcpo_only: flags & 4 != 0,
            cdn: flags & 8 != 0,
            r#static: flags & 16 != 0,
            id: i32::deserialize(buf)?,
            ip_address: String::deserialize(buf)?,
            port: i32::deserialize(buf)?,
        })
    }
}

/// `fileHash#f39b035c offset:long limit:int hash:bytes = FileHash;`
#[derive(Clone, Debug, PartialEq)]
pub struct FileHash {
    pub offset: i64,
    pub limit: i32,
    pub hash: Vec<u8>,
}

impl Identifiable for FileHash {
    const CONSTRUCTOR_ID: u32 = 0xf39b035c;
}

impl Serializable for FileHash {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.offset.serialize(buf);
        self.limit.serialize(buf);
        self.hash.serialize(buf);
    }
}

impl Deserializable for FileHash {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            offset: i64::deserialize(buf)?,
            limit: i32::deserialize(buf)?,
            hash: Vec::<u8>::deserialize(buf)?,
        })
    }
}

/// `inputDocumentFileLocation#bad07584 id:long access_hash:long
/// file_reference:bytes thumb_size:string = InputFileLocation;`
#[derive(Clone, Debug, PartialEq)]
pub struct InputDocumentFileLocation {
    pub id: i64,
    pub access_hash: i64,
    pub file_reference: Vec<u8>,
    pub thumb_size: String,
}

impl Identifiable for InputDocumentFileLocation {
    const CONSTRUCTOR_ID: u32 = 0xbad07584;
}

impl Serializable for InputDocumentFileLocation {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.id.serialize(buf);
        self.access_hash.serialize(buf);
        self.file_reference.serialize(buf);
        self.thumb_size.serialize(buf);
    }
}

impl Deserializable for InputDocumentFileLocation {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            id: i64::deserialize(buf)?,
            access_hash: i64::deserialize(buf)?,
            file_reference: Vec::<u8>::deserialize(buf)?,
            thumb_size: String::deserialize(buf)?,
        })
    }
}

/// `inputPhotoFileLocation#40181ffe id:long access_hash:long
/// file_reference:bytes thumb_size:string = InputFileLocation;`
#[derive(Clone, Debug, PartialEq)]
pub struct InputPhotoFileLocation {
    pub id: i64,
    pub access_hash: i64,
    pub file_reference: Vec<u8>,
    pub thumb_size: String,
}

impl Identifiable for InputPhotoFileLocation {
    const CONSTRUCTOR_ID: u32 = 0x40181ffe;
}

impl Serializable for InputPhotoFileLocation {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.id.serialize(buf);
        self.access_hash.serialize(buf);
        self.file_reference.serialize(buf);
        self.thumb_size.serialize(buf);
    }
}

impl Deserializable for InputPhotoFileLocation {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            id: i64::deserialize(buf)?,
            access_hash: i64::deserialize(buf)?,
            file_reference: Vec::<u8>::deserialize(buf)?,
            thumb_size: String::deserialize(buf)?,
        })
    }
}

/// `inputPeerUser#dde8a54c user_id:long access_hash:long = InputPeer;`
#[derive(Clone, Debug, PartialEq)]
pub struct InputPeerUser {
    pub user_id: i64,
    pub access_hash: i64,
}

impl Identifiable for InputPeerUser {
    const CONSTRUCTOR_ID: u32 = 0xdde8a54c;
}

impl Serializable for InputPeerUser {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.user_id.serialize(buf);
        self.access_hash.serialize(buf);
    }
}

impl Deserializable for InputPeerUser {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            user_id: i64::deserialize(buf)?,
            access_hash: i64::deserialize(buf)?,
        })
    }
}

/// `inputPeerChat#35a95cb9 chat_id:long = InputPeer;`
#[derive(Clone, Debug, PartialEq)]
pub struct InputPeerChat {
    pub chat_id: i64,
}

impl Identifiable for InputPeerChat {
    const CONSTRUCTOR_ID: u32 = 0x35a95cb9;
}

impl Serializable for InputPeerChat {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.chat_id.serialize(buf);
    }
}

impl Deserializable for InputPeerChat {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            chat_id: i64::deserialize(buf)?,
        })
    }
}

/// `inputPeerChannel#27bcbbfc channel_id:long access_hash:long = InputPeer;`
#[derive(Clone, Debug, PartialEq)]
pub struct InputPeerChannel {
    pub channel_id: i64,
    pub access_hash: i64,
}

impl Identifiable for InputPeerChannel {
    const CONSTRUCTOR_ID: u32 = 0x27bcbbfc;
}

impl Serializable for InputPeerChannel {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.channel_id.serialize(buf);
        self.access_hash.serialize(buf);
    }
}

impl Deserializable for InputPeerChannel {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            channel_id: i64::deserialize(buf)?,
            access_hash: i64::deserialize(buf)?,
        })
    }
}

/// `inputChannel#afeb712e channel_id:long access_hash:long = InputChannel;`
#[derive(Clone, Debug, PartialEq)]
pub struct InputChannel {
    pub channel_id: i64,
    pub access_hash: i64,
}

impl Identifiable for InputChannel {
    const CONSTRUCTOR_ID: u32 = 0xafeb712e;
}

impl Serializable for InputChannel {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.channel_id.serialize(buf);
        self.access_hash.serialize(buf);
    }
}

impl Deserializable for InputChannel {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            channel_id: i64::deserialize(buf)?,
            access_hash: i64::deserialize(buf)?,
        })
    }
}

/// `channelMessagesFilter#cd77d957 flags:# exclude_new_messages:flags.1?true
/// ranges:Vector<MessageRange> = ChannelMessagesFilter;`
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelMessagesFilter {
    pub exclude_new_messages: bool,
    pub ranges: Vec<enums::MessageRange>,
}

impl Identifiable for ChannelMessagesFilter {
    const CONSTRUCTOR_ID: u32 = 0xcd77d957;
}

impl Serializable for ChannelMessagesFilter {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        (if self.exclude_new_messages { 2u32 } else { 0 }).serialize(buf);
        self.ranges.serialize(buf);
    }
}

impl Deserializable for ChannelMessagesFilter {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            exclude_new_messages: flags & 2 != 0,
            ranges: Vec::<enums::MessageRange>::deserialize(buf)?,
        })
    }
}

/// `messageRange#0ae30253 min_id:int max_id:int = MessageRange;`
#[derive(Clone, Debug, PartialEq)]
pub struct MessageRange {
    pub min_id: i32,
    pub max_id: i32,
}

impl Identifiable for MessageRange {
    const CONSTRUCTOR_ID: u32 = 0x0ae30253;
}

impl Serializable for MessageRange {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.min_id.serialize(buf);
        self.max_id.serialize(buf);
    }
}

impl Deserializable for MessageRange {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            min_id: i32::deserialize(buf)?,
            max_id: i32::deserialize(buf)?,
        })
    }
}

/// `peerUser#59511722 user_id:long = Peer;`
#[derive(Clone, Debug, PartialEq)]
pub struct PeerUser {
    pub user_id: i64,
}

impl Identifiable for PeerUser {
    const CONSTRUCTOR_ID: u32 = 0x59511722;
}

impl Serializable for PeerUser {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.user_id.serialize(buf);
    }
}

impl Deserializable for PeerUser {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            user_id: i64::deserialize(buf)?,
        })
    }
}

/// `peerChat#36c6019a chat_id:long = Peer;`
#[derive(Clone, Debug, PartialEq)]
pub struct PeerChat {
    pub chat_id: i64,
}

impl Identifiable for PeerChat {
    const CONSTRUCTOR_ID: u32 = 0x36c6019a;
}

impl Serializable for PeerChat {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.chat_id.serialize(buf);
    }
}

impl Deserializable for PeerChat {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            chat_id: i64::deserialize(buf)?,
        })
    }
}

/// `peerChannel#a2a5371e channel_id:long = Peer;`
#[derive(Clone, Debug, PartialEq)]
pub struct PeerChannel {
    pub channel_id: i64,
}

impl Identifiable for PeerChannel {
    const CONSTRUCTOR_ID: u32 = 0xa2a5371e;
}

impl Serializable for PeerChannel {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.channel_id.serialize(buf);
    }
}

impl Deserializable for PeerChannel {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            channel_id: i64::deserialize(buf)?,
        })
    }
}

/// Reduced `user`, keeping the identity fields the peer store indexes.
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub bot: bool,
    pub min: bool,
    pub id: i64,
    pub access_hash: Option<i64>,
    pub username: Option<String>,
    pub phone: Option<String>,
}

impl Identifiable for User {
    const CONSTRUCTOR_ID: u32 = 0x83314fca;
}

impl Serializable for User {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        (0u32
            | if self.access_hash.is_some() { 1 } else { 0 }
            | if self.username.is_some() { 1 << 3 } else { 0 }
            | if self.phone.is_some() { 1 << 4 } else { 0 }
            | if self.bot { 1 << 14 } else { 0 }
            | if self.min { 1 << 20 } else { 0 })
        .serialize(buf);
        self.id.serialize(buf);
        if let Some(ref x) = self.access_hash {
            x.serialize(buf);
        }
        if let Some(ref x) = self.username {
            x.serialize(buf);
        }
        if let Some(ref x) = self.phone {
            x.serialize(buf);
        }
    }
}

impl Deserializable for User {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            bot: flags & (1 << 14) != 0,
            min: flags & (1 << 20) != 0,
            id: i64::deserialize(buf)?,
            access_hash: if flags & 1 != 0 {
                Some(i64::deserialize(buf)?)
            } else {
                None
            },
            username: if flags & (1 << 3) != 0 {
                Some(String::deserialize(buf)?)
            } else {
                None
            },
            phone: if flags & (1 << 4) != 0 {
                Some(String::deserialize(buf)?)
            } else {
                None
            },
        })
    }
}

/// `userEmpty#d3bc4b7a id:long = User;`
#[derive(Clone, Debug, PartialEq)]
pub struct UserEmpty {
    pub id: i64,
}

impl Identifiable for UserEmpty {
    const CONSTRUCTOR_ID: u32 = 0xd3bc4b7a;
}

impl Serializable for UserEmpty {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.id.serialize(buf);
    }
}

impl Deserializable for UserEmpty {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            id: i64::deserialize(buf)?,
        })
    }
}

/// Reduced `chat` (small group).
#[derive(Clone, Debug, PartialEq)]
pub struct Chat {
    pub id: i64,
    pub title: String,
}

impl Identifiable for Chat {
    const CONSTRUCTOR_ID: u32 = 0x41cbf256;
}

impl Serializable for Chat {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.id.serialize(buf);
        self.title.serialize(buf);
    }
}

impl Deserializable for Chat {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            id: i64::deserialize(buf)?,
            title: String::deserialize(buf)?,
        })
    }
}

/// `chatEmpty#29562865 id:long = Chat;`
#[derive(Clone, Debug, PartialEq)]
pub struct ChatEmpty {
    pub id: i64,
}

impl Identifiable for ChatEmpty {
    const CONSTRUCTOR_ID: u32 = 0x29562865;
}

impl Serializable for ChatEmpty {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.id.serialize(buf);
    }
}

impl Deserializable for ChatEmpty {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            id: i64::deserialize(buf)?,
        })
    }
}

/// Reduced `channel`, keeping the flags the update pipeline inspects.
#[derive(Clone, Debug, PartialEq)]
pub struct Channel {
    pub broadcast: bool,
    pub megagroup: bool,
    pub min: bool,
    pub id: i64,
    pub access_hash: Option<i64>,
    pub title: String,
    pub username: Option<String>,
}

impl Identifiable for Channel {
    const CONSTRUCTOR_ID: u32 = 0x83259464;
}

impl Serializable for Channel {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        (0u32
            | if self.broadcast { 1 << 5 } else { 0 }
            | if self.username.is_some() { 1 << 6 } else { 0 }
            | if self.megagroup { 1 << 8 } else { 0 }
            | if self.min { 1 << 12 } else { 0 }
            | if self.access_hash.is_some() { 1 << 13 } else { 0 })
        .serialize(buf);
        self.id.serialize(buf);
        if let Some(ref x) = self.access_hash {
            x.serialize(buf);
        }
        self.title.serialize(buf);
        if let Some(ref x) = self.username {
            x.serialize(buf);
        }
    }
}

impl Deserializable for Channel {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            broadcast: flags & (1 << 5) != 0,
            megagroup: flags & (1 << 8) != 0,
            min: flags & (1 << 12) != 0,
            id: i64::deserialize(buf)?,
            access_hash: if flags & (1 << 13) != 0 {
                Some(i64::deserialize(buf)?)
            } else {
                None
            },
            title: String::deserialize(buf)?,
            username: if flags & (1 << 6) != 0 {
                Some(String::deserialize(buf)?)
            } else {
                None
            },
        })
    }
}

/// Reduced `message`.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub id: i32,
    pub from_id: Option<enums::Peer>,
    pub peer_id: enums::Peer,
    pub date: i32,
    pub message: String,
}

impl Identifiable for Message {
    const CONSTRUCTOR_ID: u32 = 0x94345242;
}

impl Serializable for Message {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        (if self.from_id.is_some() { 1u32 << 8 } else { 0 }).serialize(buf);
        self.id.serialize(buf);
        if let Some(ref x) = self.from_id {
            x.serialize(buf);
        }
        self.peer_id.serialize(buf);
        self.date.serialize(buf);
        self.message.serialize(buf);
    }
}

impl Deserializable for Message {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            id: i32::deserialize(buf)?,
            from_id: if flags & (1 << 8) != 0 {
                Some(enums::Peer::deserialize(buf)?)
            } else {
                None
            },
            peer_id: enums::Peer::deserialize(buf)?,
            date: i32::deserialize(buf)?,
            message: String::deserialize(buf)?,
        })
    }
}

/// `messageEmpty#90a6ca84 flags:# id:int peer_id:flags.0?Peer = Message;`
#[derive(Clone, Debug, PartialEq)]
pub struct MessageEmpty {
    pub id: i32,
    pub peer_id: Option<enums::Peer>,
}

impl Identifiable for MessageEmpty {
    const CONSTRUCTOR_ID: u32 = 0x90a6ca84;
}

impl Serializable for MessageEmpty {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        (if self.peer_id.is_some() { 1u32 } else { 0 }).serialize(buf);
        self.id.serialize(buf);
        if let Some(ref x) = self.peer_id {
            x.serialize(buf);
        }
    }
}

impl Deserializable for MessageEmpty {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            id: i32::deserialize(buf)?,
            peer_id: if flags & 1 != 0 {
                Some(enums::Peer::deserialize(buf)?)
            } else {
                None
            },
        })
    }
}

/// `updateNewMessage#1f2b0afd message:Message pts:int pts_count:int = Update;`
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateNewMessage {
    pub message: enums::Message,
    pub pts: i32,
    pub pts_count: i32,
}

impl Identifiable for UpdateNewMessage {
    const CONSTRUCTOR_ID: u32 = 0x1f2b0afd;
}

impl Serializable for UpdateNewMessage {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.message.serialize(buf);
        self.pts.serialize(buf);
        self.pts_count.serialize(buf);
    }
}

impl Deserializable for UpdateNewMessage {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            message: enums::Message::deserialize(buf)?,
            pts: i32::deserialize(buf)?,
            pts_count: i32::deserialize(buf)?,
        })
    }
}

/// `updateNewChannelMessage#62ba04d9 message:Message pts:int
/// pts_count:int = Update;`
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateNewChannelMessage {
    pub message: enums::Message,
    pub pts: i32,
    pub pts_count: i32,
}

impl Identifiable for UpdateNewChannelMessage {
    const CONSTRUCTOR_ID: u32 = 0x62ba04d9;
}

impl Serializable for UpdateNewChannelMessage {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.message.serialize(buf);
        self.pts.serialize(buf);
        self.pts_count.serialize(buf);
    }
}

impl Deserializable for UpdateNewChannelMessage {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            message: enums::Message::deserialize(buf)?,
            pts: i32::deserialize(buf)?,
            pts_count: i32::deserialize(buf)?,
        })
    }
}

/// `updateEditMessage#e40370a3 message:Message pts:int pts_count:int = Update;`
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateEditMessage {
    pub message: enums::Message,
    pub pts: i32,
    pub pts_count: i32,
}

impl Identifiable for UpdateEditMessage {
    const CONSTRUCTOR_ID: u32 = 0xe40370a3;
}

impl Serializable for UpdateEditMessage {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.message.serialize(buf);
        self.pts.serialize(buf);
        self.pts_count.serialize(buf);
    }
}

impl Deserializable for UpdateEditMessage {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            message: enums::Message::deserialize(buf)?,
            pts: i32::deserialize(buf)?,
            pts_count: i32::deserialize(buf)?,
        })
    }
}

/// `updateEditChannelMessage#1b3f4df7 message:Message pts:int
/// pts_count:int = Update;`
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateEditChannelMessage {
    pub message: enums::Message,
    pub pts: i32,
    pub pts_count: i32,
}

impl Identifiable for UpdateEditChannelMessage {
    const CONSTRUCTOR_ID: u32 = 0x1b3f4df7;
}

impl Serializable for UpdateEditChannelMessage {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.message.serialize(buf);
        self.pts.serialize(buf);
        self.pts_count.serialize(buf);
    }
}

impl Deserializable for UpdateEditChannelMessage {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            message: enums::Message::deserialize(buf)?,
            pts: i32::deserialize(buf)?,
            pts_count: i32::deserialize(buf)?,
        })
    }
}

/// `updateDeleteMessages#a20db0e5 messages:Vector<int> pts:int
/// pts_count:int = Update;`
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateDeleteMessages {
    pub messages: Vec<i32>,
    pub pts: i32,
    pub pts_count: i32,
}

impl Identifiable for UpdateDeleteMessages {
    const CONSTRUCTOR_ID: u32 = 0xa20db0e5;
}

impl Serializable for UpdateDeleteMessages {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.messages.serialize(buf);
        self.pts.serialize(buf);
        self.pts_count.serialize(buf);
    }
}

impl Deserializable for UpdateDeleteMessages {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            messages: Vec::<i32>::deserialize(buf)?,
            pts: i32::deserialize(buf)?,
            pts_count: i32::deserialize(buf)?,
        })
    }
}

/// `updateDeleteChannelMessages#c32d5b12 channel_id:long messages:Vector<int>
/// pts:int pts_count:int = Update;`
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateDeleteChannelMessages {
    pub channel_id: i64,
    pub messages: Vec<i32>,
    pub pts: i32,
    pub pts_count: i32,
}

impl Identifiable for UpdateDeleteChannelMessages {
    const CONSTRUCTOR_ID: u32 = 0xc32d5b12;
}

impl Serializable for UpdateDeleteChannelMessages {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.channel_id.serialize(buf);
        self.messages.serialize(buf);
        self.pts.serialize(buf);
        self.pts_count.serialize(buf);
    }
}

impl Deserializable for UpdateDeleteChannelMessages {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            channel_id: i64::deserialize(buf)?,
            messages: Vec::<i32>::deserialize(buf)?,
            pts: i32::deserialize(buf)?,
            pts_count: i32::deserialize(buf)?,
        })
    }
}

/// `updateChannelTooLong#108d941f flags:# channel_id:long
/// pts:flags.0?int = Update;`
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateChannelTooLong {
    pub channel_id: i64,
    pub pts: Option<i32>,
}

impl Identifiable for UpdateChannelTooLong {
    const CONSTRUCTOR_ID: u32 = 0x108d941f;
}

impl Serializable for UpdateChannelTooLong {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        (if self.pts.is_some() { 1u32 } else { 0 }).serialize(buf);
        self.channel_id.serialize(buf);
        if let Some(ref x) = self.pts {
            x.serialize(buf);
        }
    }
}

impl Deserializable for UpdateChannelTooLong {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            channel_id: i64::deserialize(buf)?,
            pts: if flags & 1 != 0 {
                Some(i32::deserialize(buf)?)
            } else {
                None
            },
        })
    }
}

/// Reduced `updateShortMessage`.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateShortMessage {
    pub out: bool,
    pub id: i32,
    pub user_id: i64,
    pub message: String,
    pub pts: i32,
    pub pts_count: i32,
    pub date: i32,
}

impl Identifiable for UpdateShortMessage {
    const CONSTRUCTOR_ID: u32 = 0x313bc7f8;
}

impl Serializable for UpdateShortMessage {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        (if self.out { 2u32 } else { 0 }).serialize(buf);
        self.id.serialize(buf);
        self.user_id.serialize(buf);
        self.message.serialize(buf);
        self.pts.serialize(buf);
        self.pts_count.serialize(buf);
        self.date.serialize(buf);
    }
}

impl Deserializable for UpdateShortMessage {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            out: flags & 2 != 0,
            id: i32::deserialize(buf)?,
            user_id: i64::deserialize(buf)?,
            message: String::deserialize(buf)?,
            pts: i32::deserialize(buf)?,
            pts_count: i32::deserialize(buf)?,
            date: i32::deserialize(buf)?,
        })
    }
}

/// Reduced `updateShortChatMessage`.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateShortChatMessage {
    pub out: bool,
    pub id: i32,
    pub from_id: i64,
    pub chat_id: i64,
    pub message: String,
    pub pts: i32,
    pub pts_count: i32,
    pub date: i32,
}

impl Identifiable for UpdateShortChatMessage {
    const CONSTRUCTOR_ID: u32 = 0x4d6deea5;
}

impl Serializable for UpdateShortChatMessage {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        (if self.out { 2u32 } else { 0 }).serialize(buf);
        self.id.serialize(buf);
        self.from_id.serialize(buf);
        self.chat_id.serialize(buf);
        self.message.serialize(buf);
        self.pts.serialize(buf);
        self.pts_count.serialize(buf);
        self.date.serialize(buf);
    }
}

impl Deserializable for UpdateShortChatMessage {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        let flags = u32::deserialize(buf)?;
        Ok(Self {
            out: flags & 2 != 0,
            id: i32::deserialize(buf)?,
            from_id: i64::deserialize(buf)?,
            chat_id: i64::deserialize(buf)?,
            message: String::deserialize(buf)?,
            pts: i32::deserialize(buf)?,
            pts_count: i32::deserialize(buf)?,
            date: i32::deserialize(buf)?,
        })
    }
}

/// `updateShort#78d4dec1 update:Update date:int = Updates;`
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateShort {
    pub update: enums::Update,
    pub date: i32,
}

impl Identifiable for UpdateShort {
    const CONSTRUCTOR_ID: u32 = 0x78d4dec1;
}

impl Serializable for UpdateShort {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.update.serialize(buf);
        self.date.serialize(buf);
    }
}

impl Deserializable for UpdateShort {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            update: enums::Update::deserialize(buf)?,
            date: i32::deserialize(buf)?,
        })
    }
}

/// `updates#74ae4240 updates:Vector<Update> users:Vector<User>
/// chats:Vector<Chat> date:int seq:int = Updates;`
#[derive(Clone, Debug, PartialEq)]
pub struct Updates {
    pub updates: Vec<enums::Update>,
    pub users: Vec<enums::User>,
    pub chats: Vec<enums::Chat>,
    pub date: i32,
    pub seq: i32,
}

impl Identifiable for Updates {
    const CONSTRUCTOR_ID: u32 = 0x74ae4240;
}

impl Serializable for Updates {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.updates.serialize(buf);
        self.users.serialize(buf);
        self.chats.serialize(buf);
        self.date.serialize(buf);
        self.seq.serialize(buf);
    }
}

impl Deserializable for Updates {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            updates: Vec::<enums::Update>::deserialize(buf)?,
            users: Vec::<enums::User>::deserialize(buf)?,
            chats: Vec::<enums::Chat>::deserialize(buf)?,
            date: i32::deserialize(buf)?,
            seq: i32::deserialize(buf)?,
        })
    }
}

/// `updatesCombined#725b04c3 updates:Vector<Update> users:Vector<User>
/// chats:Vector<Chat> date:int seq_start:int seq:int = Updates;`
#[derive(Clone, Debug, PartialEq)]
pub struct UpdatesCombined {
    pub updates: Vec<enums::Update>,
    pub users: Vec<enums::User>,
    pub chats: Vec<enums::Chat>,
    pub date: i32,
    pub seq_start: i32,
    pub seq: i32,
}

impl Identifiable for UpdatesCombined {
    const CONSTRUCTOR_ID: u32 = 0x725b04c3;
}

impl Serializable for UpdatesCombined {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        self.updates.serialize(buf);
        self.users.serialize(buf);
        self.chats.serialize(buf);
        self.date.serialize(buf);
        self.seq_start.serialize(buf);
        self.seq.serialize(buf);
    }
}

impl Deserializable for UpdatesCombined {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        Ok(Self {
            updates: Vec::<enums::Update>::deserialize(buf)?,
            users: Vec::<enums::User>::deserialize(buf)?,
            chats: Vec::<enums::Chat>::deserialize(buf)?,
            date: i32::deserialize(buf)?,
            seq_start: i32::deserialize(buf)?,
            seq: i32::deserialize(buf)?,
        })
    }
}

pub mod auth {
    //! Types under the `auth.` namespace.
    use super::*;

    /// `auth.exportedAuthorization#b434e2b8 id:long bytes:bytes
    /// = auth.ExportedAuthorization;`
    #[derive(Clone, Debug, PartialEq)]
    pub struct ExportedAuthorization {
        pub id: i64,
        pub bytes: Vec<u8>,
    }

    impl Identifiable for ExportedAuthorization {
        const CONSTRUCTOR_ID: u32 = 0xb434e2b8;
    }

    impl Serializable for ExportedAuthorization {
        fn serialize(&self, buf: &mut impl Extend<u8>) {
            self.id.serialize(buf);
            self.bytes.serialize(buf);
        }
    }

    impl Deserializable for ExportedAuthorization {
        fn deserialize(buf: &mut Cursor) -> Result<Self> {
            Ok(Self {
                id: i64::deserialize(buf)?,
                bytes: Vec::<u8>::deserialize(buf)?,
            })
        }
    }

    /// Reduced `auth.authorization`.
    #[derive(Clone, Debug, PartialEq)]
    pub struct Authorization {
        pub user: enums::User,
    }

    impl Identifiable for Authorization {
        const CONSTRUCTOR_ID: u32 = 0x2ea2c0d4;
    }

    impl Serializable for Authorization {
        fn serialize(&self, buf: &mut impl Extend<u8>) {
            self.user.serialize(buf);
        }
    }

    impl Deserializable for Authorization {
        fn deserialize(buf: &mut Cursor) -> Result<Self> {
            Ok(Self {
                user: enums::User::deserialize(buf)?,
            })
        }
    }
}

pub mod storage {
    //! Types under the `storage.` namespace.
    use super::*;

    /// Unit constructors of `storage.FileType`. Only the identifier is
    /// ever serialized, so the bare types carry no fields.
    macro_rules! file_type {
        ($name:ident, $id:expr) => {
            #[derive(Clone, Debug, PartialEq)]
            pub struct $name;

            impl Identifiable for $name {
                const CONSTRUCTOR_ID: u32 = $id;
            }

            impl Serializable for $name {
                fn serialize(&self, _buf: &mut impl Extend<u8>) {}
            }

            impl Deserializable for $name {
                fn deserialize(_buf: &mut Cursor) -> Result<Self> {
                    Ok(Self)
                }
            }
        };
    }

    file_type!(FileUnknown, 0xaa963b05);
    file_type!(FilePartial, 0x40bc6f52);
    file_type!(FileJpeg, 0x007efe0e);
    file_type!(FilePng, 0x0a4f63c0);
    file_type!(FileMp4, 0xb3cea0e4);
}

pub mod upload {
    //! Types under the `upload.` namespace.
    use super::*;

    /// `upload.file#096a18d5 type:storage.FileType mtime:int
    /// bytes:bytes = upload.File;`
    #[derive(Clone, Debug, PartialEq)]
    pub struct File {
        pub file_type: enums::storage::FileType,
        pub mtime: i32,
        pub bytes: Vec<u8>,
    }

    impl Identifiable for File {
        const CONSTRUCTOR_ID: u32 = 0x096a18d5;
    }

    impl Serializable for File {
        fn serialize(&self, buf: &mut impl Extend<u8>) {
            self.file_type.serialize(buf);
            self.mtime.serialize(buf);
            self.bytes.serialize(buf);
        }
    }

    impl Deserializable for File {
        fn deserialize(buf: &mut Cursor) -> Result<Self> {
            Ok(Self {
                file_type: enums::storage::FileType::deserialize(buf)?,
                mtime: i32::deserialize(buf)?,
                bytes: Vec::<u8>::deserialize(buf)?,
            })
        }
    }

    /// `upload.fileCdnRedirect#f18cda44 dc_id:int file_token:bytes
    /// encryption_key:bytes encryption_iv:bytes
    /// file_hashes:Vector<FileHash> = upload.File;`
    #[derive(Clone, Debug, PartialEq)]
    pub struct FileCdnRedirect {
        pub dc_id: i32,
        pub file_token: Vec<u8>,
        pub encryption_key: Vec<u8>,
        pub encryption_iv: Vec<u8>,
        pub file_hashes: Vec<enums::FileHash>,
    }

    impl Identifiable for FileCdnRedirect {
        const CONSTRUCTOR_ID: u32 = 0xf18cda44;
    }

    impl Serializable for FileCdnRedirect {
        fn serialize(&self, buf: &mut impl Extend<u8>) {
            self.dc_id.serialize(buf);
            self.file_token.serialize(buf);
            self.encryption_key.serialize(buf);
            self.encryption_iv.serialize(buf);
            self.file_hashes.serialize(buf);
        }
    }

    impl Deserializable for FileCdnRedirect {
        fn deserialize(buf: &mut Cursor) -> Result<Self> {
            Ok(Self {
                dc_id: i32::deserialize(buf)?,
                file_token: Vec::<u8>::deserialize(buf)?,
                encryption_key: Vec::<u8>::deserialize(buf)?,
                encryption_iv: Vec::<u8>::deserialize(buf)?,
                file_hashes: Vec::<enums::FileHash>::deserialize(buf)?,
            })
        }
    }

    /// `upload.cdnFile#a99fca4f bytes:bytes = upload.CdnFile;`
    #[derive(Clone, Debug, PartialEq)]
    pub struct CdnFile {
        pub bytes: Vec<u8>,
    }

    impl Identifiable for CdnFile {
        const CONSTRUCTOR_ID: u32 = 0xa99fca4f;
    }

    impl Serializable for CdnFile {
        fn serialize(&self, buf: &mut impl Extend<u8>) {
            self.bytes.serialize(buf);
        }
    }

    impl Deserializable for CdnFile {
        fn deserialize(buf: &mut Cursor) -> Result<Self> {
            Ok(Self {
                bytes: Vec::<u8>::deserialize(buf)?,
            })
        }
    }

    /// `upload.cdnFileReuploadNeeded#eea8e46e request_token:bytes
    /// = upload.CdnFile;`
    #[derive(Clone, Debug, PartialEq)]
    pub struct CdnFileReuploadNeeded {
        pub request_token: Vec<u8>,
    }

    impl Identifiable for CdnFileReuploadNeeded {
        const CONSTRUCTOR_ID: u32 = 0xeea8e46e;
    }

    impl Serializable for CdnFileReuploadNeeded {
        fn serialize(&self, buf: &mut impl Extend<u8>) {
            self.request_token.serialize(buf);
        }
    }

    impl Deserializable for CdnFileReuploadNeeded {
        fn deserialize(buf: &mut Cursor) -> Result<Self> {
            Ok(Self {
                request_token: Vec::<u8>::deserialize(buf)?,
            })
        }
    }
}

pub mod updates {
    //! Types under the `updates.` namespace.
    use super::*;

    /// `updates.state#a56c2a3e pts:int qts:int date:int seq:int
    /// unread_count:int = updates.State;`
    #[derive(Clone, Debug, PartialEq)]
    pub struct State {
        pub pts: i32,
        pub qts: i32,
        pub date: i32,
        pub seq: i32,
        pub unread_count: i32,
    }

    impl Identifiable for State {
        const CONSTRUCTOR_ID: u32 = 0xa56c2a3e;
    }

    impl Serializable for State {
        fn serialize(&self, buf: &mut impl Extend<u8>) {
            self.pts.serialize(buf);
            self.qts.serialize(buf);
            self.date.serialize(buf);
            self.seq.serialize(buf);
            self.unread_count.serialize(buf);
        }
    }

    impl Deserializable for State {
        fn deserialize(buf: &mut Cursor) -> Result<Self> {
            Ok(Self {
                pts: i32::deserialize(buf)?,
                qts: i32::deserialize(buf)?,
                date: i32::deserialize(buf)?,
                seq: i32::deserialize(buf)?,
                unread_count: i32::deserialize(buf)?,
            })
        }
    }

    /// `updates.channelDifferenceEmpty#3e11affb flags:# final:flags.0?true
    /// pts:int timeout:flags.1?int = updates.ChannelDifference;`
    #[derive(Clone, Debug, PartialEq)]
    pub struct ChannelDifferenceEmpty {
        pub r#final: bool,
        pub pts: i32,
        pub timeout: Option<i32>,
    }

    impl Identifiable for ChannelDifferenceEmpty {
        const CONSTRUCTOR_ID: u32 = 0x3e11affb;
    }

    impl Serializable for ChannelDifferenceEmpty {
        fn serialize(&self, buf: &mut impl Extend<u8>) {
            (0u32
                | if self.r#final { 1 } else { 0 }
                | if self.timeout.is_some() { 2 } else { 0 })
            .serialize(buf);
            self.pts.serialize(buf);
            if let Some(ref x) = self.timeout {
                x.serialize(buf);
            }
        }
    }

    impl Deserializable for ChannelDifferenceEmpty {
        fn deserialize(buf: &mut Cursor) -> Result<Self> {
            let flags = u32::deserialize(buf)?;
            Ok(Self {
                r#final: flags & 1 != 0,
                pts: i32::deserialize(buf)?,
                timeout: if flags & 2 != 0 {
                    Some(i32::deserialize(buf)?)
                } else {
                    None
                },
            })
        }
    }

    /// `updates.channelDifference#2064674e flags:# final:flags.0?true
    /// pts:int timeout:flags.1?int new_messages:Vector<Message>
    /// other_updates:Vector<Update> chats:Vector<Chat>
    /// users:Vector<User> = updates.ChannelDifference;`
    #[derive(Clone, Debug, PartialEq)]
    pub struct ChannelDifference {
        pub r#final: bool,
        pub pts: i32,
        pub timeout: Option<i32>,
        pub new_messages: Vec<enums::Message>,
        pub other_updates: Vec<enums::Update>,
        pub chats: Vec<enums::Chat>,
        pub users: Vec<enums::User>,
    }

    impl Identifiable for ChannelDifference {
        const CONSTRUCTOR_ID: u32 = 0x2064674e;
    }

    impl Serializable for ChannelDifference {
        fn serialize(&self, buf: &mut impl Extend<u8>) {
            (0u32
                | if self.r#final { 1 } else { 0 }
                | if self.timeout.is_some() { 2 } else { 0 })
            .serialize(buf);
            self.pts.serialize(buf);
            if let Some(ref x) = self.timeout {
                x.serialize(buf);
            }
            self.new_messages.serialize(buf);
            self.other_updates.serialize(buf);
            self.chats.serialize(buf);
            self.users.serialize(buf);
        }
    }

    impl Deserializable for ChannelDifference {
        fn deserialize(buf: &mut Cursor) -> Result<Self> {
            let flags = u32::deserialize(buf)?;
            Ok(Self {
                r#final: flags & 1 != 0,
                pts: i32::deserialize(buf)?,
                timeout: if flags & 2 != 0 {
                    Some(i32::deserialize(buf)?)
                } else {
                    None
                },
                new_messages: Vec::<enums::Message>::deserialize(buf)?,
                other_updates: Vec::<enums::Update>::deserialize(buf)?,
                chats: Vec::<enums::Chat>::deserialize(buf)?,
                users: Vec::<enums::User>::deserialize(buf)?,
            })
        }
    }

    /// Reduced `updates.channelDifferenceTooLong`.
    #[derive(Clone, Debug, PartialEq)]
    pub struct ChannelDifferenceTooLong {
        pub r#final: bool,
        pub timeout: Option<i32>,
        pub messages: Vec<enums::Message>,
        pub chats: Vec<enums::Chat>,
        pub users: Vec<enums::User>,
    }

    impl Identifiable for ChannelDifferenceTooLong {
        const CONSTRUCTOR_ID: u32 = 0xa4bcc6fe;
    }

    impl Serializable for ChannelDifferenceTooLong {
        fn serialize(&self, buf: &mut impl Extend<u8>) {
            (0u32
                | if self.r#final { 1 } else { 0 }
                | if self.timeout.is_some() { 2 } else { 0 })
            .serialize(buf);
            if let Some(ref x) = self.timeout {
                x.serialize(buf);
            }
            self.messages.serialize(buf);
            self.chats.serialize(buf);
            self.users.serialize(buf);
        }
    }

    impl Deserializable for ChannelDifferenceTooLong {
        fn deserialize(buf: &mut Cursor) -> Result<Self> {
            let flags = u32::deserialize(buf)?;
            Ok(Self {
                r#final: flags & 1 != 0,
                timeout: if flags & 2 != 0 {
                    Some(i32::deserialize(buf)?)
                } else {
                    None
                },
                messages: Vec::<enums::Message>::deserialize(buf)?,
                chats: Vec::<enums::Chat>::deserialize(buf)?,
                users: Vec::<enums::User>::deserialize(buf)?,
            })
        }
    }
}
