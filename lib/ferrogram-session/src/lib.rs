// Copyright 2024 - developers of the `ferrogram` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Durable storage for the state a client needs across restarts: which
//! datacenter is home, the per-datacenter authorization keys, the
//! logged-in user, known peers, and the update state.
#![deny(unsafe_code)]

mod dc_options;
mod defs;
pub mod storages;
mod string_session;

pub use dc_options::{find_dc_option, DcOption, DEFAULT_DC, KNOWN_DC_OPTIONS};
pub use defs::{Error, PeerInfo, PeerKind, UpdateState, User};
pub use string_session::StringSession;

/// The storage contract used by the client.
///
/// Every field is individually addressable so that implementations can
/// persist exactly what changed. All methods take `&self`; storages are
/// internally synchronized and shared behind an [`std::sync::Arc`].
pub trait Session: Send + Sync {
    /// The datacenter the client should connect to by default.
    fn home_dc_id(&self) -> i32;

    fn set_home_dc_id(&self, dc_id: i32) -> Result<(), Error>;

    /// The developer's API identifier, if one was stored.
    fn api_id(&self) -> Option<i32>;

    fn set_api_id(&self, api_id: i32) -> Result<(), Error>;

    /// Whether the session belongs to Telegram's test environment.
    fn test_mode(&self) -> bool;

    fn set_test_mode(&self, test_mode: bool) -> Result<(), Error>;

    /// The authorization key bound to the given datacenter, if known.
    fn auth_key_for_dc(&self, dc_id: i32) -> Option<[u8; 256]>;

    fn set_auth_key_for_dc(&self, dc_id: i32, auth_key: &[u8; 256]) -> Result<(), Error>;

    /// The logged-in user, if any.
    fn user(&self) -> Option<User>;

    fn set_user(&self, user: User) -> Result<(), Error>;

    /// Timestamp of the last time the session was known to be fresh.
    fn date(&self) -> i32;

    fn set_date(&self, date: i32) -> Result<(), Error>;

    /// Insert or replace peers, keyed by their identifier.
    fn update_peers(&self, peers: &[PeerInfo]) -> Result<(), Error>;

    fn peer_by_id(&self, id: i64) -> Option<PeerInfo>;

    fn peer_by_username(&self, username: &str) -> Option<PeerInfo>;

    fn peer_by_phone(&self, phone: &str) -> Option<PeerInfo>;

    /// The common update state, if any was stored.
    fn update_state(&self) -> Option<UpdateState>;

    fn set_update_state(&self, state: UpdateState) -> Result<(), Error>;

    /// Per-channel persisted `pts`.
    fn channel_pts(&self, channel_id: i64) -> Option<i32>;

    fn set_channel_pts(&self, channel_id: i64, pts: i32) -> Result<(), Error>;

    /// Opaque per-chat blobs used by secret chats; the core does not
    /// interpret them.
    fn secret_chat(&self, chat_id: i64) -> Option<Vec<u8>>;

    fn set_secret_chat(&self, chat_id: i64, data: &[u8]) -> Result<(), Error>;
}
