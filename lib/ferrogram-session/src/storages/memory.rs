// Copyright 2024 - developers of the `ferrogram` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use crate::{Error, PeerInfo, Session, UpdateState, User, DEFAULT_DC};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct Data {
    home_dc_id: Option<i32>,
    api_id: Option<i32>,
    test_mode: bool,
    auth_keys: HashMap<i32, [u8; 256]>,
    user: Option<User>,
    date: i32,
    peers: HashMap<i64, PeerInfo>,
    peers_by_username: HashMap<String, i64>,
    peers_by_phone: HashMap<String, i64>,
    update_state: Option<UpdateState>,
    channel_pts: HashMap<i64, i32>,
    secret_chats: HashMap<i64, Vec<u8>>,
}

/// A [`Session`] storage that lives in memory and is lost on drop.
///
/// Useful for bots (which can log in from scratch cheaply), for tests,
/// and as the backing store of session strings.
#[derive(Default)]
pub struct MemorySession {
    data: Mutex<Data>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Session for MemorySession {
    fn home_dc_id(&self) -> i32 {
        self.data.lock().unwrap().home_dc_id.unwrap_or(DEFAULT_DC)
    }

    fn set_home_dc_id(&self, dc_id: i32) -> Result<(), Error> {
        self.data.lock().unwrap().home_dc_id = Some(dc_id);
        Ok(())
    }

    fn api_id(&self) -> Option<i32> {
        self.data.lock().unwrap().api_id
    }

    fn set_api_id(&self, api_id: i32) -> Result<(), Error> {
        self.data.lock().unwrap().api_id = Some(api_id);
        Ok(())
    }

    fn test_mode(&self) -> bool {
        self.data.lock().unwrap().test_mode
    }

    fn set_test_mode(&self, test_mode: bool) -> Result<(), Error> {
        self.data.lock().unwrap().test_mode = test_mode;
        Ok(())
    }

    fn auth_key_for_dc(&self, dc_id: i32) -> Option<[u8; 256]> {
        self.data.lock().unwrap().auth_keys.get(&dc_id).copied()
    }

    fn set_auth_key_for_dc(&self, dc_id: i32, auth_key: &[u8; 256]) -> Result<(), Error> {
        self.data.lock().unwrap().auth_keys.insert(dc_id, *auth_key);
        Ok(())
    }

    fn user(&self) -> Option<User> {
        self.data.lock().unwrap().user
    }

    fn set_user(&self, user: User) -> Result<(), Error> {
        self.data.lock().unwrap().user = Some(user);
        Ok(())
    }

    fn date(&self) -> i32 {
        self.data.lock().unwrap().date
    }

    fn set_date(&self, date: i32) -> Result<(), Error> {
        self.data.lock().unwrap().date = date;
        Ok(())
    }

    fn update_peers(&self, peers: &[PeerInfo]) -> Result<(), Error> {
        let mut data = self.data.lock().unwrap();
        for peer in peers {
            // Keep the secondary indexes in sync when a peer changes its
            // username or phone number.
            if let Some(old) = data.peers.get(&peer.id).cloned() {
                if let Some(username) = old.username {
                    data.peers_by_username.remove(&username);
                }
                if let Some(phone) = old.phone {
                    data.peers_by_phone.remove(&phone);
                }
            }

            if let Some(ref username) = peer.username {
                data.peers_by_username.insert(username.clone(), peer.id);
            }
            if let Some(ref phone) = peer.phone {
                data.peers_by_phone.insert(phone.clone(), peer.id);
            }
            data.peers.insert(peer.id, peer.clone());
        }
        Ok(())
    }

    fn peer_by_id(&self, id: i64) -> Option<PeerInfo> {
        self.data.lock().unwrap().peers.get(&id).cloned()
    }

    fn peer_by_username(&self, username: &str) -> Option<PeerInfo> {
        let data = self.data.lock().unwrap();
        let id = data.peers_by_username.get(username)?;
        data.peers.get(id).cloned()
    }

    fn peer_by_phone(&self, phone: &str) -> Option<PeerInfo> {
        let data = self.data.lock().unwrap();
        let id = data.peers_by_phone.get(phone)?;
        data.peers.get(id).cloned()
    }

    fn update_state(&self) -> Option<UpdateState> {
        self.data.lock().unwrap().update_state
    }

    fn set_update_state(&self, state: UpdateState) -> Result<(), Error> {
        self.data.lock().unwrap().update_state = Some(state);
        Ok(())
    }

    fn channel_pts(&self, channel_id: i64) -> Option<i32> {
        self.data.lock().unwrap().channel_pts.get(&channel_id).copied()
    }

    fn set_channel_pts(&self, channel_id: i64, pts: i32) -> Result<(), Error> {
        self.data.lock().unwrap().channel_pts.insert(channel_id, pts);
        Ok(())
    }

    fn secret_chat(&self, chat_id: i64) -> Option<Vec<u8>> {
        self.data.lock().unwrap().secret_chats.get(&chat_id).cloned()
    }

    fn set_secret_chat(&self, chat_id: i64, data: &[u8]) -> Result<(), Error> {
        self.data
            .lock()
            .unwrap()
            .secret_chats
            .insert(chat_id, data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PeerKind;

    fn peer(id: i64, username: Option<&str>, phone: Option<&str>) -> PeerInfo {
        PeerInfo {
            id,
            hash: Some(id * 10),
            kind: PeerKind::User,
            username: username.map(String::from),
            phone: phone.map(String::from),
        }
    }

    #[test]
    fn fresh_session_points_at_the_default_dc() {
        let session = MemorySession::new();
        assert_eq!(session.home_dc_id(), DEFAULT_DC);
        assert!(session.auth_key_for_dc(DEFAULT_DC).is_none());
    }

    #[test]
    fn peers_are_reachable_by_every_key() {
        let session = MemorySession::new();
        session
            .update_peers(&[peer(1, Some("alice"), Some("123"))])
            .unwrap();

        assert_eq!(session.peer_by_id(1).unwrap().id, 1);
        assert_eq!(session.peer_by_username("alice").unwrap().id, 1);
        assert_eq!(session.peer_by_phone("123").unwrap().id, 1);
        assert!(session.peer_by_username("bob").is_none());
    }

    #[test]
    fn renaming_a_peer_updates_the_indexes() {
        let session = MemorySession::new();
        session
            .update_peers(&[peer(1, Some("alice"), None)])
            .unwrap();
        session
            .update_peers(&[peer(1, Some("alicia"), None)])
            .unwrap();

        assert!(session.peer_by_username("alice").is_none());
        assert_eq!(session.peer_by_username("alicia").unwrap().id, 1);
    }

    #[test]
    fn auth_keys_are_per_dc() {
        let session = MemorySession::new();
        session.set_auth_key_for_dc(2, &[2; 256]).unwrap();
        session.set_auth_key_for_dc(4, &[4; 256]).unwrap();

        assert_eq!(session.auth_key_for_dc(2), Some([2; 256]));
        assert_eq!(session.auth_key_for_dc(4), Some([4; 256]));
        assert_eq!(session.auth_key_for_dc(5), None);
    }
}
