// Copyright 2024 - developers of the `ferrogram` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The pipeline between the connection and the dispatcher: decode raw
//! update payloads, persist the peers they carry, recover full channel
//! information for `min` peers, and enqueue everything for dispatch.
use super::{ClientHandle, ClientShared};
use crate::dispatcher::UpdateContext;
use ferrogram_session::{PeerInfo, PeerKind};
use ferrogram_tl::{self as tl, Deserializable};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::Arc;

/// Process one batch of raw update payloads from the connection.
pub(crate) async fn process_raw_batch(
    shared: Arc<ClientShared>,
    client: ClientHandle,
    raw_updates: Vec<Vec<u8>>,
) {
    for raw in raw_updates {
        match tl::enums::Updates::from_bytes(&raw) {
            Ok(updates) => process_updates(&shared, &client, updates).await,
            Err(e) => {
                // Not necessarily fatal: the server may be speaking a
                // newer layer than this subset understands.
                warn!("dropping updates that failed to be deserialized: {}", e);
            }
        }
    }
}

async fn process_updates(
    shared: &Arc<ClientShared>,
    client: &ClientHandle,
    updates: tl::enums::Updates,
) {
    match updates {
        tl::enums::Updates::Updates(batch) => {
            process_update_group(shared, client, batch.updates, batch.users, batch.chats).await
        }
        tl::enums::Updates::Combined(batch) => {
            process_update_group(shared, client, batch.updates, batch.users, batch.chats).await
        }
        tl::enums::Updates::Short(short) => {
            dispatch(shared, short.update, &UpdateContext::default()).await;
        }
        tl::enums::Updates::ShortMessage(short) => {
            let update = upgrade_short_message(
                short.id,
                tl::enums::Peer::User(tl::types::PeerUser {
                    user_id: short.user_id,
                }),
                short.out,
                short.user_id,
                short.message,
                short.date,
                short.pts,
                short.pts_count,
            );
            dispatch(shared, update, &UpdateContext::default()).await;
        }
        tl::enums::Updates::ShortChatMessage(short) => {
            let update = upgrade_short_message(
                short.id,
                tl::enums::Peer::Chat(tl::types::PeerChat {
                    chat_id: short.chat_id,
                }),
                short.out,
                short.from_id,
                short.message,
                short.date,
                short.pts,
                short.pts_count,
            );
            dispatch(shared, update, &UpdateContext::default()).await;
        }
        tl::enums::Updates::TooLong => {
            // There is a gap between what we have and what the server
            // holds; the watchdog's `updates.getState` nudges it.
            info!("server reported too many updates to deliver");
        }
    }
}

/// Short updates carry the message inline; rebuild the regular update
/// shape so a single code path (and handler kind) serves both.
#[allow(clippy::too_many_arguments)]
fn upgrade_short_message(
    id: i32,
    peer: tl::enums::Peer,
    out: bool,
    from_user_id: i64,
    message: String,
    date: i32,
    pts: i32,
    pts_count: i32,
) -> tl::enums::Update {
    let from = if out {
        None
    } else {
        Some(tl::enums::Peer::User(tl::types::PeerUser {
            user_id: from_user_id,
        }))
    };

    tl::enums::Update::NewMessage(tl::types::UpdateNewMessage {
        message: tl::enums::Message::Message(tl::types::Message {
            id,
            from_id: from,
            peer_id: peer,
            date,
            message,
        }),
        pts,
        pts_count,
    })
}

async fn process_update_group(
    shared: &Arc<ClientShared>,
    client: &ClientHandle,
    updates: Vec<tl::enums::Update>,
    users: Vec<tl::enums::User>,
    chats: Vec<tl::enums::Chat>,
) {
    let is_min = store_peers(shared, &users, &chats);

    let mut user_map: HashMap<i64, tl::types::User> = users
        .into_iter()
        .filter_map(|user| match user {
            tl::enums::User::User(user) => Some((user.id, user)),
            tl::enums::User::Empty(_) => None,
        })
        .collect();
    let mut chat_map: HashMap<i64, tl::enums::Chat> = chats
        .into_iter()
        .map(|chat| (chat_id_of(&chat), chat))
        .collect();

    for update in updates {
        if let tl::enums::Update::NewChannelMessage(u) = &update {
            let channel_id = match message_channel_id(&u.message) {
                Some(id) => id,
                None => {
                    dispatch_with_maps(shared, update, &user_map, &chat_map).await;
                    continue;
                }
            };

            // A caller-provided allow-list restricts which channels are
            // worth the recovery round-trip; the rest are dropped.
            if let Some(allowed) = &shared.params.ignore_channel_updates_except {
                if !allowed.contains(&channel_id) {
                    debug!("ignoring channel {} update (not in allow-list)", channel_id);
                    continue;
                }
            }

            if is_min && !matches!(u.message, tl::enums::Message::Empty(_)) {
                recover_channel_difference(
                    shared,
                    client,
                    channel_id,
                    &u.message,
                    u.pts,
                    u.pts_count,
                    &mut user_map,
                    &mut chat_map,
                )
                .await;
            }
        }

        dispatch_with_maps(shared, update, &user_map, &chat_map).await;
    }
}

/// Persist the peers carried alongside an update batch, and report
/// whether any of them was a `min` peer (incomplete, without a usable
/// access hash).
fn store_peers(
    shared: &Arc<ClientShared>,
    users: &[tl::enums::User],
    chats: &[tl::enums::Chat],
) -> bool {
    let mut is_min = false;
    let mut peers = Vec::with_capacity(users.len() + chats.len());

    for user in users {
        if let tl::enums::User::User(user) = user {
            if user.min {
                is_min = true;
                continue;
            }
            peers.push(PeerInfo {
                id: user.id,
                hash: user.access_hash,
                kind: if user.bot { PeerKind::Bot } else { PeerKind::User },
                username: user.username.clone(),
                phone: user.phone.clone(),
            });
        }
    }

    for chat in chats {
        match chat {
            tl::enums::Chat::Chat(chat) => peers.push(PeerInfo {
                id: chat.id,
                hash: None,
                kind: PeerKind::Group,
                username: None,
                phone: None,
            }),
            tl::enums::Chat::Channel(channel) => {
                if channel.min {
                    is_min = true;
                    continue;
                }
                peers.push(PeerInfo {
                    id: channel.id,
                    hash: channel.access_hash,
                    kind: if channel.megagroup {
                        PeerKind::Megagroup
                    } else {
                        PeerKind::Broadcast
                    },
                    username: channel.username.clone(),
                    phone: None,
                });
            }
            tl::enums::Chat::Empty(_) => {}
        }
    }

    if let Err(e) = shared.session.update_peers(&peers) {
        warn!("failed to persist {} peer(s): {}", peers.len(), e);
    }

    is_min
}

/// Ask the server for the channel's difference around one message so the
/// full (non-`min`) sender and chat records become available before the
/// update is dispatched.
#[allow(clippy::too_many_arguments)]
async fn recover_channel_difference(
    shared: &Arc<ClientShared>,
    client: &ClientHandle,
    channel_id: i64,
    message: &tl::enums::Message,
    pts: i32,
    pts_count: i32,
    user_map: &mut HashMap<i64, tl::types::User>,
    chat_map: &mut HashMap<i64, tl::enums::Chat>,
) {
    let access_hash = match shared.session.peer_by_id(channel_id).and_then(|p| p.hash) {
        Some(hash) => hash,
        None => {
            debug!(
                "cannot recover channel {}: no stored access hash",
                channel_id
            );
            return;
        }
    };

    let message_id = match message {
        tl::enums::Message::Message(m) => m.id,
        tl::enums::Message::Empty(m) => m.id,
    };

    let request = tl::functions::updates::GetChannelDifference {
        force: false,
        channel: tl::enums::InputChannel::Channel(tl::types::InputChannel {
            channel_id,
            access_hash,
        }),
        filter: tl::enums::ChannelMessagesFilter::Filter(tl::types::ChannelMessagesFilter {
            exclude_new_messages: false,
            ranges: vec![tl::enums::MessageRange::Range(tl::types::MessageRange {
                min_id: message_id,
                max_id: message_id,
            })],
        }),
        pts: pts - pts_count,
        limit: pts,
    };

    let difference = match client.invoke(&request).await {
        Ok(difference) => difference,
        Err(e) => {
            debug!("channel difference for {} failed: {}", channel_id, e);
            return;
        }
    };

    let (users, chats) = match difference {
        tl::enums::updates::ChannelDifference::Empty(_) => return,
        tl::enums::updates::ChannelDifference::Difference(d) => (d.users, d.chats),
        tl::enums::updates::ChannelDifference::TooLong(d) => (d.users, d.chats),
    };

    store_peers(shared, &users, &chats);
    for user in users {
        if let tl::enums::User::User(user) = user {
            user_map.insert(user.id, user);
        }
    }
    for chat in chats {
        chat_map.insert(chat_id_of(&chat), chat);
    }
}

async fn dispatch_with_maps(
    shared: &Arc<ClientShared>,
    update: tl::enums::Update,
    user_map: &HashMap<i64, tl::types::User>,
    chat_map: &HashMap<i64, tl::enums::Chat>,
) {
    let context = UpdateContext {
        users: Arc::new(user_map.clone()),
        chats: Arc::new(chat_map.clone()),
    };
    dispatch(shared, update, &context).await;
}

async fn dispatch(
    shared: &Arc<ClientShared>,
    update: tl::enums::Update,
    context: &UpdateContext,
) {
    cache_message(shared, &update);
    shared.dispatch.enqueue(update, context.clone()).await;
}

/// Remember freshly-parsed messages in the bounded cache so callbacks
/// can find them by `(chat_id, message_id)` without a server query.
fn cache_message(shared: &Arc<ClientShared>, update: &tl::enums::Update) {
    let message = match update {
        tl::enums::Update::NewMessage(u) => &u.message,
        tl::enums::Update::NewChannelMessage(u) => &u.message,
        tl::enums::Update::EditMessage(u) => &u.message,
        tl::enums::Update::EditChannelMessage(u) => &u.message,
        _ => return,
    };

    if let tl::enums::Message::Message(message) = message {
        let chat_id = peer_id_of(&message.peer_id);
        shared
            .message_cache
            .lock()
            .unwrap()
            .insert((chat_id, message.id), message.clone());
    }
}

fn peer_id_of(peer: &tl::enums::Peer) -> i64 {
    match peer {
        tl::enums::Peer::User(p) => p.user_id,
        tl::enums::Peer::Chat(p) => p.chat_id,
        tl::enums::Peer::Channel(p) => p.channel_id,
    }
}

fn chat_id_of(chat: &tl::enums::Chat) -> i64 {
    match chat {
        tl::enums::Chat::Empty(c) => c.id,
        tl::enums::Chat::Chat(c) => c.id,
        tl::enums::Chat::Channel(c) => c.id,
    }
}

fn message_channel_id(message: &tl::enums::Message) -> Option<i64> {
    let peer = match message {
        tl::enums::Message::Message(m) => Some(&m.peer_id),
        tl::enums::Message::Empty(m) => m.peer_id.as_ref(),
    }?;

    match peer {
        tl::enums::Peer::Channel(channel) => Some(channel.channel_id),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_messages_become_new_message_updates() {
        let update = upgrade_short_message(
            7,
            tl::enums::Peer::Chat(tl::types::PeerChat { chat_id: 5 }),
            false,
            3,
            "hello".into(),
            1700000000,
            100,
            1,
        );

        match update {
            tl::enums::Update::NewMessage(u) => {
                assert_eq!(u.pts, 100);
                match u.message {
                    tl::enums::Message::Message(m) => {
                        assert_eq!(m.id, 7);
                        assert_eq!(m.message, "hello");
                        assert_eq!(
                            m.from_id,
                            Some(tl::enums::Peer::User(tl::types::PeerUser { user_id: 3 }))
                        );
                    }
                    _ => panic!("expected a full message"),
                }
            }
            _ => panic!("expected a new message update"),
        }
    }

    #[test]
    fn channel_ids_are_extracted_from_messages() {
        let message = tl::enums::Message::Message(tl::types::Message {
            id: 1,
            from_id: None,
            peer_id: tl::enums::Peer::Channel(tl::types::PeerChannel { channel_id: 99 }),
            date: 0,
            message: String::new(),
        });
        assert_eq!(message_channel_id(&message), Some(99));

        let message = tl::enums::Message::Message(tl::types::Message {
            id: 1,
            from_id: None,
            peer_id: tl::enums::Peer::User(tl::types::PeerUser { user_id: 1 }),
            date: 0,
            message: String::new(),
        });
        assert_eq!(message_channel_id(&message), None);
    }
}
