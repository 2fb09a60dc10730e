// Copyright 2024 - developers of the `ferrogram` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::fmt;

/// Error raised by a [`crate::Session`] storage.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// The underlying storage failed to read or write.
    Storage(String),

    /// The stored data is malformed and cannot be interpreted.
    Malformed(String),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(detail) => write!(f, "session storage error: {detail}"),
            Self::Malformed(detail) => write!(f, "malformed session data: {detail}"),
        }
    }
}

/// The different kinds of peers a chat identifier may refer to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeerKind {
    User,
    Bot,
    Group,
    Megagroup,
    Broadcast,
}

impl PeerKind {
    pub(crate) fn to_code(self) -> i64 {
        match self {
            Self::User => 1,
            Self::Bot => 2,
            Self::Group => 3,
            Self::Megagroup => 4,
            Self::Broadcast => 5,
        }
    }

    pub(crate) fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            1 => Self::User,
            2 => Self::Bot,
            3 => Self::Group,
            4 => Self::Megagroup,
            5 => Self::Broadcast,
            _ => return None,
        })
    }
}

/// A peer row: identity, access hash, and the secondary keys peers can
/// be looked up by.
#[derive(Clone, Debug, PartialEq)]
pub struct PeerInfo {
    pub id: i64,
    pub hash: Option<i64>,
    pub kind: PeerKind,
    pub username: Option<String>,
    pub phone: Option<String>,
}

/// The logged-in user.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct User {
    pub id: i64,
    pub bot: bool,
}

/// The portion of the update state that is common to all chats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UpdateState {
    pub pts: i32,
    pub qts: i32,
    pub date: i32,
    pub seq: i32,
}
