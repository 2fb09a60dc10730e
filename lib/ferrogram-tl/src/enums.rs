// Copyright 2024 - developers of the `ferrogram` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Boxed type definitions. Serializing a boxed type emits the variant's
//! constructor identifier followed by the bare body, and deserialization
//! dispatches on that identifier.
use crate::deserialize::{Cursor, Error, Result};
use crate::{types, Deserializable, Identifiable, Serializable};

/// Declare a boxed enum over previously-defined bare types.
macro_rules! boxed_enum {
    ($(#[$doc:meta])* $name:ident { $($variant:ident => $ty:path),+ $(,)? }) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq)]
        pub enum $name {
            $($variant($ty)),+
        }

        impl Serializable for $name {
            fn serialize(&self, buf: &mut impl Extend<u8>) {
                match self {
                    $(Self::$variant(x) => {
                        <$ty as Identifiable>::CONSTRUCTOR_ID.serialize(buf);
                        x.serialize(buf);
                    })+
                }
            }
        }

        impl Deserializable for $name {
            fn deserialize(buf: &mut Cursor) -> Result<Self> {
                let id = u32::deserialize(buf)?;
                match id {
                    $(<$ty as Identifiable>::CONSTRUCTOR_ID => {
                        Ok(Self::$variant(<$ty>::deserialize(buf)?))
                    })+
                    id => Err(Error::UnexpectedConstructor { id }),
                }
            }
        }

        $(impl From<$ty> for $name {
            fn from(x: $ty) -> Self {
                Self::$variant(x)
            }
        })+
    };
}

boxed_enum!(
    /// `ResPQ`.
    ResPq { Pq => types::ResPq }
);

boxed_enum!(
    /// `P_Q_inner_data`.
    PqInnerData { Data => types::PqInnerData }
);

boxed_enum!(
    /// `Server_DH_Params`.
    ServerDhParams {
        Ok => types::ServerDhParamsOk,
        Fail => types::ServerDhParamsFail,
    }
);

boxed_enum!(
    /// `Server_DH_inner_data`.
    ServerDhInnerData { Data => types::ServerDhInnerData }
);

boxed_enum!(
    /// `Client_DH_Inner_Data`.
    ClientDhInnerData { Data => types::ClientDhInnerData }
);

boxed_enum!(
    /// `Set_client_DH_params_answer`.
    SetClientDhParamsAnswer {
        DhGenOk => types::DhGenOk,
        DhGenRetry => types::DhGenRetry,
        DhGenFail => types::DhGenFail,
    }
);

boxed_enum!(
    /// `RpcError`.
    RpcError { Error => types::RpcError }
);

boxed_enum!(
    /// `Pong`.
    Pong { Pong => types::Pong }
);

boxed_enum!(
    /// `BadMsgNotification`.
    BadMsgNotification {
        Notification => types::BadMsgNotification,
        BadServerSalt => types::BadServerSalt,
    }
);

boxed_enum!(
    /// `MsgsAck`.
    MsgsAck { Ack => types::MsgsAck }
);

boxed_enum!(
    /// `NewSession`.
    NewSession { Created => types::NewSessionCreated }
);

boxed_enum!(
    /// `FutureSalt`.
    FutureSalt { Salt => types::FutureSalt }
);

boxed_enum!(
    /// `FutureSalts`.
    FutureSalts { Salts => types::FutureSalts }
);

boxed_enum!(
    /// `MsgDetailedInfo`.
    MsgDetailedInfo {
        Info => types::MsgDetailedInfo,
        MsgNewDetailedInfo => types::MsgNewDetailedInfo,
    }
);

boxed_enum!(
    /// `MsgsStateReq`.
    MsgsStateReq { Req => types::MsgsStateReq }
);

boxed_enum!(
    /// `MsgsStateInfo`.
    MsgsStateInfo { Info => types::MsgsStateInfo }
);

boxed_enum!(
    /// `MsgsAllInfo`.
    MsgsAllInfo { Info => types::MsgsAllInfo }
);

boxed_enum!(
    /// `MsgResendReq`.
    MsgResendReq { Req => types::MsgResendReq }
);

boxed_enum!(
    /// `DestroySessionRes`.
    DestroySessionRes {
        Ok => types::DestroySessionOk,
        None => types::DestroySessionNone,
    }
);

boxed_enum!(
    /// `HttpWait`.
    HttpWait { Wait => types::HttpWait }
);

boxed_enum!(
    /// `Config`.
    Config { Config => types::Config }
);

boxed_enum!(
    /// `DcOption`.
    DcOption { DcOption => types::DcOption }
);

boxed_enum!(
    /// `FileHash`.
    FileHash { Hash => types::FileHash }
);

boxed_enum!(
    /// `InputFileLocation`.
    InputFileLocation {
        Document => types::InputDocumentFileLocation,
        Photo => types::InputPhotoFileLocation,
    }
);

boxed_enum!(
    /// `InputPeer`.
    InputPeer {
        User => types::InputPeerUser,
        Chat => types::InputPeerChat,
        Channel => types::InputPeerChannel,
    }
);

boxed_enum!(
    /// `InputChannel`.
    InputChannel { Channel => types::InputChannel }
);

boxed_enum!(
    /// `ChannelMessagesFilter`.
    ChannelMessagesFilter { Filter => types::ChannelMessagesFilter }
);

boxed_enum!(
    /// `MessageRange`.
    MessageRange { Range => types::MessageRange }
);

boxed_enum!(
    /// `Peer`.
    Peer {
        User => types::PeerUser,
        Chat => types::PeerChat,
        Channel => types::PeerChannel,
    }
);

boxed_enum!(
    /// `User`.
    User {
        Empty => types::UserEmpty,
        User => types::User,
    }
);

boxed_enum!(
    /// `Chat`.
    Chat {
        Empty => types::ChatEmpty,
        Chat => types::Chat,
        Channel => types::Channel,
    }
);

boxed_enum!(
    /// `Message`.
    Message {
        Empty => types::MessageEmpty,
        Message => types::Message,
    }
);

boxed_enum!(
    /// `Update`.
    Update {
        NewMessage => types::UpdateNewMessage,
        NewChannelMessage => types::UpdateNewChannelMessage,
        EditMessage => types::UpdateEditMessage,
        EditChannelMessage => types::UpdateEditChannelMessage,
        DeleteMessages => types::UpdateDeleteMessages,
        DeleteChannelMessages => types::UpdateDeleteChannelMessages,
        ChannelTooLong => types::UpdateChannelTooLong,
    }
);

/// `Updates`. The `TooLong` variant has no body, so it falls outside the
/// macro above.
#[derive(Clone, Debug, PartialEq)]
pub enum Updates {
    TooLong,
    Short(types::UpdateShort),
    ShortMessage(types::UpdateShortMessage),
    ShortChatMessage(types::UpdateShortChatMessage),
    Combined(types::UpdatesCombined),
    Updates(types::Updates),
}

/// `updatesTooLong#e317af7e = Updates;`
pub const UPDATES_TOO_LONG_ID: u32 = 0xe317af7e;

impl Serializable for Updates {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        match self {
            Self::TooLong => UPDATES_TOO_LONG_ID.serialize(buf),
            Self::Short(x) => {
                types::UpdateShort::CONSTRUCTOR_ID.serialize(buf);
                x.serialize(buf);
            }
            Self::ShortMessage(x) => {
                types::UpdateShortMessage::CONSTRUCTOR_ID.serialize(buf);
                x.serialize(buf);
            }
            Self::ShortChatMessage(x) => {
                types::UpdateShortChatMessage::CONSTRUCTOR_ID.serialize(buf);
                x.serialize(buf);
            }
            Self::Combined(x) => {
                types::UpdatesCombined::CONSTRUCTOR_ID.serialize(buf);
                x.serialize(buf);
            }
            Self::Updates(x) => {
                types::Updates::CONSTRUCTOR_ID.serialize(buf);
                x.serialize(buf);
            }
        }
    }
}

impl Deserializable for Updates {
    fn deserialize(buf: &mut Cursor) -> Result<Self> {
        let id = u32::deserialize(buf)?;
        match id {
            UPDATES_TOO_LONG_ID => Ok(Self::TooLong),
            types::UpdateShort::CONSTRUCTOR_ID => {
                Ok(Self::Short(types::UpdateShort::deserialize(buf)?))
            }
            types::UpdateShortMessage::CONSTRUCTOR_ID => Ok(Self::ShortMessage(
                types::UpdateShortMessage::deserialize(buf)?,
            )),
            types::UpdateShortChatMessage::CONSTRUCTOR_ID => Ok(Self::ShortChatMessage(
                types::UpdateShortChatMessage::deserialize(buf)?,
            )),
            types::UpdatesCombined::CONSTRUCTOR_ID => {
                Ok(Self::Combined(types::UpdatesCombined::deserialize(buf)?))
            }
            types::Updates::CONSTRUCTOR_ID => Ok(Self::Updates(types::Updates::deserialize(buf)?)),
            id => Err(Error::UnexpectedConstructor { id }),
        }
    }
}

pub mod auth {
    //! Boxed types under the `auth.` namespace.
    use super::*;

    boxed_enum!(
        /// `auth.ExportedAuthorization`.
        ExportedAuthorization { Authorization => types::auth::ExportedAuthorization }
    );

    boxed_enum!(
        /// `auth.Authorization`.
        Authorization { Authorization => types::auth::Authorization }
    );
}

pub mod storage {
    //! Boxed types under the `storage.` namespace.
    use super::*;

    boxed_enum!(
        /// `storage.FileType`.
        FileType {
            Unknown => types::storage::FileUnknown,
            Partial => types::storage::FilePartial,
            Jpeg => types::storage::FileJpeg,
            Png => types::storage::FilePng,
            Mp4 => types::storage::FileMp4,
        }
    );
}

pub mod upload {
    //! Boxed types under the `upload.` namespace.
    use super::*;

    boxed_enum!(
        /// `upload.File`.
        File {
            File => types::upload::File,
            CdnRedirect => types::upload::FileCdnRedirect,
        }
    );

    boxed_enum!(
        /// `upload.CdnFile`.
        CdnFile {
            File => types::upload::CdnFile,
            ReuploadNeeded => types::upload::CdnFileReuploadNeeded,
        }
    );
}

pub mod updates {
    //! Boxed types under the `updates.` namespace.
    use super::*;

    boxed_enum!(
        /// `updates.State`.
        State { State => types::updates::State }
    );

    boxed_enum!(
        /// `updates.ChannelDifference`.
        ChannelDifference {
            Empty => types::updates::ChannelDifferenceEmpty,
            TooLong => types::updates::ChannelDifferenceTooLong,
            Difference => types::updates::ChannelDifference,
        }
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Serializable;

    #[test]
    fn boxed_round_trip() {
        let pong = Pong::Pong(types::Pong {
            msg_id: 123,
            ping_id: 456,
        });
        let bytes = pong.to_bytes();
        assert_eq!(&bytes[..4], &0x347773c5u32.to_le_bytes());
        assert_eq!(Pong::from_bytes(&bytes).unwrap(), pong);
    }

    #[test]
    fn boxed_rejects_unknown_constructor() {
        let bytes = 0xdeadbeefu32.to_bytes();
        assert!(matches!(
            Pong::from_bytes(&bytes),
            Err(Error::UnexpectedConstructor { id: 0xdeadbeef })
        ));
    }

    #[test]
    fn flagged_type_round_trip() {
        let user = User::User(types::User {
            bot: true,
            min: false,
            id: 777000,
            access_hash: Some(-1),
            username: Some("telegram".into()),
            phone: None,
        });
        assert_eq!(User::from_bytes(&user.to_bytes()).unwrap(), user);
    }

    #[test]
    fn updates_too_long_is_bare_id() {
        assert_eq!(Updates::TooLong.to_bytes(), 0xe317af7eu32.to_le_bytes());
        assert_eq!(
            Updates::from_bytes(&0xe317af7eu32.to_le_bytes()).unwrap(),
            Updates::TooLong
        );
    }
}
