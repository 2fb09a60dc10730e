// Copyright 2024 - developers of the `ferrogram` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use crate::{Error, PeerInfo, PeerKind, Session, UpdateState, User, DEFAULT_DC};
use std::path::Path;
use std::sync::Mutex;

const VERSION: i64 = 1;

struct Database(sqlite::Connection);

struct TransactionGuard<'c>(&'c sqlite::Connection);

/// SQLite-based storage. This is the recommended option for user
/// accounts, which should not log in from scratch on every run.
pub struct SqliteSession {
    database: Mutex<Database>,
}

impl From<sqlite::Error> for Error {
    fn from(error: sqlite::Error) -> Self {
        Self::Storage(error.to_string())
    }
}

impl Database {
    fn init(&self) -> sqlite::Result<()> {
        let mut user_version = self
            .fetch_one("PRAGMA user_version", &[], |stmt| stmt.read::<i64, _>(0))?
            .unwrap_or(0);
        if user_version == VERSION {
            return Ok(());
        }

        if user_version == 0 {
            self.migrate_v0_to_v1()?;
            user_version += 1;
        }
        if user_version == VERSION {
            // PRAGMA parameters can't be bound, but `VERSION` is not user-controlled input.
            self.0.execute(format!("PRAGMA user_version = {VERSION}"))?;
        }
        Ok(())
    }

    fn migrate_v0_to_v1(&self) -> sqlite::Result<()> {
        let _transaction = self.begin_transaction()?;
        self.0.execute(
            "CREATE TABLE meta (
                home_dc_id INTEGER NOT NULL,
                api_id INTEGER,
                test_mode INTEGER NOT NULL,
                user_id INTEGER,
                user_bot INTEGER,
                date INTEGER NOT NULL)",
        )?;
        self.0.execute(
            "CREATE TABLE dc_auth (
                dc_id INTEGER NOT NULL,
                auth_key BLOB NOT NULL,
                PRIMARY KEY (dc_id))",
        )?;
        self.0.execute(
            "CREATE TABLE peer_info (
                peer_id INTEGER NOT NULL,
                hash INTEGER,
                subtype INTEGER NOT NULL,
                username TEXT UNIQUE,
                phone TEXT UNIQUE,
                PRIMARY KEY (peer_id))",
        )?;
        self.0.execute(
            "CREATE TABLE update_state (
                pts INTEGER NOT NULL,
                qts INTEGER NOT NULL,
                date INTEGER NOT NULL,
                seq INTEGER NOT NULL)",
        )?;
        self.0.execute(
            "CREATE TABLE channel_state (
                peer_id INTEGER NOT NULL,
                pts INTEGER NOT NULL,
                PRIMARY KEY (peer_id))",
        )?;
        self.0.execute(
            "CREATE TABLE secret_chat (
                chat_id INTEGER NOT NULL,
                data BLOB NOT NULL,
                PRIMARY KEY (chat_id))",
        )?;
        self.0.execute(format!(
            "INSERT INTO meta (home_dc_id, test_mode, date) VALUES ({DEFAULT_DC}, 0, 0)"
        ))?;

        Ok(())
    }

    fn begin_transaction(&self) -> sqlite::Result<TransactionGuard<'_>> {
        self.0.execute("BEGIN TRANSACTION")?;
        Ok(TransactionGuard(&self.0))
    }

    fn fetch_one<T, F: FnOnce(sqlite::Statement) -> sqlite::Result<T>>(
        &self,
        statement: &str,
        bindings: &[(&str, sqlite::Value)],
        select: F,
    ) -> sqlite::Result<Option<T>> {
        let mut statement = self.0.prepare(statement)?;
        if !bindings.is_empty() {
            statement.bind(bindings)?;
        }
        let result = match statement.next()? {
            sqlite::State::Row => Some(select(statement)?),
            sqlite::State::Done => None,
        };
        Ok(result)
    }

    fn execute_with(
        &self,
        statement: &str,
        bindings: &[(&str, sqlite::Value)],
    ) -> sqlite::Result<()> {
        let mut statement = self.0.prepare(statement)?;
        statement.bind(bindings)?;
        while statement.next()? != sqlite::State::Done {}
        Ok(())
    }
}

impl Drop for TransactionGuard<'_> {
    fn drop(&mut self) {
        self.0.execute("COMMIT").unwrap();
    }
}

impl SqliteSession {
    /// Open a connection to the SQLite database at `path`, creating one
    /// if it doesn't exist.
    pub fn open<P: AsRef<Path>>(path: P) -> sqlite::Result<Self> {
        let database = Database(sqlite::Connection::open(path)?);
        database.init()?;
        Ok(SqliteSession {
            database: Mutex::new(database),
        })
    }

    fn select_peer(
        database: &Database,
        condition: &str,
        bindings: &[(&str, sqlite::Value)],
    ) -> Option<PeerInfo> {
        database
            .fetch_one(
                &format!(
                    "SELECT peer_id, hash, subtype, username, phone FROM peer_info WHERE {}",
                    condition
                ),
                bindings,
                |stmt| {
                    Ok(PeerInfo {
                        id: stmt.read::<i64, _>("peer_id")?,
                        hash: stmt.read::<Option<i64>, _>("hash")?,
                        kind: PeerKind::from_code(stmt.read::<i64, _>("subtype")?)
                            .unwrap_or(PeerKind::User),
                        username: stmt.read::<Option<String>, _>("username")?,
                        phone: stmt.read::<Option<String>, _>("phone")?,
                    })
                },
            )
            .ok()
            .flatten()
    }
}

impl Session for SqliteSession {
    fn home_dc_id(&self) -> i32 {
        let database = self.database.lock().unwrap();
        database
            .fetch_one("SELECT home_dc_id FROM meta", &[], |stmt| {
                stmt.read::<i64, _>(0)
            })
            .ok()
            .flatten()
            .map(|id| id as i32)
            .unwrap_or(DEFAULT_DC)
    }

    fn set_home_dc_id(&self, dc_id: i32) -> Result<(), Error> {
        let database = self.database.lock().unwrap();
        database.execute_with(
            "UPDATE meta SET home_dc_id = :dc_id",
            &[(":dc_id", (dc_id as i64).into())],
        )?;
        Ok(())
    }

    fn api_id(&self) -> Option<i32> {
        let database = self.database.lock().unwrap();
        database
            .fetch_one("SELECT api_id FROM meta", &[], |stmt| {
                stmt.read::<Option<i64>, _>(0)
            })
            .ok()
            .flatten()
            .flatten()
            .map(|id| id as i32)
    }

    fn set_api_id(&self, api_id: i32) -> Result<(), Error> {
        let database = self.database.lock().unwrap();
        database.execute_with(
            "UPDATE meta SET api_id = :api_id",
            &[(":api_id", (api_id as i64).into())],
        )?;
        Ok(())
    }

    fn test_mode(&self) -> bool {
        let database = self.database.lock().unwrap();
        database
            .fetch_one("SELECT test_mode FROM meta", &[], |stmt| {
                stmt.read::<i64, _>(0)
            })
            .ok()
            .flatten()
            .map(|mode| mode != 0)
            .unwrap_or(false)
    }

    fn set_test_mode(&self, test_mode: bool) -> Result<(), Error> {
        let database = self.database.lock().unwrap();
        database.execute_with(
            "UPDATE meta SET test_mode = :test_mode",
            &[(":test_mode", (test_mode as i64).into())],
        )?;
        Ok(())
    }

    fn auth_key_for_dc(&self, dc_id: i32) -> Option<[u8; 256]> {
        let database = self.database.lock().unwrap();
        database
            .fetch_one(
                "SELECT auth_key FROM dc_auth WHERE dc_id = :dc_id",
                &[(":dc_id", (dc_id as i64).into())],
                |stmt| stmt.read::<Vec<u8>, _>(0),
            )
            .ok()
            .flatten()
            .and_then(|bytes| bytes.try_into().ok())
    }

    fn set_auth_key_for_dc(&self, dc_id: i32, auth_key: &[u8; 256]) -> Result<(), Error> {
        let database = self.database.lock().unwrap();
        database.execute_with(
            "INSERT INTO dc_auth (dc_id, auth_key) VALUES (:dc_id, :auth_key)
                ON CONFLICT (dc_id) DO UPDATE SET auth_key = :auth_key",
            &[
                (":dc_id", (dc_id as i64).into()),
                (":auth_key", auth_key.to_vec().into()),
            ],
        )?;
        Ok(())
    }

    fn user(&self) -> Option<User> {
        let database = self.database.lock().unwrap();
        database
            .fetch_one("SELECT user_id, user_bot FROM meta", &[], |stmt| {
                Ok((
                    stmt.read::<Option<i64>, _>(0)?,
                    stmt.read::<Option<i64>, _>(1)?,
                ))
            })
            .ok()
            .flatten()
            .and_then(|(id, bot)| {
                Some(User {
                    id: id?,
                    bot: bot.unwrap_or(0) != 0,
                })
            })
    }

    fn set_user(&self, user: User) -> Result<(), Error> {
        let database = self.database.lock().unwrap();
        database.execute_with(
            "UPDATE meta SET user_id = :user_id, user_bot = :user_bot",
            &[
                (":user_id", user.id.into()),
                (":user_bot", (user.bot as i64).into()),
            ],
        )?;
        Ok(())
    }

    fn date(&self) -> i32 {
        let database = self.database.lock().unwrap();
        database
            .fetch_one("SELECT date FROM meta", &[], |stmt| stmt.read::<i64, _>(0))
            .ok()
            .flatten()
            .map(|date| date as i32)
            .unwrap_or(0)
    }

    fn set_date(&self, date: i32) -> Result<(), Error> {
        let database = self.database.lock().unwrap();
        database.execute_with(
            "UPDATE meta SET date = :date",
            &[(":date", (date as i64).into())],
        )?;
        Ok(())
    }

    fn update_peers(&self, peers: &[PeerInfo]) -> Result<(), Error> {
        let database = self.database.lock().unwrap();
        let _transaction = database.begin_transaction()?;
        for peer in peers {
            database.execute_with(
                "INSERT INTO peer_info (peer_id, hash, subtype, username, phone)
                    VALUES (:peer_id, :hash, :subtype, :username, :phone)
                    ON CONFLICT (peer_id) DO UPDATE SET
                        hash = :hash, subtype = :subtype,
                        username = :username, phone = :phone",
                &[
                    (":peer_id", peer.id.into()),
                    (
                        ":hash",
                        peer.hash.map(Into::into).unwrap_or(sqlite::Value::Null),
                    ),
                    (":subtype", peer.kind.to_code().into()),
                    (
                        ":username",
                        peer.username
                            .as_deref()
                            .map(Into::into)
                            .unwrap_or(sqlite::Value::Null),
                    ),
                    (
                        ":phone",
                        peer.phone
                            .as_deref()
                            .map(Into::into)
                            .unwrap_or(sqlite::Value::Null),
                    ),
                ],
            )?;
        }
        Ok(())
    }

    fn peer_by_id(&self, id: i64) -> Option<PeerInfo> {
        let database = self.database.lock().unwrap();
        Self::select_peer(&database, "peer_id = :peer_id", &[(":peer_id", id.into())])
    }

    fn peer_by_username(&self, username: &str) -> Option<PeerInfo> {
        let database = self.database.lock().unwrap();
        Self::select_peer(
            &database,
            "username = :username",
            &[(":username", username.into())],
        )
    }

    fn peer_by_phone(&self, phone: &str) -> Option<PeerInfo> {
        let database = self.database.lock().unwrap();
        Self::select_peer(&database, "phone = :phone", &[(":phone", phone.into())])
    }

    fn update_state(&self) -> Option<UpdateState> {
        let database = self.database.lock().unwrap();
        database
            .fetch_one("SELECT pts, qts, date, seq FROM update_state", &[], |stmt| {
                Ok(UpdateState {
                    pts: stmt.read::<i64, _>(0)? as i32,
                    qts: stmt.read::<i64, _>(1)? as i32,
                    date: stmt.read::<i64, _>(2)? as i32,
                    seq: stmt.read::<i64, _>(3)? as i32,
                })
            })
            .ok()
            .flatten()
    }

    fn set_update_state(&self, state: UpdateState) -> Result<(), Error> {
        let database = self.database.lock().unwrap();
        let _transaction = database.begin_transaction()?;
        database.0.execute("DELETE FROM update_state")?;
        database.execute_with(
            "INSERT INTO update_state (pts, qts, date, seq)
                VALUES (:pts, :qts, :date, :seq)",
            &[
                (":pts", (state.pts as i64).into()),
                (":qts", (state.qts as i64).into()),
                (":date", (state.date as i64).into()),
                (":seq", (state.seq as i64).into()),
            ],
        )?;
        Ok(())
    }

    fn channel_pts(&self, channel_id: i64) -> Option<i32> {
        let database = self.database.lock().unwrap();
        database
            .fetch_one(
                "SELECT pts FROM channel_state WHERE peer_id = :peer_id",
                &[(":peer_id", channel_id.into())],
                |stmt| stmt.read::<i64, _>(0),
            )
            .ok()
            .flatten()
            .map(|pts| pts as i32)
    }

    fn set_channel_pts(&self, channel_id: i64, pts: i32) -> Result<(), Error> {
        let database = self.database.lock().unwrap();
        database.execute_with(
            "INSERT INTO channel_state (peer_id, pts) VALUES (:peer_id, :pts)
                ON CONFLICT (peer_id) DO UPDATE SET pts = :pts",
            &[
                (":peer_id", channel_id.into()),
                (":pts", (pts as i64).into()),
            ],
        )?;
        Ok(())
    }

    fn secret_chat(&self, chat_id: i64) -> Option<Vec<u8>> {
        let database = self.database.lock().unwrap();
        database
            .fetch_one(
                "SELECT data FROM secret_chat WHERE chat_id = :chat_id",
                &[(":chat_id", chat_id.into())],
                |stmt| stmt.read::<Vec<u8>, _>(0),
            )
            .ok()
            .flatten()
    }

    fn set_secret_chat(&self, chat_id: i64, data: &[u8]) -> Result<(), Error> {
        let database = self.database.lock().unwrap();
        database.execute_with(
            "INSERT INTO secret_chat (chat_id, data) VALUES (:chat_id, :data)
                ON CONFLICT (chat_id) DO UPDATE SET data = :data",
            &[
                (":chat_id", chat_id.into()),
                (":data", data.to_vec().into()),
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp() -> SqliteSession {
        SqliteSession::open(":memory:").unwrap()
    }

    #[test]
    fn fresh_database_has_defaults() {
        let session = open_temp();
        assert_eq!(session.home_dc_id(), DEFAULT_DC);
        assert!(!session.test_mode());
        assert!(session.user().is_none());
        assert!(session.api_id().is_none());
    }

    #[test]
    fn meta_round_trips() {
        let session = open_temp();
        session.set_home_dc_id(4).unwrap();
        session.set_api_id(1234).unwrap();
        session.set_test_mode(true).unwrap();
        session.set_user(User { id: 777, bot: true }).unwrap();
        session.set_date(1700000000).unwrap();

        assert_eq!(session.home_dc_id(), 4);
        assert_eq!(session.api_id(), Some(1234));
        assert!(session.test_mode());
        assert_eq!(session.user(), Some(User { id: 777, bot: true }));
        assert_eq!(session.date(), 1700000000);
    }

    #[test]
    fn auth_keys_round_trip() {
        let session = open_temp();
        session.set_auth_key_for_dc(2, &[7; 256]).unwrap();
        assert_eq!(session.auth_key_for_dc(2), Some([7; 256]));
        assert_eq!(session.auth_key_for_dc(3), None);

        // Overwriting replaces the previous key.
        session.set_auth_key_for_dc(2, &[8; 256]).unwrap();
        assert_eq!(session.auth_key_for_dc(2), Some([8; 256]));
    }

    #[test]
    fn peers_query_by_secondary_keys() {
        let session = open_temp();
        session
            .update_peers(&[
                PeerInfo {
                    id: 1,
                    hash: Some(10),
                    kind: PeerKind::User,
                    username: Some("alice".into()),
                    phone: Some("123".into()),
                },
                PeerInfo {
                    id: 2,
                    hash: None,
                    kind: PeerKind::Broadcast,
                    username: Some("channel".into()),
                    phone: None,
                },
            ])
            .unwrap();

        assert_eq!(session.peer_by_id(1).unwrap().username.as_deref(), Some("alice"));
        assert_eq!(session.peer_by_username("channel").unwrap().id, 2);
        assert_eq!(session.peer_by_phone("123").unwrap().id, 1);
        assert_eq!(session.peer_by_id(2).unwrap().kind, PeerKind::Broadcast);
        assert!(session.peer_by_phone("999").is_none());
    }

    #[test]
    fn update_state_replaces_itself() {
        let session = open_temp();
        assert!(session.update_state().is_none());

        session
            .set_update_state(UpdateState {
                pts: 1,
                qts: 2,
                date: 3,
                seq: 4,
            })
            .unwrap();
        session
            .set_update_state(UpdateState {
                pts: 10,
                qts: 2,
                date: 3,
                seq: 5,
            })
            .unwrap();

        assert_eq!(session.update_state().unwrap().pts, 10);
    }

    #[test]
    fn channel_and_secret_chat_rows() {
        let session = open_temp();
        session.set_channel_pts(100, 7).unwrap();
        session.set_channel_pts(100, 8).unwrap();
        assert_eq!(session.channel_pts(100), Some(8));
        assert_eq!(session.channel_pts(101), None);

        session.set_secret_chat(5, &[1, 2, 3]).unwrap();
        assert_eq!(session.secret_chat(5), Some(vec![1, 2, 3]));
    }
}
