// Copyright 2024 - developers of the `ferrogram` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
pub mod files;
mod net;
mod updates;

use crate::cache::MessageCache;
use crate::dispatcher::{Dispatcher, DispatcherHandle, Handler, Middleware};
use ferrogram_mtproto::{mtp, transport};
use ferrogram_mtsender::{
    ExponentialBackoff, InvocationError, ReconnectionPolicy, Sender,
};
use ferrogram_session::Session;
use ferrogram_tl::{self as tl, Serializable};
use futures_util::future::FutureExt as _;
use futures_util::{future, pin_mut};
use log::{info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, Semaphore};
use tokio::time::Instant;

/// When no locale can be found, use this one instead.
const DEFAULT_LOCALE: &str = "en";

/// If no update arrives for this long, `updates.getState` is invoked to
/// nudge the server into talking to us again.
const UPDATES_WATCHDOG_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Configuration required to create a [`Client`] instance.
pub struct Config {
    /// Session storage where data should persist: authorization keys,
    /// the home datacenter, peers, and the update state.
    pub session: Arc<dyn Session>,

    /// Developer's API ID, required to interact with Telegram's API.
    ///
    /// You may obtain your own in <https://my.telegram.org/auth>.
    pub api_id: i32,

    /// Developer's API hash, required to interact with Telegram's API.
    pub api_hash: String,

    /// Additional initialization parameters with sane defaults.
    pub params: InitParams,
}

/// Optional initialization parameters.
#[derive(Clone)]
pub struct InitParams {
    pub device_model: String,
    pub system_version: String,
    pub app_version: String,
    pub system_lang_code: String,
    pub lang_code: String,

    /// A `FLOOD_WAIT_N` at or below this many seconds makes the client
    /// sleep and retry instead of failing the request.
    pub flood_sleep_threshold: u32,

    /// Size of the dispatcher's worker pool.
    pub workers: usize,

    /// How many concurrent uploads/downloads are allowed.
    pub max_concurrent_transmissions: usize,

    /// Capacity of the message-by-id cache.
    pub message_cache_size: usize,

    /// When set, channels outside this allow-list skip min-peer
    /// recovery and their new-message updates are ignored.
    pub ignore_channel_updates_except: Option<Vec<i64>>,

    /// Prefer IPv6 endpoints when connecting.
    pub use_ipv6: bool,

    /// How dropped connections are retried.
    pub reconnection_policy: Arc<dyn ReconnectionPolicy>,
}

impl Default for InitParams {
    fn default() -> Self {
        let info = os_info::get();

        let mut system_lang_code = locate_locale::system();
        if system_lang_code.is_empty() {
            system_lang_code.push_str(DEFAULT_LOCALE);
        }

        let mut lang_code = locate_locale::user();
        if lang_code.is_empty() {
            lang_code.push_str(DEFAULT_LOCALE);
        }

        Self {
            device_model: format!("{} {}", info.os_type(), info.bitness()),
            system_version: info.version().to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            system_lang_code,
            lang_code,
            flood_sleep_threshold: 10,
            workers: crate::dispatcher::default_worker_count(),
            max_concurrent_transmissions: 1,
            message_cache_size: 10_000,
            ignore_channel_updates_except: None,
            use_ipv6: false,
            reconnection_policy: Arc::new(ExponentialBackoff::default()),
        }
    }
}

/// Requests a [`ClientHandle`] can make to the IO loop that owns the
/// connection.
pub(crate) enum HandleRequest {
    Rpc {
        body: Vec<u8>,
        response: oneshot::Sender<oneshot::Receiver<Result<Vec<u8>, InvocationError>>>,
    },
    Disconnect {
        response: oneshot::Sender<()>,
    },
}

/// A raw, cloneable channel into one connection's IO loop.
#[derive(Clone)]
pub(crate) struct RawHandle {
    tx: mpsc::UnboundedSender<HandleRequest>,
}

impl RawHandle {
    /// Enqueue a serialized request and await its serialized response,
    /// within the given deadline.
    pub(crate) async fn invoke_body(
        &self,
        body: Vec<u8>,
        timeout: Duration,
    ) -> Result<Vec<u8>, InvocationError> {
        let (response, rx) = oneshot::channel();
        if self
            .tx
            .send(HandleRequest::Rpc { body, response })
            .is_err()
        {
            return Err(InvocationError::Dropped);
        }

        let inner_rx = match rx.await {
            Ok(inner_rx) => inner_rx,
            Err(_) => return Err(InvocationError::Dropped),
        };

        match tokio::time::timeout(timeout, inner_rx).await {
            // Late responses for a request abandoned here are discarded
            // by the connection when they eventually arrive.
            Err(_) => Err(InvocationError::Timeout),
            Ok(Err(_)) => Err(InvocationError::Dropped),
            Ok(Ok(result)) => result,
        }
    }

    pub(crate) async fn disconnect(&self) {
        let (response, rx) = oneshot::channel();
        if self.tx.send(HandleRequest::Disconnect { response }).is_ok() {
            let _ = rx.await;
        }
    }
}

/// A media or CDN connection spawned on demand, driven by its own task.
pub(crate) struct MediaSession {
    pub(crate) handle: RawHandle,
    pub(crate) task: tokio::task::JoinHandle<()>,
}

/// State shared between the [`Client`] and every [`ClientHandle`].
pub(crate) struct ClientShared {
    pub(crate) session: Arc<dyn Session>,
    pub(crate) api_id: i32,
    #[allow(dead_code)]
    pub(crate) api_hash: String,
    pub(crate) params: InitParams,
    pub(crate) handle_tx: mpsc::UnboundedSender<HandleRequest>,
    pub(crate) media_sessions: tokio::sync::Mutex<HashMap<i32, MediaSession>>,
    pub(crate) auth_exported_to: tokio::sync::Mutex<Vec<i32>>,
    pub(crate) get_file_semaphore: Arc<Semaphore>,
    pub(crate) save_file_semaphore: Arc<Semaphore>,
    pub(crate) message_cache: StdMutex<MessageCache<(i64, i32), tl::types::Message>>,
    pub(crate) dispatch: DispatcherHandle,
    pub(crate) dc_addresses: net::DcAddresses,
}

impl ClientShared {
    pub(crate) fn home_handle(&self) -> RawHandle {
        RawHandle {
            tx: self.handle_tx.clone(),
        }
    }
}

/// The result of a single [`Client::step`].
pub enum Step {
    /// The connection is healthy.
    Connected,
    /// A graceful disconnection was requested.
    Disconnected,
}

/// A client connected to Telegram's API, owning the home-datacenter
/// connection and driving all of its IO.
///
/// Obtain cloneable [`ClientHandle`]s with [`Client::handle`] to invoke
/// requests concurrently while [`Client::run_until_disconnected`] (or a
/// manual [`Client::step`] loop) keeps the connection moving.
pub struct Client {
    pub(crate) sender: Sender<transport::Full, mtp::Encrypted>,
    pub(crate) shared: Arc<ClientShared>,
    handle_rx: mpsc::UnboundedReceiver<HandleRequest>,
    dispatcher: Dispatcher,
    last_update: Instant,
}

/// A cloneable handle used to invoke requests through a [`Client`].
#[derive(Clone)]
pub struct ClientHandle {
    pub(crate) shared: Arc<ClientShared>,
}

impl Client {
    /// Connect to Telegram using the session's home datacenter.
    ///
    /// If the session has no authorization key for it, one is generated
    /// and persisted. The connection is always initialized with
    /// `invokeWithLayer(initConnection(...))` before anything else.
    pub async fn connect(config: Config) -> Result<Self, InvocationError> {
        let Config {
            session,
            api_id,
            api_hash,
            params,
        } = config;

        session
            .set_api_id(api_id)
            .map_err(|e| io_error(&e.to_string()))?;

        let dc_id = session.home_dc_id();
        let dc_addresses = net::DcAddresses::default();
        let (sender, remote_config) =
            net::connect_sender(dc_id, &session, api_id, &params, false, &dc_addresses).await?;

        session
            .set_home_dc_id(remote_config.this_dc)
            .map_err(|e| io_error(&e.to_string()))?;
        session
            .set_date(remote_config.date)
            .map_err(|e| io_error(&e.to_string()))?;

        let (handle_tx, handle_rx) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher::new(params.workers);
        let shared = Arc::new(ClientShared {
            session,
            api_id,
            api_hash,
            get_file_semaphore: Arc::new(Semaphore::new(params.max_concurrent_transmissions)),
            save_file_semaphore: Arc::new(Semaphore::new(params.max_concurrent_transmissions)),
            message_cache: StdMutex::new(MessageCache::with_capacity(params.message_cache_size)),
            media_sessions: tokio::sync::Mutex::new(HashMap::new()),
            auth_exported_to: tokio::sync::Mutex::new(Vec::new()),
            dispatch: dispatcher.handle(),
            dc_addresses,
            handle_tx,
            params,
        });

        Ok(Self {
            sender,
            shared,
            handle_rx,
            dispatcher,
            last_update: Instant::now(),
        })
    }

    /// Return a new [`ClientHandle`] that can invoke remote procedure
    /// calls concurrently with the IO loop.
    pub fn handle(&self) -> ClientHandle {
        ClientHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Register an update handler under a group; lower groups are
    /// offered updates first. Must be called before the dispatcher
    /// starts running.
    pub fn add_handler(&mut self, group: i32, handler: Handler) {
        self.dispatcher.add_handler(group, handler);
    }

    /// Register a middleware around the update dispatch.
    pub fn add_middleware(&mut self, middleware: Middleware) {
        self.dispatcher.add_middleware(middleware);
    }

    /// Invoke a raw API call without going through a handle.
    pub async fn invoke<R: tl::RemoteCall>(
        &mut self,
        request: &R,
    ) -> Result<R::Return, InvocationError> {
        self.sender.invoke(request).await
    }

    /// Perform a single network step, processing incoming requests from
    /// handles and feeding received updates to the dispatcher.
    pub async fn step(&mut self) -> Result<Step, InvocationError> {
        if !self.dispatcher.is_running() {
            self.dispatcher.start();
        }

        let (network, request) = {
            let network = self.sender.step();
            let request = self.handle_rx.recv();
            pin_mut!(network);
            pin_mut!(request);
            match future::select(network, request).await {
                future::Either::Left((network, request)) => {
                    let request = request.now_or_never();
                    (Some(network), request)
                }
                future::Either::Right((request, network)) => {
                    let network = network.now_or_never();
                    (network, Some(request))
                }
            }
        };

        if let Some(request) = request {
            match request {
                Some(HandleRequest::Rpc { body, response }) => {
                    drop(response.send(self.sender.enqueue_body(body)));
                }
                Some(HandleRequest::Disconnect { response }) => {
                    drop(response.send(()));
                    self.teardown().await;
                    return Ok(Step::Disconnected);
                }
                // All handles are gone; the connection can't be useful.
                None => {
                    self.teardown().await;
                    return Ok(Step::Disconnected);
                }
            }
        }

        match network {
            Some(Ok(raw_updates)) => {
                if !raw_updates.is_empty() {
                    self.last_update = Instant::now();
                    let shared = Arc::clone(&self.shared);
                    let handle = self.handle();
                    tokio::spawn(async move {
                        updates::process_raw_batch(shared, handle, raw_updates).await;
                    });
                }
            }
            Some(Err(err)) => {
                warn!("network step failed: {}; attempting to reconnect", err);
                self.reconnect().await?;
            }
            None => {}
        }

        // A stale connection may silently stop receiving updates; ask
        // for the state to wake the server up.
        if self.last_update.elapsed() >= UPDATES_WATCHDOG_INTERVAL {
            info!("no updates in a while; invoking updates.getState");
            self.last_update = Instant::now();
            drop(self.sender.enqueue_body(tl::functions::updates::GetState.to_bytes()));
        }

        Ok(Step::Connected)
    }

    /// Run the client by repeatedly stepping it until a graceful
    /// disconnection occurs or the retry policy gives up on an error.
    pub async fn run_until_disconnected(mut self) -> Result<(), InvocationError> {
        loop {
            match self.step().await? {
                Step::Connected => continue,
                Step::Disconnected => break Ok(()),
            }
        }
    }

    /// Re-establish the home connection, carrying every unresolved
    /// request over so it is sent again on the new session.
    async fn reconnect(&mut self) -> Result<(), InvocationError> {
        let mut pending = Some(self.sender.take_requests());
        let policy = Arc::clone(&self.shared.params.reconnection_policy);
        let dc_id = self.shared.session.home_dc_id();

        let mut attempts = 0;
        loop {
            match policy.should_retry(attempts) {
                std::ops::ControlFlow::Continue(delay) => {
                    tokio::time::sleep(delay).await;
                }
                std::ops::ControlFlow::Break(()) => {
                    // Nobody will resolve the carried-over requests;
                    // dropping their channels fails them as `Dropped`.
                    return Err(io_error("reconnection attempts exhausted"));
                }
            }
            attempts += 1;

            match net::connect_sender(
                dc_id,
                &self.shared.session,
                self.shared.api_id,
                &self.shared.params,
                false,
                &self.shared.dc_addresses,
            )
            .await
            {
                Ok((mut sender, _config)) => {
                    info!("reconnected after {} attempt(s)", attempts);
                    for request in pending.take().unwrap_or_default() {
                        sender.enqueue_request(request);
                    }
                    self.sender = sender;
                    return Ok(());
                }
                Err(e) => {
                    warn!("reconnect attempt {} failed: {}", attempts, e);
                }
            }
        }
    }

    /// Stop the dispatcher and every media session.
    async fn teardown(&mut self) {
        self.dispatcher.stop().await;

        let mut media_sessions = self.shared.media_sessions.lock().await;
        for (dc_id, session) in media_sessions.drain() {
            info!("closing media session to dc {}", dc_id);
            session.task.abort();
        }
    }
}

impl ClientHandle {
    /// Look up a recently-seen message in the bounded cache.
    pub fn cached_message(&self, chat_id: i64, message_id: i32) -> Option<tl::types::Message> {
        self.shared
            .message_cache
            .lock()
            .unwrap()
            .get(&(chat_id, message_id))
            .cloned()
    }

    /// Gracefully tell the client to disconnect and stop the IO loop.
    pub async fn disconnect(&self) {
        self.shared.home_handle().disconnect().await;
    }
}

pub(crate) fn io_error(message: &str) -> InvocationError {
    InvocationError::Io(std::io::Error::new(std::io::ErrorKind::Other, message))
}
