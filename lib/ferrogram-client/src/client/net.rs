// Copyright 2024 - developers of the `ferrogram` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Method implementations directly related with network connectivity:
//! connecting senders, the invocation facade with flood-wait handling,
//! and the per-datacenter media sessions.
use super::{io_error, ClientHandle, HandleRequest, InitParams, MediaSession, RawHandle};
use ferrogram_mtproto::{mtp, transport};
use ferrogram_mtsender::{
    self as sender, InvocationError, ReconnectionPolicy, Sender, ServerAddr,
};
use ferrogram_session::{find_dc_option, Session};
use ferrogram_tl::{self as tl, Deserializable, RemoteCall, Serializable};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

/// Deadline for ordinary requests.
pub(crate) const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Deadline for requests that move file chunks around, which are larger
/// and slower than anything else.
pub(crate) const TRANSFER_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Datacenter addresses learned from the server's configuration at
/// runtime. CDN datacenters in particular only exist here, since their
/// identifiers are not part of the compiled-in table.
pub(crate) type DcAddresses = Arc<StdMutex<HashMap<i32, SocketAddr>>>;

/// Open a connection to the given datacenter, generating (and saving) an
/// authorization key for it if the session has none, and initialize it
/// with `invokeWithLayer(initConnection(help.getConfig))`.
pub(crate) async fn connect_sender(
    dc_id: i32,
    session: &Arc<dyn Session>,
    api_id: i32,
    params: &InitParams,
    media: bool,
    dc_addresses: &DcAddresses,
) -> Result<(Sender<transport::Full, mtp::Encrypted>, tl::types::Config), InvocationError> {
    let address = match find_dc_option(dc_id, session.test_mode(), media, params.use_ipv6) {
        Some(option) => option.address(params.use_ipv6),
        None => dc_addresses
            .lock()
            .unwrap()
            .get(&dc_id)
            .copied()
            .ok_or(InvocationError::InvalidDc)?,
    };
    let addr = ServerAddr::Tcp { address };

    let transport = transport::Full::new();
    let mut sender = if let Some(auth_key) = session.auth_key_for_dc(dc_id) {
        info!(
            "creating a new sender with existing auth key to dc {} {}",
            dc_id, addr
        );
        sender::connect_with_auth(transport, addr, auth_key).await?
    } else {
        info!("creating a new sender and auth key in dc {} {}", dc_id, addr);
        let sender = sender::connect(transport, addr).await?;

        session
            .set_auth_key_for_dc(dc_id, &sender.auth_key())
            .map_err(|e| io_error(&e.to_string()))?;
        sender
    };

    // The connection must be initialized before any other request; the
    // wrapped `help.getConfig` doubles as a datacenter-list refresh.
    let tl::enums::Config::Config(remote_config) = sender
        .invoke(&tl::functions::InvokeWithLayer {
            layer: tl::LAYER,
            query: tl::functions::InitConnection {
                api_id,
                device_model: params.device_model.clone(),
                system_version: params.system_version.clone(),
                app_version: params.app_version.clone(),
                system_lang_code: params.system_lang_code.clone(),
                lang_pack: String::new(),
                lang_code: params.lang_code.clone(),
                query: tl::functions::help::GetConfig,
            },
        })
        .await?;

    remember_dc_options(dc_addresses, &remote_config, params.use_ipv6);

    Ok((sender, remote_config))
}

/// Fold the datacenter options of a fresh `config` into the runtime
/// address table, so redirects to datacenters outside the compiled-in
/// list (CDNs in particular) can be followed.
fn remember_dc_options(dc_addresses: &DcAddresses, config: &tl::types::Config, ipv6: bool) {
    let mut dc_addresses = dc_addresses.lock().unwrap();
    for tl::enums::DcOption::DcOption(option) in &config.dc_options {
        if option.ipv6 != ipv6 || option.tcpo_only {
            continue;
        }
        let address = match option.ip_address.parse::<std::net::IpAddr>() {
            Ok(ip) => SocketAddr::new(ip, option.port as u16),
            Err(_) => {
                debug!("skipping unparsable dc option for dc {}", option.id);
                continue;
            }
        };
        dc_addresses.entry(option.id).or_insert(address);
    }
}

/// Drive a secondary (media or CDN) connection: serialize requests from
/// handles and step the network, reconnecting with the policy when the
/// connection drops.
pub(crate) async fn drive_media_sender(
    mut sender: Sender<transport::Full, mtp::Encrypted>,
    mut rx: mpsc::UnboundedReceiver<HandleRequest>,
    dc_id: i32,
    session: Arc<dyn Session>,
    api_id: i32,
    params_policy: Arc<dyn ReconnectionPolicy>,
    params: InitParams,
    dc_addresses: DcAddresses,
) {
    loop {
        tokio::select! {
            request = rx.recv() => match request {
                Some(HandleRequest::Rpc { body, response }) => {
                    drop(response.send(sender.enqueue_body(body)));
                }
                Some(HandleRequest::Disconnect { response }) => {
                    drop(response.send(()));
                    break;
                }
                None => break,
            },
            step = sender.step() => if let Err(err) = step {
                warn!("media session to dc {} failed: {}; reconnecting", dc_id, err);

                let pending = sender.take_requests();
                let mut attempts = 0;
                let reconnected = loop {
                    match params_policy.should_retry(attempts) {
                        ControlFlow::Continue(delay) => sleep(delay).await,
                        ControlFlow::Break(()) => break None,
                    }
                    attempts += 1;

                    match connect_sender(dc_id, &session, api_id, &params, true, &dc_addresses)
                        .await
                    {
                        Ok((sender, _)) => break Some(sender),
                        Err(e) => warn!("media reconnect attempt {} failed: {}", attempts, e),
                    }
                };

                match reconnected {
                    Some(mut new_sender) => {
                        for request in pending {
                            new_sender.enqueue_request(request);
                        }
                        sender = new_sender;
                    }
                    None => {
                        warn!("giving up on media session to dc {}", dc_id);
                        break;
                    }
                }
            },
        }
    }
}

/// Typed invocation over a raw handle.
pub(crate) async fn invoke_via<R: RemoteCall>(
    handle: &RawHandle,
    request: &R,
    timeout: Duration,
) -> Result<R::Return, InvocationError> {
    handle
        .invoke_body(request.to_bytes(), timeout)
        .await
        .and_then(|body| R::Return::from_bytes(&body).map_err(|e| e.into()))
}

impl ClientHandle {
    /// Invoke a raw API call against the home datacenter.
    ///
    /// Short `FLOOD_WAIT` errors (at or below the configured threshold)
    /// sleep and retry once with a fresh message id; everything else
    /// (including terminal authorization errors) is propagated.
    pub async fn invoke<R: RemoteCall>(&self, request: &R) -> Result<R::Return, InvocationError> {
        self.invoke_with_timeout(request, DEFAULT_REQUEST_TIMEOUT)
            .await
    }

    /// Like [`Self::invoke`], with an explicit deadline per attempt.
    pub async fn invoke_with_timeout<R: RemoteCall>(
        &self,
        request: &R,
        timeout: Duration,
    ) -> Result<R::Return, InvocationError> {
        let handle = self.shared.home_handle();
        self.do_invoke(&handle, request.to_bytes(), timeout)
            .await
            .and_then(|body| R::Return::from_bytes(&body).map_err(|e| e.into()))
    }

    /// Like [`Self::invoke`], but against the given datacenter's media
    /// session, creating it (and copying the authorization over) on
    /// first use.
    pub async fn invoke_in_dc<R: RemoteCall>(
        &self,
        dc_id: i32,
        request: &R,
    ) -> Result<R::Return, InvocationError> {
        let handle = self.media_handle(dc_id, false).await?;
        self.do_invoke(&handle, request.to_bytes(), TRANSFER_REQUEST_TIMEOUT)
            .await
            .and_then(|body| R::Return::from_bytes(&body).map_err(|e| e.into()))
    }

    pub(crate) async fn do_invoke(
        &self,
        handle: &RawHandle,
        body: Vec<u8>,
        timeout: Duration,
    ) -> Result<Vec<u8>, InvocationError> {
        let mut slept_on_flood = false;

        loop {
            match handle.invoke_body(body.clone(), timeout).await {
                Err(InvocationError::Rpc(rpc)) if rpc.code == 420 && !slept_on_flood => {
                    let seconds = rpc.value.unwrap_or(0);
                    if seconds <= self.shared.params.flood_sleep_threshold {
                        info!("sleeping on {} for {}s before retrying", rpc.name, seconds);
                        sleep(Duration::from_secs(seconds as u64)).await;
                        slept_on_flood = true;
                        continue;
                    } else {
                        return Err(InvocationError::Rpc(rpc));
                    }
                }
                other => return other,
            }
        }
    }

    /// Get (or lazily create) the handle to a media or CDN session in
    /// the given datacenter.
    pub(crate) async fn media_handle(
        &self,
        dc_id: i32,
        cdn: bool,
    ) -> Result<RawHandle, InvocationError> {
        let mut media_sessions = self.shared.media_sessions.lock().await;
        if let Some(existing) = media_sessions.get(&dc_id) {
            return Ok(existing.handle.clone());
        }

        info!(
            "creating {} session to dc {}",
            if cdn { "cdn" } else { "media" },
            dc_id
        );
        let (sender, _config) = connect_sender(
            dc_id,
            &self.shared.session,
            self.shared.api_id,
            &self.shared.params,
            true,
            &self.shared.dc_addresses,
        )
        .await?;

        let (tx, rx) = mpsc::unbounded_channel();
        let handle = RawHandle { tx };
        let task = tokio::spawn(drive_media_sender(
            sender,
            rx,
            dc_id,
            Arc::clone(&self.shared.session),
            self.shared.api_id,
            Arc::clone(&self.shared.params.reconnection_policy),
            self.shared.params.clone(),
            Arc::clone(&self.shared.dc_addresses),
        ));

        media_sessions.insert(
            dc_id,
            MediaSession {
                handle: handle.clone(),
                task,
            },
        );
        drop(media_sessions);

        // CDN datacenters serve files under their own keys; user
        // authorization is neither needed nor accepted there.
        if !cdn {
            self.copy_auth_to_dc(dc_id, &handle).await?;
        }

        Ok(handle)
    }

    /// Make the logged-in authorization usable in another datacenter by
    /// exporting it at home and importing it there, once.
    async fn copy_auth_to_dc(
        &self,
        target_dc_id: i32,
        target: &RawHandle,
    ) -> Result<(), InvocationError> {
        let mut auth_exported_to = self.shared.auth_exported_to.lock().await;
        if auth_exported_to.contains(&target_dc_id) {
            return Ok(());
        }

        let home_dc_id = self.shared.session.home_dc_id();
        if target_dc_id == home_dc_id {
            return Ok(());
        }

        let tl::enums::auth::ExportedAuthorization::Authorization(exported) = invoke_via(
            &self.shared.home_handle(),
            &tl::functions::auth::ExportAuthorization {
                dc_id: target_dc_id,
            },
            DEFAULT_REQUEST_TIMEOUT,
        )
        .await?;

        invoke_via(
            target,
            &tl::functions::auth::ImportAuthorization {
                id: exported.id,
                bytes: exported.bytes,
            },
            DEFAULT_REQUEST_TIMEOUT,
        )
        .await?;

        auth_exported_to.push(target_dc_id);

        Ok(())
    }
}

