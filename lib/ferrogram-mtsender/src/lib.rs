// Copyright 2024 - developers of the `ferrogram` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The network connection to Telegram servers: queueing outgoing
//! requests, correlating their responses, keeping the connection alive
//! with pings, and generating the authorization key when a datacenter
//! does not have one yet.
mod errors;
mod net;
mod reconnection;

pub use errors::{InvocationError, ReadError, RpcError};
pub use net::{NetStream, ServerAddr};
pub use reconnection::{ExponentialBackoff, FixedReconnect, NoReconnect, ReconnectionPolicy};

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, SystemTime};
use std::{io, thread};

use ferrogram_crypto::DequeBuffer;
use ferrogram_mtproto::mtp::{
    self, BadMessage, Deserialization, DeserializationFailure, Mtp, RpcResult, RpcResultError,
};
use ferrogram_mtproto::transport::{self, Transport};
use ferrogram_mtproto::{authentication, MsgId};
use ferrogram_tl::{self as tl, Deserializable, RemoteCall, Serializable};
use log::{debug, error, info, trace, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::time::{sleep_until, Instant};

/// The maximum data that we're willing to send or receive at once.
///
/// By having a fixed-size buffer, we can avoid unnecessary allocations
/// and trivially prevent allocating more than this limit if we ever
/// received invalid data.
///
/// Telegram will close the connection with roughly a megabyte of data,
/// so to account for the transports' own overhead, we add a few extra
/// kilobytes to the maximum data size.
const MAXIMUM_DATA: usize = (1024 * 1024) + (8 * 1024);

/// How much leading space is reserved in the write buffer so headers can
/// be prepended without moving memory around.
const LEADING_BUFFER_SPACE: usize = transport::MAX_HEADER_LEN
    + mtp::ENCRYPTED_PACKET_HEADER_LEN
    + mtp::MESSAGE_CONTAINER_HEADER_LEN;

/// Every how often a ping is sent to keep the connection alive.
const PING_DELAY: Duration = Duration::from_secs(5);

/// After how many seconds the server should close the connection when we
/// stop sending pings.
///
/// This value essentially means we have `NO_PING_DISCONNECT - PING_DELAY`
/// seconds of slack before the server drops us.
const NO_PING_DISCONNECT: i32 = 75;

/// If no pong arrives within this long of a sent ping, the connection is
/// considered dead.
const PONG_TIMEOUT: Duration = Duration::from_secs(10);

/// How many times the authorization key exchange is attempted with a
/// fresh nonce before giving up.
const MAX_KEY_GEN_ATTEMPTS: usize = 5;

/// Generate a "random" ping ID.
pub(crate) fn generate_random_id() -> i64 {
    static LAST_ID: AtomicI64 = AtomicI64::new(0);

    while LAST_ID.load(Ordering::SeqCst) == 0 {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .expect("system time is before epoch")
            .as_nanos() as i64;

        if LAST_ID
            .compare_exchange(0, now, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            thread::yield_now();
        }
    }

    LAST_ID.fetch_add(1, Ordering::SeqCst)
}

/// A pending request and the sender half used to resolve it.
pub struct PendingRequest {
    pub body: Vec<u8>,
    pub result: oneshot::Sender<Result<Vec<u8>, InvocationError>>,
}

/// Manages enqueuing requests, matching them to their response, and IO.
pub struct Sender<T: Transport, M: Mtp> {
    stream: NetStream,
    transport: T,
    mtp: M,
    addr: ServerAddr,
    requests: Vec<Request>,
    next_ping: Instant,
    pong_deadline: Option<Instant>,
    pong_rx: Option<oneshot::Receiver<Result<Vec<u8>, InvocationError>>>,

    // Transport-level buffers and positions.
    read_buffer: Vec<u8>,
    read_tail: usize,
    write_buffer: DequeBuffer<u8>,
    write_head: usize,
}

struct Request {
    body: Vec<u8>,
    state: RequestState,
    result: oneshot::Sender<Result<Vec<u8>, InvocationError>>,
}

#[derive(Clone, Debug)]
struct MsgIdPair {
    msg_id: MsgId,
    container_msg_id: MsgId,
}

enum RequestState {
    NotSerialized,
    Serialized(MsgIdPair),
    Sent(MsgIdPair),
}

impl MsgIdPair {
    fn new(msg_id: MsgId) -> Self {
        Self {
            msg_id,
            // By default there is no container, so the outer id is itself.
            container_msg_id: msg_id,
        }
    }

    fn matches(&self, msg_id: MsgId) -> bool {
        self.msg_id == msg_id || self.container_msg_id == msg_id
    }
}

impl<T: Transport, M: Mtp> Sender<T, M> {
    /// Create a new connection using the specified transport, MTP state
    /// and server address.
    ///
    /// This simply opens a socket; no MTProto traffic happens until
    /// requests are enqueued and the connection is stepped.
    pub async fn connect(transport: T, mtp: M, addr: ServerAddr) -> Result<Self, io::Error> {
        let stream = NetStream::connect(&addr).await?;
        Ok(Self {
            stream,
            transport,
            mtp,
            addr,
            requests: vec![],
            next_ping: Instant::now() + PING_DELAY,
            pong_deadline: None,
            pong_rx: None,
            read_buffer: vec![0; MAXIMUM_DATA],
            read_tail: 0,
            write_buffer: DequeBuffer::with_capacity(MAXIMUM_DATA, LEADING_BUFFER_SPACE),
            write_head: 0,
        })
    }

    /// The address this sender is connected to.
    pub fn addr(&self) -> &ServerAddr {
        &self.addr
    }

    /// Serializes the given request, enqueues it, and repeatedly calls
    /// [`Self::step`] until its response is received.
    pub async fn invoke<R: RemoteCall>(
        &mut self,
        request: &R,
    ) -> Result<R::Return, InvocationError> {
        let rx = self.enqueue_body(request.to_bytes());
        self.step_until_receive(rx)
            .await
            .and_then(|body| R::Return::from_bytes(&body).map_err(|err| err.into()))
    }

    /// Enqueue an already-serialized request, returning the receiver
    /// that will eventually hold its response.
    pub fn enqueue_body(
        &mut self,
        body: Vec<u8>,
    ) -> oneshot::Receiver<Result<Vec<u8>, InvocationError>> {
        let (tx, rx) = oneshot::channel();
        self.enqueue_request(PendingRequest { body, result: tx });
        rx
    }

    /// Enqueue a request whose result channel already exists, e.g. one
    /// taken from a previous connection with [`Self::take_requests`].
    pub fn enqueue_request(&mut self, request: PendingRequest) {
        assert!(request.body.len() >= 4);
        let req_id = u32::from_le_bytes(request.body[..4].try_into().unwrap());
        debug!(
            "enqueueing request {} to be serialized",
            tl::name_for_id(req_id)
        );

        self.requests.push(Request {
            body: request.body,
            state: RequestState::NotSerialized,
            result: request.result,
        });
    }

    /// Remove every request (resolved or not) from this sender, so they
    /// can be transplanted into a new connection after a network error.
    pub fn take_requests(&mut self) -> Vec<PendingRequest> {
        self.requests
            .drain(..)
            .map(|request| PendingRequest {
                body: request.body,
                result: request.result,
            })
            .collect()
    }

    async fn step_until_receive(
        &mut self,
        mut rx: oneshot::Receiver<Result<Vec<u8>, InvocationError>>,
    ) -> Result<Vec<u8>, InvocationError> {
        loop {
            self.step().await?;
            match rx.try_recv() {
                Ok(x) => break x,
                Err(TryRecvError::Empty) => continue,
                Err(TryRecvError::Closed) => break Err(InvocationError::Dropped),
            }
        }
    }

    /// Step network events, writing and reading at the same time.
    ///
    /// Raw updates received during this step, if any, are returned.
    ///
    /// If an error is returned, the connection should be treated as
    /// dead; the sender can be recreated and its requests carried over
    /// with [`Self::take_requests`].
    pub async fn step(&mut self) -> Result<Vec<Vec<u8>>, ReadError> {
        self.try_fill_write();
        trace!(
            "stepping with {} bytes pending to write",
            self.write_buffer.len() - self.write_head
        );

        let deadline = match self.pong_deadline {
            Some(pong) => pong.min(self.next_ping),
            None => self.next_ping,
        };

        let (mut reader, mut writer) = self.stream.split();
        let sleep = sleep_until(deadline);

        tokio::select! {
            n = reader.read(&mut self.read_buffer[self.read_tail..]) => {
                n.map_err(ReadError::Io).and_then(|n| self.on_net_read(n))
            }
            n = writer.write(&self.write_buffer[self.write_head..]), if self.write_head < self.write_buffer.len() => {
                n.map_err(ReadError::Io).map(|n| {
                    self.on_net_write(n);
                    Vec::new()
                })
            }
            _ = sleep => {
                self.on_timer_tick()?;
                Ok(Vec::new())
            }
        }
    }

    /// Setup the write buffer for the transport, unless a write is
    /// already pending.
    fn try_fill_write(&mut self) {
        if !self.write_buffer.is_empty() {
            return;
        }

        for request in self
            .requests
            .iter_mut()
            .filter(|r| matches!(r.state, RequestState::NotSerialized))
        {
            if let Some(msg_id) = self.mtp.push(&mut self.write_buffer, &request.body) {
                let req_id = u32::from_le_bytes(request.body[..4].try_into().unwrap());
                debug!(
                    "serialized request {:x} ({}) with {:?}",
                    req_id,
                    tl::name_for_id(req_id),
                    msg_id
                );
                // Note how only NotSerialized becomes Serialized; nasty
                // bugs (e.g. infinite loops leading to transport flood)
                // occur otherwise.
                request.state = RequestState::Serialized(MsgIdPair::new(msg_id));
            } else {
                break;
            }
        }

        if let Some(container_msg_id) = self.mtp.finalize(&mut self.write_buffer) {
            for request in self.requests.iter_mut() {
                if let RequestState::Serialized(ref mut pair) = request.state {
                    pair.container_msg_id = container_msg_id;
                }
            }
            self.transport.pack(&mut self.write_buffer)
        }
    }

    /// Handle `n` more read bytes being ready to process by the transport.
    fn on_net_read(&mut self, n: usize) -> Result<Vec<Vec<u8>>, ReadError> {
        if n == 0 {
            return Err(ReadError::Io(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "read 0 bytes",
            )));
        }

        self.read_tail += n;
        trace!("read {} bytes from the network", n);

        let mut updates = Vec::new();
        let mut next_offset = 0;
        while next_offset != self.read_tail {
            match self
                .transport
                .unpack(&self.read_buffer[next_offset..self.read_tail])
            {
                Ok(offset) => {
                    debug!("deserializing valid transport packet...");
                    let results = self
                        .mtp
                        .deserialize(
                            &self.read_buffer[next_offset..][offset.data_start..offset.data_end],
                        )?;

                    self.process_mtp_results(results, &mut updates);
                    next_offset += offset.next_offset;
                }
                Err(transport::Error::MissingBytes) => break,
                Err(err) => return Err(err.into()),
            }
        }

        self.read_buffer.copy_within(next_offset..self.read_tail, 0);
        self.read_tail -= next_offset;

        Ok(updates)
    }

    /// Handle `n` more written bytes being accepted by the socket.
    fn on_net_write(&mut self, n: usize) {
        self.write_head += n;
        trace!(
            "written {} bytes to the network ({}/{})",
            n,
            self.write_head,
            self.write_buffer.len()
        );
        assert!(self.write_head <= self.write_buffer.len());
        if self.write_head != self.write_buffer.len() {
            return;
        }

        self.write_buffer.clear();
        self.write_head = 0;
        for req in self.requests.iter_mut() {
            if let RequestState::Serialized(pair) = &req.state {
                debug!("sent request with {:?}", pair);
                req.state = RequestState::Sent(pair.clone());
            }
        }
    }

    /// A timer fired: either a pong deadline expired, or it is time to
    /// enqueue a new keepalive ping.
    fn on_timer_tick(&mut self) -> Result<(), ReadError> {
        let now = Instant::now();

        if let Some(deadline) = self.pong_deadline {
            if now >= deadline {
                match self.pong_rx.as_mut().map(|rx| rx.try_recv()) {
                    Some(Ok(_)) => {
                        trace!("keepalive pong arrived in time");
                        self.pong_deadline = None;
                        self.pong_rx = None;
                    }
                    _ => {
                        warn!("server did not answer the keepalive ping; reconnecting");
                        return Err(ReadError::PingTimeout);
                    }
                }
            }
        }

        if now >= self.next_ping {
            self.on_ping_timeout();
        }

        Ok(())
    }

    /// Enqueue a new keepalive ping request.
    fn on_ping_timeout(&mut self) {
        if !self.mtp.requires_keepalive() {
            self.next_ping = Instant::now() + PING_DELAY;
            return;
        }

        let ping_id = generate_random_id();
        debug!("enqueueing keepalive ping {}", ping_id);
        let rx = self.enqueue_body(
            tl::functions::PingDelayDisconnect {
                ping_id,
                disconnect_delay: NO_PING_DISCONNECT,
            }
            .to_bytes(),
        );

        // Only watch for the pong of one outstanding ping at a time.
        if self.pong_deadline.is_none() {
            self.pong_deadline = Some(Instant::now() + PONG_TIMEOUT);
            self.pong_rx = Some(rx);
        }

        self.next_ping = Instant::now() + PING_DELAY;
    }

    /// Process the deserialization results of one MTP payload.
    fn process_mtp_results(
        &mut self,
        results: Vec<Deserialization>,
        updates: &mut Vec<Vec<u8>>,
    ) {
        for result in results {
            match result {
                Deserialization::OwnUpdate { msg_id: _, update } => updates.push(update),
                Deserialization::Update(update) => updates.push(update),
                Deserialization::RpcResult(result) => self.process_result(result),
                Deserialization::RpcError(error) => self.process_error(error),
                Deserialization::BadMessage(bad_msg) => self.process_bad_message(bad_msg),
                Deserialization::RpcCleared { first_msg_id } => {
                    self.process_rpc_cleared(first_msg_id)
                }
                Deserialization::Failure(failure) => self.process_deserialize_error(failure),
            }
        }
    }

    fn process_result(&mut self, result: RpcResult) {
        if let Some(req) = self.pop_request(result.msg_id) {
            let body = result.body;
            assert!(body.len() >= 4);
            let res_id = u32::from_le_bytes(body[..4].try_into().unwrap());
            debug!(
                "got result {:x} ({}) for request {:?}",
                res_id,
                tl::name_for_id(res_id),
                result.msg_id
            );
            if req.result.send(Ok(body)).is_err() {
                debug!(
                    "discarding response for {:?}; the caller cancelled the wait",
                    result.msg_id
                );
            }
        } else {
            // Likely a response for a request whose invocation timed out
            // and was cancelled; there is nobody left to deliver it to.
            debug!(
                "dropping late rpc result {:?}; no such request is saved",
                result.msg_id
            );
        }
    }

    fn process_error(&mut self, error: RpcResultError) {
        if let Some(req) = self.pop_request(error.msg_id) {
            debug!("got rpc error {:?} for request {:?}", error.error, error.msg_id);
            let req_id = u32::from_le_bytes(req.body[..4].try_into().unwrap());
            drop(req.result.send(Err(InvocationError::Rpc(
                RpcError::from(error.error).with_caused_by(req_id),
            ))));
        } else {
            debug!(
                "dropping late rpc error {:?}; no such request is saved",
                error.msg_id
            );
        }
    }

    fn process_bad_message(&mut self, bad_msg: BadMessage) {
        for i in (0..self.requests.len()).rev() {
            let matches = match &self.requests[i].state {
                RequestState::Serialized(pair) | RequestState::Sent(pair) => {
                    pair.matches(bad_msg.msg_id)
                }
                RequestState::NotSerialized => false,
            };
            if !matches {
                continue;
            }

            if bad_msg.retryable() {
                info!(
                    "{}; re-sending request {:?}",
                    bad_msg.description(),
                    bad_msg.msg_id
                );
                self.requests[i].state = RequestState::NotSerialized;
            } else {
                if bad_msg.fatal() {
                    error!(
                        "{}; cannot retry request {:?}",
                        bad_msg.description(),
                        bad_msg.msg_id
                    );
                } else {
                    warn!(
                        "{}; cannot retry request {:?}",
                        bad_msg.description(),
                        bad_msg.msg_id
                    );
                }
                let req = self.requests.swap_remove(i);
                drop(req.result.send(Err(InvocationError::Dropped)));
            }
        }
    }

    /// The server created a new session and forgot everything below
    /// `first_msg_id`; those requests will never get a response, so they
    /// have to be sent again.
    fn process_rpc_cleared(&mut self, first_msg_id: MsgId) {
        for request in self.requests.iter_mut() {
            if let RequestState::Sent(pair) = &request.state {
                if pair.msg_id.value() < first_msg_id.value() {
                    info!(
                        "new session created; re-sending request {:?}",
                        pair.msg_id
                    );
                    request.state = RequestState::NotSerialized;
                }
            }
        }
    }

    fn process_deserialize_error(&mut self, failure: DeserializationFailure) {
        if let Some(req) = self.pop_request(failure.msg_id) {
            debug!("got deserialization failure {:?}", failure.error);
            drop(req.result.send(Err(InvocationError::from(failure.error))));
        } else {
            debug!(
                "dropping deserialization failure {:?}; no such request is saved",
                failure.error
            );
        }
    }

    fn pop_request(&mut self, msg_id: MsgId) -> Option<Request> {
        for i in 0..self.requests.len() {
            match &self.requests[i].state {
                RequestState::Serialized(pair) if pair.msg_id == msg_id => {
                    warn!("got response {msg_id:?} for unsent request; resolving anyway");
                    return Some(self.requests.swap_remove(i));
                }
                RequestState::Sent(pair) if pair.msg_id == msg_id => {
                    return Some(self.requests.swap_remove(i));
                }
                _ => {}
            }
        }

        None
    }
}

impl<T: Transport> Sender<T, mtp::Encrypted> {
    /// The authorization key in use by this sender.
    pub fn auth_key(&self) -> [u8; 256] {
        self.mtp.auth_key()
    }
}

/// Helper function to [`Sender::connect`] a plain transport and generate
/// an authorization key on it.
pub async fn connect<T: Transport>(
    transport: T,
    addr: ServerAddr,
) -> Result<Sender<T, mtp::Encrypted>, InvocationError> {
    let sender = Sender::connect(transport, mtp::Plain::new(), addr).await?;
    generate_auth_key(sender).await
}

/// Run one full authorization key exchange over the plain sender.
async fn auth_key_exchange<T: Transport>(
    sender: &mut Sender<T, mtp::Plain>,
) -> Result<authentication::Finished, InvocationError> {
    let (request, data) = authentication::step1()?;
    debug!("gen auth key: sending step 1");
    let response = sender.step_until_receive_raw(request).await?;
    debug!("gen auth key: starting step 2");
    let (request, data) = authentication::step2(data, &response)?;
    debug!("gen auth key: sending step 2");
    let response = sender.step_until_receive_raw(request).await?;
    debug!("gen auth key: starting step 3");
    let (request, mut data) = authentication::step3(data, &response)?;
    debug!("gen auth key: sending step 3");
    let mut response = sender.step_until_receive_raw(request).await?;

    loop {
        match authentication::create_key(data, &response)? {
            authentication::CreatedKey::Done(finished) => break Ok(finished),
            authentication::CreatedKey::Retry { request, data: retry } => {
                debug!("gen auth key: server asked to retry the client-DH round");
                response = sender.step_until_receive_raw(request).await?;
                data = retry;
            }
        }
    }
}

impl<T: Transport> Sender<T, mtp::Plain> {
    async fn step_until_receive_raw(&mut self, body: Vec<u8>) -> Result<Vec<u8>, InvocationError> {
        let rx = self.enqueue_body(body);
        self.step_until_receive(rx).await
    }
}

/// Uses the input plain sender to carry out the authorization key
/// generation process, and returns an encrypted sender reusing the same
/// connection, transport and buffers.
///
/// Failed exchanges are restarted with a fresh nonce a few times before
/// the error is surfaced.
pub async fn generate_auth_key<T: Transport>(
    mut sender: Sender<T, mtp::Plain>,
) -> Result<Sender<T, mtp::Encrypted>, InvocationError> {
    info!("generating new authorization key...");

    let mut attempt = 1;
    let finished = loop {
        match auth_key_exchange(&mut sender).await {
            Ok(finished) => break finished,
            Err(InvocationError::Authentication(e)) if attempt < MAX_KEY_GEN_ATTEMPTS => {
                warn!(
                    "authorization key generation attempt {} failed: {}; retrying",
                    attempt, e
                );
                sender.mtp.reset();
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    };
    info!("authorization key generated successfully");

    let authentication::Finished {
        auth_key,
        time_offset,
        first_salt,
    } = finished;

    Ok(Sender {
        stream: sender.stream,
        transport: sender.transport,
        mtp: mtp::Encrypted::build()
            .time_offset(time_offset)
            .first_salt(first_salt)
            .finish(auth_key),
        addr: sender.addr,
        requests: sender.requests,
        next_ping: Instant::now() + PING_DELAY,
        pong_deadline: None,
        pong_rx: None,
        read_buffer: sender.read_buffer,
        read_tail: sender.read_tail,
        write_buffer: sender.write_buffer,
        write_head: sender.write_head,
    })
}

/// Helper function to [`Sender::connect`] an encrypted transport with a
/// previously-generated authorization key.
pub async fn connect_with_auth<T: Transport>(
    transport: T,
    addr: ServerAddr,
    auth_key: [u8; 256],
) -> Result<Sender<T, mtp::Encrypted>, io::Error> {
    Sender::connect(transport, mtp::Encrypted::build().finish(auth_key), addr).await
}
