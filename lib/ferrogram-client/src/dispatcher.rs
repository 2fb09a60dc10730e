// Copyright 2024 - developers of the `ferrogram` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Fans incoming updates out to registered handlers.
//!
//! Handlers live in integer-keyed groups. For every update, groups are
//! visited in ascending order and, within a group, the first handler
//! whose filter matches runs; the rest of the group is skipped unless
//! the handler asks to [`Propagation::Continue`]. A handler may also
//! [`Propagation::Stop`] the update entirely.
//!
//! Middleware wraps the whole group dispatch and is composed once at
//! start time, in registration order (the most recently added runs
//! innermost).
use ferrogram_tl::{self as tl, Identifiable};
use futures_util::future::BoxFuture;
use log::{debug, info, warn};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

/// How many update batches may sit in the dispatcher queue before the
/// producer is forced to wait.
const QUEUE_CAPACITY: usize = 1024;

/// What should happen with an update after a handler ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Propagation {
    /// The update was handled; skip the rest of this group and offer it
    /// to the next group.
    Done,
    /// Keep looking for another matching handler within this group.
    Continue,
    /// The update is fully handled; no other handler may see it.
    Stop,
}

/// Users and chats that arrived in the same batch as the update, for
/// handlers to resolve identifiers without round-trips.
#[derive(Clone, Default)]
pub struct UpdateContext {
    pub users: Arc<HashMap<i64, tl::types::User>>,
    pub chats: Arc<HashMap<i64, tl::enums::Chat>>,
}

/// An update after going through the parser registry.
#[derive(Clone, Debug)]
pub enum ParsedUpdate {
    NewMessage(tl::types::Message),
    EditedMessage(tl::types::Message),
    DeletedMessages {
        channel_id: Option<i64>,
        messages: Vec<i32>,
    },
    /// No registered parser claimed this constructor.
    Raw(tl::enums::Update),
}

type AsyncCallback =
    Arc<dyn Fn(ParsedUpdate, UpdateContext) -> BoxFuture<'static, Propagation> + Send + Sync>;
type BlockingCallback = Arc<dyn Fn(ParsedUpdate, UpdateContext) -> Propagation + Send + Sync>;
type Filter = Arc<dyn Fn(&ParsedUpdate, &UpdateContext) -> bool + Send + Sync>;

enum Callback {
    Async(AsyncCallback),
    /// CPU-bound handlers marked as blocking run on the blocking thread
    /// pool so they cannot stall the event loop.
    Blocking(BlockingCallback),
}

/// A filter and callback pair, ready to be registered in a group.
pub struct Handler {
    filter: Filter,
    callback: Callback,
}

/// Builder helper that produces [`Handler`] descriptors, consumed when
/// registering them with [`Dispatcher::add_handler`].
pub struct HandlerBuilder {
    filter: Filter,
}

impl HandlerBuilder {
    /// A handler offered every update.
    pub fn any() -> Self {
        Self {
            filter: Arc::new(|_, _| true),
        }
    }

    /// A handler offered only new messages.
    pub fn new_messages() -> Self {
        Self::any().filter(|update, _| matches!(update, ParsedUpdate::NewMessage(_)))
    }

    /// A handler offered only edited messages.
    pub fn edited_messages() -> Self {
        Self::any().filter(|update, _| matches!(update, ParsedUpdate::EditedMessage(_)))
    }

    /// Restrict the handler with an additional predicate; all predicates
    /// must hold for the callback to run.
    pub fn filter<F>(self, filter: F) -> Self
    where
        F: Fn(&ParsedUpdate, &UpdateContext) -> bool + Send + Sync + 'static,
    {
        let previous = self.filter;
        Self {
            filter: Arc::new(move |update, context| {
                previous(update, context) && filter(update, context)
            }),
        }
    }

    /// Finish the descriptor with an async callback.
    pub fn callback<F>(self, callback: F) -> Handler
    where
        F: Fn(ParsedUpdate, UpdateContext) -> BoxFuture<'static, Propagation>
            + Send
            + Sync
            + 'static,
    {
        Handler {
            filter: self.filter,
            callback: Callback::Async(Arc::new(callback)),
        }
    }

    /// Finish the descriptor with a CPU-bound callback, dispatched to
    /// the blocking thread pool.
    pub fn blocking_callback<F>(self, callback: F) -> Handler
    where
        F: Fn(ParsedUpdate, UpdateContext) -> Propagation + Send + Sync + 'static,
    {
        Handler {
            filter: self.filter,
            callback: Callback::Blocking(Arc::new(callback)),
        }
    }
}

/// A middleware continues the dispatch by calling `next`, and may run
/// code before and after it (or not call it at all).
pub type Next = Arc<dyn Fn(ParsedUpdate, UpdateContext) -> BoxFuture<'static, ()> + Send + Sync>;
pub type Middleware =
    Arc<dyn Fn(ParsedUpdate, UpdateContext, Next) -> BoxFuture<'static, ()> + Send + Sync>;

type Parser = fn(tl::enums::Update) -> ParsedUpdate;

/// Everything a worker needs to process updates, frozen at start time.
struct DispatchTable {
    parsers: HashMap<u32, Parser>,
    chain: Next,
}

enum WorkItem {
    Update(tl::enums::Update, UpdateContext),
    Stop,
}

/// A cheap handle that can enqueue updates from anywhere.
#[derive(Clone)]
pub struct DispatcherHandle {
    queue_tx: mpsc::Sender<WorkItem>,
}

impl DispatcherHandle {
    /// Queue one update for processing. Waits when the queue is full.
    pub async fn enqueue(&self, update: tl::enums::Update, context: UpdateContext) {
        if self
            .queue_tx
            .send(WorkItem::Update(update, context))
            .await
            .is_err()
        {
            warn!("dropping update; dispatcher queue is closed");
        }
    }
}

/// The update dispatcher: a bounded queue drained by a pool of workers.
///
/// Each worker processes its updates sequentially; distinct workers
/// proceed in parallel over independent updates, which means there is no
/// ordering guarantee between updates of different batches.
pub struct Dispatcher {
    groups: BTreeMap<i32, Vec<Arc<Handler>>>,
    middlewares: Vec<Middleware>,
    parsers: HashMap<u32, Parser>,
    worker_count: usize,
    queue_tx: mpsc::Sender<WorkItem>,
    queue_rx: Arc<Mutex<mpsc::Receiver<WorkItem>>>,
    workers: Vec<JoinHandle<()>>,
}

/// `min(8, cpu + 4)`, matching the sizing of thread pools meant for
/// lightly-blocking work.
pub fn default_worker_count() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (cpus + 4).min(8)
}

impl Dispatcher {
    pub fn new(worker_count: usize) -> Self {
        assert!(worker_count > 0);
        let (queue_tx, queue_rx) = mpsc::channel(QUEUE_CAPACITY);
        Self {
            groups: BTreeMap::new(),
            middlewares: Vec::new(),
            parsers: default_parsers(),
            worker_count,
            queue_tx,
            queue_rx: Arc::new(Mutex::new(queue_rx)),
            workers: Vec::new(),
        }
    }

    /// Register a handler under the given group. Lower group numbers are
    /// offered each update first.
    pub fn add_handler(&mut self, group: i32, handler: Handler) {
        self.groups.entry(group).or_default().push(Arc::new(handler));
        debug!("added handler to group {}", group);
    }

    /// Register a middleware around the whole dispatch. The most
    /// recently added middleware runs innermost.
    pub fn add_middleware(&mut self, middleware: Middleware) {
        self.middlewares.push(middleware);
    }

    /// Override the parser for one update constructor.
    pub fn set_parser(&mut self, constructor_id: u32, parser: Parser) {
        self.parsers.insert(constructor_id, parser);
    }

    /// Freeze the handler table, compose the middleware chain, and spawn
    /// the worker pool.
    pub fn start(&mut self) {
        assert!(self.workers.is_empty(), "dispatcher already started");

        let table = Arc::new(DispatchTable {
            parsers: self.parsers.clone(),
            chain: compose_chain(&self.middlewares, self.groups.clone()),
        });

        for worker in 0..self.worker_count {
            let queue_rx = Arc::clone(&self.queue_rx);
            let table = Arc::clone(&table);
            self.workers.push(tokio::spawn(async move {
                loop {
                    // The lock is only held while dequeueing; workers
                    // process their own items in parallel afterwards.
                    let item = { queue_rx.lock().await.recv().await };
                    match item {
                        Some(WorkItem::Update(update, context)) => {
                            let parsed = parse_update(&table.parsers, update);
                            (table.chain)(parsed, context).await;
                        }
                        Some(WorkItem::Stop) | None => break,
                    }
                }
                debug!("dispatcher worker {} exited", worker);
            }));
        }

        info!("started {} dispatcher worker(s)", self.worker_count);
    }

    /// Whether [`Dispatcher::start`] has been called.
    pub fn is_running(&self) -> bool {
        !self.workers.is_empty()
    }

    /// A handle that can enqueue updates without borrowing the
    /// dispatcher itself.
    pub fn handle(&self) -> DispatcherHandle {
        DispatcherHandle {
            queue_tx: self.queue_tx.clone(),
        }
    }

    /// Queue one update for processing. Waits when the queue is full.
    pub async fn enqueue(&self, update: tl::enums::Update, context: UpdateContext) {
        self.handle().enqueue(update, context).await
    }

    /// Signal each worker to stop, then wait for them to drain whatever
    /// work is already queued.
    pub async fn stop(&mut self) {
        for _ in 0..self.workers.len() {
            if self.queue_tx.send(WorkItem::Stop).await.is_err() {
                break;
            }
        }

        for worker in self.workers.drain(..) {
            let _ = worker.await;
        }
        info!("stopped dispatcher workers");
    }
}

fn compose_chain(
    middlewares: &[Middleware],
    groups: BTreeMap<i32, Vec<Arc<Handler>>>,
) -> Next {
    let groups = Arc::new(groups);

    // The innermost step is the group dispatch itself.
    let mut next: Next = Arc::new(move |update, context| {
        let groups = Arc::clone(&groups);
        Box::pin(async move { dispatch_to_groups(&groups, update, context).await })
    });

    // Wrap outwards so that the first-registered middleware ends up
    // outermost (the most recently added one runs closest to the
    // handlers).
    for middleware in middlewares.iter().rev() {
        let middleware = Arc::clone(middleware);
        let inner = next;
        next = Arc::new(move |update, context| {
            middleware(update, context, Arc::clone(&inner))
        });
    }

    next
}

async fn dispatch_to_groups(
    groups: &BTreeMap<i32, Vec<Arc<Handler>>>,
    update: ParsedUpdate,
    context: UpdateContext,
) {
    'groups: for handlers in groups.values() {
        for handler in handlers {
            if !(handler.filter)(&update, &context) {
                continue;
            }

            let result = match &handler.callback {
                Callback::Async(callback) => callback(update.clone(), context.clone()).await,
                Callback::Blocking(callback) => {
                    let callback = Arc::clone(callback);
                    let update = update.clone();
                    let context = context.clone();
                    match tokio::task::spawn_blocking(move || callback(update, context)).await {
                        Ok(propagation) => propagation,
                        Err(e) => {
                            warn!("blocking handler panicked: {}", e);
                            Propagation::Done
                        }
                    }
                }
            };

            match result {
                // One matching handler per group; move to the next group.
                Propagation::Done => continue 'groups,
                Propagation::Continue => continue,
                Propagation::Stop => return,
            }
        }
    }
}

fn parse_update(parsers: &HashMap<u32, Parser>, update: tl::enums::Update) -> ParsedUpdate {
    let id = update_constructor_id(&update);
    match parsers.get(&id) {
        Some(parser) => parser(update),
        None => ParsedUpdate::Raw(update),
    }
}

fn update_constructor_id(update: &tl::enums::Update) -> u32 {
    use tl::enums::Update;
    match update {
        Update::NewMessage(_) => tl::types::UpdateNewMessage::CONSTRUCTOR_ID,
        Update::NewChannelMessage(_) => tl::types::UpdateNewChannelMessage::CONSTRUCTOR_ID,
        Update::EditMessage(_) => tl::types::UpdateEditMessage::CONSTRUCTOR_ID,
        Update::EditChannelMessage(_) => tl::types::UpdateEditChannelMessage::CONSTRUCTOR_ID,
        Update::DeleteMessages(_) => tl::types::UpdateDeleteMessages::CONSTRUCTOR_ID,
        Update::DeleteChannelMessages(_) => tl::types::UpdateDeleteChannelMessages::CONSTRUCTOR_ID,
        Update::ChannelTooLong(_) => tl::types::UpdateChannelTooLong::CONSTRUCTOR_ID,
    }
}

fn default_parsers() -> HashMap<u32, Parser> {
    use tl::enums::Update;

    fn message_of(message: tl::enums::Message) -> Option<tl::types::Message> {
        match message {
            tl::enums::Message::Message(message) => Some(message),
            tl::enums::Message::Empty(_) => None,
        }
    }

    let mut parsers: HashMap<u32, Parser> = HashMap::new();
    parsers.insert(tl::types::UpdateNewMessage::CONSTRUCTOR_ID, |update| {
        match update {
            Update::NewMessage(u) => match message_of(u.message.clone()) {
                Some(message) => ParsedUpdate::NewMessage(message),
                None => ParsedUpdate::Raw(Update::NewMessage(u)),
            },
            other => ParsedUpdate::Raw(other),
        }
    });
    parsers.insert(
        tl::types::UpdateNewChannelMessage::CONSTRUCTOR_ID,
        |update| match update {
            Update::NewChannelMessage(u) => match message_of(u.message.clone()) {
                Some(message) => ParsedUpdate::NewMessage(message),
                None => ParsedUpdate::Raw(Update::NewChannelMessage(u)),
            },
            other => ParsedUpdate::Raw(other),
        },
    );
    parsers.insert(tl::types::UpdateEditMessage::CONSTRUCTOR_ID, |update| {
        match update {
            Update::EditMessage(u) => match message_of(u.message.clone()) {
                Some(message) => ParsedUpdate::EditedMessage(message),
                None => ParsedUpdate::Raw(Update::EditMessage(u)),
            },
            other => ParsedUpdate::Raw(other),
        }
    });
    parsers.insert(
        tl::types::UpdateEditChannelMessage::CONSTRUCTOR_ID,
        |update| match update {
            Update::EditChannelMessage(u) => match message_of(u.message.clone()) {
                Some(message) => ParsedUpdate::EditedMessage(message),
                None => ParsedUpdate::Raw(Update::EditChannelMessage(u)),
            },
            other => ParsedUpdate::Raw(other),
        },
    );
    parsers.insert(tl::types::UpdateDeleteMessages::CONSTRUCTOR_ID, |update| {
        match update {
            Update::DeleteMessages(u) => ParsedUpdate::DeletedMessages {
                channel_id: None,
                messages: u.messages,
            },
            other => ParsedUpdate::Raw(other),
        }
    });
    parsers.insert(
        tl::types::UpdateDeleteChannelMessages::CONSTRUCTOR_ID,
        |update| match update {
            Update::DeleteChannelMessages(u) => ParsedUpdate::DeletedMessages {
                channel_id: Some(u.channel_id),
                messages: u.messages,
            },
            other => ParsedUpdate::Raw(other),
        },
    );
    parsers
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    fn new_message_update(id: i32) -> tl::enums::Update {
        tl::enums::Update::NewMessage(tl::types::UpdateNewMessage {
            message: tl::enums::Message::Message(tl::types::Message {
                id,
                from_id: None,
                peer_id: tl::enums::Peer::User(tl::types::PeerUser { user_id: 1 }),
                date: 0,
                message: "hi".into(),
            }),
            pts: id,
            pts_count: 1,
        })
    }

    fn counting_handler(
        counter: Arc<AtomicUsize>,
        result: Propagation,
    ) -> Handler {
        HandlerBuilder::new_messages().callback(move |_, _| {
            let counter = Arc::clone(&counter);
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                result
            })
        })
    }

    async fn run_three_handlers(h1_result: Propagation) -> (usize, usize, usize) {
        let h1 = Arc::new(AtomicUsize::new(0));
        let h2 = Arc::new(AtomicUsize::new(0));
        let h3 = Arc::new(AtomicUsize::new(0));

        let mut dispatcher = Dispatcher::new(1);
        dispatcher.add_handler(0, counting_handler(Arc::clone(&h1), h1_result));
        dispatcher.add_handler(0, counting_handler(Arc::clone(&h2), Propagation::Done));
        dispatcher.add_handler(1, counting_handler(Arc::clone(&h3), Propagation::Done));
        dispatcher.start();

        dispatcher
            .enqueue(new_message_update(1), UpdateContext::default())
            .await;
        dispatcher.stop().await;

        (
            h1.load(Ordering::SeqCst),
            h2.load(Ordering::SeqCst),
            h3.load(Ordering::SeqCst),
        )
    }

    #[tokio::test]
    async fn one_handler_per_group_then_next_group() {
        assert_eq!(run_three_handlers(Propagation::Done).await, (1, 0, 1));
    }

    #[tokio::test]
    async fn continue_reaches_the_rest_of_the_group() {
        assert_eq!(run_three_handlers(Propagation::Continue).await, (1, 1, 1));
    }

    #[tokio::test]
    async fn stop_halts_every_group() {
        assert_eq!(run_three_handlers(Propagation::Stop).await, (1, 0, 0));
    }

    #[tokio::test]
    async fn filters_skip_non_matching_handlers() {
        let matched = Arc::new(AtomicUsize::new(0));
        let skipped = Arc::new(AtomicUsize::new(0));

        let mut dispatcher = Dispatcher::new(1);
        let skipped_handler = {
            let skipped = Arc::clone(&skipped);
            HandlerBuilder::new_messages()
                .filter(|update, _| matches!(update, ParsedUpdate::NewMessage(m) if m.id > 100))
                .callback(move |_, _| {
                    let skipped = Arc::clone(&skipped);
                    Box::pin(async move {
                        skipped.fetch_add(1, Ordering::SeqCst);
                        Propagation::Done
                    })
                })
        };
        dispatcher.add_handler(0, skipped_handler);
        dispatcher.add_handler(0, counting_handler(Arc::clone(&matched), Propagation::Done));
        dispatcher.start();

        dispatcher
            .enqueue(new_message_update(1), UpdateContext::default())
            .await;
        dispatcher.stop().await;

        assert_eq!(skipped.load(Ordering::SeqCst), 0);
        assert_eq!(matched.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn middleware_runs_in_registration_order() {
        let order = Arc::new(StdMutex::new(Vec::new()));

        let mut dispatcher = Dispatcher::new(1);
        for name in ["outer", "inner"] {
            let order = Arc::clone(&order);
            dispatcher.add_middleware(Arc::new(move |update, context, next| {
                let order = Arc::clone(&order);
                Box::pin(async move {
                    order.lock().unwrap().push(format!("{name}:before"));
                    next(update, context).await;
                    order.lock().unwrap().push(format!("{name}:after"));
                })
            }));
        }

        let handled = Arc::new(AtomicUsize::new(0));
        dispatcher.add_handler(0, counting_handler(Arc::clone(&handled), Propagation::Done));
        dispatcher.start();

        dispatcher
            .enqueue(new_message_update(1), UpdateContext::default())
            .await;
        dispatcher.stop().await;

        assert_eq!(handled.load(Ordering::SeqCst), 1);
        assert_eq!(
            *order.lock().unwrap(),
            vec!["outer:before", "inner:before", "inner:after", "outer:after"]
        );
    }

    #[tokio::test]
    async fn blocking_handlers_run_off_the_loop() {
        let handled = Arc::new(AtomicUsize::new(0));

        let mut dispatcher = Dispatcher::new(2);
        let handler = {
            let handled = Arc::clone(&handled);
            HandlerBuilder::new_messages().blocking_callback(move |_, _| {
                // Simulate CPU-bound work.
                std::thread::sleep(std::time::Duration::from_millis(5));
                handled.fetch_add(1, Ordering::SeqCst);
                Propagation::Done
            })
        };
        dispatcher.add_handler(0, handler);
        dispatcher.start();

        for i in 0..4 {
            dispatcher
                .enqueue(new_message_update(i), UpdateContext::default())
                .await;
        }
        dispatcher.stop().await;

        assert_eq!(handled.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn unparsed_updates_reach_raw_handlers() {
        let raw = Arc::new(AtomicUsize::new(0));

        let mut dispatcher = Dispatcher::new(1);
        let handler = {
            let raw = Arc::clone(&raw);
            HandlerBuilder::any()
                .filter(|update, _| matches!(update, ParsedUpdate::Raw(_)))
                .callback(move |_, _| {
                    let raw = Arc::clone(&raw);
                    Box::pin(async move {
                        raw.fetch_add(1, Ordering::SeqCst);
                        Propagation::Done
                    })
                })
        };
        dispatcher.add_handler(0, handler);
        dispatcher.start();

        dispatcher
            .enqueue(
                tl::enums::Update::ChannelTooLong(tl::types::UpdateChannelTooLong {
                    channel_id: 1,
                    pts: None,
                }),
                UpdateContext::default(),
            )
            .await;
        dispatcher.stop().await;

        assert_eq!(raw.load(Ordering::SeqCst), 1);
    }
}
