// Copyright 2024 - developers of the `ferrogram` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A client to interact with Telegram's API over the ferrogram MTProto
//! stack.
//!
//! The [`Client`] owns the connection to the home datacenter and drives
//! all IO; cloneable [`ClientHandle`]s invoke remote procedure calls,
//! download files (following CDN redirects), and feed the update
//! [`dispatcher`].
pub mod cache;
mod client;
pub mod dispatcher;

pub use client::files::{DownloadIter, MAX_CHUNK_SIZE, MIN_CHUNK_SIZE};
pub use client::{Client, ClientHandle, Config, InitParams, Step};
pub use dispatcher::{
    Dispatcher, DispatcherHandle, Handler, HandlerBuilder, Middleware, Next, ParsedUpdate,
    Propagation, UpdateContext,
};
pub use ferrogram_mtsender::{InvocationError, RpcError};
