//! sbxctl core
//!
//! Client-side logic for managing on-demand sandboxes through the platform
//! admin API.
//!
//! # Overview
//!
//! - [`ExpiringCache`] - durable get-or-compute cache with an injectable
//!   [`Clock`] and [`CacheStore`]
//! - [`TokenProvider`] - bearer tokens, cached just under their real lifetime
//! - [`Registry`] - the sandbox list (cached for two weeks) and code versions
//!   (always fresh)
//! - [`Resolver`] - maps a partial host name or exact id to sandboxes
//! - [`Dispatcher`] - runs start/stop/restart batches, code activation and
//!   realm usage queries
//! - [`Session`] - owns the client, credentials and cache for one invocation
//!
//! # Quick Start
//!
//! ```ignore
//! use sbxctl_core::{Credentials, Endpoints, ExpiringCache, FileStore, Session, SystemClock};
//! use sbxctl_types::SandboxOperation;
//!
//! let cache = ExpiringCache::new(FileStore::in_user_cache_dir()?, SystemClock);
//! let session = Session::new(
//!     Credentials::new(Some(client_id), Some(client_secret))?,
//!     Endpoints::default(),
//!     cache,
//! )?;
//!
//! let targets = session.resolver().resolve("zzzz-s0").await?;
//! let report = session
//!     .dispatcher()
//!     .dispatch(SandboxOperation::Stop, &targets)
//!     .await?;
//! for outcome in report.failed() {
//!     eprintln!("{}: {:?}", outcome.sandbox.host_name, outcome.error);
//! }
//! ```

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod session;
pub mod timerange;

pub use api::ApiClient;
pub use auth::{TOKEN_CACHE_KEY, TokenProvider, token_ttl};
pub use cache::{
    CacheEntry, CacheStore, Clock, ExpiringCache, FileStore, ManualClock, MemoryStore,
    SystemClock,
};
pub use config::{Credentials, Endpoints};
pub use dispatch::{ActivationOutcome, BatchReport, Dispatcher, OperationOutcome, validate_realm};
pub use error::{Result, SbxError};
pub use registry::{Registry, SANDBOX_LIST_CACHE_KEY, sandbox_list_ttl};
pub use resolver::{Resolver, latest_code_version_matching, matching_sandboxes};
pub use session::Session;
pub use timerange::DateRange;
