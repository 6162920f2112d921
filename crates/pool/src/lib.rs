//! # Nebula Pool
//!
//! Bounded pooling for expensive, reusable, asynchronously-executing
//! resources such as connections, workers and handles.
//!
//! A [`Pool`] creates resources lazily through a [`Factory`] up to
//! `max_pool_size`, lends each one to a single request at a time, takes it
//! back when the request finishes and evicts dead or long-idle resources
//! whenever [`Pool::maintenance`] runs.
//!
//! ```rust,ignore
//! let pool = Pool::build(factory, PoolConfig::from_millis(2, 8, 30_000, 1_000)).await?;
//! let maintainer = Maintainer::new(Duration::from_secs(5), CancellationToken::new())?;
//! maintainer.start(pool.clone());
//!
//! let response = pool.execute(request).await?;
//! ```

pub mod error;
pub mod events;
pub mod guard;
pub mod maintenance;
pub mod pool;
pub mod resource;
pub mod testing;

pub use error::{Error, Result};
pub use events::{EventBus, EvictionReason, PoolEvent};
pub use guard::Guard;
pub use maintenance::Maintainer;
pub use pool::{Pool, PoolConfig, PoolStats};
pub use resource::{Factory, Resource};
