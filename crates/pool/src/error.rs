//! Error types for pool operations
use thiserror::Error;

/// Result type for pool operations
pub type Result<T> = std::result::Result<T, Error>;

/// Every outcome a caller of the pool can observe besides a response.
#[derive(Error, Debug)]
pub enum Error {
    /// Pool configuration is invalid
    #[error("Configuration error: {message}")]
    Configuration {
        /// The error message
        message: String,
    },

    /// The factory failed to build a resource
    #[error("Initialization failed for pool '{pool}': {reason}")]
    Initialization {
        /// The pool name
        pool: String,
        /// The failure reason
        reason: String,
        /// The underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No resource became available within the acquire timeout, or the
    /// wait was cancelled
    #[error("Resource pool exhausted for '{pool}': {current_size}/{max_size} in use")]
    PoolExhausted {
        /// The pool name
        pool: String,
        /// Resources in membership when the acquisition gave up
        current_size: usize,
        /// Maximum pool size
        max_size: usize,
        /// Number of waiters in queue
        waiters: usize,
    },

    /// The resource ran the request and reported a failure
    #[error("Execution failed on resource '{resource}' in pool '{pool}': {source}")]
    Execution {
        /// The pool name
        pool: String,
        /// Identity of the resource that ran the request
        resource: String,
        /// The resource's own error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The pool has been shut down
    #[error("Pool '{pool}' is shut down")]
    Closed {
        /// The pool name
        pool: String,
    },

    /// Generic internal error
    #[error("Internal error in pool '{pool}': {message}")]
    Internal {
        /// The pool name
        pool: String,
        /// The error message
        message: String,
    },
}

impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an initialization error without an underlying source.
    pub fn initialization(pool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Initialization {
            pool: pool.into(),
            reason: reason.into(),
            source: None,
        }
    }

    /// Create an exhaustion error
    pub fn pool_exhausted(
        pool: impl Into<String>,
        current_size: usize,
        max_size: usize,
        waiters: usize,
    ) -> Self {
        Self::PoolExhausted {
            pool: pool.into(),
            current_size,
            max_size,
            waiters,
        }
    }

    /// Wrap a resource's execution failure.
    pub fn execution<E>(pool: impl Into<String>, resource: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Execution {
            pool: pool.into(),
            resource: resource.into(),
            source: Box::new(source),
        }
    }

    /// Create an internal error
    pub fn internal(pool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Internal {
            pool: pool.into(),
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    ///
    /// Only exhaustion qualifies: the pool never retries on its own, but a
    /// caller may try again once resources are released.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PoolExhausted { .. })
    }

    /// `true` when no resource could be acquired in time.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::PoolExhausted { .. })
    }

    /// Get the pool name associated with this error (if any)
    #[must_use]
    pub fn pool(&self) -> Option<&str> {
        match self {
            Self::Configuration { .. } => None,
            Self::Initialization { pool, .. }
            | Self::PoolExhausted { pool, .. }
            | Self::Execution { pool, .. }
            | Self::Closed { pool }
            | Self::Internal { pool, .. } => Some(pool),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("socket reset")]
    struct Reset;

    #[test]
    fn exhaustion_is_retryable() {
        let err = Error::pool_exhausted("db", 2, 2, 1);
        assert!(err.is_retryable());
        assert!(err.is_exhausted());
        assert_eq!(err.pool(), Some("db"));
        assert_eq!(err.to_string(), "Resource pool exhausted for 'db': 2/2 in use");
    }

    #[test]
    fn execution_failure_keeps_source() {
        let err = Error::execution("db", "7", Reset);
        assert!(!err.is_retryable());
        let source = std::error::Error::source(&err).expect("source is kept");
        assert!(source.downcast_ref::<Reset>().is_some());
        assert!(err.to_string().contains("socket reset"));
    }

    #[test]
    fn configuration_has_no_pool() {
        let err = Error::configuration("max_pool_size must be greater than 0");
        assert_eq!(err.pool(), None);
        assert!(!err.is_retryable());
    }
}
