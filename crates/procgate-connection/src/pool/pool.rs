//! Connection pool implementation

use std::collections::VecDeque;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use async_trait::async_trait;
use parking_lot::Mutex;
use procgate_core::{ProcedureConnection, ProcgateError, Result};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::config::PoolConfig;
use super::stats::PoolStats;

/// Factory trait for creating new connections
#[async_trait]
pub trait ConnectionFactory: Send + Sync + 'static {
    /// Create a new connection
    async fn create(&self) -> Result<Arc<dyn ProcedureConnection>>;

    /// Validate that a connection is still usable
    ///
    /// Default implementation only checks that the connection is open.
    async fn validate(&self, conn: &dyn ProcedureConnection) -> bool {
        !conn.is_closed()
    }
}

#[async_trait]
impl<T: ConnectionFactory> ConnectionFactory for Arc<T> {
    async fn create(&self) -> Result<Arc<dyn ProcedureConnection>> {
        (**self).create().await
    }

    async fn validate(&self, conn: &dyn ProcedureConnection) -> bool {
        (**self).validate(conn).await
    }
}

/// Idle connection with lifecycle timestamps
struct IdleConnection {
    connection: Arc<dyn ProcedureConnection>,
    created_at: Instant,
    last_used_at: Instant,
}

impl IdleConnection {
    fn new(connection: Arc<dyn ProcedureConnection>, created_at: Instant) -> Self {
        Self {
            connection,
            created_at,
            last_used_at: Instant::now(),
        }
    }
}

/// A bounded pool of procedure connections
///
/// At most `max_size` connections are borrowed at once. Connections go back
/// to the pool when the `PooledConnection` guard is dropped.
pub struct ConnectionPool {
    config: PoolConfig,
    factory: Arc<dyn ConnectionFactory>,
    idle: Mutex<VecDeque<IdleConnection>>,
    /// Limits the number of borrowed connections
    semaphore: Arc<Semaphore>,
    active_count: AtomicUsize,
    waiting_count: AtomicUsize,
}

impl ConnectionPool {
    /// Create a new connection pool with the given configuration and factory
    pub fn new<F: ConnectionFactory>(config: PoolConfig, factory: F) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_size()));
        Self {
            config,
            factory: Arc::new(factory),
            idle: Mutex::new(VecDeque::new()),
            semaphore,
            active_count: AtomicUsize::new(0),
            waiting_count: AtomicUsize::new(0),
        }
    }

    /// Open `min_size` connections ahead of the first request.
    ///
    /// Failures are logged and skipped; returns how many connections opened.
    pub async fn warm_up(&self) -> usize {
        let target = self.config.min_size();
        let mut opened = 0;

        for _ in 0..target {
            match self.factory.create().await {
                Ok(connection) => {
                    self.idle
                        .lock()
                        .push_back(IdleConnection::new(connection, Instant::now()));
                    opened += 1;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to open pooled connection during warm-up");
                }
            }
        }

        tracing::info!(opened, target, "connection pool warmed up");
        opened
    }

    /// Get a connection from the pool
    ///
    /// This will:
    /// 1. Wait for a free slot (at most `max_size` connections are borrowed)
    /// 2. Reuse a valid idle connection if there is one
    /// 3. Otherwise open a new connection through the factory
    ///
    /// Returns `ProcgateError::Timeout` if the acquire timeout is exceeded.
    pub async fn get(&self) -> Result<PooledConnection<'_>> {
        self.waiting_count.fetch_add(1, Ordering::SeqCst);

        let result = tokio::time::timeout(self.config.acquire_timeout(), async {
            let permit = self
                .semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| ProcgateError::Connection("Pool semaphore closed".into()))?;

            let (connection, created_at) = match self.try_get_idle().await {
                Some(idle) => (idle.connection, idle.created_at),
                None => (self.factory.create().await?, Instant::now()),
            };

            Ok::<_, ProcgateError>((connection, created_at, permit))
        })
        .await;

        self.waiting_count.fetch_sub(1, Ordering::SeqCst);

        match result {
            Ok(Ok((connection, created_at, permit))) => {
                self.active_count.fetch_add(1, Ordering::SeqCst);
                Ok(PooledConnection {
                    connection,
                    created_at,
                    pool: self,
                    _permit: permit,
                })
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ProcgateError::Timeout(format!(
                "Timed out waiting for connection (timeout: {:?})",
                self.config.acquire_timeout()
            ))),
        }
    }

    /// Pop idle connections until one passes lifetime, idle-time and
    /// validation checks; rejected ones are closed.
    async fn try_get_idle(&self) -> Option<IdleConnection> {
        loop {
            let idle = { self.idle.lock().pop_front() }?;

            if let Some(max_lifetime) = self.config.max_lifetime() {
                if idle.created_at.elapsed() > max_lifetime {
                    let _ = idle.connection.close().await;
                    continue;
                }
            }

            if idle.last_used_at.elapsed() > self.config.idle_timeout() {
                let _ = idle.connection.close().await;
                continue;
            }

            if !self.factory.validate(&*idle.connection).await {
                let _ = idle.connection.close().await;
                continue;
            }

            return Some(idle);
        }
    }

    /// Return a connection to the pool
    fn return_connection(&self, connection: Arc<dyn ProcedureConnection>, created_at: Instant) {
        self.active_count.fetch_sub(1, Ordering::SeqCst);

        // Closed connections are discarded
        if connection.is_closed() {
            tracing::debug!("discarding closed connection");
            return;
        }

        self.idle
            .lock()
            .push_back(IdleConnection::new(connection, created_at));
    }

    /// Get current pool statistics
    pub fn stats(&self) -> PoolStats {
        let idle = self.idle.lock().len();
        let active = self.active_count.load(Ordering::SeqCst);
        let waiting = self.waiting_count.load(Ordering::SeqCst);
        PoolStats::new(idle + active, idle, active, waiting)
    }

    /// Get the pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Close all idle connections in the pool
    pub async fn close_idle(&self) {
        let connections: Vec<_> = {
            let mut idle = self.idle.lock();
            idle.drain(..).collect()
        };

        for idle in connections {
            let _ = idle.connection.close().await;
        }
    }
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}

/// A connection borrowed from the pool
///
/// When dropped, the connection is returned to the pool.
pub struct PooledConnection<'a> {
    connection: Arc<dyn ProcedureConnection>,
    created_at: Instant,
    pool: &'a ConnectionPool,
    _permit: OwnedSemaphorePermit,
}

impl<'a> Deref for PooledConnection<'a> {
    type Target = dyn ProcedureConnection;

    fn deref(&self) -> &Self::Target {
        self.connection.as_ref()
    }
}

impl<'a> Drop for PooledConnection<'a> {
    fn drop(&mut self) {
        self.pool
            .return_connection(Arc::clone(&self.connection), self.created_at);
    }
}

impl<'a> PooledConnection<'a> {
    /// Get the underlying connection as an Arc
    pub fn inner(&self) -> &Arc<dyn ProcedureConnection> {
        &self.connection
    }
}
