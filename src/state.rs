use std::{
    ops::{Deref, DerefMut},
    sync::Arc,
    time::Duration,
};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use diesel::{
    SqliteConnection,
    connection::{SimpleConnection, TransactionManager},
    r2d2::{
        ConnectionManager, CustomizeConnection, Pool, PoolError,
        PooledConnection,
    },
};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

type PooledConn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Pragmas applied to every connection the pool hands out.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionOptions {
    pub busy_timeout: Duration,
    pub wal: bool,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_secs(5),
            wal: false,
        }
    }
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error>
    for ConnectionOptions
{
    fn on_acquire(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<(), diesel::r2d2::Error> {
        let mut pragmas = format!(
            "PRAGMA busy_timeout = {}; PRAGMA foreign_keys = ON;",
            self.busy_timeout.as_millis()
        );
        if self.wal {
            pragmas.push_str(
                " PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;",
            );
        }

        conn.batch_execute(&pragmas)
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Builds the connection pool for `database_url`.
///
/// Every `:memory:` connection is its own database, so in that case the pool
/// holds exactly one connection and never recycles it.
pub fn build_pool(database_url: &str) -> Result<DbPool, PoolError> {
    let in_memory = database_url == ":memory:";

    let builder = Pool::builder()
        .max_size(if in_memory { 1 } else { 10 })
        .connection_customizer(Box::new(ConnectionOptions {
            wal: !in_memory,
            ..Default::default()
        }));

    let builder = if in_memory {
        builder.idle_timeout(None).max_lifetime(None)
    } else {
        builder
    };

    builder.build(ConnectionManager::<SqliteConnection>::new(database_url))
}

/// A pooled connection shared between the extractors of a single request.
///
/// With `TX = true` a transaction is opened when the connection is first
/// extracted, and [`tx_commit`] settles it once the response is known.
#[derive(Clone)]
pub struct ThreadSafeConn<const TX: bool> {
    pub inner: Arc<tokio::sync::Mutex<PooledConn>>,
}

/// Filled in by [`ThreadSafeConn`] when it opens a request transaction.
#[derive(Clone, Default)]
struct TxSlot(Arc<std::sync::Mutex<Option<ThreadSafeConn<true>>>>);

#[async_trait]
impl<S, const TX: bool> FromRequestParts<S> for ThreadSafeConn<TX>
where
    S: Send + Sync,
    DbPool: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        if let Some(conn) = parts.extensions.get::<ThreadSafeConn<TX>>() {
            return Ok(conn.clone());
        }

        let slot = if TX {
            match parts.extensions.get::<TxSlot>() {
                Some(slot) => Some(slot.clone()),
                None => {
                    tracing::error!(
                        "transactional connection requested without the \
                         tx_commit middleware"
                    );
                    return Err(StatusCode::INTERNAL_SERVER_ERROR);
                }
            }
        } else {
            None
        };

        let pool = DbPool::from_ref(state);
        let mut conn = tokio::task::spawn_blocking(move || pool.get())
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
            .map_err(|e| {
                tracing::error!("could not check out a connection: {e}");
                StatusCode::SERVICE_UNAVAILABLE
            })?;

        if let Some(slot) = slot {
            <PooledConn as diesel::Connection>::TransactionManager::begin_transaction(&mut conn)
                .map_err(|e| {
                    tracing::error!("could not begin request transaction: {e}");
                    StatusCode::INTERNAL_SERVER_ERROR
                })?;

            let conn = Arc::new(tokio::sync::Mutex::new(conn));
            if let Ok(mut slot) = slot.0.lock() {
                *slot = Some(ThreadSafeConn {
                    inner: conn.clone(),
                });
            }
            let conn = ThreadSafeConn { inner: conn };
            parts.extensions.insert(conn.clone());
            return Ok(conn);
        }

        let conn = ThreadSafeConn {
            inner: Arc::new(tokio::sync::Mutex::new(conn)),
        };
        parts.extensions.insert(conn.clone());
        Ok(conn)
    }
}

/// Commits the request transaction (if one was opened) on informational,
/// success and redirect responses, and rolls it back otherwise.
pub async fn tx_commit(mut req: Request, next: Next) -> Response {
    let slot = TxSlot::default();
    req.extensions_mut().insert(slot.clone());

    let res = next.run(req).await;

    let conn = match slot.0.lock() {
        Ok(mut slot) => slot.take(),
        Err(_) => None,
    };

    if let Some(conn) = conn {
        let status = res.status();
        let commit = status.is_success()
            || status.is_redirection()
            || status.is_informational();

        let mut conn = conn.inner.lock().await;
        let outcome = if commit {
            <PooledConn as diesel::Connection>::TransactionManager::commit_transaction(&mut *conn)
        } else {
            <PooledConn as diesel::Connection>::TransactionManager::rollback_transaction(&mut *conn)
        };

        if let Err(e) = outcome {
            tracing::error!(commit, "failed to settle request transaction: {e}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    res
}

/// Exclusive access to the request's connection for the duration of a
/// handler.
pub struct Conn<const TX: bool> {
    inner: tokio::sync::OwnedMutexGuard<PooledConn>,
}

impl<const TX: bool> Deref for Conn<TX> {
    type Target = PooledConn;

    fn deref(&self) -> &Self::Target {
        self.inner.deref()
    }
}

impl<const TX: bool> DerefMut for Conn<TX> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.inner.deref_mut()
    }
}

#[async_trait]
impl<S, const TX: bool> FromRequestParts<S> for Conn<TX>
where
    S: Send + Sync,
    DbPool: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let conn = ThreadSafeConn::<TX>::from_request_parts(parts, state).await?;

        // Extractors that borrow the connection (e.g. `User`) release it
        // before returning, so this only fails on a handler asking twice.
        let inner = conn.inner.try_lock_owned().map_err(|_| {
            tracing::error!("request connection is already locked");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

        Ok(Conn { inner })
    }
}
