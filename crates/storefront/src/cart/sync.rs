//! Keeps the cart in step with the customer's auth status.
//!
//! The authentication side owns an [`AuthSignal`] and publishes every
//! sign-in and sign-out on it. A [`SyncController`] watches the signal and,
//! on each transition, points the store at the matching backend and
//! reloads it:
//!
//! - into `Authenticated`: in-memory guest items are dropped, then the
//!   server cart is loaded. Guest items are not merged into it.
//! - into `Guest`: the cart saved on this device is loaded.
//!
//! Mutations and reloads share one `tokio::sync::Mutex`, so a reload never
//! interleaves with an in-flight add or remove.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::persistence::CartPersistence;
use super::store::CartStore;
use crate::config::StorefrontConfig;
use crate::error::CartError;
use crate::models::{AuthSession, AuthStatus};
use crate::remote::{RemoteCart, RemoteCartClient};
use crate::storage::{FileStorage, LocalStorage};

/// Publisher side of the auth status.
#[derive(Debug)]
pub struct AuthSignal {
    tx: watch::Sender<AuthStatus>,
}

impl AuthSignal {
    #[must_use]
    pub fn new(initial: AuthStatus) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Publish a sign-in.
    pub fn sign_in(&self, session: AuthSession) {
        self.publish(AuthStatus::Authenticated(session));
    }

    /// Publish a sign-out.
    pub fn sign_out(&self) {
        self.publish(AuthStatus::Guest);
    }

    /// Publish a status.
    pub fn publish(&self, status: AuthStatus) {
        debug!(authenticated = status.is_authenticated(), "Auth status changed");
        self.tx.send_replace(status);
    }

    /// The last published status.
    #[must_use]
    pub fn current(&self) -> AuthStatus {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthStatus> {
        self.tx.subscribe()
    }
}

/// Applies auth transitions to a [`CartStore`].
#[derive(Debug)]
pub struct SyncController {
    rx: watch::Receiver<AuthStatus>,
}

impl SyncController {
    #[must_use]
    pub const fn new(rx: watch::Receiver<AuthStatus>) -> Self {
        Self { rx }
    }

    /// Apply the status current right now, marking it seen.
    pub async fn start<S: LocalStorage, R: RemoteCart>(&mut self, store: &mut CartStore<S, R>) {
        let status = self.rx.borrow_and_update().clone();
        Self::apply(store, status).await;
    }

    /// Wait for the next published status.
    ///
    /// Statuses published faster than they are consumed collapse into the
    /// latest one. Returns `None` once every [`AuthSignal`] is dropped.
    pub async fn next_status(&mut self) -> Option<AuthStatus> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Point `store` at the backend for `status` and reload it.
    pub async fn apply<S: LocalStorage, R: RemoteCart>(
        store: &mut CartStore<S, R>,
        status: AuthStatus,
    ) {
        let signing_in = status.is_authenticated() && !store.status().is_authenticated();
        if signing_in && !store.items().is_empty() {
            info!(
                lines = store.items().len(),
                "Discarding guest items on sign-in"
            );
        }
        store.set_status(status);
        store.reload().await;
    }

    /// Apply the current status, then every later transition, until the
    /// signal is dropped.
    pub async fn run<S: LocalStorage, R: RemoteCart>(mut self, store: Arc<Mutex<CartStore<S, R>>>) {
        {
            let mut store = store.lock().await;
            self.start(&mut store).await;
        }
        while let Some(status) = self.next_status().await {
            let mut store = store.lock().await;
            Self::apply(&mut store, status).await;
        }
        debug!("Auth signal closed, cart sync stopped");
    }
}

/// A cart store wired to an auth signal.
pub struct CartEngine<S, R> {
    store: Arc<Mutex<CartStore<S, R>>>,
    signal: AuthSignal,
}

impl<S, R> CartEngine<S, R>
where
    S: LocalStorage + 'static,
    R: RemoteCart + 'static,
{
    #[must_use]
    pub fn new(persistence: CartPersistence<S, R>, initial: AuthStatus) -> Self {
        Self {
            store: Arc::new(Mutex::new(CartStore::new(persistence))),
            signal: AuthSignal::new(initial),
        }
    }

    /// The auth signal to publish sign-ins and sign-outs on.
    #[must_use]
    pub const fn signal(&self) -> &AuthSignal {
        &self.signal
    }

    /// Shared handle to the store.
    #[must_use]
    pub fn store(&self) -> Arc<Mutex<CartStore<S, R>>> {
        Arc::clone(&self.store)
    }

    /// Lock the store for a read or mutation.
    pub async fn lock(&self) -> MutexGuard<'_, CartStore<S, R>> {
        self.store.lock().await
    }

    /// Load the cart for the current status without spawning a watcher.
    ///
    /// Suits one-shot callers such as the CLI.
    pub async fn load_current(&self) {
        let mut controller = SyncController::new(self.signal.subscribe());
        let mut store = self.store.lock().await;
        controller.start(&mut store).await;
    }

    /// Spawn the sync controller as a background task.
    ///
    /// The task applies the current status immediately and then follows
    /// the signal until the engine is dropped.
    pub fn spawn_sync(&self) -> JoinHandle<()> {
        let controller = SyncController::new(self.signal.subscribe());
        let store = Arc::clone(&self.store);
        info!("Spawning cart sync task");
        tokio::spawn(controller.run(store))
    }
}

impl CartEngine<FileStorage, RemoteCartClient> {
    /// Engine backed by file storage and the HTTP cart API.
    ///
    /// # Errors
    ///
    /// Returns error if the storage directory cannot be created or the HTTP
    /// client fails to build.
    pub fn from_config(config: &StorefrontConfig, initial: AuthStatus) -> Result<Self, CartError> {
        let storage = FileStorage::open(&config.data_dir, config.storage_quota_bytes)?;
        let remote = RemoteCartClient::new(config)?;
        Ok(Self::new(CartPersistence::new(storage, remote), initial))
    }
}
