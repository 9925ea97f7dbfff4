//! Workspace store
//!
//! Owns the workspace list and the single active workspace:
//! - Loads and reconciles the server's current workspace with the persisted id
//! - Switches and creates workspaces through the backend
//! - Publishes every state change on a watch channel
//!
//! # Stale responses
//!
//! Every `load` takes a ticket from a monotonic counter when it starts. A
//! load result commits only if its ticket is newer than the last committed
//! one. A confirmed `switch_to` always commits and supersedes every load
//! issued before it, so a slow load can not undo a switch.

use crate::config::StoreConfig;
use crate::error::{RemoteError, StoreError};
use crate::persistence::PersistenceAdapter;
use crate::remote::RemoteWorkspaceService;
use crate::state::WorkspaceState;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use wsctx_model::{NewWorkspace, PermissionSet, Workspace, WorkspaceId};

/// What to do with the persisted id after a commit
#[derive(Debug, Clone, PartialEq, Eq)]
enum PersistAction {
    Keep,
    Set(WorkspaceId),
    Clear,
}

impl PersistAction {
    fn for_active(active: &Workspace) -> Self {
        match &active.id {
            Some(id) => Self::Set(id.clone()),
            None => Self::Clear,
        }
    }
}

/// Workspace list, active workspace and their persistence
pub struct WorkspaceStore {
    remote: Arc<dyn RemoteWorkspaceService>,
    persistence: Arc<dyn PersistenceAdapter>,
    config: StoreConfig,
    /// Read side of the published state
    state: watch::Receiver<WorkspaceState>,
    /// Write side; `None` once disposed
    publisher: parking_lot::Mutex<Option<watch::Sender<WorkspaceState>>>,
    /// Highest ticket whose result is no longer wanted
    superseded: Mutex<u64>,
    tickets: AtomicU64,
    loads_in_flight: AtomicUsize,
    disposed: AtomicBool,
}

impl WorkspaceStore {
    /// Create a store; nothing is fetched until [`init`](Self::init)
    #[must_use]
    pub fn new(
        remote: Arc<dyn RemoteWorkspaceService>,
        persistence: Arc<dyn PersistenceAdapter>,
        config: StoreConfig,
    ) -> Self {
        let (tx, rx) = watch::channel(WorkspaceState::default());
        Self {
            remote,
            persistence,
            config,
            state: rx,
            publisher: parking_lot::Mutex::new(Some(tx)),
            superseded: Mutex::new(0),
            tickets: AtomicU64::new(0),
            loads_in_flight: AtomicUsize::new(0),
            disposed: AtomicBool::new(false),
        }
    }

    /// First load after construction
    pub async fn init(&self) -> WorkspaceState {
        tracing::debug!("Initializing workspace store");
        self.load().await
    }

    /// Stop publishing; later operations fail with [`StoreError::Disposed`]
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        // dropping the sender ends every subscription
        self.publisher.lock().take();
        tracing::debug!("Workspace store disposed");
    }

    /// Fetch the list and reconcile the active workspace
    ///
    /// Never fails: a list failure degrades to an empty list with the
    /// personal workspace active, and a failed current-workspace lookup
    /// falls back to the persisted id.
    pub async fn load(&self) -> WorkspaceState {
        if self.is_disposed() {
            tracing::warn!("Load requested on disposed workspace store");
            return self.state();
        }

        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;
        let loading = LoadingGuard::enter(self);

        let (workspaces, active, persist) = match self.remote.list_workspaces().await {
            Ok(list) => {
                let workspaces = self.accept_list(list);
                let active = self.reconcile(&workspaces).await;
                let persist = PersistAction::for_active(&active);
                (workspaces, active, persist)
            }
            Err(e) => {
                tracing::warn!("Failed to load workspaces, using personal workspace: {}", e);
                (Vec::new(), Workspace::personal(), PersistAction::Keep)
            }
        };

        self.commit_load(ticket, workspaces, active, persist).await;
        drop(loading);
        self.state()
    }

    /// Re-run [`load`](Self::load)
    pub async fn refresh(&self) -> WorkspaceState {
        self.load().await
    }

    /// Make `id` the active workspace; `None` selects personal
    ///
    /// State changes only after the backend confirms.
    ///
    /// The active entry is taken from the list as it stands when the switch
    /// commits, so a load finishing in between can update its role.
    ///
    /// # Errors
    /// - `StoreError::UnknownWorkspace` if `id` is not in the loaded list,
    ///   before the call or after a load committed during it
    /// - `StoreError::Remote` if the backend rejects the switch
    /// - `StoreError::Disposed` after [`dispose`](Self::dispose), including
    ///   one that happens while the backend call is in flight
    pub async fn switch_to(&self, id: Option<WorkspaceId>) -> Result<Workspace, StoreError> {
        self.ensure_live()?;

        if let Some(id) = &id {
            self.lookup(id)?;
        }

        if let Err(e) = self.remote.switch_workspace(id.as_ref()).await {
            tracing::warn!("Workspace switch failed: {}", e);
            return Err(e.into());
        }

        let active = self.commit_switch(id.as_ref()).await?;
        tracing::info!("Switched to {}", active.display_name(self.config.kind));
        Ok(active)
    }

    /// Create a shared workspace and make it active
    ///
    /// # Errors
    /// - `StoreError::InvalidWorkspace` if the payload is rejected locally
    /// - `StoreError::Remote` if the backend did not create it
    /// - `StoreError::CreatedNotActivated` if it was created but the
    ///   refresh or switch afterwards failed
    pub async fn create(&self, data: NewWorkspace) -> Result<Workspace, StoreError> {
        self.ensure_live()?;
        let data = data.validated()?;

        let created = self.remote.create_workspace(&data).await?;
        tracing::info!("Created {} {}", self.config.kind.label(), created.name);

        let not_activated = |source: StoreError| StoreError::CreatedNotActivated {
            workspace: Box::new(created.clone()),
            source: Box::new(source),
        };

        let Some(id) = created.id.clone() else {
            return Err(not_activated(
                RemoteError::Decode("created workspace has no id".to_string()).into(),
            ));
        };

        self.refresh().await;
        self.switch_to(Some(id)).await.map_err(not_activated)
    }

    /// Current snapshot
    #[must_use]
    pub fn state(&self) -> WorkspaceState {
        self.state.borrow().clone()
    }

    /// Active workspace
    #[must_use]
    pub fn active(&self) -> Workspace {
        self.state.borrow().active.clone()
    }

    /// Loaded workspaces
    #[must_use]
    pub fn workspaces(&self) -> Vec<Workspace> {
        self.state.borrow().workspaces.clone()
    }

    /// Permissions of the active workspace
    #[must_use]
    pub fn permissions(&self) -> PermissionSet {
        self.state.borrow().permissions()
    }

    /// A load is in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Store configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Check if [`dispose`](Self::dispose) was called
    #[inline]
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Receiver notified on every state change after this call
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<WorkspaceState> {
        let mut rx = self.state.clone();
        rx.borrow_and_update();
        rx
    }

    /// Run `callback` for every published state until the listener is dropped
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_change<F>(&self, mut callback: F) -> ChangeListener
    where
        F: FnMut(&WorkspaceState) + Send + 'static,
    {
        let mut rx = self.subscribe();
        let handle = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let state = rx.borrow_and_update().clone();
                callback(&state);
            }
        });
        ChangeListener { handle }
    }

    fn ensure_live(&self) -> Result<(), StoreError> {
        if self.is_disposed() {
            Err(StoreError::Disposed)
        } else {
            Ok(())
        }
    }

    /// Drop entries without an id; only shared workspaces belong in the list
    fn accept_list(&self, list: Vec<Workspace>) -> Vec<Workspace> {
        let total = list.len();
        let workspaces: Vec<Workspace> = list.into_iter().filter(|w| !w.is_personal()).collect();
        if workspaces.len() != total {
            tracing::debug!("Ignored {} workspace entries without id", total - workspaces.len());
        }
        for ws in workspaces.iter().filter(|w| w.my_role.is_none()) {
            tracing::debug!(
                workspace = ws.id_str().unwrap_or_default(),
                "{} has no role, resolving to no permissions",
                self.config.kind.label()
            );
        }
        workspaces
    }

    /// Pick the active workspace: server current, then persisted id, then personal
    async fn reconcile(&self, workspaces: &[Workspace]) -> Workspace {
        match self.remote.current_workspace().await {
            Ok(Some(current)) => {
                if let Some(ws) = current.id.as_ref().and_then(|id| find_in(workspaces, id)) {
                    tracing::debug!("Using server current workspace {}", ws.name);
                    return ws;
                }
                tracing::debug!("Server current workspace is not in the list");
            }
            Ok(None) => tracing::debug!("Server reports no current workspace"),
            Err(e) => tracing::warn!("Failed to fetch current workspace: {}", e),
        }

        let persisted = match self.persistence.get(&self.config.storage_key).await {
            Ok(value) => value.map(WorkspaceId::from),
            Err(e) => {
                tracing::warn!("Failed to read persisted workspace id: {}", e);
                None
            }
        };

        match persisted {
            Some(id) => find_in(workspaces, &id).unwrap_or_else(|| {
                tracing::debug!("Persisted workspace {} is no longer available", id);
                Workspace::personal()
            }),
            None => Workspace::personal(),
        }
    }

    async fn commit_load(
        &self,
        ticket: u64,
        workspaces: Vec<Workspace>,
        active: Workspace,
        persist: PersistAction,
    ) -> bool {
        let mut superseded = self.superseded.lock().await;
        if ticket <= *superseded {
            tracing::debug!(ticket, "Discarding stale workspace load");
            return false;
        }
        *superseded = ticket;

        self.persist(persist).await;
        self.publish(move |s| {
            s.workspaces = workspaces;
            s.active = active;
        });
        true
    }

    async fn commit_switch(&self, id: Option<&WorkspaceId>) -> Result<Workspace, StoreError> {
        let mut superseded = self.superseded.lock().await;
        self.ensure_live()?;

        let active = match id {
            None => Workspace::personal(),
            Some(id) => match self.lookup(id) {
                Ok(ws) => ws,
                Err(e) => {
                    tracing::warn!("Workspace {} left the list while switching", id);
                    return Err(e);
                }
            },
        };
        *superseded = self.tickets.load(Ordering::SeqCst);

        self.persist(PersistAction::for_active(&active)).await;
        let published = active.clone();
        self.publish(move |s| s.active = published);
        Ok(active)
    }

    fn lookup(&self, id: &WorkspaceId) -> Result<Workspace, StoreError> {
        self.state
            .borrow()
            .find(id)
            .cloned()
            .ok_or_else(|| StoreError::UnknownWorkspace(id.clone()))
    }

    async fn persist(&self, action: PersistAction) {
        let key = self.config.storage_key.as_str();
        let result = match &action {
            PersistAction::Keep => return,
            PersistAction::Set(id) => self.persistence.set(key, id.as_str()).await,
            PersistAction::Clear => self.persistence.remove(key).await,
        };
        if let Err(e) = result {
            tracing::warn!("Failed to persist active workspace ({:?}): {}", action, e);
        }
    }

    fn publish(&self, update: impl FnOnce(&mut WorkspaceState)) {
        if let Some(tx) = self.publisher.lock().as_ref() {
            tx.send_modify(update);
        }
    }
}

impl fmt::Debug for WorkspaceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkspaceStore")
            .field("config", &self.config)
            .field("state", &*self.state.borrow())
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

fn find_in(workspaces: &[Workspace], id: &WorkspaceId) -> Option<Workspace> {
    workspaces.iter().find(|w| w.id.as_ref() == Some(id)).cloned()
}

/// Keeps `loading` set while at least one load is in flight
struct LoadingGuard<'a> {
    store: &'a WorkspaceStore,
}

impl<'a> LoadingGuard<'a> {
    fn enter(store: &'a WorkspaceStore) -> Self {
        store.loads_in_flight.fetch_add(1, Ordering::SeqCst);
        store.publish(|s| s.loading = store.loads_in_flight.load(Ordering::SeqCst) > 0);
        Self { store }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let store = self.store;
        store.loads_in_flight.fetch_sub(1, Ordering::SeqCst);
        store.publish(|s| s.loading = store.loads_in_flight.load(Ordering::SeqCst) > 0);
    }
}

/// Background listener started by [`WorkspaceStore::on_change`]
///
/// Aborted on drop; ends on its own when the store is disposed.
#[derive(Debug)]
pub struct ChangeListener {
    handle: JoinHandle<()>,
}

impl ChangeListener {
    /// Listener task has ended
    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ChangeListener {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
