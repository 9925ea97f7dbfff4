//! Testing utilities for wsctx workspace
//!
//! Shared test helpers, fixtures, and a scriptable in-memory backend.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use ulid::Ulid;
use wsctx_model::{NewWorkspace, Role, Workspace, WorkspaceId};
use wsctx_store::{
    MemoryPersistence, PersistenceAdapter, PersistenceError, RemoteError,
    RemoteWorkspaceService, StoreConfig, WorkspaceStore,
};

#[derive(Debug, Default)]
struct FakeState {
    workspaces: Vec<Workspace>,
    current: Option<Workspace>,
    fail_list: Option<RemoteError>,
    fail_current: Option<RemoteError>,
    fail_switch: Option<RemoteError>,
    fail_create: Option<RemoteError>,
    switched: Vec<Option<WorkspaceId>>,
}

#[derive(Debug, Default)]
struct CallCounts {
    list: AtomicUsize,
    current: AtomicUsize,
    switch: AtomicUsize,
    create: AtomicUsize,
}

/// In-memory backend with failure injection
#[derive(Debug, Default)]
pub struct FakeWorkspaceService {
    state: Mutex<FakeState>,
    current_gate: Mutex<Option<Arc<Notify>>>,
    switch_gate: Mutex<Option<Arc<Notify>>>,
    calls: CallCounts,
}

impl FakeWorkspaceService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workspaces(workspaces: Vec<Workspace>) -> Self {
        let fake = Self::new();
        fake.set_workspaces(workspaces);
        fake
    }

    pub fn set_workspaces(&self, workspaces: Vec<Workspace>) {
        self.state.lock().workspaces = workspaces;
    }

    /// Record `current` as the server-side active workspace, bypassing checks
    pub fn set_current(&self, current: Option<Workspace>) {
        self.state.lock().current = current;
    }

    pub fn current_id(&self) -> Option<WorkspaceId> {
        self.state.lock().current.as_ref().and_then(|w| w.id.clone())
    }

    pub fn fail_list(&self, err: RemoteError) {
        self.state.lock().fail_list = Some(err);
    }

    pub fn fail_current(&self, err: RemoteError) {
        self.state.lock().fail_current = Some(err);
    }

    pub fn fail_switch(&self, err: RemoteError) {
        self.state.lock().fail_switch = Some(err);
    }

    pub fn fail_create(&self, err: RemoteError) {
        self.state.lock().fail_create = Some(err);
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.lock();
        state.fail_list = None;
        state.fail_current = None;
        state.fail_switch = None;
        state.fail_create = None;
    }

    /// Hold the response of the next `current_workspace` call
    ///
    /// The response is computed when the call arrives and delivered after
    /// the returned handle is notified, like a slow network reply.
    pub fn hold_current(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.current_gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    /// Hold the reply of the next `switch_workspace` call
    ///
    /// The server-side switch is applied when the call arrives; only the
    /// reply waits for the returned handle.
    pub fn hold_switch(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.switch_gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    pub fn switched(&self) -> Vec<Option<WorkspaceId>> {
        self.state.lock().switched.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.calls.list.load(Ordering::SeqCst)
    }

    pub fn current_calls(&self) -> usize {
        self.calls.current.load(Ordering::SeqCst)
    }

    pub fn switch_calls(&self) -> usize {
        self.calls.switch.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.calls.create.load(Ordering::SeqCst)
    }
}

impl FakeWorkspaceService {
    fn apply_switch(&self, id: Option<&WorkspaceId>) -> Result<(), RemoteError> {
        let mut state = self.state.lock();
        if let Some(err) = &state.fail_switch {
            return Err(err.clone());
        }

        let current = match id {
            None => None,
            Some(id) => match state.workspaces.iter().find(|w| w.id.as_ref() == Some(id)) {
                Some(ws) => Some(ws.clone()),
                None => {
                    return Err(RemoteError::Status {
                        status: 404,
                        message: format!("workspace {id} not found"),
                    })
                }
            },
        };
        state.current = current;
        state.switched.push(id.cloned());
        Ok(())
    }
}

#[async_trait]
impl RemoteWorkspaceService for FakeWorkspaceService {
    async fn list_workspaces(&self) -> Result<Vec<Workspace>, RemoteError> {
        self.calls.list.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock();
        match &state.fail_list {
            Some(err) => Err(err.clone()),
            None => Ok(state.workspaces.clone()),
        }
    }

    async fn current_workspace(&self) -> Result<Option<Workspace>, RemoteError> {
        self.calls.current.fetch_add(1, Ordering::SeqCst);
        let response = {
            let state = self.state.lock();
            match &state.fail_current {
                Some(err) => Err(err.clone()),
                None => Ok(state.current.clone()),
            }
        };

        let gate = self.current_gate.lock().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        response
    }

    async fn switch_workspace(&self, id: Option<&WorkspaceId>) -> Result<(), RemoteError> {
        self.calls.switch.fetch_add(1, Ordering::SeqCst);
        let response = self.apply_switch(id);

        let gate = self.switch_gate.lock().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        response
    }

    async fn create_workspace(&self, data: &NewWorkspace) -> Result<Workspace, RemoteError> {
        self.calls.create.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        if let Some(err) = &state.fail_create {
            return Err(err.clone());
        }

        let mut created = Workspace::shared(
            format!("ws_{}", Ulid::new().to_string().to_lowercase()),
            data.name.clone(),
            Role::Owner,
        )
        .with_member_count(1);
        created.description = data.description.clone();
        created.logo_url = data.logo_url.clone();

        state.workspaces.push(created.clone());
        Ok(created)
    }
}

/// Storage whose every operation fails
#[derive(Debug, Default)]
pub struct FailingPersistence;

#[async_trait]
impl PersistenceAdapter for FailingPersistence {
    async fn get(&self, _key: &str) -> Result<Option<String>, PersistenceError> {
        Err(unavailable())
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), PersistenceError> {
        Err(unavailable())
    }

    async fn remove(&self, _key: &str) -> Result<(), PersistenceError> {
        Err(unavailable())
    }
}

fn unavailable() -> PersistenceError {
    PersistenceError::Io(std::io::Error::new(
        std::io::ErrorKind::PermissionDenied,
        "storage unavailable",
    ))
}

pub fn acme_member() -> Workspace {
    Workspace::shared("ws_acme", "Acme", Role::Member).with_member_count(5)
}

pub fn globex_admin() -> Workspace {
    Workspace::shared("ws_globex", "Globex", Role::Admin).with_member_count(12)
}

pub fn initech_viewer() -> Workspace {
    Workspace::shared("ws_initech", "Initech", Role::Viewer).with_member_count(3)
}

pub fn sample_workspaces() -> Vec<Workspace> {
    vec![acme_member(), globex_admin(), initech_viewer()]
}

pub fn server_error() -> RemoteError {
    RemoteError::Status {
        status: 500,
        message: "internal server error".to_string(),
    }
}

pub fn setup_store(
    remote: &Arc<FakeWorkspaceService>,
    persistence: &Arc<MemoryPersistence>,
) -> WorkspaceStore {
    WorkspaceStore::new(
        Arc::clone(remote) as Arc<dyn RemoteWorkspaceService>,
        Arc::clone(persistence) as Arc<dyn PersistenceAdapter>,
        StoreConfig::new(),
    )
}
