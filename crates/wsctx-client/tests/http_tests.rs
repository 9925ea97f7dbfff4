//! HttpWorkspaceService Tests
//!
//! Runs the client against an in-process warp backend.

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use warp::http::StatusCode;
use warp::Filter;
use wsctx_client::{ClientConfig, HttpWorkspaceService};
use wsctx_model::{NewWorkspace, Role, Workspace, WorkspaceId};
use wsctx_store::{
    FilePersistence, PersistenceAdapter, RemoteError, RemoteWorkspaceService, StoreConfig,
    WorkspaceStore, DEFAULT_STORAGE_KEY,
};

const TOKEN: &str = "test-token";

#[derive(Debug, Default)]
struct Backend {
    workspaces: Vec<Workspace>,
    current: Option<Workspace>,
    current_status: Option<StatusCode>,
    switches: Vec<Value>,
    created: Vec<Value>,
}

type Shared = Arc<Mutex<Backend>>;
type BoxedReply = Box<dyn warp::Reply>;

fn is_authorized(header: &Option<String>) -> bool {
    header.as_deref() == Some(format!("Bearer {TOKEN}").as_str())
}

fn status_reply(status: StatusCode, detail: &str) -> BoxedReply {
    Box::new(warp::reply::with_status(
        warp::reply::json(&json!({ "detail": detail })),
        status,
    ))
}

fn routes(
    backend: Shared,
) -> impl Filter<Extract = (BoxedReply,), Error = warp::Rejection> + Clone {
    let auth = warp::header::optional::<String>("authorization");
    let state = warp::any().map(move || Arc::clone(&backend));

    let list = warp::path!("api" / "workspaces")
        .and(warp::get())
        .and(auth.clone())
        .and(state.clone())
        .map(|auth: Option<String>, backend: Shared| -> BoxedReply {
            if !is_authorized(&auth) {
                return status_reply(StatusCode::UNAUTHORIZED, "not authenticated");
            }
            let backend = backend.lock().unwrap();
            Box::new(warp::reply::json(&backend.workspaces))
        });

    let current = warp::path!("api" / "workspaces" / "current")
        .and(warp::get())
        .and(auth.clone())
        .and(state.clone())
        .map(|auth: Option<String>, backend: Shared| -> BoxedReply {
            if !is_authorized(&auth) {
                return status_reply(StatusCode::UNAUTHORIZED, "not authenticated");
            }
            let backend = backend.lock().unwrap();
            if let Some(status) = backend.current_status {
                return status_reply(status, "current workspace unavailable");
            }
            match &backend.current {
                Some(ws) => Box::new(warp::reply::json(ws)),
                None => Box::new(warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT)),
            }
        });

    let switch = warp::path!("api" / "workspaces" / "switch")
        .and(warp::post())
        .and(auth.clone())
        .and(warp::body::json::<Value>())
        .and(state.clone())
        .map(|auth: Option<String>, body: Value, backend: Shared| -> BoxedReply {
            if !is_authorized(&auth) {
                return status_reply(StatusCode::UNAUTHORIZED, "not authenticated");
            }
            let mut backend = backend.lock().unwrap();
            let current = body["workspace_id"].as_str().and_then(|id| {
                backend
                    .workspaces
                    .iter()
                    .find(|w| w.id_str() == Some(id))
                    .cloned()
            });
            backend.current = current;
            backend.switches.push(body);
            Box::new(warp::reply::json(&json!({ "success": true })))
        });

    let create = warp::path!("api" / "workspaces")
        .and(warp::post())
        .and(auth)
        .and(warp::body::json::<Value>())
        .and(state)
        .map(|auth: Option<String>, body: Value, backend: Shared| -> BoxedReply {
            if !is_authorized(&auth) {
                return status_reply(StatusCode::UNAUTHORIZED, "not authenticated");
            }
            let mut backend = backend.lock().unwrap();
            let created = Workspace::shared(
                format!("ws_{}", backend.workspaces.len() + 1),
                body["name"].as_str().unwrap_or_default(),
                Role::Owner,
            );
            backend.workspaces.push(created.clone());
            backend.created.push(body);
            Box::new(warp::reply::with_status(
                warp::reply::json(&created),
                StatusCode::CREATED,
            ))
        });

    list.or(current)
        .unify()
        .or(switch)
        .unify()
        .or(create)
        .unify()
}

fn serve(
    filter: impl Filter<Extract = (BoxedReply,), Error = warp::Rejection>
        + Clone
        + Send
        + Sync
        + 'static,
) -> SocketAddr {
    let (addr, server) = warp::serve(filter).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

fn start_backend(backend: Backend) -> (Shared, String) {
    let shared = Arc::new(Mutex::new(backend));
    let addr = serve(routes(Arc::clone(&shared)));
    (shared, format!("http://{addr}/api"))
}

fn client(base_url: &str) -> HttpWorkspaceService {
    HttpWorkspaceService::new(&ClientConfig::new(base_url).with_token(TOKEN)).unwrap()
}

fn sample() -> Vec<Workspace> {
    vec![
        Workspace::shared("ws_1", "Acme", Role::Member),
        Workspace::shared("ws_42", "Answer", Role::Admin),
    ]
}

#[tokio::test]
async fn test_list_workspaces() {
    let (_backend, url) = start_backend(Backend {
        workspaces: sample(),
        ..Backend::default()
    });

    let list = client(&url).list_workspaces().await.unwrap();

    assert_eq!(list, sample());
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let (_backend, url) = start_backend(Backend::default());
    let anonymous = HttpWorkspaceService::new(&ClientConfig::new(&url)).unwrap();

    let result = anonymous.list_workspaces().await;

    assert_eq!(result, Err(RemoteError::Unauthorized));
}

#[tokio::test]
async fn test_current_no_content_is_personal() {
    let (_backend, url) = start_backend(Backend::default());

    let current = client(&url).current_workspace().await.unwrap();

    assert_eq!(current, None);
}

#[tokio::test]
async fn test_current_not_found_is_personal() {
    let (_backend, url) = start_backend(Backend {
        current_status: Some(StatusCode::NOT_FOUND),
        ..Backend::default()
    });

    let current = client(&url).current_workspace().await.unwrap();

    assert_eq!(current, None);
}

#[tokio::test]
async fn test_current_json_null_is_personal() {
    let addr = serve(
        warp::path!("api" / "workspaces" / "current")
            .map(|| -> BoxedReply { Box::new(warp::reply::json(&Value::Null)) }),
    );

    let current = client(&format!("http://{addr}/api"))
        .current_workspace()
        .await
        .unwrap();

    assert_eq!(current, None);
}

#[tokio::test]
async fn test_current_returns_record() {
    let (_backend, url) = start_backend(Backend {
        workspaces: sample(),
        current: Some(sample()[1].clone()),
        ..Backend::default()
    });

    let current = client(&url).current_workspace().await.unwrap();

    assert_eq!(current.and_then(|w| w.id), Some(WorkspaceId::new("ws_42")));
}

#[tokio::test]
async fn test_server_error_carries_detail() {
    let (_backend, url) = start_backend(Backend {
        current_status: Some(StatusCode::INTERNAL_SERVER_ERROR),
        ..Backend::default()
    });

    let err = client(&url).current_workspace().await.unwrap_err();

    assert_eq!(
        err,
        RemoteError::Status {
            status: 500,
            message: "current workspace unavailable".to_string(),
        }
    );
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_switch_sends_workspace_id() {
    let (backend, url) = start_backend(Backend {
        workspaces: sample(),
        ..Backend::default()
    });
    let service = client(&url);

    service
        .switch_workspace(Some(&WorkspaceId::new("ws_1")))
        .await
        .unwrap();
    service.switch_workspace(None).await.unwrap();

    let backend = backend.lock().unwrap();
    assert_eq!(
        backend.switches,
        vec![json!({ "workspace_id": "ws_1" }), json!({ "workspace_id": null })]
    );
    assert_eq!(backend.current, None);
}

#[tokio::test]
async fn test_create_posts_payload() {
    let (backend, url) = start_backend(Backend::default());

    let created = client(&url)
        .create_workspace(&NewWorkspace::new("Umbrella").with_description("R&D"))
        .await
        .unwrap();

    assert_eq!(created.name, "Umbrella");
    assert_eq!(created.my_role, Some(Role::Owner));
    assert_eq!(
        backend.lock().unwrap().created,
        vec![json!({ "name": "Umbrella", "description": "R&D" })]
    );
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let err = client(&format!("http://{addr}/api"))
        .list_workspaces()
        .await
        .unwrap_err();

    assert!(matches!(err, RemoteError::Transport(_)));
}

#[tokio::test]
async fn test_store_over_http_falls_back_to_persisted_id() {
    let (backend, url) = start_backend(Backend {
        workspaces: sample(),
        current_status: Some(StatusCode::INTERNAL_SERVER_ERROR),
        ..Backend::default()
    });
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    FilePersistence::new(&path)
        .set(DEFAULT_STORAGE_KEY, "ws_42")
        .await
        .unwrap();

    let store = WorkspaceStore::new(
        Arc::new(client(&url)) as Arc<dyn RemoteWorkspaceService>,
        Arc::new(FilePersistence::new(&path)) as Arc<dyn PersistenceAdapter>,
        StoreConfig::new(),
    );
    let state = store.init().await;
    assert_eq!(state.active.id_str(), Some("ws_42"));
    assert!(state.permissions().can_manage_members);

    store.switch_to(None).await.unwrap();
    assert!(store.state().is_personal());
    assert_eq!(backend.lock().unwrap().switches.len(), 1);
    assert_eq!(
        FilePersistence::new(&path)
            .get(DEFAULT_STORAGE_KEY)
            .await
            .unwrap(),
        None
    );
}
