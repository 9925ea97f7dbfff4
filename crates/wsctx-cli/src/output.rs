//! Text and JSON rendering of store state

use serde::Serialize;
use serde_json::json;
use std::fmt::Write as _;
use wsctx_model::{Capability, PermissionSet, Workspace, WorkspaceKind};
use wsctx_store::WorkspaceState;

/// Workspace list with the active entry marked
pub(crate) fn render_list(state: &WorkspaceState, kind: WorkspaceKind) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", kind.plural(), state.workspaces.len());

    let marker = |active: bool| if active { '*' } else { ' ' };
    let _ = writeln!(
        out,
        "{} {}",
        marker(state.is_personal()),
        Workspace::personal().display_name(kind)
    );
    for ws in &state.workspaces {
        let _ = writeln!(out, "{} {}", marker(ws.id == state.active.id), describe(ws, kind));
    }
    out
}

/// One-line description of a workspace
pub(crate) fn describe(ws: &Workspace, kind: WorkspaceKind) -> String {
    if ws.is_personal() {
        return ws.display_name(kind);
    }
    let role = ws.my_role.map_or("no role", |r| r.as_str());
    let mut line = format!("{} [{}] {}", ws.name, ws.id_str().unwrap_or_default(), role);
    if let Some(count) = ws.member_count {
        let _ = write!(line, ", {count} members");
    }
    line
}

/// Capability flags, one per line
pub(crate) fn render_permissions(perms: &PermissionSet) -> String {
    let mut out = String::new();
    for capability in Capability::ALL {
        let mark = if perms.allows(capability) { "yes" } else { "no" };
        let _ = writeln!(out, "{:<16} {mark}", capability.as_str());
    }
    if perms.is_viewer_role {
        out.push_str("(read-only viewer)\n");
    }
    out
}

#[derive(Debug, Serialize)]
struct WorkspaceView<'a> {
    #[serde(flatten)]
    workspace: &'a Workspace,
    is_personal: bool,
    is_active: bool,
}

/// JSON array of workspaces; the personal workspace comes first
pub(crate) fn list_json(state: &WorkspaceState) -> serde_json::Value {
    let personal = Workspace::personal();
    let views: Vec<WorkspaceView<'_>> = std::iter::once(&personal)
        .chain(state.workspaces.iter())
        .map(|ws| WorkspaceView {
            workspace: ws,
            is_personal: ws.is_personal(),
            is_active: ws.id == state.active.id,
        })
        .collect();
    json!(views)
}

/// JSON object for the active workspace
pub(crate) fn active_json(active: &Workspace) -> serde_json::Value {
    json!(WorkspaceView {
        workspace: active,
        is_personal: active.is_personal(),
        is_active: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wsctx_model::Role;

    fn state() -> WorkspaceState {
        let acme = Workspace::shared("ws_acme", "Acme", Role::Member).with_member_count(5);
        WorkspaceState {
            workspaces: vec![acme.clone(), Workspace::shared("ws_b", "Beta", Role::Owner)],
            active: acme,
            loading: false,
        }
    }

    #[test]
    fn list_marks_active() {
        let text = render_list(&state(), WorkspaceKind::Team);
        assert_eq!(
            text,
            "Teams (2)\n  Personal Team\n* Acme [ws_acme] member, 5 members\n  Beta [ws_b] owner\n"
        );
    }

    #[test]
    fn permissions_for_member() {
        let text = render_permissions(&state().permissions());
        assert!(text.contains("create_content   yes"));
        assert!(text.contains("manage_billing   no"));
        assert!(!text.contains("viewer"));
    }

    #[test]
    fn json_list_flags_personal_and_active() {
        let value = list_json(&state());
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["is_personal"], json!(true));
        assert_eq!(items[0]["is_active"], json!(false));
        assert_eq!(items[1]["id"], json!("ws_acme"));
        assert_eq!(items[1]["my_role"], json!("member"));
        assert_eq!(items[1]["is_active"], json!(true));
    }

    #[test]
    fn json_active_personal() {
        let value = active_json(&Workspace::personal());
        assert_eq!(value["is_personal"], json!(true));
        assert!(value.get("id").is_none());
    }
}
