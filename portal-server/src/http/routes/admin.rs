//! Admin page and authenticated CRUD over the store
//!
//! Every successful write re-runs the loader so the portal reflects it.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Html,
    routing::{get, put},
    Json, Router,
};
use portal_core::render::html_escape;
use portal_core::{validate_entry, AppEntry, StoredApp};
use serde::Deserialize;

use crate::http::error::ApiError;
use crate::http::extractors::{AdminAuth, ValidAppId};
use crate::http::server::AppState;

/// Create/update body. Missing fields arrive empty and fail validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppPayload {
    pub id: String,
    pub name: String,
    pub url: String,
    pub image: String,
    pub description: String,
}

impl AppPayload {
    fn into_entry(self) -> AppEntry {
        AppEntry {
            id: self.id,
            name: self.name,
            url: self.url,
            image: self.image,
            description: self.description,
        }
        .trimmed()
    }
}

/// GET /admin - store listing with the create/edit/delete form
///
/// The page itself is public; writes go through `/api/admin/apps` with the
/// token typed into the page, and the API's `message` is shown inline.
async fn admin_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let apps = state.store.list().await?;
    Ok(Html(render_admin_page(&apps)))
}

fn render_admin_page(apps: &[StoredApp]) -> String {
    let mut rows = String::new();
    for app in apps {
        let id = html_escape(app.id());
        let name = html_escape(&app.entry.name);
        let url = html_escape(&app.entry.url);
        let image = html_escape(&app.entry.image);
        let description = html_escape(&app.entry.description);
        rows.push_str(&format!(
            r#"<tr data-id="{id}" data-name="{name}" data-url="{url}" data-image="{image}" data-description="{description}"><td>{id}</td><td>{name}</td><td>{url}</td><td>{image}</td><td>{created_by}</td><td>{created_at}</td><td><button type="button" class="edit-app">Edit</button> <button type="button" class="delete-app">Delete</button></td></tr>
"#,
            created_by = html_escape(&app.created_by),
            created_at = app.created_at.format("%Y-%m-%d %H:%M"),
        ));
    }
    if apps.is_empty() {
        rows.push_str("<tr><td colspan=\"7\">No apps in the store yet.</td></tr>\n");
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Portal admin</title>
<link rel="stylesheet" href="/assets/styles.css">
</head>
<body>
<div class="container admin">
<h1>App management</h1>
<label>Admin token <input type="password" id="adminToken" autocomplete="off"></label>
<form id="appForm" class="admin-form">
<input type="hidden" id="editingId" value="">
<label>ID <input name="id" id="appId" required></label>
<label>Name <input name="name" required></label>
<label>URL <input name="url" required></label>
<label>Image <input name="image" required></label>
<label>Description <textarea name="description"></textarea></label>
<button type="submit" id="saveApp">Save</button>
<button type="button" id="cancelEdit">Cancel</button>
</form>
<div id="adminStatus" class="admin-status" role="status"></div>
<table class="admin-apps">
<thead><tr><th>ID</th><th>Name</th><th>URL</th><th>Image</th><th>Created by</th><th>Created</th><th></th></tr></thead>
<tbody>
{rows}</tbody>
</table>
<p><a href="/">Back to portal</a></p>
</div>
<script>
(function () {{
  var form = document.getElementById('appForm');
  var token = document.getElementById('adminToken');
  var editing = document.getElementById('editingId');
  var status = document.getElementById('adminStatus');
  token.value = sessionStorage.getItem('portalAdminToken') || '';
  token.addEventListener('change', function () {{
    sessionStorage.setItem('portalAdminToken', token.value);
  }});

  function show(text, ok) {{
    status.textContent = text;
    status.className = 'admin-status ' + (ok ? 'success' : 'error');
  }}

  function reset() {{
    form.reset();
    editing.value = '';
    form.elements.id.disabled = false;
  }}

  function send(method, path, body) {{
    return fetch(path, {{
      method: method,
      headers: {{
        'Authorization': 'Bearer ' + token.value,
        'Content-Type': 'application/json'
      }},
      body: body ? JSON.stringify(body) : undefined
    }}).then(function (res) {{
      if (res.ok) {{ return res; }}
      return res.json().then(function (err) {{ throw new Error(err.message); }},
        function () {{ throw new Error('Request failed with HTTP ' + res.status); }});
    }});
  }}

  form.addEventListener('submit', function (event) {{
    event.preventDefault();
    var body = {{}};
    ['id', 'name', 'url', 'image', 'description'].forEach(function (field) {{
      body[field] = form.elements[field].value;
    }});
    var id = editing.value;
    var request = id
      ? send('PUT', '/api/admin/apps/' + encodeURIComponent(id), body)
      : send('POST', '/api/admin/apps', body);
    request.then(function () {{
      show(id ? 'App updated.' : 'App added.', true);
      window.location.reload();
    }}, function (err) {{ show(err.message, false); }});
  }});

  document.getElementById('cancelEdit').addEventListener('click', function () {{
    reset();
    show('', true);
  }});

  document.querySelectorAll('.edit-app').forEach(function (button) {{
    button.addEventListener('click', function () {{
      var row = button.closest('tr').dataset;
      ['id', 'name', 'url', 'image', 'description'].forEach(function (field) {{
        form.elements[field].value = row[field];
      }});
      editing.value = row.id;
      form.elements.id.disabled = true;
      show('Editing ' + row.id + '.', true);
    }});
  }});

  document.querySelectorAll('.delete-app').forEach(function (button) {{
    button.addEventListener('click', function () {{
      var id = button.closest('tr').dataset.id;
      if (!window.confirm('Delete ' + id + '?')) {{ return; }}
      send('DELETE', '/api/admin/apps/' + encodeURIComponent(id)).then(function () {{
        show('App deleted.', true);
        window.location.reload();
      }}, function (err) {{ show(err.message, false); }});
    }});
  }});
}})();
</script>
</body>
</html>
"#
    )
}

/// GET /api/admin/apps
async fn list_apps(
    _auth: AdminAuth,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StoredApp>>, ApiError> {
    Ok(Json(state.store.list().await?))
}

/// POST /api/admin/apps
async fn create_app(
    auth: AdminAuth,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AppPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<StoredApp>), ApiError> {
    let Json(payload) = payload?;
    let entry = payload.into_entry();
    validate_entry(&entry)?;

    let stored = state.store.create(entry, &auth.actor).await?;
    tracing::info!(id = %stored.id(), actor = %auth.actor, "app created");
    state.reload().await;

    Ok((StatusCode::CREATED, Json(stored)))
}

/// PUT /api/admin/apps/{id}
///
/// The path id wins over any id in the body.
async fn update_app(
    auth: AdminAuth,
    State(state): State<Arc<AppState>>,
    ValidAppId(id): ValidAppId,
    payload: Result<Json<AppPayload>, JsonRejection>,
) -> Result<Json<StoredApp>, ApiError> {
    let Json(payload) = payload?;
    let mut entry = payload.into_entry();
    entry.id = id.clone();
    validate_entry(&entry)?;

    let stored = state.store.update(&id, entry, &auth.actor).await?;
    tracing::info!(%id, actor = %auth.actor, "app updated");
    state.reload().await;

    Ok(Json(stored))
}

/// DELETE /api/admin/apps/{id}
async fn delete_app(
    auth: AdminAuth,
    State(state): State<Arc<AppState>>,
    ValidAppId(id): ValidAppId,
) -> Result<StatusCode, ApiError> {
    state.store.delete(&id).await?;
    tracing::info!(%id, actor = %auth.actor, "app deleted");
    state.reload().await;

    Ok(StatusCode::NO_CONTENT)
}

/// Admin routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin", get(admin_page))
        .route("/api/admin/apps", get(list_apps).post(create_app))
        .route("/api/admin/apps/{id}", put(update_app).delete(delete_app))
}
