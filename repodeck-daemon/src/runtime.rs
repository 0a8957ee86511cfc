use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, Mutex};

use repodeck_core::wire::{
    ListResponse, UpdateRequest, UpdateResponse, ValidateRequest, ValidateResponse, HEALTH_PATH,
    LIST_PATH, SHUTDOWN_PATH, UPDATE_PATH, VALIDATE_PATH,
};
use repodeck_core::{config, store, validate, RegistryError};

use crate::error::{io_err, DaemonError};

/// Shared by every handler.
pub struct AppState {
    home: PathBuf,
    manage_repos_enabled: bool,
    shutdown: broadcast::Sender<()>,
    /// Serializes registry replaces so two updates never interleave.
    writer: Mutex<()>,
}

impl AppState {
    pub fn new(home: PathBuf, manage_repos_enabled: bool, shutdown: broadcast::Sender<()>) -> Self {
        Self {
            home,
            manage_repos_enabled,
            shutdown,
            writer: Mutex::new(()),
        }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }
}

/// Start the daemon and block the current thread until it exits.
pub fn start_blocking(home: &Path, bind: &str) -> Result<(), DaemonError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(home.to_path_buf(), bind.to_string()))
}

/// Load config, bind `bind` and serve until shutdown.
pub async fn run(home: PathBuf, bind: String) -> Result<(), DaemonError> {
    let config = config::load_at(&home)?;
    store::ensure_root_at(&home)?;

    let listener = TcpListener::bind(&bind)
        .await
        .map_err(|source| DaemonError::Bind {
            addr: bind.clone(),
            source,
        })?;
    serve(listener, home, config.manage_repos_enabled).await
}

/// Serve on an already bound listener until `POST /api/shutdown` or ctrl-c.
pub async fn serve(
    listener: TcpListener,
    home: PathBuf,
    manage_repos_enabled: bool,
) -> Result<(), DaemonError> {
    let local_addr = listener
        .local_addr()
        .map_err(|e| io_err("listener address", e))?;
    tracing::info!(%local_addr, home = %home.display(), "repodeck daemon listening");

    let (shutdown_tx, _) = broadcast::channel::<()>(16);
    let state = Arc::new(AppState::new(home, manage_repos_enabled, shutdown_tx.clone()));

    let server_handle = {
        let shutdown = shutdown_tx.clone();
        let mut shutdown_rx = shutdown.subscribe();
        let app = router(state);
        tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.recv().await;
                })
                .await
                .map_err(|e| io_err("http server", e));
            let _ = shutdown.send(());
            result
        })
    };

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        let mut shutdown_rx = shutdown.subscribe();
        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown_rx.recv() => Ok(()),
                signal = tokio::signal::ctrl_c() => {
                    match signal {
                        Ok(()) => {
                            tracing::info!("received ctrl-c, shutting down daemon");
                            let _ = shutdown.send(());
                            Ok(())
                        }
                        Err(err) => Err(DaemonError::Task(format!("ctrl-c handler failed: {err}"))),
                    }
                }
            }
        })
    };

    let (server_result, signal_result) = tokio::join!(server_handle, signal_handle);
    handle_join("http_server", server_result)?;
    handle_join("signal_handler", signal_result)?;
    tracing::info!("repodeck daemon stopped");
    Ok(())
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(healthz))
        .route(LIST_PATH, get(list_repos))
        .route(VALIDATE_PATH, post(validate_repo))
        .route(UPDATE_PATH, post(update_repos))
        .route(SHUTDOWN_PATH, post(shutdown))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn healthz() -> &'static str {
    "ok"
}

async fn list_repos(State(state): State<Arc<AppState>>) -> Result<Json<ListResponse>, Response> {
    let home = state.home.clone();
    let registry = blocking(move || store::load_at(&home))
        .await
        .map_err(internal_error)?;
    Ok(Json(ListResponse {
        repos: registry.entries,
        manage_repos_enabled: state.manage_repos_enabled,
    }))
}

/// Authoritative single-entry check. Duplicates are the client's concern here
/// and are enforced again by the update endpoint.
async fn validate_repo(Json(candidate): Json<ValidateRequest>) -> Json<ValidateResponse> {
    let label = candidate.label.clone();
    let checked = tokio::task::spawn_blocking(move || validate::check_on_disk(&candidate)).await;

    let reply = match checked {
        Ok(Ok(())) => ValidateResponse::valid(),
        Ok(Err(err)) => ValidateResponse::invalid(err.to_string()),
        Err(err) => ValidateResponse::invalid(format!("validation task failed: {err}")),
    };
    tracing::info!(%label, valid = reply.valid, "validate request");
    Json(reply)
}

async fn update_repos(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpdateRequest>,
) -> (StatusCode, Json<UpdateResponse>) {
    let _guard = state.writer.lock().await;
    let count = request.repos.len();
    let home = state.home.clone();

    match blocking(move || store::replace_at(&home, &request.repos)).await {
        Ok(()) => {
            tracing::info!(entries = count, "registry replaced");
            (StatusCode::OK, Json(UpdateResponse::ok()))
        }
        Err(err) => {
            tracing::warn!(entries = count, error = %err, "registry update rejected");
            let status = match &err {
                DaemonError::Registry(
                    RegistryError::Io(_)
                    | RegistryError::Yaml(_)
                    | RegistryError::Parse { .. }
                    | RegistryError::HomeNotFound,
                )
                | DaemonError::Io { .. }
                | DaemonError::Bind { .. }
                | DaemonError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
                DaemonError::Registry(_) => StatusCode::BAD_REQUEST,
            };
            (status, Json(UpdateResponse::error(reply_message(err))))
        }
    }
}

async fn shutdown(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    tracing::info!("shutdown requested over http");
    let _ = state.shutdown.send(());
    Json(serde_json::json!({ "stopping": true }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Run a registry operation on the blocking pool.
async fn blocking<T, F>(op: F) -> Result<T, DaemonError>
where
    F: FnOnce() -> Result<T, RegistryError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|err| DaemonError::Task(format!("blocking task join error: {err}")))?
        .map_err(DaemonError::from)
}

/// Registry errors reach the user as their own message, without the
/// `registry error:` wrapper.
fn reply_message(err: DaemonError) -> String {
    match err {
        DaemonError::Registry(inner) => inner.to_string(),
        other => other.to_string(),
    }
}

fn internal_error(err: DaemonError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": reply_message(err) })),
    )
        .into_response()
}

fn handle_join(
    task: &str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(DaemonError::Task(format!("{task} task join failure: {err}"))),
    }
}

pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
