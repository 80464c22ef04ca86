//! HTTP server implementation
//!
//! hyper http1 with TokioIo for async handling; one spawned task per
//! connection, WebSocket upgrades passed through to the chat gateway.

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::auth::JwtValidator;
use crate::chat::ChatCoordinator;
use crate::config::Args;
use crate::routes;
use crate::server::websocket;
use crate::storage::{ActivityStore, MemoryActivityStore};
use crate::types::EcotrackError;

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// Activity record storage (in-memory unless a database collaborator
    /// is wired in)
    pub store: Arc<dyn ActivityStore>,
    /// Presence and messaging coordinator
    pub chat: Arc<ChatCoordinator>,
    /// Token validator for chat connections
    pub jwt: JwtValidator,
}

impl AppState {
    /// Create AppState with the in-memory store
    pub fn new(args: Args) -> Result<Self, EcotrackError> {
        let jwt = if args.dev_mode {
            JwtValidator::new_dev()
        } else {
            JwtValidator::new(args.jwt_secret(), args.jwt_expiry_seconds)?
        };
        let chat = Arc::new(ChatCoordinator::new(Duration::from_millis(
            args.typing_expiry_ms,
        )));

        Ok(Self {
            args,
            store: Arc::new(MemoryActivityStore::new()),
            chat,
            jwt,
        })
    }

    /// Create AppState with an external storage collaborator
    pub fn with_store(args: Args, store: Arc<dyn ActivityStore>) -> Result<Self, EcotrackError> {
        let mut state = Self::new(args)?;
        state.store = store;
        Ok(state)
    }
}

/// Run the server until the process is stopped
pub async fn run(state: Arc<AppState>) -> Result<(), EcotrackError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "Ecotrack listening on {} as node {}",
        state.args.listen, state.args.node_id
    );

    if state.args.dev_mode {
        warn!("Development mode enabled - token mint endpoint active");
    }

    if state.args.chat_enabled {
        info!(
            "Chat service enabled at /ws/chat (typing expiry {} ms)",
            state.args.typing_expiry_ms
        );
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .serve_connection(io, service)
                        .with_upgrades()
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    debug!("[{}] {} {}", addr, method, path);

    let response = match (method, path.as_str()) {
        // Liveness probe
        (Method::GET, "/health") | (Method::GET, "/healthz") => {
            routes::health_check(Arc::clone(&state))
        }

        // Version info for deployment verification
        (Method::GET, "/version") => routes::version_info(),

        // Dev-mode token mint (real identity comes from the auth collaborator)
        (Method::POST, "/auth/token") => routes::mint_token(Arc::clone(&state), req).await,

        // Activity upsert; responds with the record's computed footprint
        (Method::POST, "/api/v1/activities") => {
            routes::upsert_activity(Arc::clone(&state), req).await
        }

        // Dashboard aggregate (strict trends, projection, target progress)
        (Method::GET, "/api/v1/dashboard") => routes::dashboard(Arc::clone(&state), &req).await,

        // Activity-history summary (deadband trends)
        (Method::GET, "/api/v1/summary") => routes::summary(Arc::clone(&state), &req).await,

        // Milestones and weekly goals
        (Method::GET, "/api/v1/milestones") => routes::milestones(Arc::clone(&state), &req).await,

        // Derived recommendations
        (Method::GET, "/api/v1/recommendations") => {
            routes::recommendations(Arc::clone(&state), &req).await
        }

        // Presence query
        (Method::GET, "/api/v1/online") => routes::online_users(Arc::clone(&state)),

        // Chat WebSocket
        (Method::GET, "/ws/chat") if state.args.chat_enabled => {
            websocket::handle_chat_upgrade(Arc::clone(&state), req).await
        }

        _ => routes::not_found(&path),
    };

    Ok(response)
}
