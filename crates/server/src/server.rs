use axum::{
    Extension, Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::sync::Arc;

use crate::{accounts, company, documents, statements, transactions};
use engine::{Engine, LedgerKind};

/// The single demo credential pair accepted by the gateway.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub credentials: Arc<Credentials>,
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let credentials = &state.credentials;
    if auth_header.username() != credentials.username
        || auth_header.password() != credentials.password
    {
        tracing::warn!("rejected credentials for '{}'", auth_header.username());
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(request).await)
}

/// Routes of one ledger. Handlers read the ledger from the `LedgerKind`
/// extension, so both ledgers share the same code.
fn ledger_routes(kind: LedgerKind) -> Router<ServerState> {
    let prefix = format!("/api/{}", kind.as_str());
    Router::new()
        .route(
            &format!("{prefix}-transactions"),
            get(transactions::list)
                .post(transactions::create)
                .put(transactions::update)
                .delete(transactions::delete),
        )
        .route(
            &format!("{prefix}-transactions/recompute"),
            post(transactions::recompute),
        )
        .route(
            &format!("{prefix}-accounts"),
            get(accounts::list).post(accounts::open),
        )
        .route(&format!("{prefix}-accounts/history"), get(accounts::history))
        .route(&format!("{prefix}-statement"), get(statements::statement))
        .layer(Extension(kind))
}

pub fn router(engine: Arc<Engine>, credentials: Credentials) -> Router {
    let state = ServerState {
        engine,
        credentials: Arc::new(credentials),
    };

    Router::new()
        .merge(ledger_routes(LedgerKind::Customer))
        .merge(ledger_routes(LedgerKind::Supplier))
        .route(
            "/api/company-profile",
            get(company::get).post(company::create).put(company::upsert),
        )
        .route("/api/documents/totals", post(documents::totals))
        .route("/api/documents/render", post(documents::render))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, credentials: Credentials, bind: &str) {
    let listener = match tokio::net::TcpListener::bind(bind).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {bind}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, credentials, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    credentials: Credentials,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(Arc::new(engine), credentials)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    credentials: Credentials,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, credentials, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
