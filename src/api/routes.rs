//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, Path, Query, State},
    http::{HeaderMap, StatusCode},
    middleware,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::handlers::{
    AccountDetail, AccountHandler, AccountsOverview, LinkAccountCommand, LinkAccountResult,
    LinkHandler, SessionHandler, SignInCommand, SignInHandler, SignUpCommand, SignUpHandler,
    TransferCommand, TransferHandler,
};
use crate::session::{clear_session_cookie, session_cookie};

use super::middleware::{logging_middleware, session_middleware, CurrentUser, SessionToken};
use super::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&crate::domain::UserProfile> for UserResponse {
    fn from(profile: &crate::domain::UserProfile) -> Self {
        Self {
            id: profile.id.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            email: profile.email.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignOutResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct LinkTokenResponse {
    pub link_token: String,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: usize,
}

fn default_page() -> usize {
    1
}

#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub transaction_id: String,
    pub name: String,
    pub amount: String,
    pub sender_bank_id: String,
    pub receiver_bank_id: String,
    pub correlation_id: String,
    pub duplicate: bool,
    pub created_at: DateTime<Utc>,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the application router: public auth routes plus the
/// session-protected API, with request logging over everything.
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/auth/me", get(current_user))
        .route("/auth/sign-out", post(sign_out))
        .route("/link/token", post(create_link_token))
        .route("/link/exchange", post(exchange_public_token))
        .route("/accounts", get(get_accounts))
        .route("/accounts/:bank_id", get(get_account))
        .route("/transfers", post(submit_transfer))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    Router::new()
        .route("/auth/sign-up", post(sign_up))
        .route("/auth/sign-in", post(sign_in))
        .merge(protected)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

// =========================================================================
// POST /auth/sign-up
// =========================================================================

/// Register a new user and open their first session.
async fn sign_up(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(command): Json<SignUpCommand>,
) -> Result<(StatusCode, CookieJar, Json<UserResponse>), AppError> {
    let handler = SignUpHandler::new(
        state.identity.clone(),
        state.payments.clone(),
        state.documents(),
    );
    let result = handler.execute(command).await?;

    let jar = jar.add(session_cookie(
        result.session_secret,
        state.config.cookie_secure,
    ));

    Ok((
        StatusCode::CREATED,
        jar,
        Json(UserResponse::from(&result.profile)),
    ))
}

// =========================================================================
// POST /auth/sign-in
// =========================================================================

/// Open a session for an existing user.
async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(command): Json<SignInCommand>,
) -> Result<(CookieJar, Json<UserResponse>), AppError> {
    let handler = SignInHandler::new(state.identity.clone(), state.documents());
    let result = handler.execute(command).await?;

    let jar = jar.add(session_cookie(
        result.session_secret,
        state.config.cookie_secure,
    ));

    Ok((jar, Json(UserResponse::from(&result.profile))))
}

// =========================================================================
// GET /auth/me
// =========================================================================

/// The profile behind the current session.
async fn current_user(Extension(user): Extension<CurrentUser>) -> Json<UserResponse> {
    Json(UserResponse::from(&user.0))
}

// =========================================================================
// POST /auth/sign-out
// =========================================================================

/// Close the current session. The cookie is cleared even if the remote
/// deletion fails.
async fn sign_out(
    State(state): State<AppState>,
    Extension(token): Extension<SessionToken>,
    jar: CookieJar,
) -> (CookieJar, Json<SignOutResponse>) {
    let handler = SessionHandler::new(state.identity.clone(), state.documents());
    let success = handler.logout(&token.0).await;

    let jar = jar.add(clear_session_cookie(state.config.cookie_secure));

    (jar, Json(SignOutResponse { success }))
}

// =========================================================================
// POST /link/token
// =========================================================================

/// Issue a link token for the browser-side link widget.
async fn create_link_token(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<LinkTokenResponse>, AppError> {
    let handler = link_handler(&state);
    let link_token = handler.create_link_token(&user.0).await?;
    Ok(Json(LinkTokenResponse { link_token }))
}

// =========================================================================
// POST /link/exchange
// =========================================================================

/// Exchange the public token and register the linked account(s).
async fn exchange_public_token(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(command): Json<LinkAccountCommand>,
) -> Result<(StatusCode, Json<LinkAccountResult>), AppError> {
    let handler = link_handler(&state);
    let result = handler.execute(command, &user.0).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

// =========================================================================
// GET /accounts
// =========================================================================

/// Accounts overview: every linked bank with live balances and totals.
async fn get_accounts(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<AccountsOverview>, AppError> {
    let handler = account_handler(&state);
    Ok(Json(handler.get_accounts(&user.0).await?))
}

// =========================================================================
// GET /accounts/:bank_id
// =========================================================================

/// One linked bank with a page of its transaction history.
async fn get_account(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(bank_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<AccountDetail>, AppError> {
    let handler = account_handler(&state);
    Ok(Json(
        handler.get_account(&user.0, &bank_id, query.page).await?,
    ))
}

// =========================================================================
// POST /transfers
// =========================================================================

/// Submit a peer-to-peer transfer. An `Idempotency-Key` header makes
/// retries safe; without one, a fresh key is generated for the submission.
async fn submit_transfer(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    headers: HeaderMap,
    Json(command): Json<TransferCommand>,
) -> Result<(StatusCode, Json<TransferResponse>), AppError> {
    let idempotency_key = headers
        .get("Idempotency-Key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let handler = TransferHandler::new(
        state.payments.clone(),
        state.documents(),
        state.codec.clone(),
        state.cache.clone(),
    );
    let outcome = handler.execute(command, idempotency_key, &user.0.id).await?;

    let transaction = outcome.transaction;
    Ok((
        StatusCode::CREATED,
        Json(TransferResponse {
            transaction_id: transaction.id,
            name: transaction.name,
            amount: transaction.amount,
            sender_bank_id: transaction.sender_bank_id,
            receiver_bank_id: transaction.receiver_bank_id,
            correlation_id: transaction.correlation_id,
            duplicate: outcome.duplicate,
            created_at: transaction.created_at,
        }),
    ))
}

fn link_handler(state: &AppState) -> LinkHandler {
    LinkHandler::new(
        state.aggregation.clone(),
        state.payments.clone(),
        state.documents(),
        state.codec.clone(),
        state.config.account_selection_policy,
        state.cache.clone(),
    )
}

fn account_handler(state: &AppState) -> AccountHandler {
    AccountHandler::new(
        state.aggregation.clone(),
        state.documents(),
        state.cache.clone(),
        state.config.transactions_page_size,
    )
}
