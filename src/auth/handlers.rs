use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        extractors::AuthUser,
        repo::{CompanyChoice, NewUser},
        repo_types::{Role, User},
        services::{hash_password, is_valid_email, verify_password, JwtKeys},
    },
    error::{AppError, AppResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn issue_tokens(state: &AppState, user: User) -> AppResult<AuthResponse> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(&user)?;
    let refresh_token = keys.sign_refresh(&user)?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser::from(user),
    })
}

/// Decides which company a registration lands in.
fn company_choice(payload: &RegisterRequest, role: Role) -> AppResult<CompanyChoice> {
    let name = payload
        .company_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());
    match (name, payload.company_id) {
        (Some(name), _) if role == Role::Admin => Ok(CompanyChoice::Create(name.to_string())),
        (_, Some(id)) => Ok(CompanyChoice::Existing(id)),
        _ => Err(AppError::validation(
            "Company ID or Company Name is required",
        )),
    }
}

#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    payload.email = payload.email.trim().to_lowercase();
    payload.username = payload.username.trim().to_string();

    if payload.username.is_empty() || payload.full_name.trim().is_empty() {
        return Err(AppError::validation("All fields are required"));
    }

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::validation("Invalid email"));
    }

    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(AppError::validation("Password too short"));
    }

    let role: Role = payload.role.parse().map_err(|_| {
        AppError::validation("Invalid role. Must be: admin, manager, or employee")
    })?;
    let company = company_choice(&payload, role)?;

    let hash = hash_password(&payload.password)?;

    let user = User::register(
        &state.db,
        company,
        NewUser {
            username: &payload.username,
            email: &payload.email,
            password_hash: &hash,
            full_name: payload.full_name.trim(),
            role,
        },
    )
    .await?;

    info!(user_id = %user.id, company_id = %user.company_id, role = %user.role, "user registered");
    Ok((StatusCode::CREATED, Json(issue_tokens(&state, user)?)))
}

#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::validation("Username and password are required"));
    }

    let Some(user) = User::find_active_by_username(&state.db, payload.username.trim()).await?
    else {
        warn!("login unknown username");
        return Err(AppError::Unauthenticated("Invalid credentials".into()));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthenticated("Invalid credentials".into()));
    }

    info!(user_id = %user.id, "user logged in");
    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| {
            warn!(error = %e, "invalid refresh token");
            AppError::Unauthenticated("Invalid or expired token".into())
        })?;

    // Reload so role or company changes since signing are picked up
    let user = User::find_active_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("User not found".into()))?;

    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state, identity), fields(user_id = %identity.user_id))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> AppResult<Json<PublicUser>> {
    let user = User::find_active_by_id(&state.db, identity.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("User not found".into()))?;
    Ok(Json(PublicUser::from(user)))
}
