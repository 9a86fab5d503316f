use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use tower_cookies::{Cookie, Cookies, cookie::SameSite};

use crate::{
    auth::{self, UserClaims, hash_password, verify_password},
    model::{
        CrudRepository, ResourceTyped,
        entity::{UserEntity, UserEntityCreate, UserEntityUpdate},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, UserRole, WebError, WebResult,
        dto::{
            MessageResponse,
            account::{
                LoginRequest, LoginResponse, PasswordChangeRequest, ProfileUpdateRequest,
                RegisterRequest,
            },
        },
        error::ErrorResponse,
        middlewares::{self, AUTH_TOKEN},
    },
};

pub fn auth_routes<S>(state: AppState) -> Router<S> {
    let protected = Router::new()
        .route("/me", get(profile_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ));

    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .merge(protected)
        .with_state(state)
}

pub fn me_routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", delete(account_delete_handler))
        .route("/profile", put(profile_update_handler))
        .route("/password", put(password_change_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(AUTH_TOKEN, token);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    description = "Creates a new `user` or `instructor` account",
    responses(
        (status = 201, description = "User created successfully", body = UserEntity),
        (status = 400, description = "Missing field or role not allowed", body = ErrorResponse),
        (status = 409, description = "Username or email already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account"
)]
async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> WebResult<impl IntoResponse> {
    let admin = AuthenticatedUser::admin();

    if blank(&payload.full_name)
        || blank(&payload.username)
        || blank(&payload.email)
        || payload.password.is_empty()
    {
        return Err(WebError::resource_bad_request(
            UserEntity::get_resource_type(),
            "full_name, username, email and password are required",
        ));
    }

    let role = match payload.role.as_deref().map(str::trim) {
        None | Some("") => UserRole::User,
        Some(name) => match UserRole::parse(name) {
            Some(UserRole::Admin) | None => {
                return Err(WebError::registration_role_forbidden(name));
            }
            Some(role) => role,
        },
    };

    let conflict = UserEntity::find_conflicting(
        state.pool(),
        &admin,
        Some(&payload.username),
        Some(&payload.email),
        None,
    )
    .await
    .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    if conflict.is_some() {
        return Err(WebError::registration_conflict());
    }

    let hash = hash_password(&payload.password).map_err(WebError::server_crypt_error)?;
    let data = UserEntityCreate {
        full_name: payload.full_name,
        username: payload.username,
        email: payload.email,
        password_hash: hash,
        role,
    };

    let created = UserEntity::create(state.pool(), &admin, data)
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                WebError::registration_conflict()
            } else {
                WebError::resource_fetch_error(UserEntity::get_resource_type(), e)
            }
        })?;

    tracing::info!(user_id = created.id(), role = %created.role(), "user registered");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    description = "Authorizes user in the system. The token is returned and set as `SID` cookie",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "User signed in", body = LoginResponse),
        (status = 401, description = "Credentials invalid", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account",
)]
async fn login_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<LoginRequest>,
) -> WebResult<impl IntoResponse> {
    let admin = AuthenticatedUser::admin();
    let found = UserEntity::find_by_email(state.pool(), &admin, &payload.email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(WebError::auth_invalid_credentials)?;

    let is_verified =
        verify_password(found.hash(), &payload.password).map_err(WebError::server_crypt_error)?;

    if !is_verified {
        return Err(WebError::auth_invalid_credentials());
    }

    let app = state.config().app();
    let claims = UserClaims::for_user(found.id(), app.token_ttl_hours());
    let token = auth::generate_token(claims, app.jwt())
        .map_err(|e| WebError::server_crypt_error(e.into()))?;

    cookies.add(session_cookie(token.clone()));

    Ok((StatusCode::OK, Json(LoginResponse { token, user: found })))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    description = "Profile of the signed in user",
    responses(
        (status = 200, description = "Current user", body = UserEntity),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account",
    security(("bearer" = []), ("cookie" = []))
)]
async fn profile_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let found = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

    Ok((StatusCode::OK, Json(found)))
}

#[utoipa::path(
    put,
    path = "/api/v1/me/profile",
    request_body = ProfileUpdateRequest,
    description = "Updates name, username or email of the signed in user",
    responses(
        (status = 200, description = "Profile updated", body = UserEntity),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 409, description = "Username or email already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account",
    security(("bearer" = []), ("cookie" = []))
)]
async fn profile_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<ProfileUpdateRequest>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let found = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

    if payload.username.is_some() || payload.email.is_some() {
        let conflict = UserEntity::find_conflicting(
            state.pool(),
            user,
            payload.username.as_deref(),
            payload.email.as_deref(),
            Some(found.id()),
        )
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

        if conflict.is_some() {
            return Err(WebError::registration_conflict());
        }
    }

    let data = UserEntityUpdate {
        full_name: payload.full_name,
        username: payload.username,
        email: payload.email,
        ..Default::default()
    };

    let updated = found
        .update(state.pool(), user, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    put,
    path = "/api/v1/me/password",
    request_body = PasswordChangeRequest,
    description = "Replaces the password after checking the current one",
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Old password is wrong or new one is empty", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account",
    security(("bearer" = []), ("cookie" = []))
)]
async fn password_change_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<PasswordChangeRequest>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let found = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

    let is_verified =
        verify_password(found.hash(), &payload.old_password).map_err(WebError::server_crypt_error)?;
    if !is_verified {
        return Err(WebError::resource_bad_request(
            UserEntity::get_resource_type(),
            "old password is incorrect",
        ));
    }
    if payload.new_password.is_empty() {
        return Err(WebError::resource_bad_request(
            UserEntity::get_resource_type(),
            "new password is empty",
        ));
    }

    let hash = hash_password(&payload.new_password).map_err(WebError::server_crypt_error)?;
    let data = UserEntityUpdate {
        password_hash: Some(hash),
        ..Default::default()
    };

    found
        .update(state.pool(), user, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(MessageResponse::new("password updated"))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/me",
    description = "Deletes the signed in account with everything it owns",
    responses(
        (status = 200, description = "Account deleted", body = MessageResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account",
    security(("bearer" = []), ("cookie" = []))
)]
async fn account_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    cookies: Cookies,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let found = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

    found
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    let mut removal = Cookie::from(AUTH_TOKEN);
    removal.set_path("/");
    cookies.remove(removal);

    Ok((StatusCode::OK, Json(MessageResponse::new("account deleted"))))
}
