use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        extractors::{AdminUser, CurrentUser},
        handlers::is_valid_email,
        password::hash_password,
    },
    error::ApiError,
    state::AppState,
    users::{
        dto::{
            AdminCreateUser, AdminUpdateUser, ListMeta, PageInfo, Pagination, UpdateUser,
            UserResponse, UsersListResponse,
        },
        repo::{NewUser, User, UserPatch},
    },
};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/users/current", get(get_current))
        .route(
            "/users/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/private/users", get(admin_list_users).post(admin_create_user))
        .route(
            "/private/users/:id",
            get(admin_get_user)
                .patch(admin_update_user)
                .delete(admin_delete_user),
        )
}

// --- authenticated profile handlers ---

#[instrument(skip_all)]
pub async fn get_current(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

#[instrument(skip(state, _user))]
pub async fn get_user(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(Json(UserResponse::from(user)))
}

#[instrument(skip(state, _user, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUser>,
) -> Result<Json<UserResponse>, ApiError> {
    let patch = UserPatch {
        email: payload.email,
        first_name: payload.first_name,
        last_name: payload.last_name,
        other_name: payload.other_name,
        phone: payload.phone,
        birthday: payload.birthday,
        city: payload.city,
        additional_info: payload.additional_info,
        is_admin: None,
    };
    let updated = User::update(&state.db, id, patch)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    info!(user_id = id, "user updated");
    Ok(Json(UserResponse::from(updated)))
}

#[instrument(skip(state, _user))]
pub async fn delete_user(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !User::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("User"));
    }
    info!(user_id = id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

// --- admin handlers ---

#[instrument(skip(state, _admin))]
pub async fn admin_list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(p): Query<Pagination>,
) -> Result<Json<UsersListResponse>, ApiError> {
    let offset = (p.page - 1) * p.size;
    let (users, total) = User::list(&state.db, offset, p.size).await?;
    Ok(Json(UsersListResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
        meta: ListMeta {
            pagination: PageInfo {
                total,
                page: p.page,
                size: p.size,
            },
        },
    }))
}

#[instrument(skip(state, _admin, payload))]
pub async fn admin_create_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(mut payload): Json<AdminCreateUser>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    payload.email = payload.email.trim().to_string();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::BadRequest("Invalid email".into()));
    }

    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::BadRequest("Password too short".into()));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(
        &state.db,
        NewUser {
            email: payload.email,
            password_hash: hash,
            first_name: payload.first_name,
            last_name: payload.last_name,
            other_name: payload.other_name,
            phone: payload.phone,
            birthday: payload.birthday,
            city: payload.city,
            additional_info: payload.additional_info,
            is_admin: payload.is_admin,
        },
    )
    .await?;

    info!(user_id = user.id, email = %user.email, is_admin = user.is_admin, "user created by admin");
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[instrument(skip(state, _admin))]
pub async fn admin_get_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(Json(UserResponse::from(user)))
}

#[instrument(skip(state, _admin, payload))]
pub async fn admin_update_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    Json(payload): Json<AdminUpdateUser>,
) -> Result<Json<UserResponse>, ApiError> {
    let patch = UserPatch {
        email: payload.profile.email,
        first_name: payload.profile.first_name,
        last_name: payload.profile.last_name,
        other_name: payload.profile.other_name,
        phone: payload.profile.phone,
        birthday: payload.profile.birthday,
        city: payload.profile.city,
        additional_info: payload.profile.additional_info,
        is_admin: payload.is_admin,
    };
    let updated = User::update(&state.db, id, patch)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    info!(user_id = id, "user updated by admin");
    Ok(Json(UserResponse::from(updated)))
}

#[instrument(skip(state, _admin))]
pub async fn admin_delete_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !User::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("User"));
    }
    info!(user_id = id, "user deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}
