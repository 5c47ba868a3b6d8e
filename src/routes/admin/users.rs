use serde::Deserialize;

use super::prelude::*;
use crate::{
    models::user::{NewUser, User, UserRole, UserStatus, UserUpdate},
    utils::password::{hash_password, validate_new_password, MIN_PASSWORD_LENGTH},
};

#[derive(Debug, Deserialize)]
pub struct ChangePasswordPayload {
    pub password: String,
    pub password_confirmation: String,
}

fn looks_like_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !email.contains(' '),
        None => false,
    }
}

/// Loads the target of an admin action, answering 404/500 itself.
async fn load_user(app_state: &AppState, id: Uuid) -> Result<User, Response> {
    match app_state.db.find_user_by_id(id).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(JsonResponse::not_found("User not found").into_response()),
        Err(err) => {
            error!(?err, %id, "failed to load user");
            Err(JsonResponse::server_error("Failed to load user").into_response())
        }
    }
}

/// Superadmin accounts can only be touched by another superadmin.
fn guard_superadmin_target(caller: UserRole, target: &User) -> Result<(), Response> {
    if target.role == UserRole::Superadmin && caller != UserRole::Superadmin {
        return Err(JsonResponse::forbidden("Only a superadmin can modify a superadmin").into_response());
    }
    Ok(())
}

pub async fn list_users(State(app_state): State<AppState>) -> Response {
    match app_state.db.list_users().await {
        Ok(users) => Json(json!({ "success": true, "users": users })).into_response(),
        Err(err) => {
            error!(?err, "failed to list users");
            JsonResponse::server_error("Failed to list users").into_response()
        }
    }
}

pub async fn get_user(State(app_state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match load_user(&app_state, id).await {
        Ok(user) => Json(json!({ "success": true, "user": user })).into_response(),
        Err(response) => response,
    }
}

pub async fn get_user_by_email(
    State(app_state): State<AppState>,
    Path(email): Path<String>,
) -> Response {
    match app_state.db.find_user_by_email(email.trim()).await {
        Ok(Some(user)) => Json(json!({ "success": true, "user": user })).into_response(),
        Ok(None) => JsonResponse::not_found("User not found").into_response(),
        Err(err) => {
            error!(?err, "failed to load user by email");
            JsonResponse::server_error("Failed to load user").into_response()
        }
    }
}

pub async fn create_user(
    State(app_state): State<AppState>,
    AuthSession(claims): AuthSession,
    Json(payload): Json<NewUser>,
) -> Response {
    if !looks_like_email(&payload.email) {
        return JsonResponse::bad_request("A valid email is required").into_response();
    }
    if payload.password.chars().count() < MIN_PASSWORD_LENGTH {
        return JsonResponse::bad_request("Password must be at least 8 characters")
            .into_response();
    }
    if payload.role == UserRole::Superadmin && claims.role != UserRole::Superadmin {
        return JsonResponse::forbidden("Only a superadmin can create a superadmin")
            .into_response();
    }

    match app_state.db.is_email_taken(payload.email.trim()).await {
        Ok(true) => return JsonResponse::conflict("User already registered").into_response(),
        Ok(false) => {}
        Err(err) => {
            error!(?err, "failed to check email availability");
            return JsonResponse::server_error("Failed to create user").into_response();
        }
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(hash) => hash,
        Err(err) => {
            error!(?err, "password hashing failed");
            return JsonResponse::server_error("Failed to create user").into_response();
        }
    };

    match app_state.db.create_user(&payload, &password_hash).await {
        Ok(user_id) => {
            info!(%user_id, created_by = %claims.subject_id, "user created");
            (
                StatusCode::CREATED,
                Json(json!({ "success": true, "user_id": user_id })),
            )
                .into_response()
        }
        Err(err) if is_unique_violation(&err) => {
            JsonResponse::conflict("User already registered").into_response()
        }
        Err(err) => {
            error!(?err, "failed to create user");
            JsonResponse::server_error("Failed to create user").into_response()
        }
    }
}

pub async fn update_user(
    State(app_state): State<AppState>,
    AuthSession(claims): AuthSession,
    Path(id): Path<Uuid>,
    Json(update): Json<UserUpdate>,
) -> Response {
    if !looks_like_email(&update.email) {
        return JsonResponse::bad_request("A valid email is required").into_response();
    }

    let target = match load_user(&app_state, id).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = guard_superadmin_target(claims.role, &target) {
        return response;
    }
    if (target.role == UserRole::Superadmin) != (update.role == UserRole::Superadmin) {
        return JsonResponse::bad_request(
            "Use set-super-admin or unset-super-admin to change superadmin status",
        )
        .into_response();
    }

    let user = match app_state.db.update_user(id, &update).await {
        Ok(Some(user)) => user,
        Ok(None) => return JsonResponse::not_found("User not found").into_response(),
        Err(err) if is_unique_violation(&err) => {
            return JsonResponse::conflict("Email already in use").into_response()
        }
        Err(err) => {
            error!(?err, %id, "failed to update user");
            return JsonResponse::server_error("Failed to update user").into_response();
        }
    };

    if target.status == UserStatus::Active && user.status == UserStatus::Inactive {
        if let Err(err) = app_state.revoker.revoke_all_for_user(id).await {
            return err.into_response();
        }
    }

    Json(json!({ "success": true, "user": user })).into_response()
}

pub async fn delete_user(
    State(app_state): State<AppState>,
    AuthSession(claims): AuthSession,
    Path(id): Path<Uuid>,
) -> Response {
    if id == claims.subject_id {
        return JsonResponse::bad_request("You cannot delete your own account").into_response();
    }

    let target = match load_user(&app_state, id).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = guard_superadmin_target(claims.role, &target) {
        return response;
    }

    if let Err(err) = app_state.revoker.revoke_all_for_user(id).await {
        return err.into_response();
    }

    match app_state.db.delete_user(id).await {
        Ok(true) => {
            info!(user_id = %id, deleted_by = %claims.subject_id, "user deleted");
            JsonResponse::success("User deleted").into_response()
        }
        Ok(false) => JsonResponse::not_found("User not found").into_response(),
        Err(err) => {
            error!(?err, %id, "failed to delete user");
            JsonResponse::server_error("Failed to delete user").into_response()
        }
    }
}

/// Sets a new password and blocks every session the user has open.
pub async fn change_password(
    State(app_state): State<AppState>,
    AuthSession(claims): AuthSession,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangePasswordPayload>,
) -> Response {
    if let Err(err) = validate_new_password(&payload.password, &payload.password_confirmation) {
        return JsonResponse::bad_request(&err.to_string()).into_response();
    }

    let target = match load_user(&app_state, id).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = guard_superadmin_target(claims.role, &target) {
        return response;
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(hash) => hash,
        Err(err) => {
            error!(?err, "password hashing failed");
            return JsonResponse::server_error("Failed to change password").into_response();
        }
    };

    match app_state.db.update_user_password(id, &password_hash).await {
        Ok(true) => {}
        Ok(false) => return JsonResponse::not_found("User not found").into_response(),
        Err(err) => {
            error!(?err, %id, "failed to update password");
            return JsonResponse::server_error("Failed to change password").into_response();
        }
    }

    match app_state.revoker.revoke_all_for_user(id).await {
        Ok(revoked) => {
            info!(user_id = %id, revoked, "password changed");
            Json(json!({ "success": true, "revoked_sessions": revoked })).into_response()
        }
        Err(err) => err.into_response(),
    }
}

async fn set_role(app_state: &AppState, id: Uuid, role: UserRole) -> Response {
    match app_state.db.set_user_role(id, role).await {
        Ok(true) => {
            info!(user_id = %id, %role, "user role changed");
            JsonResponse::success("User role updated").into_response()
        }
        Ok(false) => JsonResponse::not_found("User not found").into_response(),
        Err(err) => {
            error!(?err, %id, "failed to change user role");
            JsonResponse::server_error("Failed to update user role").into_response()
        }
    }
}

pub async fn set_super_admin(State(app_state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    set_role(&app_state, id, UserRole::Superadmin).await
}

/// Demotes a superadmin to a plain user.
pub async fn unset_super_admin(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Response {
    let target = match load_user(&app_state, id).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if target.role != UserRole::Superadmin {
        return JsonResponse::bad_request("User is not a superadmin").into_response();
    }
    set_role(&app_state, id, UserRole::User).await
}
