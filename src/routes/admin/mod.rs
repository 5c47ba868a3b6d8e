pub mod appointments;
pub mod categories;
pub(crate) mod prelude;
pub mod sessions;
pub mod users;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};

use crate::{
    routes::auth::session::{require_admin, require_auth, require_superadmin},
    state::AppState,
};

/// Everything under `/admin`. Authentication runs first, then the admin role
/// check; promotion routes add a superadmin check on top.
pub fn routes(state: AppState) -> Router<AppState> {
    let superadmin_only = Router::new()
        .route("/users/{id}/set-super-admin", post(users::set_super_admin))
        .route("/users/{id}/unset-super-admin", post(users::unset_super_admin))
        .route_layer(from_fn(require_superadmin));

    Router::new()
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/categories/{id}",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .route(
            "/appointments",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route(
            "/appointments/{id}",
            get(appointments::get_appointment)
                .put(appointments::update_appointment)
                .delete(appointments::delete_appointment),
        )
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/email/{email}", get(users::get_user_by_email))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/{id}/password", put(users::change_password))
        .route("/users/{id}/sessions", get(sessions::list_user_sessions))
        .route("/sessions/{id}/revoke", post(sessions::revoke_session))
        .merge(superadmin_only)
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state, require_auth))
}
