use crate::modules::users::controller::{get_profile, get_students};
use crate::state::AppState;
use axum::{Router, routing::get};

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_profile))
        .route("/students", get(get_students))
}
