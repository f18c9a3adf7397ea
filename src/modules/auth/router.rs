use crate::modules::auth::controller::login_user;
use crate::state::AppState;
use axum::{Router, routing::post};

pub fn init_auth_router() -> Router<AppState> {
    Router::new().route("/login", post(login_user))
}
