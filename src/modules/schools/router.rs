use crate::modules::schools::controller::{
    create_school, create_school_admin, get_all_schools, verify_school_code,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn init_schools_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_school).get(get_all_schools))
        .route("/verify-code", post(verify_school_code))
        .route("/{id}/admins", post(create_school_admin))
}
