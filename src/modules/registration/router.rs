use crate::modules::registration::controller::{
    approve_request, list_pending_requests, reject_request, submit_independent_registration,
    submit_registration,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Public half: anyone can submit a request.
pub fn init_registration_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(submit_registration))
        .route(
            "/register/independent",
            post(submit_independent_registration),
        )
}

/// Admin half: mounted behind the admin role layer in the root router.
pub fn init_registration_admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_pending_requests))
        .route("/{id}/approve", post(approve_request))
        .route("/{id}/reject", post(reject_request))
}
