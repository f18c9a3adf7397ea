use crate::modules::invites::controller::{
    create_invite, linked_students, my_invites, my_teachers, use_invite,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn init_invites_router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_invite))
        .route("/use", post(use_invite))
        .route("/mine", get(my_invites))
        .route("/students", get(linked_students))
        .route("/my-teachers", get(my_teachers))
}
