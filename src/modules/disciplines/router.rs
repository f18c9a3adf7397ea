use crate::modules::disciplines::controller::{
    assign_discipline, create_discipline, get_school_disciplines, my_disciplines,
    unassign_discipline,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post},
};

pub fn init_disciplines_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_discipline).get(get_school_disciplines))
        .route("/my", get(my_disciplines))
        .route("/{id}/assign", post(assign_discipline))
        .route("/{id}/assign/{teacher_id}", delete(unassign_discipline))
}
