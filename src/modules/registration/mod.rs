//! Registration-request workflow: visitors submit requests, admins approve
//! or reject them. Approval creates the user from the already-hashed
//! password stored with the request.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
