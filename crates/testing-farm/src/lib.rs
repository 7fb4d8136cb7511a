//! Testing Farm request model and REST client.
//!
//! [`request`] maps a job's subject and artifacts onto the request body
//! Testing Farm expects; [`api`] submits it and returns the request id.

pub mod api;
pub mod request;
