//! HTTP read surface for the dashboard engine.

mod handlers;
mod routes;

pub use routes::create_api_router;
