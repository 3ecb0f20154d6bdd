pub mod dashboard;
pub mod ratings;
pub mod routes;
pub mod stores;
pub mod users;

pub use routes::create_router;
