//! HTTP transport: axum routes over `ParkingService`.

mod routes;
mod server;

pub use routes::routes;
pub use server::{ServerConfig, serve};
