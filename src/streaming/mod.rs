pub mod server;
pub mod session;

pub use server::{router, serve, AppState, HEALTH_PATH, PREDICT_PATH};
