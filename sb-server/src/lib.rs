pub mod admin;
pub mod error;
pub mod health;
pub mod logger;
pub mod routes;
pub mod state;

pub use error::{Result as ServerErrorResult, ServerError};
pub use routes::build_router;
pub use state::ServerState;
