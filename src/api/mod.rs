//! TxSentinel HTTP Tool Gateway
//! Tool listing, tool invocation, stats and audit verification over axum

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod tools;
pub mod types;

pub use handlers::AppState;
pub use middleware::{start_cleanup_task, RateLimiter};
pub use routes::create_router;
pub use tools::{Tool, ToolGateway, ToolOutput};
pub use types::*;
