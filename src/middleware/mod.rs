pub mod auth;
pub mod response;
pub mod session;

pub use auth::auth_middleware;
pub use response::{ApiResponse, ApiResult};
pub use session::{session_middleware, SessionId};
