pub mod claims;
pub mod context;
pub mod permissions;
pub mod session;
pub mod superadmin;

pub use claims::{decode, encode, Claims, PermissionValue, Scope, TokenError};
pub use context::RequestContext;
pub use permissions::{authorize, authorize_instance, scoped_query_filter, Action, Decision};
pub use session::{SessionError, SessionStore};
