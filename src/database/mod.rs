pub mod registry;
pub mod router;

pub use registry::{ConnectionError, TenantRegistry};
pub use router::{classify, connection_for, verify_routing_table, StorageClass};
