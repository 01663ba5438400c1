pub mod router;
pub mod routes;

pub use router::{ProvisionState, provision_router};
