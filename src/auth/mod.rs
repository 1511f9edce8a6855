//! Authentication Module
//!
//! Bearer credential check for the database API.
//!
//! ## Usage
//!
//! ```ignore
//! use dbaas_agent::auth::require_bearer;
//!
//! let app = Router::new()
//!     .route("/api/v3/dbaas/:namespace/databases/list", get(list_handler))
//!     .route_layer(middleware::from_fn(require_bearer));
//! ```

pub mod middleware;

pub use middleware::{extract_token, require_bearer};
