//! # Routes Module
//!
//! Route definitions and the ordered [`RouteTable`] they are compiled into.
//!
//! A route maps a path pattern (plus optional method, host, scheme and
//! context restrictions) to a handler notation stored under the reserved
//! `_controller` attribute. Tables are built programmatically or loaded from
//! a YAML/JSON/TOML route file, and are read-only afterwards.
//!
//! ```rust
//! use brrtmvc::routes::{Route, RouteTable};
//! use http::Method;
//!
//! let table = RouteTable::from_routes([
//!     Route::new("users_show", "/users/{id}")
//!         .methods([Method::GET])
//!         .controller("Users:show"),
//!     Route::new("assets", "/assets/{*suffix}").controller("Assets"),
//! ])
//! .unwrap();
//! assert_eq!(table.len(), 2);
//! ```

mod load;
mod pattern;
mod table;
mod types;

pub use load::{load_routes, load_routes_str, parse_routes, RouteFileFormat};
pub use table::{CompiledRoute, RouteTable};
pub use types::{
    Route, CONTROLLER_ALIAS, CONTROLLER_KEY, RESERVED_KEYS, ROUTE_ALIAS, ROUTE_KEY,
};
