//! # CLI Module
//!
//! Command-line tooling for route files: list a table in match order, match
//! a request against it, and resolve handler notations.
//!
//! ## Commands
//!
//! ### `routes`
//!
//! ```bash
//! brrtmvc routes --routes config/routes.yaml
//! brrtmvc routes --routes config/routes.yaml --format json
//! ```
//!
//! ### `match`
//!
//! ```bash
//! brrtmvc match /users/42 --method GET --routes config/routes.yaml
//! brrtmvc match /admin --host admin.example.com --param locale=en
//! ```
//!
//! Prints the merged parameters. A request that does not match prints the
//! reason and exits with status `3`.
//!
//! ### `parse`
//!
//! ```bash
//! brrtmvc parse Users:show          # Users::showAction
//! brrtmvc parse Cache --suffix Cmd  # Cache::defaultCmd
//! ```
//!
//! The routes file defaults to `routes_file` from the configuration
//! (`--config`, or `BRRTMVC_ROUTES`).

mod commands;


pub use commands::{run_cli, Cli, Commands, OutputFormat};
