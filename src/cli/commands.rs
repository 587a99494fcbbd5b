use crate::config::FrameworkConfig;
use crate::error::FrameworkError;
use crate::handler_spec::{HandlerSpec, ParseOptions};
use crate::router::{MatchContext, Router};
use crate::routes::{load_routes, RouteTable};
use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand, ValueEnum};
use http::Method;
use serde_json::json;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Command-line interface for brrtmvc
///
/// Inspects route files and resolves requests and handler notations
/// against them without running an application.
#[derive(Parser, Debug)]
#[command(name = "brrtmvc")]
#[command(about = "brrtmvc route inspector", long_about = None, version)]
pub struct Cli {
    /// Framework configuration file (TOML)
    #[arg(short, long, global = true, env = "BRRTMVC_CONFIG")]
    pub config: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Output rendering for command results
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per item
    Text,
    /// JSON document
    Json,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the routes of a routes file in match order
    Routes {
        /// Routes file (YAML, JSON or TOML); defaults to the configured one
        #[arg(short, long)]
        routes: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Match a request against a routes file
    Match {
        /// Request path, e.g. /users/42
        path: String,

        /// Request method
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Routes file; defaults to the configured one
        #[arg(short, long)]
        routes: Option<PathBuf>,

        /// Request host
        #[arg(long, default_value = "localhost")]
        host: String,

        /// Request scheme
        #[arg(long, default_value = "http")]
        scheme: String,

        /// Context parameter checked against route requirements (key=value)
        #[arg(short = 'p', long = "param", value_parser = parse_key_value)]
        params: Vec<(String, String)>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Resolve a handler notation into class and method
    Parse {
        /// Handler notation, e.g. `Users:show`
        notation: String,

        /// Method suffix; defaults to the configured one
        #[arg(long)]
        suffix: Option<String>,

        /// Default method; defaults to the configured one
        #[arg(long)]
        default_method: Option<String>,
    },
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{s}'"))
}

fn routes_path(explicit: Option<&Path>, config: &FrameworkConfig) -> anyhow::Result<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| config.routes_file.clone())
        .ok_or_else(|| anyhow!("no routes file given (use --routes or set BRRTMVC_ROUTES)"))
}

fn load_table(explicit: Option<&Path>, config: &FrameworkConfig) -> anyhow::Result<RouteTable> {
    let path = routes_path(explicit, config)?;
    load_routes(&path).with_context(|| format!("Failed to load routes from {}", path.display()))
}

/// Execute a parsed command, writing its output to `out`.
///
/// Returns the process exit code: `0` on success, or the code of the
/// [`FrameworkError`] when a request does not match.
///
/// # Errors
///
/// Returns an error if the configuration or routes file cannot be loaded,
/// or the method is not a valid HTTP method.
pub fn run_cli(cli: &Cli, out: &mut dyn Write) -> anyhow::Result<i32> {
    let config = FrameworkConfig::load_with_env(cli.config.as_deref())?;

    match &cli.command {
        Commands::Routes { routes, format } => {
            let table = load_table(routes.as_deref(), &config)?;
            match format {
                OutputFormat::Text => table.write_routes(out)?,
                OutputFormat::Json => {
                    let listing: Vec<_> = table
                        .iter()
                        .map(|route| {
                            json!({
                                "name": route.name,
                                "path": route.path,
                                "methods": route.methods.iter().map(Method::as_str).collect::<Vec<_>>(),
                                "host": route.host,
                                "schemes": route.schemes,
                                "controller": route.controller_notation(),
                                "defaults": route.defaults,
                                "requirements": route.requirements,
                                "context": route.context,
                            })
                        })
                        .collect();
                    serde_json::to_writer_pretty(&mut *out, &listing)?;
                    writeln!(out)?;
                }
            }
            Ok(0)
        }
        Commands::Match {
            path,
            method,
            routes,
            host,
            scheme,
            params,
            format,
        } => {
            let router = Router::new(load_table(routes.as_deref(), &config)?);
            let mut context = MatchContext::from_parts(method, path)
                .with_context(|| format!("invalid method '{method}'"))?
                .with_host(host.as_str())
                .with_scheme(scheme);
            for (k, v) in params {
                context = context.with_parameter(k.as_str(), v.as_str());
            }

            match router.match_context(&context) {
                Ok(matched) => {
                    match format {
                        OutputFormat::Text => {
                            for (k, v) in matched.iter() {
                                writeln!(out, "{k} = {v}")?;
                            }
                        }
                        OutputFormat::Json => {
                            serde_json::to_writer_pretty(&mut *out, &matched)?;
                            writeln!(out)?;
                        }
                    }
                    Ok(0)
                }
                Err(e) => {
                    writeln!(out, "{e}")?;
                    Ok(FrameworkError::Route(e).exit_code())
                }
            }
        }
        Commands::Parse {
            notation,
            suffix,
            default_method,
        } => {
            let defaults = config.parse_options();
            let options = ParseOptions::new(
                suffix.clone().unwrap_or(defaults.method_suffix),
                default_method.clone().unwrap_or(defaults.default_method),
            );
            let spec = HandlerSpec::parse_with(notation, &options);
            writeln!(out, "{spec}")?;
            Ok(0)
        }
    }
}
