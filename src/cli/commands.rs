use crate::{
    compiler::compile_file,
    dispatcher::{EchoBackend, Gateway},
    error::CompileError,
    generator::{compile_to_dir, EmitOptions},
    router::RouteTable,
    runtime_config::GatewayConfig,
    server::ParsedRequest,
    spec::{load_route_defs, RouteDef},
    validator::print_issues,
};
use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use http::Method;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Command-line interface for the rpcgate route compiler
#[derive(Parser, Debug)]
#[command(name = "rpcgate-gen")]
#[command(about = "rpcgate route compiler and inspection tools", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a route manifest into routes.json (and optionally routes.rs)
    Compile {
        /// Route manifest (YAML, JSON or TOML)
        #[arg(short, long)]
        manifest: PathBuf,

        /// Directory the artifacts are written to
        #[arg(short, long, default_value = "target/rpcgate")]
        out_dir: PathBuf,

        /// Also generate the Rust registration list routes.rs
        #[arg(long, default_value_t = false)]
        rust: bool,
    },
    /// Compile a manifest and report issues without writing anything
    Check {
        #[arg(short, long)]
        manifest: PathBuf,
    },
    /// List routes in registration order
    Routes {
        /// Compile this manifest and list its routes
        #[arg(short, long, conflicts_with = "table", required_unless_present = "table")]
        manifest: Option<PathBuf>,

        /// List the routes of a compiled routes.json
        #[arg(short, long)]
        table: Option<PathBuf>,
    },
    /// Send one request through a compiled table with an echo backend
    Probe {
        /// Compiled routes.json; falls back to RPCGATE_ROUTES
        #[arg(short, long, env = "RPCGATE_ROUTES")]
        table: PathBuf,

        /// HTTP method
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,

        /// Request target, e.g. /item/42?verbose=true
        path: String,

        /// Request header as "Name: value" (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Request body
        #[arg(short = 'd', long)]
        body: Option<String>,
    },
}

fn compiled(manifest: &Path) -> anyhow::Result<Vec<RouteDef>> {
    match compile_file(manifest) {
        Ok(routes) => Ok(routes),
        Err(CompileError::Invalid(issues)) => {
            print_issues(&issues);
            bail!("{} issue(s) in {}", issues.len(), manifest.display())
        }
        Err(e) => Err(e.into()),
    }
}

fn print_routes(out: &mut dyn Write, routes: &[RouteDef]) -> anyhow::Result<()> {
    writeln!(out, "[routes] count={}", routes.len())?;
    for r in routes {
        let args: Vec<String> = r
            .bindings
            .iter()
            .map(|b| {
                let mark = if b.binding.optional { "?" } else { "" };
                format!(
                    "{}{mark}: {} <- {} '{}'",
                    b.binding.name, b.ty, b.binding.source, b.binding.key
                )
            })
            .collect();
        writeln!(
            out,
            "[route] {} {} -> {} ({}) [{}] formats={}",
            r.method,
            r.path,
            r.operation,
            r.name,
            args.join(", "),
            r.formats.join(",")
        )?;
    }
    Ok(())
}

fn probe_request(
    method: &str,
    path: &str,
    headers: &[String],
    body: Option<&str>,
) -> anyhow::Result<ParsedRequest> {
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("invalid method '{method}'"))?;
    let mut request = ParsedRequest::new(method, path);
    for header in headers {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| anyhow!("header '{header}' is not 'Name: value'"))?;
        request = request.with_header(name.trim(), value.trim());
    }
    if let Some(body) = body {
        request = request.with_body(body.as_bytes().to_vec());
    }
    Ok(request)
}

/// Execute a parsed command line, writing results to `out`.
pub fn execute(cli: Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    match cli.command {
        Commands::Compile {
            manifest,
            out_dir,
            rust,
        } => {
            let written = match compile_to_dir(&manifest, &out_dir, EmitOptions { rust }) {
                Ok(written) => written,
                Err(CompileError::Invalid(issues)) => {
                    print_issues(&issues);
                    bail!("{} issue(s) in {}", issues.len(), manifest.display());
                }
                Err(e) => return Err(e.into()),
            };
            for path in written {
                writeln!(out, "✅ Wrote {}", path.display())?;
            }
            Ok(())
        }
        Commands::Check { manifest } => {
            let routes = compiled(&manifest)?;
            writeln!(
                out,
                "✅ {} is valid: {} route(s)",
                manifest.display(),
                routes.len()
            )?;
            Ok(())
        }
        Commands::Routes { manifest, table } => {
            let routes = match (manifest, table) {
                (Some(manifest), _) => compiled(&manifest)?,
                (None, Some(table)) => load_route_defs(&table)?,
                (None, None) => bail!("either --manifest or --table is required"),
            };
            print_routes(out, &routes)
        }
        Commands::Probe {
            table,
            method,
            path,
            headers,
            body,
        } => {
            let routes = RouteTable::from_defs(load_route_defs(&table)?)?;
            let config = GatewayConfig {
                routes: Some(table),
                ..GatewayConfig::from_env()
            };
            let gateway = Gateway::with_config(
                routes,
                Arc::new(EchoBackend),
                crate::codec::Codecs::with_defaults(),
                config,
            )?;
            let request = probe_request(&method, &path, &headers, body.as_deref())?;
            let response = gateway.handle(&request);

            writeln!(out, "{}", response.status)?;
            for (name, value) in &response.headers {
                writeln!(out, "{name}: {value}")?;
            }
            writeln!(out)?;
            writeln!(out, "{}", String::from_utf8_lossy(&response.body))?;
            Ok(())
        }
    }
}

/// Parse the process arguments and run.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(cli, &mut out)
}
