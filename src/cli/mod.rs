//! # CLI Module
//!
//! Command line of the `rpcgate-gen` binary.
//!
//! ## Commands
//!
//! ### `compile`
//!
//! Compile a manifest and write `routes.json` (plus `routes.rs` with `--rust`):
//!
//! ```bash
//! rpcgate-gen compile --manifest routes.yaml --out-dir target/rpcgate --rust
//! ```
//!
//! Nothing is written when the manifest has issues; all of them are printed.
//!
//! ### `check`
//!
//! Compile without writing:
//!
//! ```bash
//! rpcgate-gen check --manifest routes.yaml
//! ```
//!
//! ### `routes`
//!
//! List routes in registration order, from a manifest or a compiled table:
//!
//! ```bash
//! rpcgate-gen routes --table target/rpcgate/routes.json
//! ```
//!
//! ### `probe`
//!
//! Send one request through a compiled table. The backend echoes the operation
//! name and the bound arguments, which shows exactly what a route would call:
//!
//! ```bash
//! rpcgate-gen probe --table target/rpcgate/routes.json -X GET '/item/42?verbose=true' \
//!     -H 'Accept: application/json'
//! ```
//!
//! ## Logging
//!
//! Configured through `RPCGATE_LOG_*` variables, see [`crate::logging`].

mod commands;


pub use commands::{execute, run_cli, Cli, Commands};
