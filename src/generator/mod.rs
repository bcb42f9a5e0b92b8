//! # Generator Module
//!
//! Writes the output of the route compiler.
//!
//! ## Artifacts
//!
//! ```text
//! out_dir/
//! ├── routes.json   # compiled route table, loaded by Gateway::from_config
//! └── routes.rs     # optional: `pub fn routes() -> Vec<RouteDef>` for static linking
//! ```
//!
//! `routes.rs` is rendered with an Askama template (`templates/routes.rs.txt`).
//! Include it in a service with `include!` and pass `routes()` to
//! [`RouteTable::from_defs`](crate::router::RouteTable::from_defs).
//!
//! ## Atomicity
//!
//! All artifacts are rendered in memory first. They are then written to
//! temporary files inside the output directory and renamed into place. A failed
//! compilation, render or write leaves no artifact of the run behind.
//!
//! ## Usage
//!
//! ```bash
//! rpcgate-gen compile --manifest routes.yaml --out-dir target/rpcgate --rust
//! ```

mod emit;
mod templates;
#[cfg(test)]
mod tests;

pub use emit::{
    compile_to_dir, render_artifacts, write_artifacts, Artifact, EmitOptions, ROUTES_JSON,
    ROUTES_RS,
};
pub use templates::{render_routes_rs, rust_literal, BindingEntry, RouteEntry, RoutesRsTemplateData};
