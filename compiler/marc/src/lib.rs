//! The Marionette compiler driver.
//!
//! `marc` turns parsed manifests into catalogs. A compilation has two
//! passes over a [`SyntaxTree`]: every class, defined type and function
//! statement is registered first, then statements are evaluated in order.
//! The first error that reaches the top level halts the compilation.
//!
//! ```text
//! let output = marc::compile(&tree, &EvalSettings::from_env());
//! output.emit(&mut TextEmitter::stderr())?;
//! std::process::exit(output.exit_code());
//! ```
//!
//! Independent manifests compile in parallel with [`compile_all`]; each
//! compilation owns its context, tables and catalog.

mod compile;

use std::sync::Once;

pub use compile::{compile, compile_all, CompileOutput, CompileStatus};
pub use mar_diagnostic::emitter::{DiagnosticEmitter, TextEmitter};
pub use mar_eval::{EvalSettings, MemoryCatalog, Resource, ResourceKey};
pub use mar_ir::SyntaxTree;

static TRACING_INIT: Once = Once::new();

/// Environment variable selecting the indented span-tree output.
pub const LOG_TREE_VAR: &str = "MAR_LOG_TREE";

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enabled by `RUST_LOG`, e.g.
/// `RUST_LOG=mar_eval=debug`. With `MAR_LOG_TREE` set, spans such as class
/// declarations are printed as an indented tree instead of flat lines.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        let tree = std::env::var_os(LOG_TREE_VAR).is_some();
        let hierarchical = tree.then(|| {
            tracing_tree::HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true)
        });
        let flat = (!tree).then(|| fmt::layer().with_target(true).with_level(true));

        // A host application may already have installed a subscriber.
        let _ = tracing_subscriber::registry()
            .with(flat)
            .with(hierarchical)
            .with(filter)
            .try_init();
    });
}
