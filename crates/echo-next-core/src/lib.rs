//! # Echo Next Core
//!
//! Transform pipeline that lowers Echo Next source to the stable Echo
//! dialect, including:
//! - Arena syntax tree and canonical source generation
//! - Pest grammar for both dialects, with a strict stable-dialect parser
//! - Plugin lifecycle (begin, enter/leave traversal, end) over a shared tree
//! - The built-in plugin catalog
//! - Output validation and `#!` directive preservation
//!
//! ```
//! use echo_next_core::{convert, Options};
//!
//! let result = convert("let double = x => x * 2;", Options::default()).unwrap();
//! assert_eq!(result.code, "var double = function (x) {\n  return x * 2;\n};\n");
//! assert!(result.warnings.is_empty());
//! ```

#![warn(clippy::all)]

pub mod ast;
pub mod directive;
pub mod module;
pub mod parser;
pub mod pipeline;
pub mod transform;
pub mod validate;

// Re-export commonly used types
pub use ast::{NodeId, NodeKind, SyntaxTree};
pub use module::{Diagnostic, Location, Module, RenderedModule};
pub use parser::{create_parser, Dialect, EchoParser, ParseError, Parser};
pub use pipeline::{convert, ConvertArgs, ConvertError, Options};
pub use transform::plugins;
pub use transform::sequencer::PluginList;
pub use transform::{Pass, Plugin, TransformResult, Visit};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for the pipeline. Honors `RUST_LOG`.
pub fn init_tracing() {
    init_tracing_with(false);
}

/// Initialize tracing, lowering the default level to `debug` when asked
pub fn init_tracing_with(debug: bool) {
    let default_directive = if debug {
        "echo_next_core=debug,echo_next_cli=debug"
    } else {
        "echo_next_core=info,echo_next_cli=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    // A subscriber may already be installed by the embedding program
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
