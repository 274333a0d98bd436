// Entry point tying the directive handling, passes, renderer and validator together

use std::fmt;
use std::sync::Arc;

use crate::directive;
use crate::module::{Module, RenderedModule};
use crate::parser::ParseError;
use crate::transform::plugins;
use crate::transform::sequencer::{self, PluginList};
use crate::transform::Pass;
use crate::validate;

/// Configuration for one [`convert`] call
#[derive(Clone)]
pub struct Options {
    /// Plugins to run, in order
    pub plugins: PluginList,
    /// Re-parse the output with the stable dialect
    pub validate: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            plugins: plugins::catalog(),
            validate: true,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plugins(mut self, plugins: PluginList) -> Self {
        self.plugins = plugins;
        self
    }

    pub fn with_validate(mut self, enabled: bool) -> Self {
        self.validate = enabled;
        self
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field(
                "plugins",
                &self.plugins.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("validate", &self.validate)
            .finish()
    }
}

/// Second argument of [`convert`]
pub enum ConvertArgs {
    Options(Options),
    /// Bare plugin list; deprecated in favour of [`Options::with_plugins`]
    Plugins(PluginList),
}

impl From<Options> for ConvertArgs {
    fn from(options: Options) -> Self {
        ConvertArgs::Options(options)
    }
}

impl From<PluginList> for ConvertArgs {
    fn from(plugins: PluginList) -> Self {
        ConvertArgs::Plugins(plugins)
    }
}

impl From<&[Arc<dyn Pass>]> for ConvertArgs {
    fn from(plugins: &[Arc<dyn Pass>]) -> Self {
        ConvertArgs::Plugins(plugins.to_vec())
    }
}

/// Fatal conversion failures. Both variants display the underlying error
/// unchanged.
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    /// The input is not valid Echo Next.
    ///
    /// Message and column are the parser's own. When a `#!` line was
    /// stripped the line is shifted down by one, so it counts lines of the
    /// input as given rather than of the text the parser saw.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A plugin hook failed
    #[error(transparent)]
    Plugin(anyhow::Error),
}

/// Convert Echo Next source to Echo Stable.
///
/// A leading `#!` line is passed through untouched. Non-fatal problems,
/// including output that fails validation, are returned as warnings.
pub fn convert(source: &str, args: impl Into<ConvertArgs>) -> Result<RenderedModule, ConvertError> {
    let options = match args.into() {
        ConvertArgs::Options(options) => options,
        ConvertArgs::Plugins(plugins) => {
            tracing::warn!("convert(source, plugins) is deprecated, pass Options::default().with_plugins(plugins) instead");
            Options::default().with_plugins(plugins)
        }
    };

    let split = directive::strip(source);
    let line_offset = split.line_offset();

    let mut module = Module::new(split.body).map_err(|mut e| {
        e.line += line_offset;
        e
    })?;
    sequencer::run(&mut module, &options.plugins).map_err(ConvertError::Plugin)?;

    let mut result = module.render();
    if options.validate {
        if let Some(diagnostic) = validate::validate(&result.code) {
            result.warnings.push(diagnostic);
        }
    }

    for warning in &mut result.warnings {
        warning.location.line += line_offset;
    }
    result.code = directive::reattach(split.directive, result.code);

    tracing::debug!(
        plugins = options.plugins.len(),
        warnings = result.warnings.len(),
        "conversion finished"
    );
    Ok(result)
}
