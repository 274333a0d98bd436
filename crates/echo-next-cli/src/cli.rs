// Argument parsing and the command driver behind the `echo-next` binary

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

use echo_next_core::{plugins, Options, RenderedModule, VERSION};

use crate::files::{format_warning, ConversionSummary, FileConverter};

/// Name used for warnings about source read from standard input
pub const STDIN_NAME: &str = "<stdin>";

pub fn command() -> Command {
    Command::new("echo-next")
        .version(VERSION)
        .about("Convert Echo Next source to the stable Echo dialect")
        .arg(
            Arg::new("files")
                .value_name("FILES")
                .help("Files or directories to convert; reads stdin when omitted")
                .action(ArgAction::Append)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("write")
                .short('w')
                .long("write")
                .help("Overwrite each input with its converted output")
                .action(ArgAction::SetTrue)
                .conflicts_with("out-dir"),
        )
        .arg(
            Arg::new("out-dir")
                .short('o')
                .long("out-dir")
                .value_name("DIR")
                .help("Write converted files under DIR, mirroring input directories")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("ext")
                .long("ext")
                .value_name("EXTS")
                .help("Comma-separated extensions picked up when walking directories (default: echo)")
                .value_delimiter(','),
        )
        .arg(
            Arg::new("out-ext")
                .long("out-ext")
                .value_name("EXT")
                .help("Extension for written files (default: keep the input's)"),
        )
        .arg(
            Arg::new("flat")
                .long("flat")
                .help("Write every converted file directly into the output directory")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-validate")
                .long("no-validate")
                .help("Skip re-parsing the output with the stable grammar")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("plugins")
                .long("plugins")
                .value_name("NAMES")
                .help("Comma-separated plugins to run, in order (default: all)")
                .value_delimiter(','),
        )
        .arg(
            Arg::new("list-plugins")
                .long("list-plugins")
                .help("List the built-in plugins and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print results as JSON")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue),
        )
}

/// Parsed command line
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub files: Vec<PathBuf>,
    pub write: bool,
    pub out_dir: Option<PathBuf>,
    pub source_extensions: Option<Vec<String>>,
    pub output_extension: Option<String>,
    pub flat: bool,
    pub validate: bool,
    pub plugins: Option<Vec<String>>,
    pub list_plugins: bool,
    pub json: bool,
    pub debug: bool,
}

impl CliArgs {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            files: matches
                .get_many::<PathBuf>("files")
                .map(|files| files.cloned().collect())
                .unwrap_or_default(),
            write: matches.get_flag("write"),
            out_dir: matches.get_one::<PathBuf>("out-dir").cloned(),
            source_extensions: matches
                .get_many::<String>("ext")
                .map(|exts| exts.map(|ext| ext.trim_start_matches('.').to_string()).collect()),
            output_extension: matches
                .get_one::<String>("out-ext")
                .map(|ext| ext.trim_start_matches('.').to_string()),
            flat: matches.get_flag("flat"),
            validate: !matches.get_flag("no-validate"),
            plugins: matches
                .get_many::<String>("plugins")
                .map(|names| names.cloned().collect()),
            list_plugins: matches.get_flag("list-plugins"),
            json: matches.get_flag("json"),
            debug: matches.get_flag("debug"),
        }
    }

    /// Resolve plugin names against the catalog
    pub fn conversion_options(&self) -> Result<Options> {
        let mut options = Options::default().with_validate(self.validate);
        if let Some(names) = &self.plugins {
            let selected = names
                .iter()
                .map(|name| {
                    plugins::by_name(name.trim()).ok_or_else(|| {
                        anyhow!("Unknown plugin: {name} (see --list-plugins)")
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            options = options.with_plugins(selected);
        }
        Ok(options)
    }

    /// File converter configured from the conversion and layout flags
    pub fn converter(&self) -> Result<FileConverter> {
        let mut converter =
            FileConverter::new(self.conversion_options()?).preserve_structure(!self.flat);
        if let Some(extensions) = &self.source_extensions {
            converter = converter.source_extensions(extensions.clone());
        }
        if let Some(extension) = &self.output_extension {
            converter = converter.output_extension(extension.clone());
        }
        Ok(converter)
    }
}

/// Run the command. Converted code goes to `stdout` unless files are being
/// written; warnings and per-file errors go to `stderr`.
pub fn run<R: Read, W: Write, E: Write>(
    args: &CliArgs,
    mut stdin: R,
    mut stdout: W,
    mut stderr: E,
) -> Result<()> {
    if args.list_plugins {
        for plugin in plugins::catalog() {
            writeln!(stdout, "{:<26}{}", plugin.name(), plugin.description())?;
        }
        return Ok(());
    }

    let converter = args.converter()?;

    if args.files.is_empty() {
        let mut source = String::new();
        stdin.read_to_string(&mut source)?;
        let result = converter
            .convert_source(&source)
            .with_context(|| format!("failed to convert {STDIN_NAME}"))?;
        return emit(&result, STDIN_NAME, args.json, &mut stdout, &mut stderr);
    }

    let mut summary = ConversionSummary::new();
    let mut wrote_files = false;
    for path in &args.files {
        if path.is_dir() {
            let target = match (&args.out_dir, args.write) {
                (Some(dir), _) => dir.clone(),
                (None, true) => path.clone(),
                (None, false) => bail!(
                    "{} is a directory; pass --write or --out-dir",
                    path.display()
                ),
            };
            summary.merge(converter.convert_directory(path, &target)?);
            wrote_files = true;
        } else if let Some(dir) = &args.out_dir {
            let target = converter.output_file_in(path, dir)?;
            summary.merge(converter.convert_file(path, target)?);
            wrote_files = true;
        } else if args.write {
            let dir = path.parent().unwrap_or_else(|| Path::new(""));
            let target = converter.output_file_in(path, dir)?;
            summary.merge(converter.convert_file(path, target)?);
            wrote_files = true;
        } else {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let result = converter
                .convert_source(&source)
                .with_context(|| format!("failed to convert {}", path.display()))?;
            emit(
                &result,
                &path.display().to_string(),
                args.json,
                &mut stdout,
                &mut stderr,
            )?;
        }
    }

    if wrote_files {
        if args.json {
            writeln!(stdout, "{}", serde_json::to_string_pretty(&summary)?)?;
        } else {
            for warning in &summary.warnings {
                writeln!(
                    stderr,
                    "{}",
                    format_warning(&warning.path.display().to_string(), &warning.diagnostic)
                )?;
            }
        }
        for error in &summary.errors {
            writeln!(stderr, "error: {error}")?;
        }
        tracing::debug!(
            processed = summary.files_processed,
            converted = summary.files_converted,
            warnings = summary.warnings.len(),
            "conversion complete"
        );
    }

    if !summary.success() {
        bail!("{} file(s) failed to convert", summary.errors.len());
    }
    Ok(())
}

fn emit<W: Write, E: Write>(
    result: &RenderedModule,
    name: &str,
    json: bool,
    stdout: &mut W,
    stderr: &mut E,
) -> Result<()> {
    if json {
        writeln!(stdout, "{}", serde_json::to_string_pretty(result)?)?;
        return Ok(());
    }
    stdout.write_all(result.code.as_bytes())?;
    for warning in &result.warnings {
        writeln!(stderr, "{}", format_warning(name, warning))?;
    }
    Ok(())
}
