/*!
# FileConverter - File-based Conversion

Reads Echo Next source files, runs the pipeline and writes the stable output,
either next to the input or into a mirrored output tree.
*/

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Serialize;

use echo_next_core::{convert, Diagnostic, Options, RenderedModule};

/// Converts files and directory trees with one set of options
pub struct FileConverter {
    options: Options,
    source_extensions: Vec<String>,
    /// Replacement extension for written files; `None` keeps the input's
    output_extension: Option<String>,
    preserve_structure: bool,
}

impl FileConverter {
    pub fn new(options: Options) -> Self {
        Self {
            options,
            source_extensions: vec!["echo".to_string()],
            output_extension: None,
            preserve_structure: true,
        }
    }

    /// Set the file extensions to process
    pub fn source_extensions(mut self, extensions: Vec<String>) -> Self {
        self.source_extensions = extensions;
        self
    }

    /// Set the output file extension
    pub fn output_extension(mut self, extension: String) -> Self {
        self.output_extension = Some(extension);
        self
    }

    /// Whether to mirror the source directory layout in the output
    pub fn preserve_structure(mut self, preserve: bool) -> Self {
        self.preserve_structure = preserve;
        self
    }

    /// Convert source text held in memory
    pub fn convert_source(&self, source: &str) -> Result<RenderedModule> {
        Ok(convert(source, self.options.clone())?)
    }

    /// Convert one file, writing the result to `output_file`
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        source_file: P,
        output_file: Q,
    ) -> Result<ConversionSummary> {
        let source_path = source_file.as_ref();
        let output_path = output_file.as_ref();

        let source = fs::read_to_string(source_path)
            .with_context(|| format!("failed to read {}", source_path.display()))?;
        let result = self
            .convert_source(&source)
            .with_context(|| format!("failed to convert {}", source_path.display()))?;

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, &result.code)
            .with_context(|| format!("failed to write {}", output_path.display()))?;

        tracing::debug!(
            source = %source_path.display(),
            output = %output_path.display(),
            warnings = result.warnings.len(),
            "converted file"
        );

        let mut summary = ConversionSummary::new();
        summary.files_processed += 1;
        summary.files_converted += 1;
        summary.warnings.extend(result.warnings.into_iter().map(|diagnostic| FileWarning {
            path: source_path.to_path_buf(),
            diagnostic,
        }));
        Ok(summary)
    }

    /// Convert every matching file under `source_dir`. A file that fails is
    /// recorded in the summary and the walk carries on.
    pub fn convert_directory<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        source_dir: P,
        output_dir: Q,
    ) -> Result<ConversionSummary> {
        let source_path = source_dir.as_ref();
        let output_path = output_dir.as_ref();

        if !source_path.is_dir() {
            return Err(anyhow!(
                "Source directory does not exist: {}",
                source_path.display()
            ));
        }

        fs::create_dir_all(output_path)?;

        let mut summary = ConversionSummary::new();
        self.convert_directory_recursive(source_path, output_path, source_path, &mut summary)?;
        Ok(summary)
    }

    fn convert_directory_recursive(
        &self,
        current_dir: &Path,
        output_dir: &Path,
        source_root: &Path,
        summary: &mut ConversionSummary,
    ) -> Result<()> {
        let mut entries = fs::read_dir(current_dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();

        for path in entries {
            if path.is_dir() {
                self.convert_directory_recursive(&path, output_dir, source_root, summary)?;
            } else if self.should_process_file(&path) {
                let output_file = self.output_path(&path, output_dir, source_root)?;
                summary.files_processed += 1;
                match self.convert_file(&path, &output_file) {
                    Ok(file_summary) => {
                        summary.files_converted += file_summary.files_converted;
                        summary.warnings.extend(file_summary.warnings);
                    }
                    Err(e) => summary.errors.push(format!("{e:#}")),
                }
            }
        }

        Ok(())
    }

    /// Where a single file converted into `output_dir` is written
    pub fn output_file_in(&self, path: &Path, output_dir: &Path) -> Result<PathBuf> {
        let name = path
            .file_name()
            .ok_or_else(|| anyhow!("not a file: {}", path.display()))?;
        Ok(self.with_output_extension(output_dir.join(name)))
    }

    fn output_path(&self, path: &Path, output_dir: &Path, source_root: &Path) -> Result<PathBuf> {
        if !self.preserve_structure {
            return self.output_file_in(path, output_dir);
        }
        let relative = path.strip_prefix(source_root)?;
        Ok(self.with_output_extension(output_dir.join(relative)))
    }

    fn with_output_extension(&self, path: PathBuf) -> PathBuf {
        match &self.output_extension {
            Some(extension) => path.with_extension(extension),
            None => path,
        }
    }

    /// Check if a file should be processed based on its extension
    fn should_process_file(&self, path: &Path) -> bool {
        match path.extension() {
            Some(extension) => {
                let ext = extension.to_string_lossy().to_lowercase();
                self.source_extensions
                    .iter()
                    .any(|candidate| candidate.to_lowercase() == ext)
            }
            None => false,
        }
    }
}

/// A warning raised while converting a particular file
#[derive(Debug, Clone, Serialize)]
pub struct FileWarning {
    pub path: PathBuf,
    #[serde(flatten)]
    pub diagnostic: Diagnostic,
}

/// Summary of file conversion results
#[derive(Debug, Default, Serialize)]
pub struct ConversionSummary {
    pub files_processed: u64,
    pub files_converted: u64,
    pub warnings: Vec<FileWarning>,
    pub errors: Vec<String>,
}

impl ConversionSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, other: ConversionSummary) {
        self.files_processed += other.files_processed;
        self.files_converted += other.files_converted;
        self.warnings.extend(other.warnings);
        self.errors.extend(other.errors);
    }

    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// `path:line:column: kind: message`
pub fn format_warning(path: &str, diagnostic: &Diagnostic) -> String {
    format!(
        "{}:{}:{}: {}: {}",
        path,
        diagnostic.location.line,
        diagnostic.location.column,
        diagnostic.kind,
        diagnostic.message
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use echo_next_core::Location;

    #[test]
    fn test_should_process_file() {
        let converter = FileConverter::new(Options::default())
            .source_extensions(vec!["echo".into(), "ECHONEXT".into()]);
        assert!(converter.should_process_file(Path::new("a/b.echo")));
        assert!(converter.should_process_file(Path::new("b.EchoNext")));
        assert!(!converter.should_process_file(Path::new("b.txt")));
        assert!(!converter.should_process_file(Path::new("Makefile")));
    }

    #[test]
    fn test_output_path() {
        let root = Path::new("src");
        let file = Path::new("src/lib/a.next");

        let converter = FileConverter::new(Options::default());
        assert_eq!(
            converter.output_path(file, Path::new("out"), root).unwrap(),
            PathBuf::from("out/lib/a.next")
        );

        let renamed = FileConverter::new(Options::default()).output_extension("echo".into());
        assert_eq!(
            renamed.output_path(file, Path::new("out"), root).unwrap(),
            PathBuf::from("out/lib/a.echo")
        );

        let flat = FileConverter::new(Options::default())
            .preserve_structure(false)
            .output_extension("js".into());
        assert_eq!(
            flat.output_path(file, Path::new("out"), root).unwrap(),
            PathBuf::from("out/a.js")
        );
    }

    #[test]
    fn test_format_warning() {
        let diagnostic = Diagnostic::new("block-scope-hoisted", "moved", Location::new(3, 4));
        assert_eq!(
            format_warning("a.echo", &diagnostic),
            "a.echo:3:4: block-scope-hoisted: moved"
        );
    }

    #[test]
    fn test_summary_merge() {
        let mut summary = ConversionSummary::new();
        summary.merge(ConversionSummary {
            files_processed: 2,
            files_converted: 1,
            warnings: Vec::new(),
            errors: vec!["bad".into()],
        });
        assert_eq!(summary.files_processed, 2);
        assert!(!summary.success());
    }
}
