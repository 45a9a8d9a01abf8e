//! Core analyzer for orchestrating lint execution.

use crate::call_site::{CallSite, CallSiteExtractor, ExtractorBox};
use crate::checks::CheckKind;
use crate::config::{Config, ConfigError};
use crate::context::FileContext;
use crate::engine::{Diagnostic, RuleEngine};
use crate::settings::ResolvedSettings;
use crate::suppress::check_allow;
use crate::types::{LintResult, Replacement, Suggestion, Violation};

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Exclude patterns applied when none are configured.
const DEFAULT_EXCLUDES: &[&str] = &["**/target/**", "**/vendor/**"];

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A source file could not be read or is not valid UTF-8.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path to the unreadable file.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Error parsing a source file.
    #[error("Parse error in {path}: {message}")]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Directory walk error.
    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),

    /// Worker pool could not be created.
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    extractors: Vec<ExtractorBox>,
    exclude_patterns: Vec<String>,
    settings: Option<ResolvedSettings>,
    config: Option<Config>,
    fail_on_parse_error: bool,
    parallelism: Option<usize>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory (or single file) to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Registers a language extractor.
    #[must_use]
    pub fn extractor<E: CallSiteExtractor + 'static>(mut self, extractor: E) -> Self {
        self.extractors.push(Box::new(extractor));
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Sets the check settings. Takes precedence over the settings derived
    /// from [`config`](Self::config).
    #[must_use]
    pub fn settings(mut self, settings: ResolvedSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets whether to fail on parse errors (default: false).
    #[must_use]
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = fail;
        self
    }

    /// Limits the number of files analyzed concurrently.
    #[must_use]
    pub fn parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be read, an exclude
    /// pattern is invalid, or the configuration cannot be turned into
    /// settings.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();

        let root = self.root.unwrap_or_else(|| config.analyzer.root.clone());
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let settings = match self.settings {
            Some(settings) => settings,
            None => config.to_settings()?.resolve(),
        };

        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(config.analyzer.exclude.iter().cloned());
        if exclude_patterns.is_empty() {
            exclude_patterns.extend(DEFAULT_EXCLUDES.iter().map(|p| (*p).to_string()));
        }
        let excludes = exclude_patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Analyzer {
            root,
            extractors: self.extractors,
            excludes,
            engine: RuleEngine::new(settings),
            respect_gitignore: config.analyzer.respect_gitignore,
            fail_on_parse_error: self.fail_on_parse_error,
            parallelism: self.parallelism.or(config.analyzer.parallelism),
        })
    }
}

/// Walks a project, extracts logging calls and reports violations.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    extractors: Vec<ExtractorBox>,
    excludes: Vec<glob::Pattern>,
    engine: RuleEngine,
    respect_gitignore: bool,
    fail_on_parse_error: bool,
    parallelism: Option<usize>,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of registered extractors.
    #[must_use]
    pub fn extractor_count(&self) -> usize {
        self.extractors.len()
    }

    /// Analyzes all files and returns the results.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery fails, or a file cannot be read or
    /// parsed while `fail_on_parse_error` is set.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {:?}", self.root);

        let files = self.discover_files()?;
        info!("Found {} files to analyze", files.len());

        let outcomes = match self.parallelism {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?
                .install(|| self.analyze_files(&files)),
            None => self.analyze_files(&files),
        };

        let mut result = LintResult::new();
        for outcome in outcomes {
            match outcome {
                Ok(violations) => {
                    result.violations.extend(violations);
                    result.files_checked += 1;
                }
                Err(e @ (AnalyzerError::Parse { .. } | AnalyzerError::Read { .. })) => {
                    if self.fail_on_parse_error {
                        return Err(e);
                    }
                    warn!("Skipping file: {}", e);
                }
                Err(e) => return Err(e),
            }
        }

        result.sort();

        info!(
            "Analysis complete: {} violations in {} files",
            result.violations.len(),
            result.files_checked
        );

        Ok(result)
    }

    /// Analyzes in-memory source as if it were the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Parse`] if no extractor handles `path` or
    /// the source cannot be parsed.
    pub fn analyze_source(&self, path: &Path, content: &str) -> Result<Vec<Violation>, AnalyzerError> {
        let extractor = self.extractor_for(path).ok_or_else(|| AnalyzerError::Parse {
            path: path.to_path_buf(),
            message: "no extractor for file type".to_string(),
        })?;

        debug!("Extracting {} calls: {}", extractor.language_id(), path.display());
        let calls = extractor.extract(content).map_err(|e| AnalyzerError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let ctx = FileContext::new(path, content, self.base_dir());
        let mut violations = Vec::new();

        for call in &calls {
            if !self.engine.is_tracked(call) {
                continue;
            }
            let label = format!(
                "{}{}{}",
                call.module_path,
                extractor.path_separator(),
                call.function
            );
            for diagnostic in self.engine.classify(call) {
                if let Some(violation) = self.to_violation(&ctx, call, &label, diagnostic) {
                    violations.push(violation);
                }
            }
        }

        Ok(violations)
    }

    fn analyze_files(&self, files: &[PathBuf]) -> Vec<Result<Vec<Violation>, AnalyzerError>> {
        files.par_iter().map(|path| self.analyze_file(path)).collect()
    }

    fn analyze_file(&self, path: &Path) -> Result<Vec<Violation>, AnalyzerError> {
        let content = std::fs::read_to_string(path).map_err(|source| AnalyzerError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.analyze_source(path, &content)
    }

    fn to_violation(
        &self,
        ctx: &FileContext<'_>,
        call: &CallSite,
        label: &str,
        diagnostic: Diagnostic,
    ) -> Option<Violation> {
        let kind: CheckKind = diagnostic.check;
        let line = ctx.line_of(diagnostic.range.start);

        let allow = check_allow(ctx.content, line, kind.name(), kind.code());
        if allow.is_allowed() {
            debug!(
                "Suppressed {} at {}:{} in {}.{} ({})",
                kind.code(),
                ctx.relative_path.display(),
                line,
                call.module_path,
                call.function,
                allow.reason().unwrap_or("no reason"),
            );
            return None;
        }

        let mut violation = Violation::new(
            kind.code(),
            kind.name(),
            diagnostic.severity,
            ctx.location(diagnostic.range),
            diagnostic.message,
        )
        .with_call(label);

        if let Some(fix) = diagnostic.fix {
            let replacement = Replacement::new(ctx.location(fix.range), fix.replacement);
            violation = violation.with_suggestion(Suggestion::with_fix(fix.message, replacement));
        }

        Some(violation)
    }

    fn extractor_for(&self, path: &Path) -> Option<&dyn CallSiteExtractor> {
        let ext = path.extension().and_then(|e| e.to_str())?;
        self.extractors
            .iter()
            .find(|x| {
                x.extensions()
                    .iter()
                    .any(|known| known.strip_prefix('.') == Some(ext))
            })
            .map(Box::as_ref)
    }

    /// Directory violation paths are reported relative to: the root, or its
    /// parent when the root is a single file.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        if self.root.is_file() {
            self.root.parent().unwrap_or(&self.root)
        } else {
            &self.root
        }
    }

    /// Discovers source files handled by a registered extractor, sorted.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        if self.root.is_file() {
            return Ok(self
                .extractor_for(&self.root)
                .map(|_| vec![self.root.clone()])
                .unwrap_or_default());
        }

        let mut builder = ignore::WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .git_ignore(self.respect_gitignore)
            .require_git(false)
            .filter_entry(|entry| entry.file_name() != ".git");

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            let path = entry.path();

            if !path.is_file() || self.extractor_for(path).is_none() {
                continue;
            }

            if self.should_exclude(path) {
                debug!("Excluding: {}", path.display());
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    /// Checks a root-relative path against the exclude patterns.
    fn should_exclude(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        self.excludes
            .iter()
            .any(|pattern| pattern.matches_path(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call_site::{ExtractError, LiteralString, TextRange};
    use crate::types::Severity;

    /// Treats `say <text>` lines as `fmt.Println("<text>")` and
    /// `shout <text>` lines as an untracked call. A line starting with `!`
    /// is a parse error.
    struct LineExtractor;

    impl CallSiteExtractor for LineExtractor {
        fn language_id(&self) -> &'static str {
            "lines"
        }

        fn extensions(&self) -> &'static [&'static str] {
            &[".msg"]
        }

        fn extract(&self, source: &str) -> Result<Vec<CallSite>, ExtractError> {
            let mut calls = Vec::new();
            let mut offset = 0;
            for line in source.split_inclusive('\n') {
                let text = line.trim_end_matches('\n');
                if text.starts_with('!') {
                    return Err(ExtractError::Parse {
                        language: "lines",
                        message: "unexpected '!'".to_string(),
                    });
                }
                let parsed = text
                    .strip_prefix("say ")
                    .map(|msg| ("fmt", msg, 4))
                    .or_else(|| text.strip_prefix("shout ").map(|msg| ("other", msg, 6)));
                if let Some((module, msg, skip)) = parsed {
                    let start = offset + skip;
                    let range = TextRange::new(start, start + msg.len());
                    calls.push(
                        CallSite::new(module, "Println")
                            .with_arg(vec![LiteralString::new(msg, range)]),
                    );
                }
                offset += line.len();
            }
            Ok(calls)
        }
    }

    fn project(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            let path = dir.path().join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
        dir
    }

    fn analyzer(root: &Path) -> AnalyzerBuilder {
        Analyzer::builder().root(root).extractor(LineExtractor)
    }

    #[test]
    fn test_builder() {
        let analyzer = Analyzer::builder()
            .root(".")
            .exclude("**/target/**")
            .build()
            .expect("Failed to build analyzer");

        assert!(analyzer.root().exists());
        assert_eq!(analyzer.extractor_count(), 0);
    }

    #[test]
    fn test_invalid_exclude_pattern() {
        let result = Analyzer::builder().root(".").exclude("[").build();
        assert!(matches!(result, Err(AnalyzerError::Glob(_))));
    }

    #[test]
    fn test_reports_violation_with_fix() {
        let dir = project(&[("app/main.msg", "say Hello\nsay ok\n")]);
        let result = analyzer(dir.path()).build().unwrap().analyze().unwrap();

        assert_eq!(result.files_checked, 1);
        assert_eq!(result.violations.len(), 1);

        let v = &result.violations[0];
        assert_eq!(v.code, "LL001");
        assert_eq!(v.rule, "lowercase-first");
        assert_eq!(v.severity, Severity::Warning);
        assert_eq!(v.location.file, PathBuf::from("app/main.msg"));
        assert_eq!((v.location.line, v.location.column), (1, 5));
        assert_eq!(v.call.as_deref(), Some("fmt.Println"));

        let replacement = v
            .suggestion
            .as_ref()
            .and_then(|s| s.replacement.as_ref())
            .unwrap();
        assert_eq!(replacement.new_text, "\"hello\"");
        assert_eq!(replacement.location.offset, 4);
    }

    #[test]
    fn test_untracked_calls_are_skipped() {
        let dir = project(&[("a.msg", "shout Hello!\n")]);
        let result = analyzer(dir.path()).build().unwrap().analyze().unwrap();
        assert!(result.violations.is_empty());
    }

    #[test]
    fn test_suppression_comment() {
        let dir = project(&[(
            "a.msg",
            "// loglint: allow(lowercase-first)\nsay Hello\nsay Hello\n",
        )]);
        let result = analyzer(dir.path()).build().unwrap().analyze().unwrap();

        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].location.line, 3);
    }

    #[test]
    fn test_excludes_and_extensions() {
        let dir = project(&[
            ("src/a.msg", "say Hello\n"),
            ("gen/b.msg", "say Hello\n"),
            ("notes.txt", "say Hello\n"),
        ]);
        let result = analyzer(dir.path())
            .exclude("**/gen/**")
            .build()
            .unwrap()
            .analyze()
            .unwrap();

        assert_eq!(result.files_checked, 1);
        assert_eq!(result.violations[0].location.file, PathBuf::from("src/a.msg"));
    }

    #[test]
    fn test_default_excludes_skip_target() {
        let dir = project(&[("target/out.msg", "say Hello\n")]);
        let result = analyzer(dir.path()).build().unwrap().analyze().unwrap();
        assert_eq!(result.files_checked, 0);
    }

    #[test]
    fn test_gitignore_respected() {
        let dir = project(&[
            (".gitignore", "ignored/\n"),
            ("ignored/a.msg", "say Hello\n"),
            ("kept.msg", "say Hello\n"),
        ]);
        let result = analyzer(dir.path()).build().unwrap().analyze().unwrap();
        assert_eq!(result.files_checked, 1);

        let mut config = Config::default();
        config.analyzer.respect_gitignore = false;
        let result = analyzer(dir.path())
            .config(config)
            .build()
            .unwrap()
            .analyze()
            .unwrap();
        assert_eq!(result.files_checked, 2);
    }

    #[test]
    fn test_parse_errors() {
        let dir = project(&[("bad.msg", "!\n"), ("good.msg", "say Hello\n")]);

        let result = analyzer(dir.path()).build().unwrap().analyze().unwrap();
        assert_eq!(result.files_checked, 1);
        assert_eq!(result.violations.len(), 1);

        let err = analyzer(dir.path())
            .fail_on_parse_error(true)
            .build()
            .unwrap()
            .analyze()
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::Parse { path, .. } if path.ends_with("bad.msg")));
    }

    #[test]
    fn test_non_utf8_file_is_skipped() {
        let dir = project(&[("good.msg", "say Hello\n")]);
        std::fs::write(dir.path().join("bad.msg"), b"say caf\xe9\n").unwrap();

        let result = analyzer(dir.path()).build().unwrap().analyze().unwrap();
        assert_eq!(result.files_checked, 1);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].location.file, PathBuf::from("good.msg"));

        let err = analyzer(dir.path())
            .fail_on_parse_error(true)
            .build()
            .unwrap()
            .analyze()
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::Read { path, .. } if path.ends_with("bad.msg")));
    }

    #[test]
    fn test_parallel_results_are_ordered() {
        let files: Vec<(String, &str)> = (0..12)
            .map(|i| (format!("f{i:02}.msg"), "say ok\nsay Bad\n"))
            .collect();
        let refs: Vec<(&str, &str)> = files.iter().map(|(n, c)| (n.as_str(), *c)).collect();
        let dir = project(&refs);

        let result = analyzer(dir.path())
            .parallelism(3)
            .build()
            .unwrap()
            .analyze()
            .unwrap();

        assert_eq!(result.files_checked, 12);
        let names: Vec<_> = result
            .violations
            .iter()
            .map(|v| v.location.file.clone())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_config_settings_and_severity() {
        let config = Config::parse(
            r#"
[checks]
lowercase = false

[severity]
no-special-chars = "error"
"#,
        )
        .unwrap();
        let dir = project(&[("a.msg", "say Hello!\n")]);

        let result = analyzer(dir.path())
            .config(config)
            .build()
            .unwrap()
            .analyze()
            .unwrap();

        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].code, "LL003");
        assert!(result.has_errors());
    }

    #[test]
    fn test_single_file_root() {
        let dir = project(&[("one.msg", "say Hello\n")]);
        let result = analyzer(&dir.path().join("one.msg"))
            .build()
            .unwrap()
            .analyze()
            .unwrap();

        assert_eq!(result.files_checked, 1);
        assert_eq!(result.violations[0].location.file, PathBuf::from("one.msg"));
        assert_eq!(
            analyzer(&dir.path().join("one.msg")).build().unwrap().base_dir(),
            dir.path()
        );
    }
}
