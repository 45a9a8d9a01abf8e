//! Call-site extraction for Rust sources.

use loglint_core::{
    CallSite, CallSiteExtractor, ExtractError, FormatSyntax, LineIndex, LiteralString, TextRange,
};
use proc_macro2::{Span, TokenStream, TokenTree};
use syn::punctuated::Punctuated;
use syn::visit::Visit;
use syn::{Expr, ExprCall, ExprPath, Lit, LitStr, Macro, Token};
use tracing::debug;

use crate::scope::{path_segments, FileScope};

/// Extracts macro invocations and function calls from Rust files.
///
/// Identity is resolved from the path as written, expanded through the
/// file's `use` items. Calls that cannot be resolved (method calls, local
/// bindings) are not reported.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustExtractor;

impl RustExtractor {
    /// Creates a new extractor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl CallSiteExtractor for RustExtractor {
    fn language_id(&self) -> &'static str {
        "rust"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".rs"]
    }

    fn path_separator(&self) -> &'static str {
        "::"
    }

    fn extract(&self, source: &str) -> Result<Vec<CallSite>, ExtractError> {
        let file = syn::parse_file(source).map_err(|e| ExtractError::Parse {
            language: "rust",
            message: e.to_string(),
        })?;

        let mut visitor = CallVisitor {
            source,
            lines: LineIndex::new(source),
            scope: FileScope::collect(&file),
            calls: Vec::new(),
        };
        visitor.visit_file(&file);

        debug!("Extracted {} Rust call sites", visitor.calls.len());
        Ok(visitor.calls)
    }
}

struct CallVisitor<'a> {
    source: &'a str,
    lines: LineIndex,
    scope: FileScope,
    calls: Vec<CallSite>,
}

impl CallVisitor<'_> {
    fn range(&self, span: Span) -> TextRange {
        let (start, end) = (span.start(), span.end());
        TextRange::new(
            self.lines.offset(self.source, start.line, start.column),
            self.lines.offset(self.source, end.line, end.column),
        )
    }

    fn literal(&self, lit: &LitStr) -> LiteralString {
        LiteralString::new(lit.value(), self.range(lit.span()))
    }

    fn constant(&self, ident: &proc_macro2::Ident) -> Option<LiteralString> {
        let value = self.scope.constant(&ident.to_string())?;
        Some(LiteralString::new(value, self.range(ident.span())))
    }

    /// Collects strings from a token stream, depth-first.
    fn collect_tokens(&self, tokens: TokenStream, out: &mut Vec<LiteralString>) {
        let mut prev_is_path_sep = false;
        for tree in tokens {
            match tree {
                TokenTree::Literal(literal) => {
                    if let Lit::Str(s) = Lit::new(literal) {
                        out.push(self.literal(&s));
                    }
                    prev_is_path_sep = false;
                }
                TokenTree::Group(group) => {
                    self.collect_tokens(group.stream(), out);
                    prev_is_path_sep = false;
                }
                TokenTree::Ident(ident) => {
                    // `module::NAME` is not a file-level constant.
                    if !prev_is_path_sep {
                        out.extend(self.constant(&ident));
                    }
                    prev_is_path_sep = false;
                }
                TokenTree::Punct(punct) => {
                    prev_is_path_sep = punct.as_char() == ':';
                }
            }
        }
    }

    /// Collects strings from an expression, depth-first.
    fn collect_expr(&self, expr: &Expr, out: &mut Vec<LiteralString>) {
        let mut collector = StringCollector {
            visitor: self,
            strings: Vec::new(),
        };
        collector.visit_expr(expr);
        out.append(&mut collector.strings);
    }

    fn record_macro(&mut self, mac: &Macro) {
        let Some((module_path, function)) = self.scope.resolve(&path_segments(&mac.path), true)
        else {
            return;
        };

        let mut call = CallSite::new(module_path, function).with_format(FormatSyntax::Brace);
        for arg in split_top_level(mac.tokens.clone()) {
            if is_target_arg(&arg) {
                continue;
            }
            let mut strings = Vec::new();
            self.collect_tokens(arg, &mut strings);
            call = call.with_arg(strings);
        }
        self.calls.push(call);
    }

    fn record_call(&mut self, node: &ExprCall) {
        let Expr::Path(ExprPath { path, .. }) = node.func.as_ref() else {
            return;
        };
        let Some((module_path, function)) = self.scope.resolve(&path_segments(path), false) else {
            return;
        };

        let mut call = CallSite::new(module_path, function).with_format(FormatSyntax::Brace);
        for arg in &node.args {
            let mut strings = Vec::new();
            self.collect_expr(arg, &mut strings);
            call = call.with_arg(strings);
        }
        self.calls.push(call);
    }
}

impl<'ast> Visit<'ast> for CallVisitor<'_> {
    fn visit_macro(&mut self, node: &'ast Macro) {
        self.record_macro(node);

        // Descend into arguments that parse as expressions to reach nested
        // calls; structured-field syntax simply fails to parse.
        if let Ok(args) = node.parse_body_with(Punctuated::<Expr, Token![,]>::parse_terminated) {
            for arg in &args {
                self.visit_expr(arg);
            }
        }
    }

    fn visit_expr_call(&mut self, node: &'ast ExprCall) {
        self.record_call(node);
        syn::visit::visit_expr_call(self, node);
    }
}

/// Walks an argument expression for string literals and constant references.
struct StringCollector<'v, 'a> {
    visitor: &'v CallVisitor<'a>,
    strings: Vec<LiteralString>,
}

impl<'ast> Visit<'ast> for StringCollector<'_, '_> {
    fn visit_lit_str(&mut self, node: &'ast LitStr) {
        self.strings.push(self.visitor.literal(node));
    }

    fn visit_expr_path(&mut self, node: &'ast ExprPath) {
        if let Some(ident) = node.path.get_ident() {
            self.strings.extend(self.visitor.constant(ident));
        }
    }

    fn visit_macro(&mut self, node: &'ast Macro) {
        self.visitor
            .collect_tokens(node.tokens.clone(), &mut self.strings);
    }
}

/// Splits a macro body on commas that are not nested in a group.
fn split_top_level(tokens: TokenStream) -> Vec<TokenStream> {
    let mut args = Vec::new();
    let mut current = Vec::new();
    for tree in tokens {
        match &tree {
            TokenTree::Punct(p) if p.as_char() == ',' => {
                args.push(current.drain(..).collect());
            }
            _ => current.push(tree),
        }
    }
    if !current.is_empty() {
        args.push(current.into_iter().collect());
    }
    args
}

/// Returns true for `target: "..."` / `parent: ...` prefixes of log macros.
fn is_target_arg(arg: &TokenStream) -> bool {
    let mut trees = arg.clone().into_iter();
    let (Some(TokenTree::Ident(ident)), Some(TokenTree::Punct(colon)), next) =
        (trees.next(), trees.next(), trees.next())
    else {
        return false;
    };
    let is_single_colon =
        colon.as_char() == ':' && !matches!(next, Some(TokenTree::Punct(ref p)) if p.as_char() == ':');
    is_single_colon && (ident == "target" || ident == "parent")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(src: &str) -> Vec<CallSite> {
        RustExtractor::new().extract(src).expect("parse")
    }

    fn texts(call: &CallSite) -> Vec<Vec<&str>> {
        call.args
            .iter()
            .map(|arg| arg.iter().map(|s| s.text.as_str()).collect())
            .collect()
    }

    fn find<'c>(calls: &'c [CallSite], module: &str, function: &str) -> &'c CallSite {
        calls
            .iter()
            .find(|c| c.module_path == module && c.function == function)
            .unwrap_or_else(|| panic!("no call {module}::{function} in {calls:?}"))
    }

    #[test]
    fn extracts_qualified_macro() {
        let src = r#"
fn main() {
    tracing::info!("Server started on {}", port);
}
"#;
        let calls = extract(src);
        let call = find(&calls, "tracing", "info");

        assert_eq!(call.format, FormatSyntax::Brace);
        assert_eq!(texts(call), vec![vec!["Server started on {}"], vec![]]);

        let lit = call.primary().unwrap();
        assert_eq!(
            &src[lit.range.start..lit.range.end],
            "\"Server started on {}\""
        );
    }

    #[test]
    fn resolves_imported_and_prelude_macros() {
        let src = r#"
use log::{warn as w};

fn run() {
    w!("Disk low");
    println!("Done");
    unknown!("Skipped");
}
"#;
        let calls = extract(src);
        assert_eq!(texts(find(&calls, "log", "warn")), vec![vec!["Disk low"]]);
        assert_eq!(texts(find(&calls, "std", "println")), vec![vec!["Done"]]);
        assert!(!calls.iter().any(|c| c.function == "unknown"));
    }

    #[test]
    fn substitutes_file_level_constants() {
        let src = r#"
const MSG: &str = "Ready";

fn run() {
    tracing::info!("{}", MSG);
    tracing::info!("{}", other::MSG);
}
"#;
        let calls = extract(src);
        let infos: Vec<_> = calls.iter().filter(|c| c.function == "info").collect();
        assert_eq!(texts(infos[0]), vec![vec!["{}"], vec!["Ready"]]);
        assert_eq!(texts(infos[1]), vec![vec!["{}"], vec![]]);

        let constant = &infos[0].args[1][0];
        assert_eq!(&src[constant.range.start..constant.range.end], "MSG");
    }

    #[test]
    fn skips_target_argument_and_nested_groups_are_depth_first() {
        let src = r#"
fn run() {
    tracing::warn!(target: "net", "Retry {}", (attempt, "inner"));
}
"#;
        let calls = extract(src);
        let call = find(&calls, "tracing", "warn");
        assert_eq!(texts(call), vec![vec!["Retry {}"], vec!["inner"]]);
    }

    #[test]
    fn raw_strings_and_escapes_are_decoded() {
        let src = r##"
fn run() {
    println!(r#"Raw "quoted""#);
    println!("tab\there");
}
"##;
        let calls = extract(src);
        let printlns: Vec<_> = calls.iter().filter(|c| c.function == "println").collect();
        assert_eq!(printlns[0].primary().unwrap().text, "Raw \"quoted\"");
        assert_eq!(printlns[1].primary().unwrap().text, "tab\there");
        let raw = printlns[0].primary().unwrap();
        assert_eq!(&src[raw.range.start..raw.range.end], r##"r#"Raw "quoted""#"##);
    }

    #[test]
    fn function_calls_collect_expression_strings() {
        let src = r#"
use my_log::emit;

fn run() {
    emit("Started", if ok { "yes" } else { "no" });
    x.emit("Method");
}
"#;
        let calls = extract(src);
        let emits: Vec<_> = calls.iter().filter(|c| c.function == "emit").collect();
        assert_eq!(emits.len(), 1);
        assert_eq!(emits[0].module_path, "my_log");
        assert_eq!(texts(emits[0]), vec![vec!["Started"], vec!["yes", "no"]]);
    }

    #[test]
    fn nested_macro_calls_are_visited() {
        let src = r#"
fn run() {
    let _ = vec![tracing::error!("Inner")];
}
"#;
        let calls = extract(src);
        assert_eq!(texts(find(&calls, "tracing", "error")), vec![vec!["Inner"]]);
    }

    #[test]
    fn non_ascii_columns_map_to_byte_offsets() {
        let src = "fn run() { let é = 1; println!(\"Привет\"); }\n";
        let calls = extract(src);
        let lit = find(&calls, "std", "println").primary().unwrap();
        assert_eq!(&src[lit.range.start..lit.range.end], "\"Привет\"");
    }

    #[test]
    fn parse_error_is_reported() {
        let err = RustExtractor::new().extract("fn {").unwrap_err();
        assert!(err.to_string().starts_with("rust parse error"));
    }

    #[test]
    fn split_top_level_respects_groups() {
        let tokens: TokenStream = r#""a", (b, c), d"#.parse().unwrap();
        assert_eq!(split_top_level(tokens).len(), 3);
    }
}
