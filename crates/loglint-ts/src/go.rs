//! Go language extractor using Tree-sitter.

use std::collections::{HashMap, HashSet};

use loglint_core::{CallSite, CallSiteExtractor, ExtractError, FormatSyntax, LiteralString, TextRange};
use tracing::debug;
use tree_sitter::{Language, Node, Parser};

use crate::strings::decode_literal;

/// Extracts package-level function calls from Go source.
///
/// Resolved shapes:
///
/// - `pkg.Func(...)` where `pkg` is an imported package (or its alias)
/// - `pkg.Ctor().Method(...)`, reported as `pkg.Method`
/// - `Func(...)` where `Func` is declared in the same file, reported under
///   the file's package name
///
/// Method calls on variables need type information and are not reported.
pub struct GoExtractor {
    language: Language,
}

impl GoExtractor {
    /// Creates a new Go extractor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: tree_sitter_go::LANGUAGE.into(),
        }
    }
}

impl Default for GoExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl CallSiteExtractor for GoExtractor {
    fn language_id(&self) -> &'static str {
        "go"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".go"]
    }

    fn extract(&self, source: &str) -> Result<Vec<CallSite>, ExtractError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| parse_error(e.to_string()))?;

        let src = source.as_bytes();
        let tree = parser
            .parse(src, None)
            .ok_or_else(|| parse_error("parser produced no tree".to_string()))?;
        let root = tree.root_node();

        if root.has_error() {
            let line = first_error(root).map_or(0, |n| n.start_position().row + 1);
            return Err(parse_error(format!("syntax error at line {line}")));
        }

        let scope = FileScope::collect(root, src);
        let mut calls = Vec::new();
        visit_calls(root, src, &scope, &mut calls);

        debug!("Extracted {} Go call sites", calls.len());
        Ok(calls)
    }
}

fn parse_error(message: String) -> ExtractError {
    ExtractError::Parse {
        language: "go",
        message,
    }
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(Node::has_error)
        .find_map(first_error)
}

fn text<'a>(node: &Node<'_>, src: &'a [u8]) -> &'a str {
    std::str::from_utf8(&src[node.start_byte()..node.end_byte()]).unwrap_or("")
}

fn range(node: &Node<'_>) -> TextRange {
    TextRange::new(node.start_byte(), node.end_byte())
}

/// Package name, imports, local functions and string constants of one file.
#[derive(Debug, Default)]
struct FileScope {
    package: String,
    /// Local package name → import path.
    imports: HashMap<String, String>,
    functions: HashSet<String>,
    consts: HashMap<String, String>,
}

impl FileScope {
    fn collect(root: Node<'_>, src: &[u8]) -> Self {
        let mut scope = Self::default();
        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            match node.kind() {
                "package_clause" => {
                    if let Some(name) = node.named_child(0) {
                        scope.package = text(&name, src).to_owned();
                    }
                }
                "import_declaration" => scope.add_imports(node, src),
                "function_declaration" => {
                    if let Some(name) = node.child_by_field_name("name") {
                        scope.functions.insert(text(&name, src).to_owned());
                    }
                }
                "const_declaration" => scope.add_consts(node, src),
                _ => {}
            }
        }
        scope
    }

    fn add_imports(&mut self, node: Node<'_>, src: &[u8]) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "import_spec" => self.add_import_spec(child, src),
                "import_spec_list" => {
                    let mut list_cursor = child.walk();
                    for spec in child.named_children(&mut list_cursor) {
                        if spec.kind() == "import_spec" {
                            self.add_import_spec(spec, src);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn add_import_spec(&mut self, spec: Node<'_>, src: &[u8]) {
        let Some(path) = spec
            .child_by_field_name("path")
            .and_then(|p| decode_literal(text(&p, src)))
        else {
            return;
        };

        let local = match spec.child_by_field_name("name") {
            // Blank and dot imports introduce no qualifier.
            Some(name) if name.kind() != "package_identifier" => return,
            Some(name) => text(&name, src).to_owned(),
            None => default_package_name(&path).to_owned(),
        };
        self.imports.insert(local, path);
    }

    fn add_consts(&mut self, node: Node<'_>, src: &[u8]) {
        let mut cursor = node.walk();
        for spec in node.named_children(&mut cursor) {
            if spec.kind() != "const_spec" {
                continue;
            }
            let mut name_cursor = spec.walk();
            let names: Vec<_> = spec
                .children_by_field_name("name", &mut name_cursor)
                .map(|n| text(&n, src).to_owned())
                .collect();
            let Some(values) = spec.child_by_field_name("value") else {
                continue;
            };
            let mut value_cursor = values.walk();
            let values: Vec<_> = values.named_children(&mut value_cursor).collect();

            for (name, value) in names.into_iter().zip(values) {
                if let Some(folded) = self.fold(value, src) {
                    self.consts.insert(name, folded);
                }
            }
        }
    }

    /// Evaluates a constant string expression.
    fn fold(&self, node: Node<'_>, src: &[u8]) -> Option<String> {
        match node.kind() {
            "interpreted_string_literal" | "raw_string_literal" => decode_literal(text(&node, src)),
            "identifier" => self.consts.get(text(&node, src)).cloned(),
            "parenthesized_expression" => self.fold(node.named_child(0)?, src),
            "binary_expression" if is_concat(node) => {
                let left = self.fold(node.child_by_field_name("left")?, src)?;
                let right = self.fold(node.child_by_field_name("right")?, src)?;
                Some(left + &right)
            }
            _ => None,
        }
    }

    /// Resolves the callee of a `call_expression` to `(module_path, name)`.
    fn resolve(&self, function: Node<'_>, src: &[u8]) -> Option<(String, String)> {
        match function.kind() {
            "identifier" => {
                let name = text(&function, src);
                self.functions
                    .contains(name)
                    .then(|| (self.package.clone(), name.to_owned()))
            }
            "selector_expression" => {
                let operand = function.child_by_field_name("operand")?;
                let field = text(&function.child_by_field_name("field")?, src).to_owned();
                let module = match operand.kind() {
                    "identifier" => self.imports.get(text(&operand, src))?.clone(),
                    // `pkg.L().Info(...)`: method on a value returned by a
                    // package-level call.
                    "call_expression" => {
                        let inner = operand.child_by_field_name("function")?;
                        self.resolve(inner, src)?.0
                    }
                    _ => return None,
                };
                Some((module, field))
            }
            _ => None,
        }
    }
}

fn is_concat(node: Node<'_>) -> bool {
    node.child_by_field_name("operator")
        .is_some_and(|op| op.kind() == "+")
}

/// Last path element, the conventional package name.
fn default_package_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn visit_calls(node: Node<'_>, src: &[u8], scope: &FileScope, calls: &mut Vec<CallSite>) {
    if node.kind() == "call_expression" {
        if let Some(call) = record_call(node, src, scope) {
            calls.push(call);
        }
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        visit_calls(child, src, scope, calls);
    }
}

fn record_call(node: Node<'_>, src: &[u8], scope: &FileScope) -> Option<CallSite> {
    let (module_path, function) = scope.resolve(node.child_by_field_name("function")?, src)?;
    let mut call = CallSite::new(module_path, function).with_format(FormatSyntax::Printf);

    if let Some(arguments) = node.child_by_field_name("arguments") {
        let mut cursor = arguments.walk();
        for arg in arguments.named_children(&mut cursor) {
            if arg.kind() == "comment" {
                continue;
            }
            let mut strings = Vec::new();
            collect_strings(arg, src, scope, &mut strings);
            call = call.with_arg(strings);
        }
    }
    Some(call)
}

/// Collects strings of an argument, depth-first, left to right.
fn collect_strings(node: Node<'_>, src: &[u8], scope: &FileScope, out: &mut Vec<LiteralString>) {
    match node.kind() {
        "interpreted_string_literal" | "raw_string_literal" => {
            if let Some(value) = decode_literal(text(&node, src)) {
                out.push(LiteralString::new(value, range(&node)));
            }
            return;
        }
        "identifier" => {
            if let Some(value) = scope.consts.get(text(&node, src)) {
                out.push(LiteralString::new(value.clone(), range(&node)));
            }
            return;
        }
        "binary_expression" if is_concat(node) => {
            if let Some(value) = scope.fold(node, src) {
                out.push(LiteralString::new(value, range(&node)));
                return;
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_strings(child, src, scope, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(src: &str) -> Vec<CallSite> {
        GoExtractor::new().extract(src).expect("parse")
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
            .unwrap_or_else(|| panic!("no call {module}.{function} in {calls:?}"))
    }

    #[test]
    fn resolves_package_calls_through_imports() {
        let src = r#"package main

import (
	"fmt"
	lg "log/slog"
	_ "embed"
)

func main() {
	fmt.Printf("Hello %s", name)
	lg.Info("started", "port", 8080)
}
"#;
        let calls = extract(src);

        let printf = find(&calls, "fmt", "Printf");
        assert_eq!(printf.format, FormatSyntax::Printf);
        assert_eq!(texts(printf), vec![vec!["Hello %s"], vec![]]);
        let lit = printf.primary().unwrap();
        assert_eq!(&src[lit.range.start..lit.range.end], "\"Hello %s\"");

        let info = find(&calls, "log/slog", "Info");
        assert_eq!(texts(info), vec![vec!["started"], vec!["port"], vec![]]);
    }

    #[test]
    fn single_import_and_default_alias() {
        let src = r#"package svc

import "go.uber.org/zap"

func run() {
	zap.L().Info("Ready")
	logger.Info("Unresolved")
}
"#;
        let calls = extract(src);
        assert_eq!(texts(find(&calls, "go.uber.org/zap", "Info")), vec![vec!["Ready"]]);
        assert_eq!(calls.iter().filter(|c| c.function == "Info").count(), 1);
    }

    #[test]
    fn constants_and_concatenation_are_folded() {
        let src = r#"package main

import "fmt"

const prefix = "Server"
const (
	greeting, farewell = prefix + " up", "bye"
)

func main() {
	fmt.Println(greeting)
	fmt.Println("a" + "b", "x" + name)
}
"#;
        let calls = extract(src);
        let printlns: Vec<_> = calls.iter().filter(|c| c.function == "Println").collect();

        assert_eq!(texts(printlns[0]), vec![vec!["Server up"]]);
        let constant = printlns[0].primary().unwrap();
        assert_eq!(&src[constant.range.start..constant.range.end], "greeting");

        assert_eq!(texts(printlns[1]), vec![vec!["ab"], vec!["x"]]);
        let folded = printlns[1].primary().unwrap();
        assert_eq!(&src[folded.range.start..folded.range.end], "\"a\" + \"b\"");
    }

    #[test]
    fn local_functions_use_package_name() {
        let src = r#"package audit

func Record(msg string) {}

func run() {
	Record("User logged in")
	undeclared("Skipped")
}
"#;
        let calls = extract(src);
        assert_eq!(texts(find(&calls, "audit", "Record")), vec![vec!["User logged in"]]);
        assert!(!calls.iter().any(|c| c.function == "undeclared"));
    }

    #[test]
    fn nested_calls_are_reported_and_strings_depth_first() {
        let src = r#"package main

import "fmt"

func main() {
	fmt.Println("outer", fmt.Sprintf("Inner %d", 1))
}
"#;
        let calls = extract(src);
        assert_eq!(
            texts(find(&calls, "fmt", "Println")),
            vec![vec!["outer"], vec!["Inner %d"]]
        );
        assert_eq!(texts(find(&calls, "fmt", "Sprintf")), vec![vec!["Inner %d"], vec![]]);
    }

    #[test]
    fn raw_and_escaped_strings() {
        let src = "package main\n\nimport \"fmt\"\n\nfunc main() {\n\tfmt.Print(`Raw \\n`, \"tab\\there\")\n}\n";
        let calls = extract(src);
        assert_eq!(
            texts(find(&calls, "fmt", "Print")),
            vec![vec!["Raw \\n"], vec!["tab\there"]]
        );
    }

    #[test]
    fn syntax_errors_are_reported() {
        let err = GoExtractor::new()
            .extract("package main\n\nfunc main() {\n\tfmt.Println(\"x\"\n")
            .unwrap_err();
        assert!(err.to_string().starts_with("go parse error: syntax error at line"));
    }

    #[test]
    fn default_package_names() {
        assert_eq!(default_package_name("log/slog"), "slog");
        assert_eq!(default_package_name("fmt"), "fmt");
        assert_eq!(default_package_name("go.uber.org/zap"), "zap");
    }
}
