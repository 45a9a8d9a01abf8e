//! File-level name resolution: `use` imports and string constants.

use std::collections::HashMap;
use syn::{Expr, ExprLit, Item, Lit, UseTree};

/// Macros reachable without an import.
const PRELUDE_MACROS: &[&str] = &[
    "println", "print", "eprintln", "eprint", "panic", "format", "write", "writeln",
];

/// Names visible at file level.
#[derive(Debug, Default)]
pub(crate) struct FileScope {
    /// Local name → full path segments.
    imports: HashMap<String, Vec<String>>,
    /// Constant name → string value.
    consts: HashMap<String, String>,
}

impl FileScope {
    /// Collects imports and `&str` constants from the top level of `file`.
    pub(crate) fn collect(file: &syn::File) -> Self {
        let mut scope = Self::default();
        for item in &file.items {
            match item {
                Item::Use(item_use) => scope.add_use_tree(&item_use.tree, &mut Vec::new()),
                Item::Const(item_const) => {
                    if let Expr::Lit(ExprLit {
                        lit: Lit::Str(s), ..
                    }) = item_const.expr.as_ref()
                    {
                        scope.consts.insert(item_const.ident.to_string(), s.value());
                    }
                }
                _ => {}
            }
        }
        scope
    }

    fn add_use_tree(&mut self, tree: &UseTree, prefix: &mut Vec<String>) {
        match tree {
            UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.add_use_tree(&path.tree, prefix);
                prefix.pop();
            }
            UseTree::Name(name) => {
                let ident = name.ident.to_string();
                // `use tracing::{self}` imports `tracing` itself.
                if ident == "self" {
                    if let Some(last) = prefix.last() {
                        self.imports.insert(last.clone(), prefix.clone());
                    }
                    return;
                }
                let mut full = prefix.clone();
                full.push(ident.clone());
                self.imports.insert(ident, full);
            }
            UseTree::Rename(rename) => {
                let mut full = prefix.clone();
                if rename.ident != "self" {
                    full.push(rename.ident.to_string());
                }
                self.imports.insert(rename.rename.to_string(), full);
            }
            UseTree::Group(group) => {
                for item in &group.items {
                    self.add_use_tree(item, prefix);
                }
            }
            UseTree::Glob(_) => {}
        }
    }

    /// Looks up a file-level string constant.
    pub(crate) fn constant(&self, name: &str) -> Option<&str> {
        self.consts.get(name).map(String::as_str)
    }

    /// Resolves a path to `(module_path, name)`.
    ///
    /// `is_macro` enables the std prelude fallback for single-segment paths.
    pub(crate) fn resolve(&self, segments: &[String], is_macro: bool) -> Option<(String, String)> {
        let (last, init) = segments.split_last()?;

        if init.is_empty() {
            if let Some(full) = self.imports.get(last) {
                let (name, module) = full.split_last()?;
                if module.is_empty() {
                    return None;
                }
                return Some((module.join("::"), name.clone()));
            }
            if is_macro && PRELUDE_MACROS.contains(&last.as_str()) {
                return Some(("std".to_string(), last.clone()));
            }
            return None;
        }

        let mut module: Vec<String> = match init[0].as_str() {
            "crate" | "self" | "super" => vec![init[0].clone()],
            first => self
                .imports
                .get(first)
                .cloned()
                .unwrap_or_else(|| vec![first.to_string()]),
        };
        module.extend(init[1..].iter().cloned());
        Some((module.join("::"), last.clone()))
    }
}

/// Converts a path to its segment names, ignoring generics.
pub(crate) fn path_segments(path: &syn::Path) -> Vec<String> {
    path.segments.iter().map(|s| s.ident.to_string()).collect()
}
