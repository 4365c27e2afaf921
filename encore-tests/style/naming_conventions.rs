//! Naming Convention Checker
//!
//! Scans the encore crates for banned function prefixes, type suffixes and
//! generic module names.

use std::fs;
use std::path::{Path, PathBuf};

const BANNED_FUNCTION_PREFIXES: [(&str, &str); 3] = [
    ("get_", "Use the noun directly: search.artist() not search.get_artist()"),
    ("set_", "Use descriptive verbs: history.record() not history.set_entry()"),
    ("handle_", "Be specific: show_artist() not handle_artist()"),
];

const BANNED_TYPE_SUFFIXES: [&str; 2] = ["Factory", "Service"];

const VERBOSE_STRUCT_SUFFIXES: [&str; 4] = ["Manager", "Handler", "Processor", "Controller"];

const BANNED_MODULE_NAMES: [&str; 5] = ["utils", "common", "helpers", "misc", "stuff"];

/// A naming violation found in the code
#[derive(Debug)]
struct NamingViolation {
    file_path: String,
    line_number: usize,
    message: String,
}

#[derive(Default)]
struct NamingChecker {
    violations: Vec<NamingViolation>,
    files_checked: usize,
}

impl NamingChecker {
    fn record(&mut self, file_path: &Path, line_number: usize, message: String) {
        self.violations.push(NamingViolation {
            file_path: file_path.display().to_string(),
            line_number,
            message,
        });
    }

    fn check_function_prefixes(&mut self, file_path: &Path, content: &str) {
        for (line_num, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            let Some(signature) = ["pub fn ", "pub async fn ", "fn ", "async fn "]
                .iter()
                .find_map(|start| trimmed.strip_prefix(start))
            else {
                continue;
            };

            for (prefix, correction) in BANNED_FUNCTION_PREFIXES {
                if signature.starts_with(prefix) {
                    self.record(
                        file_path,
                        line_num + 1,
                        format!("Function uses banned prefix '{prefix}'. {correction}"),
                    );
                }
            }
        }
    }

    fn check_type_naming(&mut self, file_path: &Path, content: &str) {
        for (line_num, line) in content.lines().enumerate() {
            let trimmed = line.trim().strip_prefix("pub ").unwrap_or(line.trim());
            let (kind, rest) = match trimmed.split_once(' ') {
                Some((kind @ ("struct" | "enum" | "trait"), rest)) => (kind, rest),
                _ => continue,
            };
            let type_name = rest
                .split(|c: char| !c.is_alphanumeric() && c != '_')
                .next()
                .unwrap_or("");

            for suffix in BANNED_TYPE_SUFFIXES {
                if type_name.ends_with(suffix) {
                    self.record(
                        file_path,
                        line_num + 1,
                        format!("Type '{type_name}' uses banned '{suffix}' suffix"),
                    );
                }
            }

            if kind != "trait" {
                for suffix in VERBOSE_STRUCT_SUFFIXES {
                    if type_name.ends_with(suffix) {
                        self.record(
                            file_path,
                            line_num + 1,
                            format!("Type '{type_name}' uses verbose '{suffix}' suffix"),
                        );
                    }
                }
            }
        }
    }

    fn check_module_name(&mut self, file_path: &Path) {
        let Some(stem) = file_path.file_stem() else {
            return;
        };
        let stem = stem.to_string_lossy();
        if BANNED_MODULE_NAMES.contains(&stem.as_ref()) {
            self.record(
                file_path,
                1,
                format!("Module name '{stem}' is too generic"),
            );
        }
    }

    fn check_file(&mut self, file_path: &Path) -> std::io::Result<()> {
        // This file spells out the banned names
        if file_path.ends_with("naming_conventions.rs") {
            return Ok(());
        }

        let content = fs::read_to_string(file_path)?;
        self.check_function_prefixes(file_path, &content);
        self.check_type_naming(file_path, &content);
        self.check_module_name(file_path);
        self.files_checked += 1;
        Ok(())
    }
}

/// Rust sources of every encore crate in the workspace.
fn workspace_sources() -> std::io::Result<Vec<PathBuf>> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..");
    let mut files = Vec::new();

    for entry in fs::read_dir(&root)? {
        let path = entry?.path();
        let is_crate = path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().starts_with("encore-"));
        if path.is_dir() && is_crate {
            collect_sources(&path, &mut files)?;
        }
    }
    Ok(files)
}

fn collect_sources(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if path.file_name().is_some_and(|name| name == "target") {
                continue;
            }
            collect_sources(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            files.push(path);
        }
    }
    Ok(())
}

#[test]
fn test_workspace_follows_naming_conventions() {
    let mut checker = NamingChecker::default();
    for file in workspace_sources().unwrap() {
        checker.check_file(&file).unwrap();
    }

    assert!(checker.files_checked > 10, "workspace scan found too few files");
    assert!(
        checker.violations.is_empty(),
        "naming violations:\n{}",
        checker
            .violations
            .iter()
            .map(|v| format!("{}:{} - {}", v.file_path, v.line_number, v.message))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

#[test]
fn test_checker_flags_banned_names() {
    let mut checker = NamingChecker::default();
    let code = r#"
pub struct SearchService;
struct CacheManager {}
pub trait EventHandler {}
impl Thing {
    pub fn get_artist(&self) {}
    async fn handle_event(&self) {}
    fn artist(&self) {}
}
"#;

    checker.check_function_prefixes(Path::new("sample.rs"), code);
    checker.check_type_naming(Path::new("sample.rs"), code);
    checker.check_module_name(Path::new("src/utils.rs"));

    let messages: Vec<&str> = checker.violations.iter().map(|v| v.message.as_str()).collect();
    assert_eq!(messages.len(), 5, "{messages:?}");
    assert!(messages.iter().any(|m| m.contains("SearchService")));
    assert!(messages.iter().any(|m| m.contains("CacheManager")));
    assert!(!messages.iter().any(|m| m.contains("EventHandler")));
    assert!(messages.iter().any(|m| m.contains("get_")));
    assert!(messages.iter().any(|m| m.contains("handle_")));
    assert!(messages.iter().any(|m| m.contains("utils")));
}
