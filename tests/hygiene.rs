//! Hygiene — source-level rules checked at test time.
//!
//! Scans `src/` (test files excluded) for patterns that crash the wasm module
//! or silently drop errors, and checks that browser bindings stay inside
//! `src/browser/`. Each budget is a ceiling; lower it when a hit is removed,
//! never raise it.

use std::fs;
use std::path::Path;

/// (pattern, budget, why it is rationed)
const BUDGETS: &[(&str, usize, &str)] = &[
    (".unwrap()", 0, "panics abort the wasm module"),
    (".expect(", 0, "panics abort the wasm module"),
    ("panic!(", 0, "panics abort the wasm module"),
    ("unreachable!(", 0, "panics abort the wasm module"),
    ("todo!(", 0, "stubs must not ship"),
    ("unimplemented!(", 0, "stubs must not ship"),
    ("let _ =", 0, "log ignored errors instead of discarding them"),
    (".ok()", 0, "log ignored errors instead of discarding them"),
    ("#[allow(dead_code)]", 0, "delete unused code"),
];

/// Markers of browser-only bindings.
const BROWSER_MARKERS: &[&str] = &["web_sys", "wasm_bindgen", "js_sys", "gloo_"];

struct SourceFile {
    path: String,
    content: String,
}

fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(Path::new("src"), &mut files);
    files
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
            continue;
        }
        let path_str = path.to_string_lossy().replace('\\', "/");
        if !path_str.ends_with(".rs") || path_str.ends_with("_test.rs") {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path) {
            out.push(SourceFile { path: path_str, content });
        }
    }
}

fn hits(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|file| {
            let count = file.content.lines().filter(|line| line.contains(pattern)).count();
            (count > 0).then(|| (file.path.clone(), count))
        })
        .collect()
}

fn format_hits(hits: &[(String, usize)]) -> String {
    hits.iter()
        .map(|(path, count)| format!("  {path}: {count}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn sources_are_found() {
    let files = source_files();
    assert!(files.iter().any(|f| f.path.ends_with("src/lib.rs")), "run from the crate root");
}

#[test]
fn pattern_budgets() {
    let files = source_files();
    let mut failures = Vec::new();
    for (pattern, budget, why) in BUDGETS {
        let found = hits(&files, pattern);
        let count: usize = found.iter().map(|(_, c)| c).sum();
        if count > *budget {
            failures.push(format!("{pattern} budget exceeded ({why}): found {count}, max {budget}\n{}", format_hits(&found)));
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn browser_bindings_stay_in_browser_module() {
    let files: Vec<SourceFile> =
        source_files().into_iter().filter(|f| !f.path.contains("src/browser/")).collect();
    let mut leaks = Vec::new();
    for marker in BROWSER_MARKERS {
        leaks.extend(hits(&files, marker).into_iter().map(|(path, count)| (format!("{path} ({marker})"), count)));
    }
    assert!(
        leaks.is_empty(),
        "browser bindings outside src/browser/ break native tests:\n{}",
        format_hits(&leaks)
    );
}
