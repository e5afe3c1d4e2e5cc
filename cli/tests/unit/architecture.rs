//! Structural tests for architectural boundary enforcement.
//!
//! These tests scan source files to verify that the layer boundaries
//! (domain, application, infra, commands) are kept.

use std::path::{Path, PathBuf};

/// Collect all `.rs` files under a directory recursively.
fn collect_rs_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(collect_rs_files(&path));
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                files.push(path);
            }
        }
    }
    files
}

/// Track brace depth and return whether a line is inside a `#[cfg(test)]` block.
struct CfgTestTracker {
    in_test_block: bool,
    brace_depth: i32,
    test_block_start_depth: i32,
}

impl CfgTestTracker {
    fn new() -> Self {
        Self {
            in_test_block: false,
            brace_depth: 0,
            test_block_start_depth: 0,
        }
    }

    /// Process a line and return `true` if it's inside a `#[cfg(test)]` block.
    fn process_line(&mut self, line: &str) -> bool {
        let trimmed = line.trim();
        if trimmed.contains("#[cfg(test)]") {
            self.in_test_block = true;
            self.test_block_start_depth = self.brace_depth;
        }
        for ch in line.chars() {
            match ch {
                '{' => self.brace_depth += 1,
                '}' => {
                    self.brace_depth -= 1;
                    if self.in_test_block && self.brace_depth <= self.test_block_start_depth {
                        self.in_test_block = false;
                    }
                }
                _ => {}
            }
        }
        self.in_test_block
    }
}

fn layer_dir(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src").join(name)
}

fn relative(file: &Path) -> String {
    file.strip_prefix(env!("CARGO_MANIFEST_DIR"))
        .unwrap_or(file)
        .display()
        .to_string()
}

/// Report every non-comment line outside `#[cfg(test)]` that contains one of
/// `forbidden`. `target` may be a directory or a single file.
fn production_violations(target: &Path, forbidden: &[&str]) -> Vec<String> {
    let files = if target.is_file() {
        vec![target.to_path_buf()]
    } else {
        collect_rs_files(target)
    };
    assert!(!files.is_empty(), "no sources found under {}", target.display());
    let mut violations = Vec::new();
    for file in files {
        let Ok(content) = std::fs::read_to_string(&file) else {
            continue;
        };
        let rel = relative(&file);
        let mut tracker = CfgTestTracker::new();
        for (i, line) in content.lines().enumerate() {
            let in_test = tracker.process_line(line);
            let trimmed = line.trim();
            if in_test || trimmed.starts_with("//") {
                continue;
            }
            if let Some(pattern) = forbidden.iter().find(|p| line.contains(*p)) {
                violations.push(format!("{rel}:{}: `{pattern}`: {line}", i + 1));
            }
        }
    }
    violations
}

// ── Domain layer is pure ──────────────────────────────────────────────────────

#[test]
fn domain_has_no_io_or_outer_layer_imports() {
    let violations = production_violations(
        &layer_dir("domain"),
        &[
            "crate::infra",
            "crate::application",
            "crate::commands",
            "crate::output",
            "tokio",
            "std::fs",
            "std::net",
            "std::process",
        ],
    );
    assert!(
        violations.is_empty(),
        "domain/ must stay free of I/O and outer layers:\n{}",
        violations.join("\n")
    );
}

// ── Application layer boundary ───────────────────────────────────────────────

/// application/ must not import from infra/ or output/ layers.
#[test]
fn application_has_no_infra_or_output_imports() {
    let violations = production_violations(
        &layer_dir("application"),
        &["crate::infra", "crate::output", "crate::commands", "std::fs"],
    );
    assert!(
        violations.is_empty(),
        "application/ must not import from infra/ or output/:\n{}",
        violations.join("\n")
    );
}

/// Network calls never happen while the state lock is held.
#[test]
fn agent_state_does_not_touch_the_network() {
    let violations = production_violations(
        &layer_dir("application").join("state.rs"),
        &["SyncClient", ".await", "ureq"],
    );
    assert!(
        violations.is_empty(),
        "AgentState must only perform local file operations:\n{}",
        violations.join("\n")
    );
}

// ── Infra layer boundary ─────────────────────────────────────────────────────

#[test]
fn infra_has_no_imports_from_commands_or_output() {
    let violations =
        production_violations(&layer_dir("infra"), &["crate::commands", "crate::output"]);
    assert!(
        violations.is_empty(),
        "infra/ must not import from commands/ or output/:\n{}",
        violations.join("\n")
    );
}

#[test]
fn infra_has_no_print_macros_outside_tests() {
    let violations = production_violations(&layer_dir("infra"), &["println!", "eprintln!"]);
    assert!(
        violations.is_empty(),
        "infra/ must not use println!/eprintln! outside #[cfg(test)]:\n{}",
        violations.join("\n")
    );
}

// ── Blocking I/O safety ──────────────────────────────────────────────────────

/// Track whether a line is inside an async fn and outside `spawn_blocking`.
struct AsyncContextTracker {
    in_async_fn: bool,
    in_spawn_blocking: bool,
    brace_depth: i32,
    async_fn_start_depth: i32,
    spawn_blocking_start_depth: i32,
}

impl AsyncContextTracker {
    fn new() -> Self {
        Self {
            in_async_fn: false,
            in_spawn_blocking: false,
            brace_depth: 0,
            async_fn_start_depth: 0,
            spawn_blocking_start_depth: 0,
        }
    }

    /// Returns `true` if the line is in an async fn but not in `spawn_blocking`.
    fn process_line(&mut self, line: &str) -> bool {
        let trimmed = line.trim();
        if trimmed.contains("async fn ") && !trimmed.starts_with("//") {
            self.in_async_fn = true;
            self.async_fn_start_depth = self.brace_depth;
        } else if trimmed.contains("fn ") && !trimmed.starts_with("//") {
            self.in_async_fn = false;
            self.in_spawn_blocking = false;
        }
        if self.in_async_fn && line.contains("spawn_blocking") {
            self.in_spawn_blocking = true;
            self.spawn_blocking_start_depth = self.brace_depth;
        }
        let guarded = self.in_spawn_blocking;
        for ch in line.chars() {
            match ch {
                '{' => self.brace_depth += 1,
                '}' => {
                    self.brace_depth -= 1;
                    if self.in_spawn_blocking && self.brace_depth <= self.spawn_blocking_start_depth
                    {
                        self.in_spawn_blocking = false;
                    }
                    if self.in_async_fn && self.brace_depth <= self.async_fn_start_depth {
                        self.in_async_fn = false;
                    }
                }
                _ => {}
            }
        }
        // A brace-less `spawn_blocking(...)` call ends with its statement.
        if self.in_spawn_blocking
            && trimmed.ends_with(';')
            && self.brace_depth <= self.spawn_blocking_start_depth
        {
            self.in_spawn_blocking = false;
        }
        self.in_async_fn && !guarded
    }
}

/// State file reads and writes from async code go through `spawn_blocking`.
#[test]
fn async_code_does_not_touch_state_file_directly() {
    let patterns = [".load()", ".save()", ".reset()", ".reset_identity()"];
    let mut violations = Vec::new();
    for layer in ["commands", "application"] {
        for file in collect_rs_files(&layer_dir(layer)) {
            let Ok(content) = std::fs::read_to_string(&file) else {
                continue;
            };
            let rel = relative(&file);
            let mut cfg_test = CfgTestTracker::new();
            let mut tracker = AsyncContextTracker::new();
            for (i, line) in content.lines().enumerate() {
                let in_test = cfg_test.process_line(line);
                let unguarded = tracker.process_line(line);
                if in_test || !unguarded || line.trim().starts_with("//") {
                    continue;
                }
                if patterns.iter().any(|p| line.contains(p)) {
                    violations.push(format!("{rel}:{}: {line}", i + 1));
                }
            }
        }
    }
    assert!(
        violations.is_empty(),
        "state file I/O in async fn outside spawn_blocking:\n{}",
        violations.join("\n")
    );
}

// ── Commands ─────────────────────────────────────────────────────────────────

#[test]
fn commands_use_standardized_confirmation() {
    let violations = production_violations(&layer_dir("commands"), &["dialoguer::"]);
    assert!(
        violations.is_empty(),
        "Commands must use app.confirm() for user prompts:\n{}",
        violations.join("\n")
    );
}

/// No module-level `#![allow(dead_code)]` in the layered modules.
#[test]
fn no_module_level_dead_code_allows_in_layers() {
    let mut violations = Vec::new();
    for layer in ["domain", "application", "infra"] {
        violations.extend(production_violations(
            &layer_dir(layer),
            &["#![allow(dead_code)]"],
        ));
    }
    assert!(
        violations.is_empty(),
        "Found module-level dead_code allows:\n{}",
        violations.join("\n")
    );
}
