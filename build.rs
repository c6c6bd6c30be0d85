// Build script - reads config.yaml at compile time and generates defaults
// This allows changing defaults during development without editing source code

use std::env;
use std::fs;
use std::path::Path;

fn main() {
    // Tell Cargo to rerun if config.yaml changes
    println!("cargo:rerun-if-changed=src/config.yaml");

    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("compiled_config.rs");

    // Try to read config.yaml from src/, fall back to hardcoded defaults if not found
    let config = if Path::new("src/config.yaml").exists() {
        let content = fs::read_to_string("src/config.yaml")
            .expect("Failed to read src/config.yaml");
        parse_config(&content)
    } else {
        CompiledConfig::default()
    };

    let generated = format!(
        r#"// Auto-generated from config.yaml at compile time
// Do not edit - modify config.yaml and rebuild instead

pub const INTERVAL_SECS: u64 = {interval_secs};
pub const CHUNK_SIZE: usize = {chunk_size};
pub const CONTINUE_ON_ERROR: bool = {continue_on_error};
pub const MIRROR_STDOUT: bool = {mirror_stdout};
pub const LOG_FILTER: &str = "{log_filter}";
"#,
        interval_secs = config.interval_secs,
        chunk_size = config.chunk_size,
        continue_on_error = config.continue_on_error,
        mirror_stdout = config.mirror_stdout,
        log_filter = config.log_filter,
    );

    fs::write(&dest_path, generated).expect("Failed to write compiled config");
}

struct CompiledConfig {
    interval_secs: u64,
    chunk_size: usize,
    continue_on_error: bool,
    mirror_stdout: bool,
    log_filter: String,
}

impl Default for CompiledConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            chunk_size: 4096,
            continue_on_error: false,
            mirror_stdout: true,
            log_filter: "warn".to_string(),
        }
    }
}

fn parse_config(content: &str) -> CompiledConfig {
    let mut config = CompiledConfig::default();

    // Simple YAML parsing (avoiding external dependencies in build script)
    let mut in_sync = false;
    let mut in_logging = false;

    for line in content.lines() {
        let trimmed = line.trim();

        // Track which section we're in
        if trimmed.starts_with("sync:") {
            in_sync = true;
            in_logging = false;
            continue;
        } else if trimmed.starts_with("logging:") {
            in_sync = false;
            in_logging = true;
            continue;
        }

        if let Some((key, value)) = parse_kv(trimmed) {
            if in_sync {
                match key {
                    "interval_secs" => {
                        config.interval_secs = value.parse::<u64>().ok().filter(|v| *v > 0).unwrap_or(60)
                    }
                    "chunk_size" => {
                        config.chunk_size = value.parse::<usize>().ok().filter(|v| *v > 0).unwrap_or(4096)
                    }
                    "continue_on_error" => config.continue_on_error = parse_bool(value),
                    _ => {}
                }
            } else if in_logging {
                match key {
                    "mirror_stdout" => config.mirror_stdout = parse_bool(value),
                    "filter" => config.log_filter = value.trim_matches('"').to_string(),
                    _ => {}
                }
            }
        }
    }

    config
}

fn parse_kv(line: &str) -> Option<(&str, &str)> {
    // Skip comments and empty lines
    if line.starts_with('#') || line.is_empty() {
        return None;
    }

    let colon_pos = line.find(':')?;
    let key = line[..colon_pos].trim();
    let mut value = line[colon_pos + 1..].trim();

    // Remove inline comments
    if let Some(comment_pos) = value.find(" #") {
        value = value[..comment_pos].trim();
    }

    // Skip if value is empty (section header)
    if value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn parse_bool(s: &str) -> bool {
    matches!(s.to_lowercase().as_str(), "true" | "yes" | "1")
}
