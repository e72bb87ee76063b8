use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// One usage entry lifted out of a session log line. Ephemeral: consumed
/// by the aggregator and never retained.
#[derive(Debug, Clone)]
pub struct RawEntry {
    pub timestamp: Option<Timestamp>,
    pub model: Option<String>,
    pub usage: Option<RawUsage>,
}

/// Session logs carry either epoch timestamps or ISO date-time strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Numeric(f64),
    Text(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub cache_read_input_tokens: u64,
    #[serde(default)]
    pub cache_creation_input_tokens: u64,
}

// ── Session JSONL shape ───────────────────────────────────────────────

#[derive(Deserialize)]
struct SessionLine {
    timestamp: Option<Timestamp>,
    message: Option<SessionMessage>,
}

#[derive(Deserialize)]
struct SessionMessage {
    model: Option<String>,
    usage: Option<RawUsage>,
}

// ── Discovery ─────────────────────────────────────────────────────────

/// Roots that may hold a `projects/` directory of session logs.
fn session_roots(extra_roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = Vec::new();

    if let Some(home) = dirs::home_dir() {
        roots.push(home.join(".claude"));
    }
    if let Ok(config_dir) = std::env::var("CLAUDE_CONFIG_DIR") {
        roots.push(PathBuf::from(config_dir));
    }
    if let Some(config_home) = dirs::config_dir() {
        roots.push(config_home.join("claude"));
    }
    roots.extend(extra_roots.iter().cloned());

    roots
}

/// Collect `projects/*/*.jsonl` under every session root.
pub fn discover_session_files(extra_roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    for root in session_roots(extra_roots) {
        collect_project_files(&root, &mut files);
    }
    files
}

fn collect_project_files(root: &Path, files: &mut Vec<PathBuf>) {
    let projects_dir = root.join("projects");
    if !projects_dir.is_dir() {
        return;
    }
    let projects = match std::fs::read_dir(&projects_dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };
    for project_entry in projects.flatten() {
        let project_path = project_entry.path();
        if !project_path.is_dir() {
            continue;
        }
        if let Ok(entries) = std::fs::read_dir(&project_path) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("jsonl") {
                    files.push(path);
                }
            }
        }
    }
}

// ── Parsing ───────────────────────────────────────────────────────────

/// Fast check: can this line carry a usage payload at all?
fn is_candidate_line(line: &str) -> bool {
    line.contains("\"usage\"")
}

/// Parse one session file into raw entries. Malformed lines are dropped.
fn parse_session_file(path: &Path) -> Result<Vec<RawEntry>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = std::io::BufReader::new(file);

    let mut entries: Vec<RawEntry> = Vec::new();
    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        let line = line.trim();
        if line.is_empty() || !is_candidate_line(line) {
            continue;
        }

        let parsed: SessionLine = match serde_json::from_str(line) {
            Ok(p) => p,
            Err(_) => continue,
        };

        let (model, usage) = match parsed.message {
            Some(message) => (message.model, message.usage),
            None => (None, None),
        };

        entries.push(RawEntry {
            timestamp: parsed.timestamp,
            model,
            usage,
        });
    }

    Ok(entries)
}

/// Read every discoverable entry. Unreadable files are skipped.
pub fn read_entries(files: &[PathBuf]) -> Vec<RawEntry> {
    let mut entries: Vec<RawEntry> = Vec::new();
    for path in files {
        match parse_session_file(path) {
            Ok(parsed) => entries.extend(parsed),
            Err(_) => continue,
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn candidate_check() {
        assert!(is_candidate_line(r#"{"message":{"usage":{"input_tokens":1}}}"#));
        assert!(!is_candidate_line(r#"{"type":"user","message":{"content":"hi"}}"#));
    }

    #[test]
    fn parse_session_file_flattens_entries() {
        let dir = std::env::temp_dir().join("ccl_test_reader_parse");
        let _ = std::fs::create_dir_all(&dir);
        let file_path = dir.join("session.jsonl");

        let mut f = std::fs::File::create(&file_path).unwrap();
        writeln!(f, r#"{{"timestamp":"2026-01-05T10:00:00Z","message":{{"model":"claude-sonnet-4-5","usage":{{"input_tokens":1000,"output_tokens":200,"cache_read_input_tokens":500,"cache_creation_input_tokens":50}}}}}}"#).unwrap();
        writeln!(f, r#"{{"type":"user","message":{{"content":"hello"}}}}"#).unwrap();
        writeln!(f, "not json at all with \"usage\" inside").unwrap();
        writeln!(f, r#"{{"timestamp":1700000000000,"message":{{"model":"claude-haiku-3-5","usage":{{"input_tokens":10}}}}}}"#).unwrap();
        drop(f);

        let entries = parse_session_file(&file_path).unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.model.as_deref(), Some("claude-sonnet-4-5"));
        let usage = first.usage.as_ref().unwrap();
        assert_eq!(usage.input_tokens, 1000);
        assert_eq!(usage.cache_read_input_tokens, 500);

        let second = &entries[1];
        assert!(matches!(second.timestamp, Some(Timestamp::Numeric(_))));
        assert_eq!(second.usage.as_ref().unwrap().output_tokens, 0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_usage_fields_default_to_zero() {
        let usage: RawUsage = serde_json::from_str(r#"{"input_tokens": 42}"#).unwrap();
        assert_eq!(usage.input_tokens, 42);
        assert_eq!(usage.output_tokens, 0);
        assert_eq!(usage.cache_read_input_tokens, 0);
        assert_eq!(usage.cache_creation_input_tokens, 0);
    }

    #[test]
    fn timestamp_deserializes_both_shapes() {
        let numeric: Timestamp = serde_json::from_str("1700000000").unwrap();
        assert!(matches!(numeric, Timestamp::Numeric(v) if (v - 1_700_000_000.0).abs() < 1e-3));
        let text: Timestamp = serde_json::from_str(r#""2026-01-05T10:00:00Z""#).unwrap();
        assert!(matches!(text, Timestamp::Text(s) if s.starts_with("2026-01-05")));
    }

    #[test]
    fn discover_finds_project_jsonl_only() {
        let root = std::env::temp_dir().join("ccl_test_reader_discover");
        let _ = std::fs::remove_dir_all(&root);

        let project = root.join("projects").join("proj-abc");
        std::fs::create_dir_all(&project).unwrap();
        std::fs::File::create(project.join("aaaa-bbbb.jsonl")).unwrap();
        std::fs::File::create(project.join("notes.md")).unwrap();
        // Files directly under projects/ are not session logs.
        std::fs::File::create(root.join("projects").join("stray.jsonl")).unwrap();

        let mut files: Vec<PathBuf> = Vec::new();
        collect_project_files(&root, &mut files);

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("aaaa-bbbb.jsonl"));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn read_entries_skips_unreadable_files() {
        let missing = std::env::temp_dir().join("ccl_test_reader_missing.jsonl");
        let entries = read_entries(&[missing]);
        assert!(entries.is_empty());
    }
}
