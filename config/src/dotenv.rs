//! `.env` reader. Produces a map; applying it to the environment happens in the crate root.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

fn dotenv_path(override_dir: Option<&Path>) -> Option<PathBuf> {
    let dir = match override_dir {
        Some(d) => d.to_path_buf(),
        None => std::env::current_dir().ok()?,
    };
    let path = dir.join(".env");
    path.is_file().then_some(path)
}

fn unquote(raw: &str) -> String {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return raw[1..raw.len() - 1].replace("\\\"", "\"").replace("\\n", "\n");
    }
    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        return raw[1..raw.len() - 1].to_string();
    }
    // unquoted: ` #` starts a trailing comment
    match raw.find(" #") {
        Some(idx) => raw[..idx].trim_end().to_string(),
        None => raw.to_string(),
    }
}

/// `KEY=VALUE` lines with optional `export ` prefix. Blank lines and `#` lines are
/// skipped, as are lines without `=` or with an empty key.
pub(crate) fn parse_dotenv(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), unquote(value.trim())))
        })
        .collect()
}

/// Loads `.env` from `override_dir` or the current directory. A missing file is an
/// empty map.
pub fn load_env_map(override_dir: Option<&Path>) -> std::io::Result<HashMap<String, String>> {
    match dotenv_path(override_dir) {
        Some(path) => Ok(parse_dotenv(&std::fs::read_to_string(path)?)),
        None => Ok(HashMap::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_and_exported_pairs() {
        let m = parse_dotenv("OPENAI_MODEL=gpt-4o\nexport LINKPOST_DB=/tmp/lp.db\n");
        assert_eq!(m.get("OPENAI_MODEL").map(String::as_str), Some("gpt-4o"));
        assert_eq!(m.get("LINKPOST_DB").map(String::as_str), Some("/tmp/lp.db"));
    }

    #[test]
    fn comments_blank_and_malformed_lines_skipped() {
        let m = parse_dotenv("\n# comment\nNO_EQUALS\n=orphan\nKEY=val # trailing\n");
        assert_eq!(m.len(), 1);
        assert_eq!(m.get("KEY").map(String::as_str), Some("val"));
    }

    #[test]
    fn quoting() {
        let m = parse_dotenv(
            "A=\"hello # world\"\nB='single # kept'\nC=\"say \\\"hi\\\"\"\nD=\nE=\"\"\n",
        );
        assert_eq!(m.get("A").map(String::as_str), Some("hello # world"));
        assert_eq!(m.get("B").map(String::as_str), Some("single # kept"));
        assert_eq!(m.get("C").map(String::as_str), Some("say \"hi\""));
        assert_eq!(m.get("D").map(String::as_str), Some(""));
        assert_eq!(m.get("E").map(String::as_str), Some(""));
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_env_map(Some(dir.path())).unwrap().is_empty());
    }

    #[test]
    fn reads_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "A=1\nB=2\n").unwrap();
        let m = load_env_map(Some(dir.path())).unwrap();
        assert_eq!(m.len(), 2);
    }
}
