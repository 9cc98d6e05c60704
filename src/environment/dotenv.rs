//! `.env` file loading.
//!
//! Files are parsed with `dotenvy` but never applied to the process
//! environment; the pairs are layered into an explicit map instead.

use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Dotenv files read from the project root, in load order.
pub const DOTENV_FILES: [&str; 2] = [".env", ".env.local"];

/// Parse a dotenv file into key/value pairs.
///
/// A missing file yields no pairs. Lines that cannot be parsed are skipped.
pub fn read_dotenv(path: &Path) -> Vec<(String, String)> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(e) => {
            if path.exists() {
                warn!("Could not read {}: {}", path.display(), e);
            }
            return Vec::new();
        }
    };

    let mut pairs = Vec::new();
    for item in iter {
        match item {
            Ok(pair) => pairs.push(pair),
            Err(e) => warn!("Skipping invalid line in {}: {}", path.display(), e),
        }
    }

    debug!("Loaded {} variables from {}", pairs.len(), path.display());
    pairs
}

/// Layer the project's dotenv files onto `env` without overriding.
///
/// A key already present in `env`, whether from the base environment or
/// an earlier file, keeps its value. `.env` therefore wins over
/// `.env.local`.
pub fn apply_dotenv_files(env: &mut BTreeMap<String, String>, root: &Path) {
    for name in DOTENV_FILES {
        for (key, value) in read_dotenv(&root.join(name)) {
            env.entry(key).or_insert(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_nothing() {
        let temp = TempDir::new().unwrap();
        assert!(read_dotenv(&temp.path().join(".env")).is_empty());
    }

    #[test]
    fn parses_quotes_and_comments() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".env");
        fs::write(
            &path,
            "# database\nDATABASE_URL=postgres://localhost/db\nGREETING=\"hello world\"\n",
        )
        .unwrap();

        let pairs = read_dotenv(&path);

        assert!(pairs.contains(&(
            "DATABASE_URL".to_string(),
            "postgres://localhost/db".to_string()
        )));
        assert!(pairs.contains(&("GREETING".to_string(), "hello world".to_string())));
    }

    #[test]
    fn first_file_wins() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".env"), "A=1\n").unwrap();
        fs::write(temp.path().join(".env.local"), "A=2\nB=3\n").unwrap();

        let mut env = BTreeMap::new();
        apply_dotenv_files(&mut env, temp.path());

        assert_eq!(env.get("A").map(String::as_str), Some("1"));
        assert_eq!(env.get("B").map(String::as_str), Some("3"));
    }

    #[test]
    fn existing_variables_are_not_overridden() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".env"), "HOME=/nowhere\n").unwrap();

        let mut env = BTreeMap::new();
        env.insert("HOME".to_string(), "/home/dev".to_string());
        apply_dotenv_files(&mut env, temp.path());

        assert_eq!(env.get("HOME").map(String::as_str), Some("/home/dev"));
    }
}
