//! Line-oriented input files: tokens, repository names and logins.

use std::path::Path;

/// Trimmed, non-empty lines that do not start with `#`.
pub fn parse_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Read one token per line.
pub fn read_tokens(path: &Path) -> std::io::Result<Vec<String>> {
    Ok(parse_lines(&std::fs::read_to_string(path)?))
}

/// Read one `owner/name` per line.
pub fn read_repository_names(path: &Path) -> std::io::Result<Vec<String>> {
    let names = parse_lines(&std::fs::read_to_string(path)?);
    for name in names.iter().filter(|n| !n.contains('/')) {
        tracing::warn!(path = %path.display(), entry = %name, "Entry is not in owner/name form");
    }
    Ok(names)
}

/// Read one login per line, e.g. invite candidates.
pub fn read_logins(path: &Path) -> std::io::Result<Vec<String>> {
    Ok(parse_lines(&std::fs::read_to_string(path)?))
}
