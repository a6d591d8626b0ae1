//! Static metadata collection
//!
//! Call and import collection happens inside each language adapter (it needs
//! the language's node kinds); this module owns the pieces shared across
//! languages: deterministic ordering of collected names and the revision
//! history query against version control.
//!
//! The changelog query is a synchronous `git log -L` subprocess scoped to the
//! declaration's line range. Only stdout lines matching the strict
//! `- YYYY-MM-DD: message (short-id)` pattern are retained; diff bodies and
//! anything else git prints are discarded so the output stays deterministic
//! and never leaks into narrative content.

use crate::docblock::ChangelogEntry;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;

/// Default bound on the number of revisions requested from version control.
pub const DEFAULT_MAX_REVISIONS: usize = 5;

fn changelog_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^- (\d{4}-\d{2}-\d{2}): (.+) \(([0-9a-f]{7,40})\)$").expect("valid regex")
    })
}

/// Parse one stdout line against the strict changelog pattern.
pub fn parse_changelog_line(line: &str) -> Option<ChangelogEntry> {
    let captures = changelog_pattern().captures(line.trim_end())?;
    Some(ChangelogEntry::Revision {
        date: captures[1].to_string(),
        message: captures[2].to_string(),
        short_id: captures[3].to_string(),
    })
}

/// Filter raw `git log` stdout down to changelog entries, keeping at most
/// `max` and dropping everything that does not match the pattern.
pub fn filter_changelog_output(stdout: &str, max: usize) -> Vec<ChangelogEntry> {
    stdout
        .lines()
        .filter_map(parse_changelog_line)
        .take(max)
        .collect()
}

/// Query version control for the most recent revisions touching
/// `start..=end` of `path`, bounded by `max`.
///
/// Returns the `Unavailable` sentinel when git cannot be invoked or exits
/// with failure, so callers can distinguish "checked, found nothing" (an
/// empty list) from "not checked".
pub fn collect_changelog(path: &Path, start: u32, end: u32, max: usize) -> Vec<ChangelogEntry> {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return vec![ChangelogEntry::Unavailable];
    };
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());

    let mut command = Command::new("git");
    command
        .arg("log")
        .arg(format!("-L{start},{end}:{file_name}"))
        .arg("-n")
        .arg(max.to_string())
        .arg("--date=short")
        .arg("--format=- %ad: %s (%h)");
    if let Some(dir) = dir {
        command.current_dir(dir);
    }

    match command.output() {
        Ok(output) if output.status.success() => {
            // Changelog output is non-critical; decode best-effort.
            let stdout = String::from_utf8_lossy(&output.stdout);
            filter_changelog_output(&stdout, max)
        }
        _ => vec![ChangelogEntry::Unavailable],
    }
}

/// Collapse collected names into sorted, deduplicated order. Metadata must
/// be byte-identical across runs for a fixed source tree, regardless of
/// traversal order.
pub fn deterministic(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let set: BTreeSet<String> = names.into_iter().filter(|n| !n.is_empty()).collect();
    set.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_line_parses() {
        let entry = parse_changelog_line("- 2024-03-01: fix span math (deadbee)").unwrap();
        assert_eq!(
            entry,
            ChangelogEntry::Revision {
                date: "2024-03-01".to_string(),
                message: "fix span math".to_string(),
                short_id: "deadbee".to_string(),
            }
        );
    }

    #[test]
    fn non_matching_lines_are_discarded() {
        assert!(parse_changelog_line("commit deadbeef").is_none());
        assert!(parse_changelog_line("- March 1: no iso date (abc1234)").is_none());
        assert!(parse_changelog_line("- 2024-03-01: missing id").is_none());
        assert!(parse_changelog_line("+++ b/file.py").is_none());
    }

    #[test]
    fn filter_drops_diff_bodies_and_bounds_count() {
        let stdout = "\
- 2024-03-02: second (abc1234)
diff --git a/f b/f
@@ -1,2 +1,2 @@
- 2024-03-01: first (def5678)
- 2024-02-01: third (aaa1111)
";
        let entries = filter_changelog_output(stdout, 2);
        assert_eq!(entries.len(), 2);
        assert!(matches!(
            &entries[0],
            ChangelogEntry::Revision { short_id, .. } if short_id == "abc1234"
        ));
    }

    #[test]
    fn unavailable_outside_a_repository() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orphan.py");
        std::fs::write(&path, "x = 1\n").unwrap();
        let entries = collect_changelog(&path, 1, 1, DEFAULT_MAX_REVISIONS);
        assert_eq!(entries, vec![ChangelogEntry::Unavailable]);
    }

    #[test]
    fn deterministic_sorts_and_dedupes() {
        let names = vec![
            "b".to_string(),
            "a".to_string(),
            "b".to_string(),
            String::new(),
        ];
        assert_eq!(deterministic(names), vec!["a".to_string(), "b".to_string()]);
    }
}
