//! Classpath mining over raw process-listing text.
//!
//! A `jps -l -v` line is a pid followed by a soup of JVM arguments with no
//! firm grammar: `-Dkey=value` values may contain spaces, classpaths mix
//! separators, and agents embed jar paths inside `-javaagent:` tokens. The
//! extractors over-approximate on purpose; a spurious candidate costs one
//! cheap rejection in the inspector, a missed one costs a blind spot. The
//! exact patterns and the split-before-tokenize strategy are behavioral
//! contracts, not implementation detail.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Parameter boundary (`-Dkey=`, `-Xmx`, `-XX:...`); lines are split on
/// these so a value with embedded spaces stays attached to its parameter.
static JAVA_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-[A-Z:]+(?:\w+\.*)+[=:]*").expect("java parameter pattern"));

/// `-javaagent:<jar>=<port>:` prefix; whatever trails it is a path of its
/// own and must not stay glued to the agent jar.
static JAVA_AGENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-javaagent:.*?=\d+:").expect("javaagent pattern"));

/// Path shape: optional drive letter, then one or more separator+word runs.
static DIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:[a-zA-Z]:)?(?:[\\/][\w.\-]+)+").expect("dir pattern"));

/// Conservative jar shape: absolute or relative POSIX-style path ending in
/// a known archive extension.
static JAR_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\.?/\w+.*?.[jwe]ar)|(?:\w+/\w+.*?.[jwe]ar)").expect("jar path pattern")
});

/// Loose fallback: any run of path-ish characters (backslashes and an
/// optional drive letter included) ending in a known archive extension.
static JAR_LOOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:[a-zA-Z]:)?[\w.^\\/-]+.[jwe]ar").expect("loose jar pattern"));

/// Extracts jar/war/ear path candidates from process-listing lines.
///
/// Both patterns are applied to every line and their matches unioned.
pub fn extract_jar_paths(lines: &[String]) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    for line in lines {
        let line = line.replace("-javaagent:", "");
        for m in JAR_PATH_RE.find_iter(&line) {
            insert_trimmed(&mut found, m.as_str());
        }
        for m in JAR_LOOSE_RE.find_iter(&line) {
            insert_trimmed(&mut found, m.as_str());
        }
    }
    found
}

/// Extracts directory path candidates from process-listing lines.
///
/// Splits on parameter boundaries rather than whitespace, then keeps every
/// segment that contains a path-shaped substring. Segments are kept whole
/// so values with embedded spaces survive intact.
pub fn extract_dir_paths(lines: &[String]) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    for line in lines {
        for segment in JAVA_PARAM_RE.split(line) {
            let mut candidate = segment;
            if JAVA_AGENT_RE.is_match(candidate) {
                let parts: Vec<&str> = JAVA_AGENT_RE.split(candidate).collect();
                if parts.len() > 1 {
                    candidate = parts[parts.len() - 1];
                }
            }
            if DIR_RE.is_match(candidate) {
                insert_trimmed(&mut found, candidate);
            }
        }
    }
    found
}

fn insert_trimmed(found: &mut BTreeSet<String>, raw: &str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        found.insert(trimmed.to_string());
    }
}
