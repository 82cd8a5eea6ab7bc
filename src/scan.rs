use log::info;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::inspect::Inspector;
use crate::report::ScanSummary;
use crate::walk::{ExclusionSet, find_archives};

/// Collects every archive file reachable from `targets`, deduplicated so
/// each candidate is inspected exactly once even when a jar is both named
/// directly and discovered under a target directory.
pub fn collect_archives(targets: &[PathBuf], excludes: &ExclusionSet) -> Vec<PathBuf> {
    let mut unique = BTreeSet::new();
    for target in targets {
        unique.extend(find_archives(target, excludes));
    }
    unique.into_iter().collect()
}

/// Runs one full scan: discovery, parallel inspection, aggregation.
///
/// Archives are independent, so inspection fans out over the rayon pool
/// with no ordering requirement; the scan always completes over all
/// discovered archives regardless of what any one verdict says.
pub fn run_scan(targets: &[PathBuf], excludes: &ExclusionSet, inspector: &Inspector) -> ScanSummary {
    let archives = collect_archives(targets, excludes);
    info!(
        "inspecting {} archive(s) from {} target(s)",
        archives.len(),
        targets.len()
    );

    let reports: Vec<_> = archives
        .par_iter()
        .map(|path| inspector.inspect_path(path))
        .collect();
    ScanSummary::from_reports(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Verdict;
    use crate::signatures::FingerprintDb;
    use sha2::{Digest, Sha256};
    use std::collections::HashMap;
    use std::io::Write;
    use std::path::Path;
    use std::time::{SystemTime, UNIX_EPOCH};
    use zip::write::FileOptions;

    const LOOKUP_ENTRY: &str = "org/apache/logging/log4j/core/lookup/JndiLookup.class";
    const VULN_BYTES: &[u8] = b"\xca\xfe\xba\xbe vulnerable lookup build";

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "log4j_scout_scan_{}_{}_{}",
            std::process::id(),
            nanos,
            name
        ))
    }

    fn write_jar(path: &Path, entries: &[(&str, &[u8])]) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        let file = std::fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for (name, content) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap();
    }

    fn test_inspector() -> Inspector {
        let mut vulnerable = HashMap::new();
        let mut hasher = Sha256::new();
        hasher.update(VULN_BYTES);
        vulnerable.insert(hex::encode(hasher.finalize()), "log4j 2.14.1".to_string());
        Inspector::new(FingerprintDb::from_parts(vulnerable, HashMap::new()))
    }

    #[test]
    fn scan_finds_vulnerable_archives_and_honors_exclusions() {
        let base = temp_dir("full_scan");
        let vuln = base.join("apps/vuln.jar");
        let clean = base.join("apps/clean.jar");
        let excluded = base.join("quarantine/also-vuln.jar");
        write_jar(&vuln, &[(LOOKUP_ENTRY, VULN_BYTES)]);
        write_jar(&clean, &[("org/example/App.class", b"\xca\xfe\xba\xbe")]);
        write_jar(&excluded, &[(LOOKUP_ENTRY, VULN_BYTES)]);

        let excludes = ExclusionSet::new([base.join("quarantine")]);
        let summary = run_scan(&[base.clone()], &excludes, &test_inspector());

        assert_eq!(summary.scanned, 2);
        assert_eq!(summary.vulnerable, 1);
        assert!(summary.found);
        assert!(
            summary
                .reports
                .iter()
                .any(|r| r.archive.ends_with("vuln.jar") && r.verdict == Verdict::Vulnerable)
        );

        let _ = std::fs::remove_dir_all(base);
    }

    #[test]
    fn duplicate_targets_inspect_each_archive_once() {
        let base = temp_dir("dedup");
        let jar = base.join("lib/app.jar");
        write_jar(&jar, &[("org/example/App.class", b"\xca\xfe\xba\xbe")]);

        let targets = vec![base.clone(), jar.clone()];
        let summary = run_scan(&targets, &ExclusionSet::default(), &test_inspector());
        assert_eq!(summary.scanned, 1);
        assert!(!summary.found);

        let _ = std::fs::remove_dir_all(base);
    }

    #[test]
    fn empty_target_list_scans_nothing() {
        let summary = run_scan(&[], &ExclusionSet::default(), &test_inspector());
        assert_eq!(summary.scanned, 0);
        assert!(!summary.found);
    }
}
