//! Archive vulnerability inspection.
//!
//! Opens a jar/war/ear as a zip container, recurses into archives nested
//! inside it (shaded libraries are routinely repackaged one or more levels
//! deep), fingerprints the JNDI lookup class wherever it appears, and
//! folds everything into a single verdict per top-level archive. Every
//! per-entry failure is isolated: a corrupt entry or an over-deep nest is
//! indeterminate for that entry alone, never fatal to its siblings.

use anyhow::{Context, Result};
use log::{debug, warn};
use memmap2::Mmap;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

use crate::report::{Finding, InspectionResult, Verdict};
use crate::signatures::{BuildClass, FingerprintDb};

pub const ARCHIVE_EXTENSIONS: &[&str] = &["jar", "war", "ear"];

/// Base name of the class carrying the exploitable lookup; matched by base
/// name so relocated (shaded) packages are still caught.
const JNDI_LOOKUP_CLASS: &str = "JndiLookup.class";

/// log4j 1.x JNDI-capable appender (CVE-2021-4104); presence-based check.
const V1_JMS_APPENDER_CLASS: &str = "org/apache/log4j/net/JMSAppender.class";

const DEFAULT_MAX_NESTING: usize = 8;

pub fn is_archive_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            ARCHIVE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

#[derive(Debug, Clone)]
pub struct Inspector {
    db: FingerprintDb,
    ignore_v1: bool,
    max_nesting: usize,
}

impl Inspector {
    pub fn new(db: FingerprintDb) -> Self {
        Self {
            db,
            ignore_v1: false,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }

    pub fn ignore_v1(mut self, ignore_v1: bool) -> Self {
        self.ignore_v1 = ignore_v1;
        self
    }

    pub fn max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting.max(1);
        self
    }

    /// Inspects one on-disk archive. Never fails: open and read problems
    /// become an indeterminate verdict for this archive only.
    pub fn inspect_path(&self, path: &Path) -> InspectionResult {
        let label = path.display().to_string();
        match self.open_path(path, &label) {
            Ok(result) => result,
            Err(err) => InspectionResult::indeterminate(label, format!("{err:#}")),
        }
    }

    /// Inspects an already-buffered archive, e.g. in tests or when the
    /// caller streams bytes from elsewhere.
    pub fn inspect_bytes(&self, label: &str, bytes: &[u8]) -> InspectionResult {
        let mut findings = Vec::new();
        let verdict = self.inspect_container(label, bytes, 0, &mut findings);
        InspectionResult {
            archive: label.to_string(),
            verdict,
            findings,
        }
    }

    fn open_path(&self, path: &Path, label: &str) -> Result<InspectionResult> {
        let file = File::open(path).with_context(|| format!("failed to open {label}"))?;
        let len = file
            .metadata()
            .with_context(|| format!("failed to stat {label}"))?
            .len();
        if len == 0 {
            return Ok(InspectionResult::indeterminate(
                label.to_string(),
                "empty file".to_string(),
            ));
        }
        // SAFETY: The file is opened read-only and the mapping is dropped
        // before the file handle.
        let mmap =
            unsafe { Mmap::map(&file) }.with_context(|| format!("failed to map {label}"))?;
        Ok(self.inspect_bytes(label, &mmap[..]))
    }

    fn inspect_container(
        &self,
        label: &str,
        bytes: &[u8],
        depth: usize,
        findings: &mut Vec<Finding>,
    ) -> Verdict {
        let mut archive = match ZipArchive::new(Cursor::new(bytes)) {
            Ok(archive) => archive,
            Err(err) => return Verdict::Indeterminate(format!("not a readable archive: {err}")),
        };

        let mut verdict = Verdict::Inapplicable;
        for index in 0..archive.len() {
            let entry_verdict = self.inspect_entry(label, &mut archive, index, depth, findings);
            verdict = verdict.combine(entry_verdict);
        }
        verdict
    }

    fn inspect_entry(
        &self,
        label: &str,
        archive: &mut ZipArchive<Cursor<&[u8]>>,
        index: usize,
        depth: usize,
        findings: &mut Vec<Finding>,
    ) -> Verdict {
        let mut entry = match archive.by_index(index) {
            Ok(entry) => entry,
            Err(err) => {
                return Verdict::Indeterminate(format!("unreadable entry #{index}: {err}"));
            }
        };
        if !entry.is_file() {
            return Verdict::Inapplicable;
        }
        let name = entry.name().to_string();

        if is_archive_path(Path::new(&name)) {
            if depth + 1 >= self.max_nesting {
                return Verdict::Indeterminate(format!(
                    "archives nested deeper than {} levels, gave up at {name}",
                    self.max_nesting
                ));
            }
            let mut nested_bytes = Vec::with_capacity(entry.size() as usize);
            if let Err(err) = entry.read_to_end(&mut nested_bytes) {
                return Verdict::Indeterminate(format!("failed to read nested {name}: {err}"));
            }
            let nested_label = format!("{label}::{name}");
            return self.inspect_container(&nested_label, &nested_bytes, depth + 1, findings);
        }

        if base_name(&name) == JNDI_LOOKUP_CLASS {
            // Fingerprint over the complete decompressed bytes; a partial
            // read would hash garbage.
            let mut class_bytes = Vec::with_capacity(entry.size() as usize);
            if let Err(err) = entry.read_to_end(&mut class_bytes) {
                return Verdict::Indeterminate(format!("failed to read {name}: {err}"));
            }
            let digest = fingerprint(&class_bytes);
            return match self.db.classify(&digest) {
                BuildClass::Vulnerable(version) => {
                    warn!("vulnerable {version} lookup class in {label} ({name})");
                    findings.push(Finding {
                        archive: label.to_string(),
                        entry: name,
                        version: version.to_string(),
                    });
                    Verdict::Vulnerable
                }
                BuildClass::Patched(version) => {
                    debug!("patched {version} lookup class in {label} ({name})");
                    Verdict::Patched
                }
                BuildClass::Unknown => Verdict::Indeterminate(format!(
                    "unrecognized JndiLookup build in {name} (sha256 {digest})"
                )),
            };
        }

        if !self.ignore_v1 && name.ends_with(V1_JMS_APPENDER_CLASS) {
            warn!("log4j 1.x JMSAppender in {label} ({name})");
            findings.push(Finding {
                archive: label.to_string(),
                entry: name,
                version: "log4j 1.2 JMSAppender (CVE-2021-4104)".to_string(),
            });
            return Verdict::Vulnerable;
        }

        Verdict::Inapplicable
    }
}

fn base_name(entry_name: &str) -> &str {
    entry_name.rsplit(['/', '\\']).next().unwrap_or(entry_name)
}

fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
