use serde::Serialize;

/// Outcome of inspecting one archive (or one entry within it).
///
/// `Patched` and `Inapplicable` are both "not vulnerable" but stay
/// distinct: `Patched` means the lookup class was found and its
/// fingerprint is a known-fixed build, `Inapplicable` means the archive
/// does not embed the library at all. `Indeterminate` (open/read failure,
/// unknown build, nesting cap) is never folded into either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Vulnerable,
    Patched,
    Indeterminate(String),
    Inapplicable,
}

impl Verdict {
    fn rank(&self) -> u8 {
        match self {
            Verdict::Vulnerable => 3,
            Verdict::Patched => 2,
            Verdict::Indeterminate(_) => 1,
            Verdict::Inapplicable => 0,
        }
    }

    /// Combines two sub-verdicts: Vulnerable > Patched > Indeterminate >
    /// Inapplicable. A conclusive patched build outweighs an indeterminate
    /// sibling entry; anything vulnerable outweighs everything.
    pub fn combine(self, other: Verdict) -> Verdict {
        if other.rank() > self.rank() { other } else { self }
    }

    pub fn is_vulnerable(&self) -> bool {
        matches!(self, Verdict::Vulnerable)
    }
}

/// One vulnerable indicator: where it was seen and which build it is.
/// `archive` communicates nesting as `outer.jar::inner.jar`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub archive: String,
    pub entry: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectionResult {
    pub archive: String,
    pub verdict: Verdict,
    pub findings: Vec<Finding>,
}

impl InspectionResult {
    pub fn indeterminate(archive: String, reason: String) -> Self {
        Self {
            archive,
            verdict: Verdict::Indeterminate(reason),
            findings: Vec::new(),
        }
    }
}

/// Aggregate outcome of one run. `found` is derived from the per-archive
/// verdicts; there is no ambient mutable flag anywhere in the scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    pub scanned: usize,
    pub vulnerable: usize,
    pub patched: usize,
    pub indeterminate: usize,
    pub found: bool,
    pub reports: Vec<InspectionResult>,
}

impl ScanSummary {
    pub fn from_reports(reports: Vec<InspectionResult>) -> Self {
        let mut vulnerable = 0usize;
        let mut patched = 0usize;
        let mut indeterminate = 0usize;
        for report in &reports {
            match report.verdict {
                Verdict::Vulnerable => vulnerable += 1,
                Verdict::Patched => patched += 1,
                Verdict::Indeterminate(_) => indeterminate += 1,
                Verdict::Inapplicable => {}
            }
        }
        Self {
            scanned: reports.len(),
            vulnerable,
            patched,
            indeterminate,
            found: vulnerable > 0,
            reports,
        }
    }
}

pub fn render_text(summary: &ScanSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("scanned_archives: {}\n", summary.scanned));
    out.push_str(&format!("vulnerable: {}\n", summary.vulnerable));
    out.push_str(&format!("patched: {}\n", summary.patched));
    out.push_str(&format!("indeterminate: {}\n", summary.indeterminate));

    for report in &summary.reports {
        match &report.verdict {
            Verdict::Vulnerable => {
                for finding in &report.findings {
                    out.push_str(&format!(
                        "- vulnerable: {} ({}): {}\n",
                        finding.archive, finding.entry, finding.version
                    ));
                }
            }
            Verdict::Indeterminate(reason) => {
                out.push_str(&format!("- indeterminate: {}: {}\n", report.archive, reason));
            }
            Verdict::Patched | Verdict::Inapplicable => {}
        }
    }

    if summary.found {
        out.push_str("\nthe system is vulnerable, please update immediately.\n");
    } else {
        out.push_str(
            "\nno vulnerable log4j build was found; verify further with your system vendor.\n",
        );
    }
    out
}
