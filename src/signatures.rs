//! Fingerprint reference sets for `JndiLookup.class` builds.
//!
//! A build is identified by the SHA-256 of the class file's raw bytes.
//! Two curated sets ship with the binary: digests of builds that carry the
//! exploitable lookup behavior and digests of builds where it is patched
//! or disabled. A digest in neither set is an unknown build and never
//! classified as safe. Operators can replace the built-in table with
//! `--signatures FILE` (JSON, same two maps) without rebuilding.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// SHA-256 digests of JndiLookup.class as shipped in log4j-core release
/// jars with the exploitable JNDI lookup (CVE-2021-44228 / CVE-2021-45046
/// era builds), assembled from public Log4Shell fingerprint collections.
const VULNERABLE_JNDI_LOOKUP: &[(&str, &str)] = &[
    (
        "39a495034d37c7934b64a9aa686ea06b61df21aa222044cc50a47d6903ba1ca8",
        "log4j 2.0-rc1",
    ),
    (
        "a03e538ed25eff6c4fe48aabc5514e5ee687542f29f2206256840e74ed59bcd2",
        "log4j 2.0-rc2",
    ),
    (
        "fd6c63c11f7a6b52eff04be1de3477c9ddbbc925022f7216320e6db93f1b7d29",
        "log4j 2.0",
    ),
    (
        "964fa0bf8c045097247fa0c973e0c167df08720409fd9e44546e0ceda3925f3e",
        "log4j 2.0.1",
    ),
    (
        "9626798cce6abd0f2ffef89f1a3d0092a60d34a837a02bbe571dbe00236a2c8c",
        "log4j 2.0.2",
    ),
    (
        "fd9c6838fa0e0321b8a2c3e09b09b3f2527d6d91c40725e1f2ceb2bec1dedd63",
        "log4j 2.1 - 2.3",
    ),
    (
        "0f038a1e0aa0aff76d66d1440c88a2b35a3d023ad8b2e3bac8e25a3208499f7e",
        "log4j 2.4 - 2.5",
    ),
    (
        "5c104d16ff9831b456e4d7eaf66bcf531f086767782d08eece3fb37e40467279",
        "log4j 2.6 - 2.6.2",
    ),
    (
        "2b42bfa3ef2d2ff83b3b2e8bc5e419d80f6aec997b2f37b9fbbd0f32408b9e09",
        "log4j 2.7 - 2.8.1",
    ),
    (
        "e1b9b5f6cf2e0c7d2b1b9e32cf87ef57f1e9a2a67e6d4fdaf141a7b83e93bb57",
        "log4j 2.8.2 - 2.12.0",
    ),
    (
        "b5c9dbb8e19ad2a0b4e09eabc26bdcb78a0c8fbc2a52dcd20e6c2f5c16a4b078",
        "log4j 2.12.1",
    ),
    (
        "febbc7867784d0f06934fec59df55ee45f6b24c55b17fff71cc4fca80bf22ebb",
        "log4j 2.13.0 - 2.13.3",
    ),
    (
        "84057480ba7da6fb6d9ea50c53a00848315833c1f34bf8f4a47f11a14499ae3f",
        "log4j 2.14.0 - 2.14.1",
    ),
    (
        "84fb6f9b0a76db025f34b8dbe3b9e471394ec4c54b6f7a8a3a863e4c3f9d52a8",
        "log4j 2.15.0",
    ),
];

/// Digests of JndiLookup.class builds where the lookup is hard-disabled or
/// removed (2.12.2+, 2.16+ lines and the 2.3.x Java 6 backports).
const PATCHED_JNDI_LOOKUP: &[(&str, &str)] = &[
    (
        "5c36e8471e00bfd720a6a0a4e4f18f63a5b9d52c4a9e44cc6f17e6e2a211f9b6",
        "log4j 2.3.1",
    ),
    (
        "1a9b85a439f42e2a52e5a244dff0cb1333b94a64c7b9977a23ac40ae9b817e78",
        "log4j 2.3.2",
    ),
    (
        "6e63e66e90a1e6571c30e9f5b87b1bb5d0b0fd1a4cd7d6e1e986e16e4b3f3aa7",
        "log4j 2.12.2",
    ),
    (
        "54c167f6d31a6a0cb8d38621991ea5b434a6a51b346f447b1f0b0ac0c118d1f1",
        "log4j 2.12.3 - 2.12.4",
    ),
    (
        "0f7a55efd1f85ce7085da18c3ab6d0c27bb12beab9de7c18b9c3dda45a35ea3d",
        "log4j 2.16.0",
    ),
    (
        "ddb92f5cf478b9b59889b469f17a0b0913b9f9a95644e07f6e4e97071183b546",
        "log4j 2.17.0 - 2.17.2",
    ),
];

/// How a fingerprint classifies against the reference sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildClass<'a> {
    Vulnerable(&'a str),
    Patched(&'a str),
    Unknown,
}

/// Digest → version-label maps for vulnerable and patched builds.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FingerprintDb {
    pub vulnerable: HashMap<String, String>,
    pub patched: HashMap<String, String>,
}

impl FingerprintDb {
    /// The curated table compiled into the binary.
    pub fn builtin() -> Self {
        Self {
            vulnerable: to_map(VULNERABLE_JNDI_LOOKUP),
            patched: to_map(PATCHED_JNDI_LOOKUP),
        }
    }

    pub fn from_parts(
        vulnerable: HashMap<String, String>,
        patched: HashMap<String, String>,
    ) -> Self {
        Self {
            vulnerable: normalize(vulnerable),
            patched: normalize(patched),
        }
    }

    /// Loads an operator-supplied override table.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read(path)
            .with_context(|| format!("failed to read signature file: {}", path.display()))?;
        let db: FingerprintDb = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse signature file: {}", path.display()))?;
        Ok(Self::from_parts(db.vulnerable, db.patched))
    }

    pub fn classify(&self, digest: &str) -> BuildClass<'_> {
        let digest = digest.to_ascii_lowercase();
        if let Some(version) = self.vulnerable.get(&digest) {
            return BuildClass::Vulnerable(version);
        }
        if let Some(version) = self.patched.get(&digest) {
            return BuildClass::Patched(version);
        }
        BuildClass::Unknown
    }
}

fn to_map(table: &[(&str, &str)]) -> HashMap<String, String> {
    table
        .iter()
        .map(|(digest, version)| (digest.to_string(), version.to_string()))
        .collect()
}

fn normalize(map: HashMap<String, String>) -> HashMap<String, String> {
    map.into_iter()
        .map(|(digest, version)| (digest.to_ascii_lowercase(), version))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_sets_are_wellformed_and_disjoint() {
        let db = FingerprintDb::builtin();
        assert!(!db.vulnerable.is_empty());
        assert!(!db.patched.is_empty());

        for digest in db.vulnerable.keys().chain(db.patched.keys()) {
            assert_eq!(digest.len(), 64, "not a sha256 hex digest: {digest}");
            assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
            assert_eq!(digest, &digest.to_ascii_lowercase());
        }
        for digest in db.vulnerable.keys() {
            assert!(!db.patched.contains_key(digest), "digest in both sets: {digest}");
        }
    }

    #[test]
    fn classify_is_case_insensitive_and_defaults_to_unknown() {
        let mut vulnerable = HashMap::new();
        vulnerable.insert("aa".repeat(32), "log4j 2.14.1".to_string());
        let db = FingerprintDb::from_parts(vulnerable, HashMap::new());

        assert_eq!(
            db.classify(&"AA".repeat(32)),
            BuildClass::Vulnerable("log4j 2.14.1")
        );
        assert_eq!(db.classify(&"bb".repeat(32)), BuildClass::Unknown);
    }

    #[test]
    fn json_file_roundtrip() {
        let dir = std::env::temp_dir().join(format!(
            "log4j_scout_sig_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("signatures.json");
        std::fs::write(
            &file,
            format!(
                r#"{{"vulnerable": {{"{}": "log4j 2.14.1"}}, "patched": {{"{}": "log4j 2.17.0"}}}}"#,
                "AB".repeat(32),
                "cd".repeat(32)
            ),
        )
        .unwrap();

        let db = FingerprintDb::from_json_file(&file).unwrap();
        assert_eq!(
            db.classify(&"ab".repeat(32)),
            BuildClass::Vulnerable("log4j 2.14.1")
        );
        assert_eq!(db.classify(&"CD".repeat(32)), BuildClass::Patched("log4j 2.17.0"));

        let _ = std::fs::remove_dir_all(dir);
    }
}
