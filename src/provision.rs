//! Toolchain provisioning.
//!
//! When the host has no `jps`, a Temurin JDK distribution is downloaded
//! just to obtain one. The unpacked toolchain is cached under the user
//! data directory so repeat scans skip the download. The rest of the
//! scanner only ever sees the resulting executable path.

use anyhow::{Context, Result, bail};
use log::info;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone, Copy)]
pub struct JdkDist {
    pub url: &'static str,
    pub archive_name: &'static str,
    pub sha256: &'static str,
    pub jps_path: &'static str,
}

const LINUX: JdkDist = JdkDist {
    url: "https://github.com/adoptium/temurin17-binaries/releases/download/jdk-17.0.1%2B12/OpenJDK17U-jdk_x64_linux_hotspot_17.0.1_12.tar.gz",
    archive_name: "OpenJDK17U-jdk_x64_linux_hotspot_17.0.1_12.tar.gz",
    sha256: "6ea18c276dcbb8522feeebcfc3a4b5cb7c7e7368ba8590d3326c6c3efc5448b6",
    jps_path: "openjdk/jdk-17.0.1+12/bin/jps",
};

const MACOS: JdkDist = JdkDist {
    url: "https://github.com/adoptium/temurin17-binaries/releases/download/jdk-17.0.1%2B12/OpenJDK17U-jdk_x64_mac_hotspot_17.0.1_12.tar.gz",
    archive_name: "OpenJDK17U-jdk_x64_mac_hotspot_17.0.1_12.tar.gz",
    sha256: "98a759944a256dbdd4d1113459c7638501f4599a73d06549ac309e1982e2fa70",
    jps_path: "openjdk/jdk-17.0.1+12/Contents/Home/bin/jps",
};

const WINDOWS: JdkDist = JdkDist {
    url: "https://github.com/adoptium/temurin17-binaries/releases/download/jdk-17.0.1%2B12/OpenJDK17U-jdk_x64_windows_hotspot_17.0.1_12.zip",
    archive_name: "OpenJDK17U-jdk_x64_windows_hotspot_17.0.1_12.zip",
    sha256: "e5419773052ac6479ff211d5945f8625e0cdb036e69c0f71affaf02d5dc9aa0b",
    jps_path: "openjdk/jdk-17.0.1+12/bin/jps.exe",
};

pub fn dist_for_host() -> Option<&'static JdkDist> {
    if cfg!(target_os = "linux") {
        Some(&LINUX)
    } else if cfg!(target_os = "macos") {
        Some(&MACOS)
    } else if cfg!(target_os = "windows") {
        Some(&WINDOWS)
    } else {
        None
    }
}

/// Returns a path to a runnable `jps`, downloading and unpacking a JDK on
/// first use.
pub fn provision_jps() -> Result<PathBuf> {
    let dist = dist_for_host().context("no JDK distribution is known for this platform")?;
    let tools = tools_dir()?;
    let jps = tools.join(dist.jps_path);
    if jps.exists() {
        return Ok(jps);
    }

    std::fs::create_dir_all(&tools)
        .with_context(|| format!("failed to create directory: {}", tools.display()))?;

    let archive = tools.join(dist.archive_name);
    if !archive.exists() {
        info!(
            "downloading {} to obtain a jps executable",
            dist.archive_name
        );
        download(dist.url, &archive)?;
    }
    verify_sha256(&archive, dist.sha256)?;
    extract(&archive, &tools.join("openjdk"))?;

    if !jps.exists() {
        bail!(
            "extracted JDK does not contain the expected executable: {}",
            jps.display()
        );
    }
    Ok(jps)
}

fn tools_dir() -> Result<PathBuf> {
    let base = dirs::data_local_dir()
        .or_else(dirs::cache_dir)
        .or_else(dirs::home_dir)
        .ok_or_else(|| anyhow::anyhow!("failed to resolve a data directory"))?;
    Ok(base.join("log4j-scout").join("tools"))
}

fn download(url: &str, target: &Path) -> Result<()> {
    let status = Command::new("curl")
        .args([
            "-L",
            "--fail",
            "--silent",
            "--show-error",
            "-o",
            target
                .to_str()
                .context("download target path is not valid UTF-8")?,
            url,
        ])
        .status()
        .context("failed to execute curl (ensure curl is installed)")?;

    if !status.success() {
        if cfg!(windows) {
            let ps_status = Command::new("powershell")
                .args([
                    "-NoProfile",
                    "-ExecutionPolicy",
                    "Bypass",
                    "-Command",
                    &format!(
                        "Invoke-WebRequest -Uri '{url}' -OutFile '{}'",
                        target.display()
                    ),
                ])
                .status();

            if let Ok(s) = ps_status
                && s.success()
            {
                return Ok(());
            }
        }

        bail!("failed to download {url} (exit status: {status})");
    }

    Ok(())
}

/// Refuses to unpack anything whose digest does not match the pinned one.
pub fn verify_sha256(path: &Path, expected: &str) -> Result<()> {
    let mut file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let sum = hex::encode(hasher.finalize());

    if !sum.eq_ignore_ascii_case(expected) {
        bail!(
            "sha256 of downloaded file {} does not match expected {expected}",
            sum
        );
    }
    Ok(())
}

fn extract(archive: &Path, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest)
        .with_context(|| format!("failed to create directory: {}", dest.display()))?;

    let status = if cfg!(windows) {
        Command::new("powershell")
            .args([
                "-NoProfile",
                "-ExecutionPolicy",
                "Bypass",
                "-Command",
                &format!(
                    "Expand-Archive -Path '{}' -DestinationPath '{}' -Force",
                    archive.display(),
                    dest.display()
                ),
            ])
            .status()
            .context("failed to execute powershell for extraction")?
    } else {
        Command::new("tar")
            .args([
                "-xzf",
                archive
                    .to_str()
                    .context("archive path is not valid UTF-8")?,
                "-C",
                dest.to_str().context("dest path is not valid UTF-8")?,
            ])
            .status()
            .context("failed to execute tar")?
    };

    if !status.success() {
        bail!(
            "failed to extract {} (exit status: {status})",
            archive.display()
        );
    }
    Ok(())
}
