//! Process listing source.
//!
//! Wraps a `jps`-compatible executable: `jps -l -v` prints one line per
//! running JVM, `<pid> <main-class-or-jar> <jvm args...>`. The output is
//! treated purely as text; the miner makes sense of it.

use anyhow::{Context, Result, bail};
use log::debug;
use std::env;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

const LISTING_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct Jps {
    exe: PathBuf,
}

impl Jps {
    pub fn new(exe: PathBuf) -> Self {
        Self { exe }
    }

    /// Searches PATH for an installed `jps`.
    pub fn locate() -> Option<Self> {
        let exe_name = if cfg!(windows) { "jps.exe" } else { "jps" };
        let path_var = env::var_os("PATH")?;
        for dir in env::split_paths(&path_var) {
            let candidate = dir.join(exe_name);
            if candidate.is_file() {
                debug!("found jps at {}", candidate.display());
                return Some(Self::new(candidate));
            }
        }
        None
    }

    pub fn exe(&self) -> &PathBuf {
        &self.exe
    }

    /// Runs `<exe> -l -v` and returns its combined stdout+stderr lines.
    ///
    /// Both pipes are drained on dedicated threads while the parent polls
    /// for exit; a child writing more than a pipe buffer would otherwise
    /// deadlock against our wait. The readers are joined before the exit
    /// status is treated as final.
    pub fn lines(&self) -> Result<Vec<String>> {
        let mut child = Command::new(&self.exe)
            .args(["-l", "-v"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to run {}", self.exe.display()))?;

        let stdout = child.stdout.take().context("child stdout was not piped")?;
        let stderr = child.stderr.take().context("child stderr was not piped")?;
        let out_reader = spawn_line_reader(stdout);
        let err_reader = spawn_line_reader(stderr);

        let status = wait_with_timeout(&mut child, LISTING_TIMEOUT, &self.exe)?;

        let mut lines = join_reader(out_reader)?;
        lines.extend(join_reader(err_reader)?);

        if !status.success() {
            bail!("{} exited with {status}", self.exe.display());
        }
        Ok(lines)
    }
}

fn spawn_line_reader<R: Read + Send + 'static>(reader: R) -> JoinHandle<Vec<String>> {
    std::thread::spawn(move || {
        BufReader::new(reader)
            .lines()
            .map_while(|line| line.ok())
            .collect()
    })
}

fn join_reader(handle: JoinHandle<Vec<String>>) -> Result<Vec<String>> {
    handle
        .join()
        .map_err(|_| anyhow::anyhow!("process output reader thread panicked"))
}

fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
    exe: &PathBuf,
) -> Result<std::process::ExitStatus> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child
            .try_wait()
            .with_context(|| format!("failed waiting for {}", exe.display()))?
        {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            bail!(
                "{} did not exit within {}s",
                exe.display(),
                timeout.as_secs()
            );
        }
        std::thread::sleep(Duration::from_millis(25));
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use std::sync::{Mutex, OnceLock};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn path_env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "log4j_scout_jps_test_{}_{}_{}",
            std::process::id(),
            nanos,
            name
        ))
    }

    fn write_script(path: &Path, content: &str) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms)?;
        Ok(())
    }

    #[test]
    fn lines_merges_stdout_and_stderr() -> Result<()> {
        let base = temp_dir("merge");
        let fake_jps = base.join("jps");
        write_script(
            &fake_jps,
            r#"#!/bin/sh
if [ "$1" = "-l" ] && [ "$2" = "-v" ]; then
  echo "41946 target/log4j-checkout-1.0-SNAPSHOT.jar"
  echo "7001 org.example.Main -Dapp.home=/srv/app"
  echo "warning: noise on stderr" >&2
  exit 0
fi
echo "unexpected args" >&2
exit 1
"#,
        )?;

        let lines = Jps::new(fake_jps).lines()?;
        assert_eq!(lines.len(), 3);
        assert!(
            lines
                .iter()
                .any(|l| l.contains("target/log4j-checkout-1.0-SNAPSHOT.jar"))
        );
        assert!(lines.iter().any(|l| l.contains("noise on stderr")));

        let _ = fs::remove_dir_all(base);
        Ok(())
    }

    #[test]
    fn nonzero_exit_is_an_error_after_draining() -> Result<()> {
        let base = temp_dir("fail");
        let fake_jps = base.join("jps");
        write_script(
            &fake_jps,
            r#"#!/bin/sh
echo "boom" >&2
exit 3
"#,
        )?;

        let err = Jps::new(fake_jps).lines().unwrap_err().to_string();
        assert!(err.contains("exited with"));

        let _ = fs::remove_dir_all(base);
        Ok(())
    }

    #[test]
    fn locate_finds_jps_on_path() -> Result<()> {
        let _guard = path_env_lock().lock().expect("PATH test lock poisoned");
        let base = temp_dir("locate");
        let bin = base.join("bin");
        write_script(&bin.join("jps"), "#!/bin/sh\nexit 0\n")?;

        let old_path = std::env::var("PATH").unwrap_or_default();
        let new_path = format!("{}:{}", bin.to_string_lossy(), old_path);
        // SAFETY: Guarded by path_env_lock and restored before returning.
        unsafe { std::env::set_var("PATH", &new_path) };

        let located = Jps::locate();

        // SAFETY: Guarded by path_env_lock and restored before returning.
        unsafe { std::env::set_var("PATH", old_path) };

        let located = located.expect("jps should be found on the prepended PATH");
        assert_eq!(located.exe(), &bin.join("jps"));

        let _ = fs::remove_dir_all(base);
        Ok(())
    }
}
