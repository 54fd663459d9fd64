//! External executables used by the compiler, behind small traits so that tests and callers can
//! substitute them.

use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
    thread,
    time::{Duration, Instant},
};

use crate::{Error, Result};

/// Wraps an FMU into a proxy FMU that forwards calls to a remote host.
pub trait ProxyTool {
    /// Create the proxy for `fmu` and return its path.
    fn proxify(&self, fmu: &Path, host: &str, port: u16) -> Result<PathBuf>;
}

/// Renders graph descriptions in the DOT language.
pub trait GraphRenderer {
    fn render(&self, dot_source: &Path, output: &Path) -> Result<()>;
}

/// The `fmu-proxify` executable
#[derive(Clone, Debug)]
pub struct FmuProxify {
    pub program: PathBuf,
    pub timeout: Duration,
}

impl Default for FmuProxify {
    fn default() -> Self {
        Self {
            program: program_from_env("OSPX_FMU_PROXIFY", "fmu-proxify"),
            timeout: Duration::from_secs(60),
        }
    }
}

impl ProxyTool for FmuProxify {
    fn proxify(&self, fmu: &Path, host: &str, port: u16) -> Result<PathBuf> {
        let dir = match fmu.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let file_name = fmu
            .file_name()
            .ok_or_else(|| Error::Tool(format!("not a file: {}", fmu.display())))?;

        let mut command = Command::new(&self.program);
        command
            .arg(file_name)
            .arg(format!("--remote={host}:{port}"))
            .current_dir(dir);
        run_with_timeout(command, self.timeout)?;

        let stem = fmu
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let proxy = dir.join(format!("{stem}-proxy.fmu"));
        if !proxy.exists() {
            return Err(Error::Tool(format!(
                "{} did not produce {}",
                self.program.display(),
                proxy.display()
            )));
        }
        Ok(proxy)
    }
}

/// The Graphviz `dot` executable
#[derive(Clone, Debug)]
pub struct Dot {
    pub program: PathBuf,
    pub timeout: Duration,
}

impl Default for Dot {
    fn default() -> Self {
        Self {
            program: program_from_env("OSPX_DOT", "dot"),
            timeout: Duration::from_secs(60),
        }
    }
}

impl GraphRenderer for Dot {
    fn render(&self, dot_source: &Path, output: &Path) -> Result<()> {
        let mut command = Command::new(&self.program);
        command.arg("-Tpdf").arg("-o").arg(output).arg(dot_source);
        run_with_timeout(command, self.timeout)
    }
}

fn program_from_env(key: &str, default: &str) -> PathBuf {
    std::env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

/// Run `command` to completion, killing it once `timeout` has passed. Stderr is drained on a
/// separate thread so a chatty tool cannot block on a full pipe.
pub fn run_with_timeout(mut command: Command, timeout: Duration) -> Result<()> {
    let program = command.get_program().to_string_lossy().into_owned();
    log::debug!("Running {command:?}");

    let mut child = command
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::Tool(format!("could not start {program}: {e}")))?;

    let stderr = child.stderr.take().map(|mut pipe| {
        thread::spawn(move || {
            let mut text = String::new();
            let _ = std::io::Read::read_to_string(&mut pipe, &mut text);
            text
        })
    });

    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            let stderr = stderr
                .and_then(|reader| reader.join().ok())
                .unwrap_or_default();
            if status.success() {
                if !stderr.trim().is_empty() {
                    log::debug!("{program}: {}", stderr.trim());
                }
                return Ok(());
            }
            return Err(Error::Tool(format!(
                "{program} exited with {status}: {}",
                stderr.trim()
            )));
        }
        if started.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::Timeout(format!(
                "{program} did not finish within {}s",
                timeout.as_secs_f64()
            )));
        }
        thread::sleep(Duration::from_millis(50));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program() {
        let command = Command::new("ospx-no-such-program");
        let err = run_with_timeout(command, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, Error::Tool(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout() {
        let mut command = Command::new("sleep");
        command.arg("5");
        let err = run_with_timeout(command, Duration::from_millis(100)).unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_status() {
        let command = Command::new("false");
        let err = run_with_timeout(command, Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, Error::Tool(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_large_stderr() {
        // Well beyond the pipe buffer
        let script = "head -c 300000 /dev/zero | tr '\\0' x >&2; exit 3";
        let mut command = Command::new("sh");
        command.args(["-c", script]);
        let err = run_with_timeout(command, Duration::from_secs(10)).unwrap_err();
        let Error::Tool(message) = &err else {
            panic!("expected a tool error, got {err:?}");
        };
        assert!(message.contains("xxxx"));

        let mut command = Command::new("sh");
        command.args(["-c", "head -c 300000 /dev/zero | tr '\\0' x >&2"]);
        run_with_timeout(command, Duration::from_secs(10)).unwrap();
    }
}
