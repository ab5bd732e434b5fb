use crate::domain::{Container, ContainerRuntime, ServiceState};
use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tracing::debug;

const INSPECT_FORMAT: &str = "{{.State.Running}}|{{.Config.Image}}";
const PS_FORMAT: &str = "{{.Names}}|{{.State}}|{{.Image}}";

/// Runtime boundary backed by a docker-compatible CLI (`docker` or `podman`).
#[derive(Debug, Clone)]
pub struct DockerAdapter {
    binary: String,
}

impl DockerAdapter {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn output<I, S>(&self, args: I) -> Result<Output>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args).stdin(Stdio::null());
        debug!(command = ?cmd, "running");

        cmd.output().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::RuntimeUnavailable(format!("'{}' not found in PATH", self.binary))
            } else {
                Error::RuntimeUnavailable(format!("could not run '{}': {e}", self.binary))
            }
        })
    }

    /// Runs a mutating command; non-zero exit becomes `ExternalCommandFailure`.
    fn run<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = self.output(args)?;
        let text = combined_output(&output);

        if !output.status.success() {
            return Err(Error::ExternalCommandFailure {
                code: output.status.code(),
                output: text,
            });
        }

        Ok(text)
    }
}

impl Default for DockerAdapter {
    fn default() -> Self {
        Self::new("docker")
    }
}

impl ContainerRuntime for DockerAdapter {
    fn check_available(&self) -> Result<()> {
        for args in [&["version"][..], &["compose", "version"][..]] {
            let output = self.output(args)?;
            if !output.status.success() {
                return Err(Error::RuntimeUnavailable(format!(
                    "'{} {}' failed: {}",
                    self.binary,
                    args.join(" "),
                    combined_output(&output).trim()
                )));
            }
        }
        Ok(())
    }

    fn get_container(&self, name: &str) -> Result<Container> {
        let output = self.output(["container", "inspect", name, "--format", INSPECT_FORMAT])?;

        if !output.status.success() {
            if is_missing_container(&String::from_utf8_lossy(&output.stderr)) {
                return Ok(Container::absent(name));
            }
            return Err(Error::ExternalCommandFailure {
                code: output.status.code(),
                output: combined_output(&output),
            });
        }

        Ok(parse_inspect(name, &String::from_utf8_lossy(&output.stdout)))
    }

    fn list_containers(&self) -> Result<Vec<Container>> {
        let text = self.run(["ps", "-a", "--format", PS_FORMAT])?;
        Ok(text.lines().filter_map(parse_ps_line).collect())
    }

    fn compose_up(&self, manifest: &Path) -> Result<()> {
        self.run([
            OsStr::new("compose"),
            OsStr::new("-f"),
            manifest.as_os_str(),
            OsStr::new("up"),
            OsStr::new("-d"),
        ])
        .map(|_| ())
    }

    fn start_container(&self, name: &str) -> Result<()> {
        self.run(["start", name]).map(|_| ())
    }

    fn stop_container(&self, name: &str) -> Result<()> {
        self.run(["stop", name]).map(|_| ())
    }

    fn restart_container(&self, name: &str) -> Result<()> {
        self.run(["restart", name]).map(|_| ())
    }

    fn remove_container(&self, name: &str) -> Result<()> {
        self.run(["rm", "-f", name]).map(|_| ())
    }

    fn container_logs(&self, name: &str, lines: usize) -> Result<String> {
        self.run(["logs", "--tail", &lines.to_string(), name])
    }
}

fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.is_empty() {
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&stderr);
    }
    text
}

/// docker: "No such container: x"; podman: "no such container" or "no such object".
fn is_missing_container(stderr: &str) -> bool {
    let stderr = stderr.to_ascii_lowercase();
    stderr.contains("no such container") || stderr.contains("no such object")
}

fn parse_inspect(name: &str, stdout: &str) -> Container {
    let line = stdout.lines().next().unwrap_or_default().trim();
    let (running, image) = line.split_once('|').unwrap_or((line, ""));

    let state = if running == "true" {
        ServiceState::Running
    } else {
        ServiceState::Stopped
    };

    let container = Container::new(name, state);
    if image.is_empty() {
        container
    } else {
        container.with_image(image)
    }
}

fn parse_ps_line(line: &str) -> Option<Container> {
    let mut parts = line.trim().splitn(3, '|');
    let name = parts.next().filter(|n| !n.is_empty())?;
    let state = match parts.next()?.to_ascii_lowercase().as_str() {
        "running" | "restarting" => ServiceState::Running,
        _ => ServiceState::Stopped,
    };
    let container = Container::new(name, state);

    Some(match parts.next().filter(|i| !i.is_empty()) {
        Some(image) => container.with_image(image),
        None => container,
    })
}
