//! Helpers for running the smallsh binary inside a scratch directory.

#![allow(dead_code)]

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tempdir::TempDir;

pub const SMALLSH_BIN: &str = env!("CARGO_BIN_EXE_smallsh");

/// A temporary working directory that is removed when dropped.
pub struct WorkDir {
    dir: TempDir,
}

impl WorkDir {
    pub fn new(name: &str) -> WorkDir {
        // assert_cli runs cargo from the current directory, so the
        // directory must live below the one containing Cargo.toml
        let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests");
        let dir = TempDir::new_in(root, name).expect("unable to create temp dir");
        WorkDir { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn log_arg(&self) -> String {
        format!("--log={}", self.path().join("smallsh.log").display())
    }

    pub fn create_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path().join(name);
        fs::write(&path, contents).expect("unable to write file");
        path
    }

    pub fn read_file(&self, name: &str) -> String {
        fs::read_to_string(self.path().join(name)).expect("unable to read file")
    }

    /// A smallsh command rooted in this directory, logging into it.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(SMALLSH_BIN);
        cmd.current_dir(self.path()).arg(self.log_arg());
        cmd
    }

    /// Feeds `input` to an interactive shell and collects its stdout.
    ///
    /// stderr is discarded so that a background job still holding it open
    /// can't keep the collection waiting.
    pub fn run_session(&self, input: &str) -> (Pid, String) {
        let mut child = self
            .command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("unable to spawn smallsh");
        let pid = Pid::from_raw(child.id() as i32);

        {
            let stdin = child.stdin.as_mut().expect("stdin not captured");
            stdin
                .write_all(input.as_bytes())
                .expect("unable to write to smallsh");
        }
        let output = child.wait_with_output().expect("smallsh did not exit");
        assert!(output.status.success(), "smallsh exited with {}", output.status);

        (pid, String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Starts an interactive shell whose output can be read line by line.
    pub fn spawn_session(&self) -> Session {
        let mut child = self
            .command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("unable to spawn smallsh");

        let stdin = child.stdin.take().expect("stdin not captured");
        let stdout = child.stdout.take().expect("stdout not captured");
        let (sender, lines) = mpsc::channel();
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                match line {
                    Ok(line) => {
                        if sender.send(line).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });

        Session {
            child,
            stdin: Some(stdin),
            lines,
        }
    }
}

/// A running interactive shell.
pub struct Session {
    child: Child,
    stdin: Option<ChildStdin>,
    lines: Receiver<String>,
}

impl Session {
    pub fn pid(&self) -> Pid {
        Pid::from_raw(self.child.id() as i32)
    }

    pub fn send_line(&mut self, line: &str) {
        let stdin = self.stdin.as_mut().expect("stdin already closed");
        writeln!(stdin, "{}", line).expect("unable to write to smallsh");
        stdin.flush().expect("unable to flush smallsh stdin");
    }

    pub fn signal(&self, sig: Signal) {
        signal::kill(self.pid(), sig).expect("unable to signal smallsh");
    }

    /// Waits for a line containing `needle`, returning every line read
    /// up to and including it.
    pub fn expect_line(&self, needle: &str) -> Vec<String> {
        let mut seen = Vec::new();
        loop {
            match self.lines.recv_timeout(Duration::from_secs(10)) {
                Ok(line) => {
                    let found = line.contains(needle);
                    seen.push(line);
                    if found {
                        return seen;
                    }
                }
                Err(_) => panic!("never saw {:?}, got {:?}", needle, seen),
            }
        }
    }

    /// Polls until a child of the shell has exec'd `name`, returning its pid.
    pub fn wait_for_child(&self, name: &str) -> Pid {
        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline {
            if let Some(pid) = find_child(self.pid(), name) {
                return pid;
            }
            thread::sleep(Duration::from_millis(20));
        }
        panic!("no {:?} child appeared under {}", name, self.pid());
    }

    /// Closes stdin and waits for the shell, returning the remaining output.
    pub fn finish(mut self) -> Vec<String> {
        drop(self.stdin.take());
        let status = self.child.wait().expect("smallsh did not exit");
        assert!(status.success(), "smallsh exited with {}", status);
        self.lines.iter().collect()
    }
}

/// Scans `/proc/<pid>/stat` (`pid (comm) state ppid ...`) for a child of
/// `parent` whose command name is `name`.
fn find_child(parent: Pid, name: &str) -> Option<Pid> {
    for entry in fs::read_dir("/proc").ok()?.filter_map(|entry| entry.ok()) {
        let pid = match entry.file_name().to_str().and_then(|s| s.parse().ok()) {
            Some(pid) => pid,
            None => continue,
        };
        let stat = match fs::read_to_string(entry.path().join("stat")) {
            Ok(stat) => stat,
            Err(_) => continue,
        };
        let (open, close) = match (stat.find('('), stat.rfind(')')) {
            (Some(open), Some(close)) if open < close => (open, close),
            _ => continue,
        };
        let ppid = stat[close + 1..]
            .split_whitespace()
            .nth(1)
            .and_then(|ppid| ppid.parse::<i32>().ok());
        if &stat[open + 1..close] == name && ppid == Some(parent.as_raw()) {
            return Some(Pid::from_raw(pid));
        }
    }
    None
}
