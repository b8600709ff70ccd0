//! Sessions against a live shell: `$$`, background jobs and signals.

use std::time::{Duration, Instant};

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use regex::Regex;

mod workdir;

use crate::workdir::WorkDir;

#[test]
fn test_pid_expansion() {
    let workdir = WorkDir::new("jobs");
    let (pid, stdout) = workdir.run_session("echo $$ x$$y $$$\nexit\n");
    assert_eq!(stdout, format!(": {0} x{0}y {0}$\n: ", pid));
}

#[test]
fn test_background_job_is_reported_when_done() {
    let workdir = WorkDir::new("jobs");
    let (_, stdout) = workdir.run_session("true &\nsleep 1\nexit\n");

    let started = Regex::new(r"Background process ID is (\d+)").expect("bad regex");
    let pid = &started
        .captures(&stdout)
        .unwrap_or_else(|| panic!("no launch message in {:?}", stdout))[1];
    let done = format!("Background process {} is done: Exited with value: 0", pid);
    assert!(stdout.contains(&done), "{:?} missing from {:?}", done, stdout);
    assert_eq!(stdout.matches(&done).count(), 1);
}

#[test]
fn test_background_job_does_not_block() {
    let workdir = WorkDir::new("jobs");
    let start = Instant::now();
    let (_, stdout) = workdir.run_session("sleep 5 &\necho next\nexit\n");

    assert!(start.elapsed() < Duration::from_secs(4), "shell waited on background job");
    assert!(stdout.contains("Background process ID is "));
    assert!(stdout.contains("next\n"));
    assert!(!stdout.contains("is done"));
}

#[test]
fn test_background_output_goes_to_dev_null() {
    let workdir = WorkDir::new("jobs");
    let (_, stdout) = workdir.run_session("echo hidden &\nsleep 1\nexit\n");
    assert!(!stdout.contains("hidden"), "{:?}", stdout);
    assert!(stdout.contains("is done: Exited with value: 0"));
}

#[test]
fn test_background_job_killed_by_signal() {
    let workdir = WorkDir::new("jobs");
    // the shell would expand `$$` to its own pid, so the kill lives in a script
    workdir.create_file("term.sh", "kill -15 $$\n");
    let (_, stdout) = workdir.run_session("sh term.sh &\nsleep 1\nexit\n");
    assert!(
        stdout.contains("is done: Terminated by signal: 15"),
        "{:?}",
        stdout
    );
}

#[test]
fn test_status_after_exit_and_signal() {
    let workdir = WorkDir::new("jobs");
    workdir.create_file("exit2.sh", "exit 2\n");
    workdir.create_file("kill9.sh", "kill -9 $$\n");
    let (_, stdout) = workdir.run_session("sh exit2.sh\nstatus\nsh kill9.sh\nstatus\nexit\n");

    assert_eq!(
        stdout,
        ": : Exited with value: 2\n\
         : Terminated by signal: 9\n\
         : Terminated by signal: 9\n\
         : "
    );
}

#[test]
fn test_shell_ignores_sigint() {
    let workdir = WorkDir::new("jobs");
    let mut session = workdir.spawn_session();
    session.send_line("echo ready");
    session.expect_line("ready");

    session.signal(Signal::SIGINT);
    session.send_line("echo alive");
    session.expect_line("alive");
    session.send_line("exit");
    session.finish();
}

#[test]
fn test_sigtstp_toggles_foreground_only_mode() {
    let workdir = WorkDir::new("jobs");
    let mut session = workdir.spawn_session();
    session.send_line("echo ready");
    session.expect_line("ready");

    session.signal(Signal::SIGTSTP);
    session.expect_line("Entering foreground-only mode ('&' ignored)");

    session.send_line("echo ignored &");
    let lines = session.expect_line("ignored");
    assert!(lines.iter().all(|line| !line.contains("Background process")));

    // the prompt stays blocked until the would-be background job is done
    let start = Instant::now();
    session.send_line("sleep 1 &");
    session.send_line("echo marker");
    let lines = session.expect_line("marker");
    assert!(start.elapsed() >= Duration::from_secs(1), "{:?}", lines);
    assert!(lines.iter().all(|line| !line.contains("Background process")));

    session.signal(Signal::SIGTSTP);
    session.expect_line("Exiting foreground-only mode");

    session.send_line("true &");
    session.expect_line("Background process ID is ");
    session.send_line("exit");
    session.finish();
}

#[test]
fn test_sigint_terminates_foreground_child() {
    let workdir = WorkDir::new("jobs");
    let mut session = workdir.spawn_session();
    session.send_line("sleep 30");
    let child = session.wait_for_child("sleep");

    signal::kill(child, Signal::SIGINT).expect("unable to signal sleep");
    session.expect_line("Terminated by signal: 2");
    session.send_line("status");
    session.expect_line("Terminated by signal: 2");
    session.send_line("exit");
    session.finish();
}

#[test]
fn test_sigint_is_ignored_by_background_child() {
    let workdir = WorkDir::new("jobs");
    let mut session = workdir.spawn_session();
    session.send_line("sleep 2 &");
    let line = session.expect_line("Background process ID is ").pop();
    let started = Regex::new(r"Background process ID is (\d+)").expect("bad regex");
    let pid: i32 = line
        .as_ref()
        .and_then(|line| started.captures(line))
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or_else(|| panic!("no pid in {:?}", line));

    signal::kill(Pid::from_raw(pid), Signal::SIGINT).expect("unable to signal sleep");
    session.send_line("sleep 3");
    session.expect_line(&format!(
        "Background process {} is done: Exited with value: 0",
        pid
    ));
    session.send_line("exit");
    session.finish();
}

#[test]
fn test_children_ignore_sigtstp() {
    let workdir = WorkDir::new("jobs");
    workdir.create_file("tstp.sh", "kill -TSTP $$\necho survived\n");
    let mut session = workdir.spawn_session();

    session.send_line("sh tstp.sh");
    session.expect_line("survived");
    session.send_line("status");
    session.expect_line("Exited with value: 0");

    session.send_line("sh tstp.sh > bg.txt &");
    session.expect_line("Background process ID is ");
    session.send_line("sleep 1");
    session.expect_line("is done: Exited with value: 0");
    session.send_line("exit");
    session.finish();
    assert_eq!(workdir.read_file("bg.txt"), "survived\n");
}

#[test]
fn test_cd_changes_directory() {
    let workdir = WorkDir::new("jobs");
    let (_, stdout) = workdir.run_session("cd /\npwd\ncd /nonexistent_smallsh_dir\npwd\nexit\n");
    assert_eq!(
        stdout,
        ": : /\n: Directory /nonexistent_smallsh_dir not found.\n: /\n: "
    );
}

#[test]
fn test_end_of_input_exits_cleanly() {
    let workdir = WorkDir::new("jobs");
    let (_, stdout) = workdir.run_session("echo last");
    assert_eq!(stdout, ": last\n: ");
}
