#![cfg(unix)]

mod common;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use venvtask::config::{ConfigFile, ManagerSection};
use venvtask::engine::Scheduler;
use venvtask::env::{EnvironmentRegistry, Existence, ManagerCommands};
use venvtask::errors::VenvtaskError;
use venvtask::exec::{run_command, CommandLine, CommandSpec, ProcessRunner};
use venvtask::tasks::{Step, Task};
use venvtask::types::{Mode, TaskName};

type TestResult = Result<(), Box<dyn Error>>;

fn idle_shutdown() -> watch::Receiver<bool> {
    let (_tx, rx) = watch::channel(false);
    rx
}

#[tokio::test]
async fn streamed_bytes_match_captured_bytes() -> TestResult {
    with_timeout(async {
        init_tracing();

        let script = "printf 'a\\n'; printf 'err\\n' >&2; printf '\\001\\377 binary'; printf 'tail'";
        let spec = CommandSpec::new(CommandLine::shell(script));
        let mut console: Vec<u8> = Vec::new();
        let mut shutdown = idle_shutdown();

        let result = run_command(&spec, Some(&mut console), &mut shutdown).await?;

        assert_eq!(console, result.output);
        assert_eq!(result.output, b"a\nerr\n\x01\xff binarytail");
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}

#[tokio::test]
async fn large_output_is_captured_completely() -> TestResult {
    with_timeout(async {
        init_tracing();

        // Several times the read chunk size.
        let spec = CommandSpec::new(CommandLine::shell("head -c 100000 /dev/zero"));
        let mut console: Vec<u8> = Vec::new();
        let mut shutdown = idle_shutdown();

        let result = run_command(&spec, Some(&mut console), &mut shutdown).await?;

        assert_eq!(result.output.len(), 100_000);
        assert_eq!(console.len(), 100_000);
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}

#[tokio::test]
async fn working_directory_is_scoped_to_one_call() -> TestResult {
    with_timeout(async {
        init_tracing();

        let dir = tempfile::tempdir()?;
        let mut shutdown = idle_shutdown();

        let inside = CommandSpec::new(CommandLine::program("pwd", Vec::<String>::new())).in_dir(dir.path());
        let outside = CommandSpec::new(CommandLine::program("pwd", Vec::<String>::new()));

        let a = run_command::<Vec<u8>>(&inside, None, &mut shutdown).await?;
        let b = run_command::<Vec<u8>>(&outside, None, &mut shutdown).await?;

        let expected = dir.path().canonicalize()?;
        assert_eq!(
            std::path::Path::new(a.output_lossy().trim()).canonicalize()?,
            expected
        );
        assert_ne!(b.output_lossy().trim(), a.output_lossy().trim());
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}

#[tokio::test]
async fn failing_step_prevents_later_steps_from_running() -> TestResult {
    with_timeout(async {
        init_tracing();

        let dir = tempfile::tempdir()?;
        let task = Task {
            name: TaskName::Lint,
            environment: None,
            steps: vec![
                Step::shell("touch step1").in_dir(dir.path()).quiet(),
                Step::shell("touch step2; exit 4").in_dir(dir.path()).quiet(),
                Step::shell("touch step3").in_dir(dir.path()).quiet(),
            ],
        };

        let runner = Arc::new(ProcessRunner::uninterruptible());
        let scheduler = Scheduler::new(&ConfigFile::default(), runner, Mode::Check, Vec::new())?;
        let report = scheduler.execute_task(&task).await;

        assert_eq!(report.failure.as_ref().map(|f| f.exit_code), Some(4));
        assert!(dir.path().join("step1").exists());
        assert!(dir.path().join("step2").exists());
        assert!(!dir.path().join("step3").exists());
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}

#[tokio::test]
async fn interrupt_kills_and_reaps_the_child() -> TestResult {
    with_timeout(async {
        init_tracing();

        let dir = tempfile::tempdir()?;
        let pid_file = dir.path().join("pid");
        let script = format!("echo $$ > {}; exec sleep 30", pid_file.display());
        let spec = CommandSpec::new(CommandLine::shell(script));

        let (tx, mut rx) = watch::channel(false);
        let watcher = {
            let pid_file = pid_file.clone();
            tokio::spawn(async move {
                while !pid_file.exists() {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
                let _ = tx.send(true);
            })
        };

        let err = run_command::<Vec<u8>>(&spec, None, &mut rx).await.unwrap_err();
        watcher.await?;
        assert!(matches!(err, VenvtaskError::Interrupted));

        // A reaped process no longer exists, not even as a zombie.
        let pid = std::fs::read_to_string(&pid_file)?.trim().to_string();
        let alive = std::process::Command::new("kill")
            .args(["-0", &pid])
            .stderr(std::process::Stdio::null())
            .status()?
            .success();
        assert!(!alive);
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}

#[tokio::test]
async fn manager_stderr_warnings_do_not_break_queries() -> TestResult {
    with_timeout(async {
        init_tracing();

        let dir = tempfile::tempdir()?;
        let synced = dir.path().join("synced").to_string_lossy().into_owned();

        // `sh -c SCRIPT NAME` exposes the environment name as `$0`.
        let section = ManagerSection {
            program: "sh".to_string(),
            exists: strings(&[
                "-c",
                r#"echo 'WARNING: config cache stale' >&2; echo "[{\"name\": \"$0\", \"exists\": true}]""#,
                "{name}",
            ]),
            sync: strings(&["-c", r#"touch "$1""#, "{name}", synced.as_str()]),
            info: strings(&[
                "-c",
                r#"echo 'WARNING: config cache stale' >&2; echo '[{"name": "test", "discovered_requirements": {"out_path": "reqs/test.txt"}}]'"#,
            ]),
            ..ManagerSection::default()
        };
        let mut registry = EnvironmentRegistry::new(
            Arc::new(ProcessRunner::uninterruptible()),
            ManagerCommands::from_section(&section),
        );

        assert_eq!(registry.probe("lint").await?, Existence::Present);
        registry.ensure_ready("lint").await?;
        assert!(!dir.path().join("synced").exists());

        let paths = registry.resolve_requirements_paths(&["test".to_string()]).await?;
        assert_eq!(
            paths.get("test").map(|p| p.to_string_lossy().into_owned()),
            Some("reqs/test.txt".to_string())
        );
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}

/// `true` once `pid` no longer runs (gone, or a zombie awaiting its parent).
#[cfg(target_os = "linux")]
fn has_stopped_running(pid: &str) -> bool {
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        Err(_) => true,
        Ok(stat) => stat
            .rsplit_once(')')
            .map(|(_, rest)| rest.trim_start().starts_with('Z'))
            .unwrap_or(false),
    }
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn interrupt_kills_grandchildren_too() -> TestResult {
    with_timeout(async {
        init_tracing();

        let dir = tempfile::tempdir()?;
        let pid_file = dir.path().join("grandchild");
        let script = format!("sleep 30 & echo $! > {}; wait", pid_file.display());
        let spec = CommandSpec::new(CommandLine::shell(script));

        let (tx, mut rx) = watch::channel(false);
        let watcher = {
            let pid_file = pid_file.clone();
            tokio::spawn(async move {
                while !pid_file.exists() {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
                let _ = tx.send(true);
            })
        };

        let err = run_command::<Vec<u8>>(&spec, None, &mut rx).await.unwrap_err();
        watcher.await?;
        assert!(matches!(err, VenvtaskError::Interrupted));

        let pid = std::fs::read_to_string(&pid_file)?.trim().to_string();
        let mut stopped = false;
        for _ in 0..100 {
            if has_stopped_running(&pid) {
                stopped = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(stopped, "grandchild {pid} survived the interrupt");
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}
