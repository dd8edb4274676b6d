mod common;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use venvtask::config::ManagerSection;
use venvtask::env::{EnvState, EnvironmentRegistry, Existence, ManagerCommands};
use venvtask::errors::VenvtaskError;
use venvtask_test_utils::builders::{exists_payload, info_payload};
use venvtask_test_utils::fake_runner::FakeRunner;

type TestResult = Result<(), Box<dyn Error>>;

fn registry(runner: &FakeRunner) -> EnvironmentRegistry<FakeRunner> {
    EnvironmentRegistry::new(
        Arc::new(runner.clone()),
        ManagerCommands::from_section(&ManagerSection::default()),
    )
}

#[tokio::test]
async fn missing_lint_environment_is_provisioned_exactly_once() -> TestResult {
    with_timeout(async {
        init_tracing();

        let runner = FakeRunner::new().respond("mvenv info lint --json", 0, &exists_payload("lint", false));
        let mut reg = registry(&runner);

        reg.ensure_ready("lint").await?;

        assert_eq!(runner.count("mvenv sync"), 1);
        assert_eq!(
            runner.executed_lines(),
            ["mvenv info lint --json", "mvenv sync lint"]
        );
        assert_eq!(reg.state("lint"), EnvState::Ready);
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}

#[tokio::test]
async fn ensure_ready_is_idempotent_for_present_environment() -> TestResult {
    with_timeout(async {
        init_tracing();

        let runner = FakeRunner::new().respond("mvenv info test --json", 0, &exists_payload("test", true));
        let mut reg = registry(&runner);

        reg.ensure_ready("test").await?;
        reg.ensure_ready("test").await?;

        // Both calls re-query; neither provisions.
        assert_eq!(runner.count("mvenv info test --json"), 2);
        assert_eq!(runner.count("mvenv sync"), 0);
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}

#[tokio::test]
async fn failing_existence_query_still_provisions() -> TestResult {
    with_timeout(async {
        init_tracing();

        let runner = FakeRunner::new().respond("mvenv info docs --json", 2, "mvenv: no config found");
        let mut reg = registry(&runner);

        assert_eq!(reg.probe("docs").await?, Existence::Ambiguous);
        assert!(!reg.exists("docs").await?);

        reg.ensure_ready("docs").await?;
        assert_eq!(runner.count("mvenv sync docs"), 1);
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}

#[tokio::test]
async fn sync_failure_surfaces_as_provision_failed() -> TestResult {
    with_timeout(async {
        init_tracing();

        let runner = FakeRunner::new()
            .respond("mvenv info lint --json", 0, &exists_payload("lint", false))
            .respond("mvenv sync lint", 7, "resolver conflict");
        let mut reg = registry(&runner);

        match reg.ensure_ready("lint").await {
            Err(VenvtaskError::ProvisionFailed {
                environment,
                exit_code,
                output,
            }) => {
                assert_eq!(environment, "lint");
                assert_eq!(exit_code, 7);
                assert_eq!(output, b"resolver conflict");
            }
            other => panic!("expected ProvisionFailed, got {other:?}"),
        }
        assert_eq!(reg.state("lint"), EnvState::CheckedMissing);
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}

#[tokio::test]
async fn requirements_paths_resolve_without_provisioning() -> TestResult {
    with_timeout(async {
        init_tracing();

        let runner = FakeRunner::new().respond(
            "mvenv info --json",
            0,
            &info_payload(&[("lint", "requirements/lint.txt"), ("test", "requirements/test.txt")]),
        );
        let reg = registry(&runner);

        let paths = reg.resolve_requirements_paths(&[]).await?;
        assert_eq!(paths.len(), 2);
        assert_eq!(paths["test"], PathBuf::from("requirements/test.txt"));
        assert_eq!(
            venvtask::env::join_paths(&paths),
            "requirements/lint.txt, requirements/test.txt"
        );

        assert_eq!(
            reg.resolve_file_extension(&[]).await?.as_deref(),
            Some("linux-3.11")
        );
        assert_eq!(reg.defined_environments().await?, ["lint", "test"]);

        assert_eq!(runner.count("mvenv sync"), 0);
        assert_eq!(runner.count("mvenv info --json"), 3);
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}
