use crate::common::command::{repository_dir, run_gitlet_command};
use assert_fs::TempDir;
use rstest::rstest;

mod common;

#[rstest]
fn missing_command_is_reported(repository_dir: TempDir) {
    run_gitlet_command(repository_dir.path(), &[])
        .assert()
        .success()
        .stdout("Please enter a command.\n");
}

#[rstest]
fn unknown_command_is_reported(repository_dir: TempDir) {
    run_gitlet_command(repository_dir.path(), &["hello"])
        .assert()
        .success()
        .stdout("No command with that name exists.\n");
}

#[rstest]
#[case(&["add"])]
#[case(&["add", "a.txt", "b.txt"])]
#[case(&["commit"])]
#[case(&["log", "extra"])]
#[case(&["checkout"])]
#[case(&["checkout", "a", "b"])]
#[case(&["merge"])]
fn wrong_operands_are_reported(repository_dir: TempDir, #[case] args: &[&str]) {
    run_gitlet_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    run_gitlet_command(repository_dir.path(), args)
        .assert()
        .success()
        .stdout("Incorrect operands.\n");
}

#[rstest]
#[case(&["status"])]
#[case(&["log"])]
#[case(&["add", "a.txt"])]
#[case(&["branch", "side"])]
fn commands_outside_a_repository_are_refused(repository_dir: TempDir, #[case] args: &[&str]) {
    run_gitlet_command(repository_dir.path(), args)
        .assert()
        .success()
        .stdout("Not in an initialized Gitlet directory.\n");

    assert!(!repository_dir.path().join(".gitlet").exists());
}

#[rstest]
fn corrupted_stage_is_fatal(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_gitlet_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    std::fs::write(repository_dir.path().join(".gitlet").join("stage"), b"garbage")?;

    run_gitlet_command(repository_dir.path(), &["status"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicates::str::contains("fatal:"));

    Ok(())
}
