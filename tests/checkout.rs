use crate::common::command::{
    commit_file, get_head_commit_sha, gitlet_stdout, init_repository_dir, run_gitlet_command,
};
use crate::common::file::{FileSpec, read_file, write_file};
use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

#[rstest]
fn checkout_branch_successfully(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    run_gitlet_command(dir, &["branch", "side"]).assert().success();
    commit_file(dir, "1.txt", "master edit", "Edit on master");
    commit_file(dir, "master_only.txt", "m", "Master only file");

    run_gitlet_command(dir, &["checkout", "side"])
        .assert()
        .success()
        .stdout("");

    assert_eq!(read_file(&dir.join("1.txt")).as_deref(), Some("one"));
    assert_eq!(read_file(&dir.join("a").join("2.txt")).as_deref(), Some("two"));
    assert_eq!(read_file(&dir.join("master_only.txt")), None);
    assert_eq!(
        std::fs::read_to_string(dir.join(".gitlet").join("HEAD"))?,
        "ref: refs/heads/side\n"
    );

    run_gitlet_command(dir, &["checkout", "master"]).assert().success();

    assert_eq!(read_file(&dir.join("1.txt")).as_deref(), Some("master edit"));
    assert_eq!(read_file(&dir.join("master_only.txt")).as_deref(), Some("m"));

    Ok(())
}

#[rstest]
fn checkout_branch_clears_the_stage(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    run_gitlet_command(dir, &["branch", "side"]).assert().success();
    write_file(FileSpec::new(dir.join("pending.txt"), "pending".to_string()));
    run_gitlet_command(dir, &["add", "pending.txt"]).assert().success();

    run_gitlet_command(dir, &["checkout", "side"]).assert().success();

    let status = gitlet_stdout(dir, &["status"])?;
    assert!(status.contains("=== Staged Files ===\n\n"));
    assert!(status.contains("=== Untracked Files ===\npending.txt\n\n"));

    Ok(())
}

#[rstest]
fn checkout_with_untracked_file_in_the_way(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    run_gitlet_command(dir, &["branch", "side"]).assert().success();
    run_gitlet_command(dir, &["checkout", "side"]).assert().success();
    commit_file(dir, "shared.txt", "from side", "Side file");
    run_gitlet_command(dir, &["checkout", "master"]).assert().success();
    let master_head = get_head_commit_sha(dir)?;
    write_file(FileSpec::new(dir.join("shared.txt"), "mine".to_string()));

    run_gitlet_command(dir, &["checkout", "side"])
        .assert()
        .success()
        .stdout(
            "There is an untracked file in the way; delete it, or add and commit it first.\n",
        );

    assert_eq!(read_file(&dir.join("shared.txt")).as_deref(), Some("mine"));
    assert_eq!(read_file(&dir.join("1.txt")).as_deref(), Some("one"));
    assert_eq!(get_head_commit_sha(dir)?, master_head);
    assert_eq!(
        std::fs::read_to_string(dir.join(".gitlet").join("HEAD"))?,
        "ref: refs/heads/master\n"
    );

    Ok(())
}

#[rstest]
#[case("side", "No such branch exists.\n")]
#[case("master", "No need to checkout the current branch.\n")]
fn checkout_branch_errors(
    init_repository_dir: TempDir,
    #[case] branch: &str,
    #[case] expected_output: &str,
) {
    run_gitlet_command(init_repository_dir.path(), &["checkout", branch])
        .assert()
        .success()
        .stdout(expected_output.to_string());
}

#[rstest]
fn checkout_file_from_head(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_file(FileSpec::new(dir.join("a").join("2.txt"), "scribbles".to_string()));

    run_gitlet_command(dir, &["checkout", "--", "a/2.txt"])
        .assert()
        .success()
        .stdout("");

    assert_eq!(read_file(&dir.join("a").join("2.txt")).as_deref(), Some("two"));
}

#[rstest]
fn checkout_file_from_abbreviated_commit(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    let initial = get_head_commit_sha(dir)?;
    commit_file(dir, "1.txt", "uno", "Translate");
    write_file(FileSpec::new(dir.join("1.txt"), "pending".to_string()));
    run_gitlet_command(dir, &["add", "1.txt"]).assert().success();

    run_gitlet_command(dir, &["checkout", &initial[..6], "--", "1.txt"])
        .assert()
        .success()
        .stdout("");

    assert_eq!(read_file(&dir.join("1.txt")).as_deref(), Some("one"));
    let status = gitlet_stdout(dir, &["status"])?;
    assert!(status.contains("=== Staged Files ===\n1.txt\n\n"));

    Ok(())
}

#[rstest]
fn checkout_file_errors(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();

    run_gitlet_command(dir, &["checkout", "--", "ghost.txt"])
        .assert()
        .success()
        .stdout("File does not exist in that commit.\n");
    run_gitlet_command(dir, &["checkout", "0000000", "--", "1.txt"])
        .assert()
        .success()
        .stdout("No commit with that id exists.\n");
}

#[rstest]
fn checkout_with_untracked_files_in_a_directory_in_the_way(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir.path();
    run_gitlet_command(dir, &["branch", "side"]).assert().success();
    run_gitlet_command(dir, &["checkout", "side"]).assert().success();
    commit_file(dir, "d", "flat on side", "Flat file");
    run_gitlet_command(dir, &["checkout", "master"]).assert().success();
    let head = get_head_commit_sha(dir)?;
    write_file(FileSpec::new(
        dir.join("d").join("precious.txt"),
        "precious".to_string(),
    ));

    run_gitlet_command(dir, &["checkout", "side"])
        .assert()
        .success()
        .stdout("There is an untracked file in the way; delete it, or add and commit it first.\n");

    assert_eq!(
        read_file(&dir.join("d").join("precious.txt")).as_deref(),
        Some("precious")
    );
    assert_eq!(get_head_commit_sha(dir)?, head);

    Ok(())
}
