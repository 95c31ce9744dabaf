use crate::common::FIXED_COMMIT_DATE;
use crate::common::file::{FileSpec, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// Repository with `1.txt` and `a/2.txt` committed on `master`
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_gitlet_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    let file1 = FileSpec::new(repository_dir.path().join("1.txt"), "one".to_string());
    write_file(file1);

    let file2 = FileSpec::new(
        repository_dir.path().join("a").join("2.txt"),
        "two".to_string(),
    );
    write_file(file2);

    for file in ["1.txt", "a/2.txt"] {
        run_gitlet_command(repository_dir.path(), &["add", file])
            .assert()
            .success()
            .stdout("");
    }

    gitlet_commit(repository_dir.path(), "Initial commit")
        .assert()
        .success();

    repository_dir
}

pub fn run_gitlet_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("gitlet").expect("Failed to find gitlet binary");
    cmd.envs(vec![
        ("NO_PAGER", "1"),
        ("GITLET_COMMIT_DATE", FIXED_COMMIT_DATE),
    ]);
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn gitlet_commit(dir: &Path, message: &str) -> Command {
    run_gitlet_command(dir, &["commit", message])
}

/// Write, add and commit a single file
pub fn commit_file(dir: &Path, name: &str, content: &str, message: &str) {
    write_file(FileSpec::new(dir.join(name), content.to_string()));
    run_gitlet_command(dir, &["add", name])
        .assert()
        .success()
        .stdout("");
    gitlet_commit(dir, message).assert().success();
}

/// Run a command that must succeed and return its stdout
pub fn gitlet_stdout(dir: &Path, args: &[&str]) -> Result<String, Box<dyn std::error::Error>> {
    let output = run_gitlet_command(dir, args).assert().success();
    let stdout = output.get_output().stdout.clone();

    Ok(String::from_utf8(stdout)?)
}

/// Get the current HEAD commit SHA
pub fn get_head_commit_sha(dir: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let head_path = dir.join(".gitlet").join("HEAD");
    let head_content = std::fs::read_to_string(head_path)?;

    // HEAD holds either a commit SHA or a ref like "ref: refs/heads/master"
    if let Some(ref_path) = head_content.trim().strip_prefix("ref: ") {
        let ref_file = dir.join(".gitlet").join(ref_path);
        let commit_sha = std::fs::read_to_string(ref_file)?;
        Ok(commit_sha.trim().to_string())
    } else {
        Ok(head_content.trim().to_string())
    }
}

pub fn get_branch_commit_sha(
    dir: &Path,
    branch: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    let ref_file = dir.join(".gitlet").join("refs").join("heads").join(branch);
    Ok(std::fs::read_to_string(ref_file)?.trim().to_string())
}
