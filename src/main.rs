use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use colored::Colorize;
use gitlet::areas::repository::Repository;
use gitlet::artifacts::core::{PagerWriter, should_page};
use gitlet::{GitletError, UsageError};
use minus::Pager;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "gitlet",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "A tiny version-control system",
    long_about = "Gitlet keeps snapshots of a directory as commits, with branches, \
    a staging area and three-way merges. One command runs per invocation.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

COMMANDS:
{subcommands}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Create a new repository in the current directory"
    )]
    Init,
    #[command(name = "add", about = "Stage a file for the next commit")]
    Add {
        #[arg(index = 1, help = "The file to stage")]
        file: String,
    },
    #[command(
        name = "rm",
        about = "Unstage a file, or stage its removal if it is tracked"
    )]
    Rm {
        #[arg(index = 1, help = "The file to remove")]
        file: String,
    },
    #[command(name = "commit", about = "Record the staged changes")]
    Commit {
        #[arg(index = 1, help = "The commit message")]
        message: String,
    },
    #[command(name = "log", about = "Show the history of the current branch")]
    Log,
    #[command(name = "global-log", about = "Show every commit ever made")]
    GlobalLog,
    #[command(name = "find", about = "List the commits whose message contains a text")]
    Find {
        #[arg(index = 1, help = "The text to search for")]
        message: String,
    },
    #[command(
        name = "status",
        about = "Show branches, staged files and working tree changes"
    )]
    Status,
    #[command(
        name = "checkout",
        about = "Switch branches or restore a file",
        long_about = "Usage: checkout <branch> | checkout -- <file> | checkout <commit> -- <file>. \
        The first form replaces the working tree with the branch's last commit; \
        the other forms restore a single file from HEAD or from the given commit."
    )]
    Checkout {
        #[arg(index = 1, help = "Branch to switch to, or commit to restore the file from")]
        target: Option<String>,
        #[arg(index = 2, last = true, help = "The file to restore")]
        file: Option<String>,
    },
    #[command(name = "branch", about = "Create a branch at the current commit")]
    Branch {
        #[arg(index = 1, help = "The name of the new branch")]
        name: String,
    },
    #[command(name = "rm-branch", about = "Delete a branch")]
    RmBranch {
        #[arg(index = 1, help = "The branch to delete")]
        name: String,
    },
    #[command(
        name = "reset",
        about = "Check out a commit and move the current branch to it"
    )]
    Reset {
        #[arg(index = 1, help = "The commit to reset to")]
        commit: String,
    },
    #[command(name = "merge", about = "Merge a branch into the current branch")]
    Merge {
        #[arg(index = 1, help = "The branch to merge")]
        branch: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => report(error),
    }
}

/// User errors are a line on stdout; anything else is fatal
fn report(error: anyhow::Error) -> ExitCode {
    match GitletError::find_in(&error) {
        Some(gitlet_error) => {
            log::debug!("{:#}", error);
            println!("{}", gitlet_error);
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("{} {:#}", "fatal:".red(), error);
            ExitCode::FAILURE
        }
    }
}

fn parse_cli() -> anyhow::Result<Option<Cli>> {
    match Cli::try_parse() {
        Ok(cli) => Ok(Some(cli)),
        Err(error) => match error.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                error.print()?;
                Ok(None)
            }
            ErrorKind::InvalidSubcommand => Err(GitletError::from(UsageError::UnknownCommand).into()),
            ErrorKind::MissingSubcommand
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                Err(GitletError::from(UsageError::MissingCommand).into())
            }
            _ => {
                log::debug!("{}", error);
                Err(GitletError::from(UsageError::IncorrectOperands).into())
            }
        },
    }
}

async fn run() -> anyhow::Result<()> {
    let Some(cli) = parse_cli()? else {
        return Ok(());
    };
    let Some(command) = cli.command else {
        return Err(GitletError::from(UsageError::MissingCommand).into());
    };

    let pwd = std::env::current_dir()?;

    let pager = (matches!(command, Commands::Log | Commands::GlobalLog) && should_page())
        .then(Pager::new);
    let writer: Box<dyn std::io::Write> = match &pager {
        Some(pager) => Box::new(PagerWriter::new(pager.clone())),
        None => Box::new(std::io::stdout()),
    };

    let mut repository = Repository::new(&pwd, writer)?;
    let _lock = match command {
        Commands::Init => None,
        _ => {
            repository.ensure_initialized()?;
            Some(repository.lock()?)
        }
    };

    match command {
        Commands::Init => repository.init().await?,
        Commands::Add { file } => repository.add(&file).await?,
        Commands::Rm { file } => repository.rm(&file).await?,
        Commands::Commit { message } => repository.commit(&message).await?,
        Commands::Log => repository.log()?,
        Commands::GlobalLog => repository.global_log()?,
        Commands::Find { message } => repository.find(&message)?,
        Commands::Status => repository.status().await?,
        Commands::Checkout { target, file } => match (target, file) {
            (Some(branch), None) => repository.checkout_branch(&branch).await?,
            (revision, Some(file)) => {
                repository
                    .checkout_file(revision.as_deref(), &file)
                    .await?
            }
            (None, None) => return Err(GitletError::from(UsageError::IncorrectOperands).into()),
        },
        Commands::Branch { name } => repository.branch(&name)?,
        Commands::RmBranch { name } => repository.rm_branch(&name)?,
        Commands::Reset { commit } => repository.reset(&commit).await?,
        Commands::Merge { branch } => {
            repository.merge(&branch).await?;
        }
    }

    if let Some(pager) = pager {
        minus::page_all(pager)?;
    }

    Ok(())
}
