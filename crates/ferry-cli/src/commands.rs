use colored::Colorize;
use ferry_sdk::{
    ClientConfig, PushMode, SkippedEntry, SkippedPath, StatusReport, WorkingCopy, IGNORE_FILE_NAME,
};
use tracing::debug;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let root = match cli.dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let config = ClientConfig::load()?.with_remote_url(cli.remote);
    debug!(root = %root.display(), index = %config.index_path.display(), "working copy");
    let wc = WorkingCopy::open(root, &config)?;

    match cli.command {
        Command::Init(args) => cmd_init(&wc, args).await,
        Command::Add(args) => cmd_add(&wc, args),
        Command::Commit(args) => cmd_commit(&wc, args).await,
        Command::Push(args) => cmd_push(&wc, args).await,
        Command::Clone => cmd_clone(&wc).await,
        Command::Status => cmd_status(&wc).await,
        Command::Branch(args) => {
            wc.create_branch(&args.from, &args.name).await?;
            println!("{} Created branch {} from {}", "✓".green(), args.name.yellow(), args.from.yellow());
            Ok(())
        }
        Command::Merge(args) => {
            wc.merge_branch(&args.source, &args.into).await?;
            println!("{} Merged {} into {}", "✓".green(), args.source.yellow(), args.into.yellow());
            Ok(())
        }
        Command::Fork(args) => {
            let fork = wc.fork(&args.name).await?;
            println!("{} Forked as {} (repository {})", "✓".green(), args.name.bold(), fork.to_string().cyan());
            Ok(())
        }
        Command::Collaborator(args) => {
            wc.add_collaborator(&args.principal).await?;
            println!("{} Added collaborator {}", "✓".green(), args.principal.bold());
            Ok(())
        }
    }
}

async fn cmd_init(wc: &WorkingCopy, args: InitArgs) -> anyhow::Result<()> {
    let outcome = wc.init(&args.name, args.public).await?;
    let visibility = if outcome.is_public { "public" } else { "private" };
    println!(
        "{} Initialized {} repository {} in {}",
        "✓".green().bold(),
        visibility,
        outcome.name.bold(),
        wc.root().display()
    );
    println!("  Repository: {}", outcome.repository.to_string().cyan());
    if outcome.seeded_ignore_file {
        println!("  Created {}", IGNORE_FILE_NAME.dimmed());
    }
    Ok(())
}

fn cmd_add(wc: &WorkingCopy, args: AddArgs) -> anyhow::Result<()> {
    let outcome = wc.add(&args.patterns)?;
    for path in &outcome.added {
        println!("  {} {}", "staged:".green(), path);
    }
    for pattern in &outcome.unmatched_patterns {
        println!("  {} pattern {} matched no files", "warning:".yellow(), pattern.bold());
    }
    print_skipped_entries(&outcome.skipped);
    println!(
        "{} newly staged, {} already staged ({} total)",
        outcome.added.len().to_string().bold(),
        outcome.already_staged.len(),
        outcome.staged_total
    );
    Ok(())
}

async fn cmd_commit(wc: &WorkingCopy, args: CommitArgs) -> anyhow::Result<()> {
    let outcome = wc.commit(&args.message).await?;
    println!(
        "{} Committed {} to {} ({} files)",
        "✓".green().bold(),
        outcome.commit.short().yellow(),
        "main".yellow(),
        outcome.files.len()
    );
    print_skipped_paths(&outcome.skipped);
    Ok(())
}

async fn cmd_push(wc: &WorkingCopy, args: PushArgs) -> anyhow::Result<()> {
    let mode = if args.by_reference { PushMode::Reference } else { PushMode::Replay };
    let outcome = wc.push(mode).await?;
    match outcome.mode {
        PushMode::Replay => println!(
            "{} Replayed {} onto {} as new commit {}",
            "✓".green().bold(),
            outcome.source.short().yellow(),
            "main".yellow(),
            outcome.pushed.short().yellow()
        ),
        PushMode::Reference => println!(
            "{} {} now at {}",
            "✓".green().bold(),
            "main".yellow(),
            outcome.pushed.short().yellow()
        ),
    }
    Ok(())
}

async fn cmd_clone(wc: &WorkingCopy) -> anyhow::Result<()> {
    let outcome = wc.clone_repository().await?;
    for path in &outcome.written {
        println!("  {} {}", "wrote:".green(), path);
    }
    print_skipped_entries(&outcome.skipped);
    println!(
        "{} Checked out {} ({} files)",
        "✓".green().bold(),
        outcome.commit.short().yellow(),
        outcome.written.len()
    );
    Ok(())
}

async fn cmd_status(wc: &WorkingCopy) -> anyhow::Result<()> {
    let report = wc.status().await?;
    print_status(&report);
    Ok(())
}

fn print_status(report: &StatusReport) {
    let repo = &report.repository;
    println!("Repository {} ({})", repo.name.bold(), repo.id.to_string().cyan());
    println!("  Owner: {}", repo.owner);
    println!("  Visibility: {}", repo.visibility());
    if !repo.collaborators.is_empty() {
        println!("  Collaborators: {}", repo.collaborators.join(", "));
    }
    for branch in &repo.branches {
        let head = branch.head.as_ref().map_or("(no commits)", |c| c.short());
        println!("  Branch {} at {}", branch.name.yellow(), head);
    }
    println!("  State: {}", report.state);
    if let Some(commit) = &report.last_commit {
        println!("  Last commit: {}", commit.short().yellow());
    }

    if report.staged.is_empty() {
        println!("\nNothing staged.");
    } else {
        println!("\nStaged for commit:");
        for path in &report.staged {
            println!("  {}", path.green());
        }
    }
}

fn print_skipped_entries(skipped: &[SkippedEntry]) {
    for entry in skipped {
        println!("  {} skipped {}: {}", "warning:".yellow(), entry.path, entry.reason);
    }
}

fn print_skipped_paths(skipped: &[SkippedPath]) {
    for entry in skipped {
        println!("  {} skipped {}: {}", "warning:".yellow(), entry.path, entry.reason);
    }
}
