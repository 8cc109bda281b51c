use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};
use ferry_sdk::MAIN_BRANCH;

#[derive(Parser)]
#[command(
    name = "ferry",
    about = "Ferry: stage, commit and share files through a remote repository service",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Run as if started in PATH
    #[arg(short = 'C', long = "dir", global = true, value_name = "PATH")]
    pub dir: Option<PathBuf>,

    /// Remote service URL, overriding FERRY_REMOTE_URL and config.toml
    #[arg(long, global = true, value_name = "URL")]
    pub remote: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a remote repository and bind this directory to it
    Init(InitArgs),
    /// Stage files for the next commit
    Add(AddArgs),
    /// Commit the staged files to main
    Commit(CommitArgs),
    /// Publish the last commit to main
    Push(PushArgs),
    /// Write the head of main into this directory
    Clone,
    /// Show repository metadata and staged files
    Status,
    /// Create a branch on the remote
    Branch(BranchArgs),
    /// Merge one remote branch into another
    Merge(MergeArgs),
    /// Fork the repository under a new name
    Fork(ForkArgs),
    /// Grant a principal access to the repository
    Collaborator(CollaboratorArgs),
}

#[derive(Args)]
pub struct InitArgs {
    pub name: String,
    /// Whether the repository is public
    #[arg(
        value_name = "PUBLIC",
        default_value = "true",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub public: bool,
}

#[derive(Args)]
pub struct AddArgs {
    /// `.` for everything, otherwise substrings of relative paths
    #[arg(required = true, value_name = "PATTERN")]
    pub patterns: Vec<String>,
}

#[derive(Args)]
pub struct CommitArgs {
    pub message: String,
}

#[derive(Args)]
pub struct PushArgs {
    /// Move main to the existing commit instead of replaying it
    #[arg(long)]
    pub by_reference: bool,
}

#[derive(Args)]
pub struct BranchArgs {
    pub name: String,
    #[arg(long, default_value = MAIN_BRANCH)]
    pub from: String,
}

#[derive(Args)]
pub struct MergeArgs {
    pub source: String,
    #[arg(long, default_value = MAIN_BRANCH)]
    pub into: String,
}

#[derive(Args)]
pub struct ForkArgs {
    pub name: String,
}

#[derive(Args)]
pub struct CollaboratorArgs {
    pub principal: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_init_defaults_to_public() {
        let cli = Cli::try_parse_from(["ferry", "init", "demo"]).unwrap();
        if let Command::Init(args) = cli.command {
            assert_eq!(args.name, "demo");
            assert!(args.public);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_init_private() {
        let cli = Cli::try_parse_from(["ferry", "init", "demo", "false"]).unwrap();
        if let Command::Init(args) = cli.command {
            assert!(!args.public);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn init_requires_a_name() {
        assert!(Cli::try_parse_from(["ferry", "init"]).is_err());
    }

    #[test]
    fn parse_add_patterns() {
        let cli = Cli::try_parse_from(["ferry", "add", ".", "src"]).unwrap();
        if let Command::Add(args) = cli.command {
            assert_eq!(args.patterns, vec![".", "src"]);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn add_requires_a_pattern() {
        assert!(Cli::try_parse_from(["ferry", "add"]).is_err());
    }

    #[test]
    fn parse_commit() {
        let cli = Cli::try_parse_from(["ferry", "commit", "first commit"]).unwrap();
        if let Command::Commit(args) = cli.command {
            assert_eq!(args.message, "first commit");
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_push_modes() {
        let cli = Cli::try_parse_from(["ferry", "push"]).unwrap();
        assert!(matches!(cli.command, Command::Push(PushArgs { by_reference: false })));
        let cli = Cli::try_parse_from(["ferry", "push", "--by-reference"]).unwrap();
        assert!(matches!(cli.command, Command::Push(PushArgs { by_reference: true })));
    }

    #[test]
    fn parse_branch_and_merge_defaults() {
        let cli = Cli::try_parse_from(["ferry", "branch", "dev"]).unwrap();
        if let Command::Branch(args) = cli.command {
            assert_eq!(args.from, "main");
        } else { panic!("wrong command"); }

        let cli = Cli::try_parse_from(["ferry", "merge", "dev", "--into", "release"]).unwrap();
        if let Command::Merge(args) = cli.command {
            assert_eq!(args.source, "dev");
            assert_eq!(args.into, "release");
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::try_parse_from([
            "ferry", "-vv", "-C", "/tmp/wc", "--remote", "https://vcs.example.org", "status",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.dir, Some(PathBuf::from("/tmp/wc")));
        assert_eq!(cli.remote.as_deref(), Some("https://vcs.example.org"));
        assert!(matches!(cli.command, Command::Status));
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(Cli::try_parse_from(["ferry", "frobnicate"]).is_err());
    }
}
