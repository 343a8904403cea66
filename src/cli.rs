use clap::{Parser, Subcommand};

use crate::commands::clone::CloneArgs;
use crate::commands::config::ConfigCommands;
use crate::commands::create::CreateArgs;
use crate::commands::diff::DiffArgs;
use crate::commands::ingest_attachments::IngestAttachmentsArgs;
use crate::commands::init::InitArgs;
use crate::commands::open::OpenArgs;
use crate::commands::pull::PullArgs;
use crate::commands::push::PushArgs;
use crate::commands::shell_integration::ShellIntegrationArgs;
use crate::commands::show::ShowArgs;
use crate::commands::upload::UploadArgs;
use crate::commands::{
    clone, create, diff, ingest_attachments, init, open, pull, push, shell_integration, show,
    upload,
};

#[derive(Parser)]
#[command(
    name = "ghpr",
    version,
    about,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, PartialEq, Eq, Debug)]
pub enum Commands {
    /// Clone an issue or PR (and its comments) into a local git repo
    Clone(CloneArgs),

    /// Pull the latest description and comments, then push back
    Pull(PullArgs),

    /// Push local edits to GitHub (and the gist)
    Push(PushArgs),

    /// Show differences between the clone and GitHub
    Diff(DiffArgs),

    /// Start a new PR or issue draft in gh/new/
    Init(InitArgs),

    /// Create the drafted PR or issue on GitHub
    Create(CreateArgs),

    /// Open the item (or its gist) in the browser
    Open(OpenArgs),

    /// Print the item and gist URLs
    Show(ShowArgs),

    /// Upload files to the gist and print links to them
    Upload(UploadArgs),

    /// Move user-attachments images into the gist
    IngestAttachments(IngestAttachmentsArgs),

    /// Print shell completions and aliases
    ShellIntegration(ShellIntegrationArgs),

    /// Configuration management
    #[command(subcommand, hide = true)]
    Config(ConfigCommands),
}

impl Cli {
    pub async fn run(&self) -> anyhow::Result<()> {
        match &self.command {
            Commands::Clone(args) => clone::run(args).await,
            Commands::Pull(args) => pull::run(args).await,
            Commands::Push(args) => push::run(args).await,
            Commands::Diff(args) => diff::run(args).await,
            Commands::Init(args) => init::run(args).await,
            Commands::Create(args) => create::run(args).await,
            Commands::Open(args) => open::run(args),
            Commands::Show(args) => show::run(args),
            Commands::Upload(args) => upload::run(args).await,
            Commands::IngestAttachments(args) => ingest_attachments::run(args).await,
            Commands::ShellIntegration(args) => shell_integration::run(args),
            Commands::Config(command) => command.run(),
        }
    }
}
