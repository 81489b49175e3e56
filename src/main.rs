use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version, about = "Terminal client for a blog publishing API")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip confirmation prompts
    #[arg(long, global = true)]
    pub yes: bool,

    /// API root, e.g. http://localhost:8001/api. Overrides FOLIO_API_URL and folio.toml.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory holding folio.toml and the saved session (default ~/.folio)
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List articles
    List {
        /// Match title or content
        #[arg(short, long)]
        search: Option<String>,
        /// Comma-separated tag filter
        #[arg(short, long)]
        tags: Option<String>,
        /// Include your unpublished drafts (signed in only)
        #[arg(short, long)]
        all: bool,
    },
    /// Show one article
    Show { id: String },
    /// Create an article
    Create {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        /// Read content from a file instead of --content
        #[arg(long, conflicts_with = "content")]
        content_file: Option<PathBuf>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// Edit an article; omitted fields keep their current value
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long, conflicts_with = "content")]
        content_file: Option<PathBuf>,
        #[arg(long)]
        tags: Option<String>,
    },
    /// Publish a draft
    Publish { id: String },
    /// Return an article to draft
    Unpublish { id: String },
    /// Delete an article
    Delete { id: String },
    /// Sign in
    Login {
        username: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Interactive catalog with live search
    Browse,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    folio::logging::init(cli.verbose);

    match &cli.command {
        Commands::List { search, tags, all } => {
            let (search, tags) = (search.as_deref(), tags.as_deref());
            cmd::cmd_list(&cli, search, tags, *all).await?
        }
        Commands::Show { id } => cmd::cmd_show(&cli, id).await?,
        Commands::Create {
            title,
            content,
            content_file,
            tags,
        } => {
            let input = cmd::ArticleInput {
                title: title.clone(),
                content: content.clone(),
                content_file: content_file.clone(),
                tags: tags.clone(),
            };
            cmd::cmd_create(&cli, input).await?
        }
        Commands::Edit {
            id,
            title,
            content,
            content_file,
            tags,
        } => {
            let input = cmd::ArticleInput {
                title: title.clone(),
                content: content.clone(),
                content_file: content_file.clone(),
                tags: tags.clone(),
            };
            cmd::cmd_edit(&cli, id, input).await?
        }
        Commands::Publish { id } => cmd::cmd_publish(&cli, id, true).await?,
        Commands::Unpublish { id } => cmd::cmd_publish(&cli, id, false).await?,
        Commands::Delete { id } => cmd::cmd_delete(&cli, id).await?,
        Commands::Login { username, password } => {
            cmd::cmd_login(&cli, username, password.clone()).await?
        }
        Commands::Register {
            username,
            email,
            first_name,
            last_name,
        } => {
            cmd::cmd_register(
                &cli,
                username,
                email,
                first_name.as_deref(),
                last_name.as_deref(),
            )
            .await?
        }
        Commands::Logout => cmd::cmd_logout(&cli).await?,
        Commands::Whoami => cmd::cmd_whoami(&cli).await?,
        Commands::Browse => cmd::cmd_browse(&cli).await?,
    }

    Ok(())
}
