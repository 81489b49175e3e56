//! Interactive catalog: `folio browse`.
//!
//! Each input line replaces a filter field, the way a keystroke does in a
//! search box, so the catalog debounce applies between lines. Rendering
//! happens whenever a new list result lands. Signing in or out from here
//! changes the session the catalog watches, which reloads the list.

use anyhow::{Context, Result};
use console::style;
use dialoguer::Password;
use folio::api::{ArticleApi, AuthApi};
use folio::catalog::{CatalogHandle, CatalogView};
use folio::detail::{self, DetailState};
use folio::errors::AuthError;
use folio::mutation::{MutationCoordinator, Outcome};
use folio::ui::icons::CHECK;
use folio::ui::{render_article, render_catalog, terminal_width};
use folio_model::ArticleId;
use std::io::BufRead;
use tokio::sync::watch;

use super::{Cli, connect_signed_in, terminal_mutations};

#[derive(Debug, Clone, PartialEq, Eq)]
enum BrowseCommand {
    Search(String),
    Tags(String),
    Drafts(bool),
    Open(ArticleId),
    Publish(ArticleId),
    Unpublish(ArticleId),
    Delete(ArticleId),
    Login(String),
    Logout,
    Refresh,
    Help,
    Quit,
}

fn parse_line(line: &str) -> Result<BrowseCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let id = || {
        rest.parse::<ArticleId>()
            .map_err(|_| format!("'{}' needs an article id", word))
    };

    match word {
        "search" | "s" => Ok(BrowseCommand::Search(rest.to_string())),
        "tags" | "t" => Ok(BrowseCommand::Tags(rest.to_string())),
        "drafts" => match rest {
            "on" => Ok(BrowseCommand::Drafts(true)),
            "off" => Ok(BrowseCommand::Drafts(false)),
            _ => Err("usage: drafts on|off".to_string()),
        },
        "open" | "o" => id().map(BrowseCommand::Open),
        "publish" => id().map(BrowseCommand::Publish),
        "unpublish" => id().map(BrowseCommand::Unpublish),
        "delete" => id().map(BrowseCommand::Delete),
        "login" if !rest.is_empty() => Ok(BrowseCommand::Login(rest.to_string())),
        "login" => Err("usage: login <username>".to_string()),
        "logout" => Ok(BrowseCommand::Logout),
        "refresh" | "r" => Ok(BrowseCommand::Refresh),
        "help" | "?" => Ok(BrowseCommand::Help),
        "quit" | "q" | "exit" => Ok(BrowseCommand::Quit),
        other => Err(format!("Unknown command '{}'. Type 'help'.", other)),
    }
}

fn print_help() {
    println!("{}", style("Commands").bold());
    println!("  search <text>      match title or content (empty clears)");
    println!("  tags <a, b>        filter by tags (empty clears)");
    println!("  drafts on|off      include your unpublished articles");
    println!("  open <id>          read an article");
    println!("  publish <id>       publish a draft");
    println!("  unpublish <id>     return an article to draft");
    println!("  delete <id>        delete an article");
    println!("  login <username>   sign in (drafts become visible)");
    println!("  logout             sign out");
    println!("  refresh            reload the list");
    println!("  quit");
}

/// Services the input loop acts on.
struct Browser {
    catalog: CatalogHandle,
    mutations: MutationCoordinator,
    articles: ArticleApi,
    auth: AuthApi,
    width: usize,
}

pub async fn cmd_browse(cli: &Cli) -> Result<()> {
    let client = connect_signed_in(cli).await?;
    let catalog = client.catalog();
    let width = terminal_width();
    let browser = Browser {
        catalog: catalog.clone(),
        mutations: terminal_mutations(cli, &client).with_catalog(catalog.clone()),
        articles: client.articles.clone(),
        auth: client.auth.clone(),
        width,
    };

    let renderer = tokio::spawn(render_loop(catalog.subscribe(), width));
    print_help();

    let runtime = tokio::runtime::Handle::current();
    // Prompts from the confirmation gate read the terminal too, so input
    // is handled on one blocking thread, one line at a time.
    let input = tokio::task::spawn_blocking(move || -> Result<()> {
        for line in std::io::stdin().lock().lines() {
            let line = line.context("Failed to read input")?;
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(&line) {
                Ok(BrowseCommand::Quit) => break,
                Ok(command) => runtime.block_on(browser.run(command))?,
                Err(message) => eprintln!("{}", style(message).yellow()),
            }
        }
        Ok(())
    });

    let result = input.await.context("Input loop failed");
    catalog.shutdown().await;
    renderer.abort();
    result?
}

impl Browser {
    async fn run(&self, command: BrowseCommand) -> Result<()> {
        match command {
            BrowseCommand::Search(text) => self.catalog.set_search(text)?,
            BrowseCommand::Tags(text) => self.catalog.set_tags(text)?,
            BrowseCommand::Drafts(on) => self.catalog.set_include_unpublished(on)?,
            BrowseCommand::Refresh => {
                self.catalog.refresh().await?;
            }
            BrowseCommand::Open(id) => match detail::load(&self.articles, &id).await {
                DetailState::Loaded(article) => {
                    println!("\n{}\n", render_article(&article, self.width))
                }
                DetailState::NotFound => println!("Article {} not found.", id),
                DetailState::Failed(message) => eprintln!("{}", style(message).red()),
            },
            // Failures have already been shown by the notifier.
            BrowseCommand::Publish(id) => {
                let _ = self.mutations.publish(&id).await;
            }
            BrowseCommand::Unpublish(id) => {
                let _ = self.mutations.unpublish(&id).await;
            }
            BrowseCommand::Delete(id) => {
                if let Ok(Outcome::Declined) = self.mutations.delete(&id).await {
                    println!("Cancelled.");
                }
            }
            BrowseCommand::Login(username) => self.login(&username).await,
            BrowseCommand::Logout => match self.auth.logout().await {
                Ok(()) => println!("{}Signed out", CHECK),
                Err(AuthError::Request(err)) => eprintln!(
                    "{} server did not confirm logout: {}",
                    style("Warning:").yellow(),
                    err
                ),
                Err(err) => return Err(err).context("Logout failed"),
            },
            BrowseCommand::Help => print_help(),
            BrowseCommand::Quit => {}
        }
        Ok(())
    }

    async fn login(&self, username: &str) {
        let password = match Password::new().with_prompt("Password").interact() {
            Ok(password) => password,
            Err(e) => {
                eprintln!("{} {}", style("Failed to read password:").red(), e);
                return;
            }
        };
        match self.auth.login(username, &password).await {
            Ok(identity) => println!("{}Signed in as {}", CHECK, style(&identity.username).bold()),
            Err(err) => eprintln!("{} {}", style("Login failed:").red(), err),
        }
    }
}

async fn render_loop(mut views: watch::Receiver<CatalogView>, width: usize) {
    let mut shown = 0;
    while views.changed().await.is_ok() {
        let view = views.borrow_and_update().clone();
        if view.loading || view.applied_seq == shown {
            continue;
        }
        shown = view.applied_seq;
        println!("\n{}\n", render_catalog(&view, width));
    }
}
