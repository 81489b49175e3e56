//! Article commands: `folio list|show|create|edit|publish|unpublish|delete`.

use anyhow::{Context, Result};
use console::style;
use folio::catalog::{FETCH_FAILED_MESSAGE, compose_query};
use folio::detail::{self, DetailState};
use folio::mutation::Outcome;
use folio::ui::icons::CHECK;
use folio::ui::{Spinner, render_article, render_article_row, terminal_width};
use folio_model::{Article, ArticleFields, Tags};
use std::path::PathBuf;

use super::{Cli, connect, connect_signed_in, parse_id, terminal_mutations};

/// Field values given on the command line for create/edit.
#[derive(Debug, Clone, Default)]
pub struct ArticleInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub content_file: Option<PathBuf>,
    pub tags: Option<String>,
}

impl ArticleInput {
    fn content(&self) -> Result<Option<String>> {
        match &self.content_file {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))
                .map(Some),
            None => Ok(self.content.clone()),
        }
    }

    /// Fields for a new article; anything missing is blank.
    fn into_new_fields(self) -> Result<ArticleFields> {
        let content = self.content()?.unwrap_or_default();
        Ok(ArticleFields::new(
            self.title.unwrap_or_default(),
            content,
            Tags::parse(self.tags.as_deref().unwrap_or("")),
        ))
    }

    /// Fields for an edit, keeping the server value for anything not given.
    fn merge_into(self, current: &Article) -> Result<ArticleFields> {
        let mut fields = ArticleFields::from(current);
        if let Some(content) = self.content()? {
            fields.content = content;
        }
        if let Some(title) = self.title {
            fields.title = title;
        }
        if let Some(tags) = self.tags {
            fields.tags = Tags::parse(&tags);
        }
        Ok(fields)
    }
}

pub async fn cmd_list(
    cli: &Cli,
    search: Option<&str>,
    tags: Option<&str>,
    include_unpublished: bool,
) -> Result<()> {
    let client = connect_signed_in(cli).await?;
    let signed_in = client.session.current().is_signed_in();
    if include_unpublished && !signed_in {
        eprintln!(
            "{} drafts are only listed for signed-in users",
            style("Note:").yellow()
        );
    }

    let query = compose_query(
        search.unwrap_or(""),
        tags.unwrap_or(""),
        include_unpublished,
        signed_in,
    );
    let spinner = Spinner::start("Loading articles...");
    let articles = match client.articles.list(&query).await {
        Ok(articles) => {
            spinner.clear();
            articles
        }
        Err(err) => {
            spinner.fail(FETCH_FAILED_MESSAGE);
            return Err(err).context(FETCH_FAILED_MESSAGE);
        }
    };

    if articles.is_empty() {
        println!("No articles found.");
        return Ok(());
    }
    for article in &articles {
        println!("{}", render_article_row(article));
    }
    println!();
    println!("{} article(s)", articles.len());
    Ok(())
}

pub async fn cmd_show(cli: &Cli, id: &str) -> Result<()> {
    let id = parse_id(id)?;
    let client = connect_signed_in(cli).await?;

    match detail::load(&client.articles, &id).await {
        DetailState::Loaded(article) => {
            println!("{}", render_article(&article, terminal_width()));
            Ok(())
        }
        DetailState::NotFound => anyhow::bail!("Article {} not found", id),
        DetailState::Failed(message) => anyhow::bail!(message),
    }
}

pub async fn cmd_create(cli: &Cli, input: ArticleInput) -> Result<()> {
    let fields = input.into_new_fields()?;
    let client = connect(cli)?;
    let mutations = terminal_mutations(cli, &client);

    match mutations.create(&fields).await {
        Ok(article) => {
            println!(
                "{}Created article #{} \"{}\"",
                CHECK, article.id, article.title
            );
            Ok(())
        }
        Err(err) => {
            mutations.wait_for_redirects().await;
            Err(err).context("Failed to create article")
        }
    }
}

pub async fn cmd_edit(cli: &Cli, id: &str, input: ArticleInput) -> Result<()> {
    let id = parse_id(id)?;
    let client = connect(cli)?;
    let current = client
        .articles
        .get(&id)
        .await
        .context("Failed to fetch article")?;
    let fields = input.merge_into(&current)?;
    let mutations = terminal_mutations(cli, &client);

    match mutations.update(&id, &fields).await {
        Ok(article) => {
            println!("{}Saved article #{} \"{}\"", CHECK, id, article.title);
            Ok(())
        }
        Err(err) => {
            mutations.wait_for_redirects().await;
            Err(err).context("Failed to update article")
        }
    }
}

pub async fn cmd_publish(cli: &Cli, id: &str, publish: bool) -> Result<()> {
    let id = parse_id(id)?;
    let client = connect(cli)?;
    let mutations = terminal_mutations(cli, &client);

    if publish {
        mutations.publish(&id).await.context("Publish failed")?;
        println!("{}Published article #{}", CHECK, id);
    } else {
        mutations.unpublish(&id).await.context("Unpublish failed")?;
        println!("{}Article #{} is a draft again", CHECK, id);
    }
    Ok(())
}

pub async fn cmd_delete(cli: &Cli, id: &str) -> Result<()> {
    let id = parse_id(id)?;
    let client = connect(cli)?;
    let mutations = terminal_mutations(cli, &client);

    match mutations
        .delete_and_leave(&id)
        .await
        .context("Delete failed")?
    {
        Outcome::Applied => println!("{}Deleted article #{}", CHECK, id),
        Outcome::Declined => println!("Cancelled."),
    }
    Ok(())
}
