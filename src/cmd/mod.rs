//! CLI command implementations.
//!
//! | Module     | Commands handled                                                |
//! |------------|-----------------------------------------------------------------|
//! | `articles` | `List`, `Show`, `Create`, `Edit`, `Publish`, `Unpublish`, `Delete` |
//! | `session`  | `Login`, `Register`, `Logout`, `Whoami`                         |
//! | `browse`   | `Browse`                                                        |

pub mod articles;
pub mod browse;
pub mod session;

pub use articles::{
    ArticleInput, cmd_create, cmd_delete, cmd_edit, cmd_list, cmd_publish, cmd_show,
};
pub use browse::cmd_browse;
pub use session::{cmd_login, cmd_logout, cmd_register, cmd_whoami};

use anyhow::{Context, Result};
use folio::gate::{AutoConfirm, ConfirmationGate, TerminalGate, TerminalNavigator, TerminalNotifier};
use folio::mutation::MutationCoordinator;
use folio::{CliOverrides, Client, ClientConfig};
use folio_model::ArticleId;
use std::sync::Arc;

use super::Cli;

/// Resolve configuration and open a client. No network traffic.
pub(crate) fn connect(cli: &Cli) -> Result<Client> {
    let config = ClientConfig::load(CliOverrides {
        api_url: cli.api_url.clone(),
        state_dir: cli.state_dir.clone(),
    })
    .context("Failed to load configuration")?;
    Client::connect(config)
}

/// Open a client and resolve any stored session against the server.
pub(crate) async fn connect_signed_in(cli: &Cli) -> Result<Client> {
    let client = connect(cli)?;
    client.auth.bootstrap().await;
    Ok(client)
}

pub(crate) fn gate(cli: &Cli) -> Arc<dyn ConfirmationGate> {
    if cli.yes {
        Arc::new(AutoConfirm)
    } else {
        Arc::new(TerminalGate)
    }
}

pub(crate) fn terminal_mutations(cli: &Cli, client: &Client) -> MutationCoordinator {
    client.mutations(
        gate(cli),
        Arc::new(TerminalNotifier),
        Arc::new(TerminalNavigator),
    )
}

pub(crate) fn parse_id(raw: &str) -> Result<ArticleId> {
    Ok(raw.parse::<ArticleId>()?)
}
