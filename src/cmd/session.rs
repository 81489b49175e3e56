//! Account commands: `folio login|register|logout|whoami`.

use anyhow::{Context, Result};
use console::style;
use dialoguer::Password;
use folio::api::Registration;
use folio::errors::AuthError;
use folio::ui::icons::{CHECK, USER};

use super::{Cli, connect, connect_signed_in};

pub async fn cmd_login(cli: &Cli, username: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .interact()
            .context("Failed to read password")?,
    };
    let client = connect(cli)?;

    let identity = client
        .auth
        .login(username, &password)
        .await
        .context("Login failed")?;
    println!("{}Signed in as {}", CHECK, style(&identity.username).bold());
    Ok(())
}

pub async fn cmd_register(
    cli: &Cli,
    username: &str,
    email: &str,
    first_name: Option<&str>,
    last_name: Option<&str>,
) -> Result<()> {
    let password = Password::new()
        .with_prompt("Password")
        .interact()
        .context("Failed to read password")?;
    let password2 = Password::new()
        .with_prompt("Confirm password")
        .interact()
        .context("Failed to read password")?;
    let registration = Registration {
        username: username.to_string(),
        email: email.to_string(),
        password,
        password2,
        first_name: first_name.unwrap_or_default().to_string(),
        last_name: last_name.unwrap_or_default().to_string(),
    };
    let client = connect(cli)?;

    match client.auth.register(&registration).await {
        Ok(Some(identity)) => {
            println!(
                "{}Registered and signed in as {}",
                CHECK,
                style(&identity.username).bold()
            );
            Ok(())
        }
        Ok(None) => {
            println!(
                "{}Registered. Sign in with `folio login {}`",
                CHECK, username
            );
            Ok(())
        }
        Err(AuthError::Request(err)) => {
            if let Some(fields) = err.field_errors() {
                for (field, messages) in fields {
                    eprintln!("  {}: {}", style(field).red(), messages.join(" "));
                }
            }
            Err(err).context("Registration failed")
        }
        Err(err) => Err(err).context("Registration failed"),
    }
}

pub async fn cmd_logout(cli: &Cli) -> Result<()> {
    let client = connect(cli)?;
    match client.auth.logout().await {
        Ok(()) => println!("{}Signed out", CHECK),
        Err(AuthError::Request(err)) => {
            // Local tokens are already gone.
            eprintln!(
                "{} server did not confirm logout: {}",
                style("Warning:").yellow(),
                err
            );
            println!("{}Signed out locally", CHECK);
        }
        Err(err) => return Err(err).context("Logout failed"),
    }
    Ok(())
}

pub async fn cmd_whoami(cli: &Cli) -> Result<()> {
    let client = connect_signed_in(cli).await?;
    match client.session.current().username() {
        Some(username) => println!("{}{}", USER, username),
        None => println!("Not signed in"),
    }
    Ok(())
}
