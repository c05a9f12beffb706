//! Subcommand implementations.

mod export;
mod login;
mod token;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use cronometer::{Client, ClientConfig, Credentials, ServiceUrl};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and show the account's user id
    Login(login::LoginArgs),

    /// Mint a fresh export authorization token
    Token(token::TokenArgs),

    /// Stream a data export to stdout or a file
    Export(export::ExportArgs),
}

pub async fn handle(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Login(args) => login::run(args).await,
        Commands::Token(args) => token::run(args).await,
        Commands::Export(args) => export::run(args).await,
    }
}

/// Account and service options shared by every subcommand.
#[derive(Args, Debug)]
pub struct AccountArgs {
    /// Account username (email address)
    #[arg(long, env = "CRONOMETER_USERNAME")]
    pub username: String,

    /// Account password
    #[arg(long, env = "CRONOMETER_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Service base URL
    #[arg(long, env = "CRONOMETER_URL", default_value = "https://cronometer.com")]
    pub url: String,
}

impl AccountArgs {
    pub fn client(&self) -> Result<Client> {
        let service = ServiceUrl::new(&self.url).context("Invalid service URL")?;
        Ok(Client::with_config(
            ClientConfig::for_service(service),
            Credentials::new(&self.username, &self.password),
        ))
    }
}
