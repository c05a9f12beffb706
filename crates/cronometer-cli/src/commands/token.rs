//! Token command implementation.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::output;

use super::AccountArgs;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[command(flatten)]
    pub account: AccountArgs,

    /// Output the token and user id as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct TokenOutput<'a> {
    user_id: i64,
    token: &'a str,
}

pub async fn run(args: TokenArgs) -> Result<()> {
    let client = args.account.client()?;

    output::progress("Generating authorization token...");

    let (token, session) = client
        .valid_token()
        .await
        .context("Failed to generate authorization token")?;

    if args.json {
        output::json(&TokenOutput {
            user_id: session.user_id(),
            token: token.as_str(),
        })?;
    } else {
        println!("{}", token.as_str());
    }

    Ok(())
}
