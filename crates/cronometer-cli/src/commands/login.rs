//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;

use super::AccountArgs;

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[command(flatten)]
    pub account: AccountArgs,
}

pub async fn run(args: LoginArgs) -> Result<()> {
    let client = args.account.client()?;

    output::progress("Logging in...");

    let session = client.login().await.context("Failed to login")?;

    output::success("Logged in successfully");
    output::field("User ID", &session.user_id().to_string());
    output::field("Service", client.config().service.as_str());

    Ok(())
}
