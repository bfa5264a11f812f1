//! Saved-account command handlers.

use std::sync::Arc;
use std::time::Duration;

use riftwatch_config::Config;
use riftwatch_core::{Account, AccountStore, LoginCoordinator, ProcessLauncher};
use tabled::Tabled;

use crate::cli::{AccountsArgs, AccountsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct AccountRow {
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Server")]
    server: String,
    #[tabled(rename = "Riot ID")]
    riot_id: String,
    #[tabled(rename = "Level")]
    level: String,
    #[tabled(rename = "Rank")]
    rank: String,
    #[tabled(rename = "BE")]
    blue_essence: String,
}

fn or_dash<T: ToString>(v: Option<&T>) -> String {
    v.map_or_else(|| "-".into(), ToString::to_string)
}

fn account_row(a: &Account) -> AccountRow {
    AccountRow {
        username: a.username.clone(),
        server: or_dash(a.server.as_ref()),
        riot_id: or_dash(a.riot_id.as_ref()),
        level: or_dash(a.level.as_ref()),
        rank: or_dash(a.rank.as_ref()),
        blue_essence: or_dash(a.blue_essence.as_ref()),
    }
}

/// Passwords never reach the terminal, whatever the output format.
fn redacted(mut account: Account) -> Account {
    account.password = None;
    account
}

pub async fn handle(cfg: &Config, args: AccountsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let store = Arc::new(AccountStore::new(cfg.accounts_file()));
    match args.command {
        AccountsCommand::List => {
            let accounts: Vec<Account> = store.load_all().await?.into_iter().map(redacted).collect();
            let out = output::render_list(&global.output, &accounts, account_row, |a| {
                a.username.clone()
            });
            output::print_output(&out, global.quiet);
        }

        AccountsCommand::Add {
            username,
            server,
            riot_id,
            password,
        } => {
            let mut account = Account::new(username);
            account.server = server;
            account.riot_id = riot_id;
            if password {
                let secret = rpassword::prompt_password("Password: ")?;
                account.password = Some(secret).filter(|s| !s.is_empty());
            }
            let saved = store.upsert(account).await?;
            output::print_done(&format!("Saved account '{}'", saved.username), global.quiet);
        }

        AccountsCommand::Remove { username } => {
            if !util::confirm(
                "accounts remove",
                &format!("Delete saved account '{username}'?"),
                global.yes,
            )? {
                return Ok(());
            }
            if !store.remove(&username).await? {
                return Err(CliError::AccountNotFound { username });
            }
            output::print_done(&format!("Removed account '{username}'"), global.quiet);
        }

        AccountsCommand::Login { username, wait } => {
            let conn = super::build(cfg, global);
            let launcher = Arc::new(ProcessLauncher::new(cfg.accounts.launcher.clone()));
            let login = LoginCoordinator::new(Arc::clone(&store), launcher, conn.poller.clone());
            login.login(&username).await?;
            output::print_done(&format!("Launching the Riot Client for '{username}'"), global.quiet);

            match wait {
                Some(secs) => {
                    if !login.wait_connected(Duration::from_secs(secs)).await {
                        return Err(CliError::LoginTimeout { secs });
                    }
                    output::print_done("League client connected", global.quiet);
                }
                None => conn.poller.stop().await,
            }
        }
    }
    Ok(())
}
