//! Command implementations for the caseflow shell.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::warn;

use caseflow_core::config::Config;
use caseflow_core::router::RouteTable;
use caseflow_core::{AppContext, Identity, LoginRequest, MessageLog, NavigationOutcome};

pub struct Shell {
    config: Config,
    ctx: AppContext,
    messages: Arc<MessageLog>,
}

impl Shell {
    pub fn new(config: Config) -> Result<Self> {
        let storage = config.token_store().context("Failed to open credential storage")?;
        let messages = Arc::new(MessageLog::new());
        let ctx = AppContext::new(&config, storage, messages.clone())?;
        Ok(Self { config, ctx, messages })
    }

    /// Print notifications raised by the HTTP pipeline, oldest first
    pub fn flush_notifications(&self) {
        for notification in self.messages.drain() {
            eprintln!("! {}", notification);
        }
    }

    pub async fn login(&self, username: Option<String>) -> Result<()> {
        let username = match choose_username(username, self.config.last_username.as_deref()) {
            Some(u) => u,
            None => prompt_username()?,
        };
        let password = match std::env::var("CASEFLOW_PASSWORD") {
            Ok(p) if !p.is_empty() => p,
            _ => rpassword::prompt_password("Password: ")?,
        };

        let identity = self
            .ctx
            .store
            .login(&LoginRequest::new(username.clone(), password))
            .await
            .context("Login failed")?;

        let mut config = self.config.clone();
        config.last_username = Some(username);
        if let Err(e) = config.save() {
            warn!(error = %e, "Failed to save config");
        }

        match identity {
            Some(identity) => println!("Logged in as {}", describe_identity(&identity)),
            None => anyhow::bail!("Logged in, but the profile could not be loaded"),
        }
        Ok(())
    }

    pub fn logout(&self) -> Result<()> {
        self.ctx.store.logout();
        println!("Logged out");
        Ok(())
    }

    pub async fn whoami(&self) -> Result<()> {
        if !self.ctx.session.has_credential() {
            anyhow::bail!("Not logged in");
        }
        match self.ctx.store.fetch_identity().await? {
            Some(identity) => {
                println!("{}", describe_identity(&identity));
                Ok(())
            }
            None => anyhow::bail!("Not logged in"),
        }
    }

    pub async fn visit(&self, path: &str) -> Result<()> {
        let outcome = self.ctx.router.push(path).await?;
        println!("{}", describe_outcome(&outcome));
        Ok(())
    }

    pub fn routes(&self) -> Result<()> {
        print!("{}", format_routes(self.ctx.router.table()));
        Ok(())
    }
}

/// Explicit username first, then the one used last time.
fn choose_username(explicit: Option<String>, last: Option<&str>) -> Option<String> {
    explicit
        .filter(|u| !u.trim().is_empty())
        .or_else(|| last.filter(|u| !u.is_empty()).map(str::to_string))
}

fn prompt_username() -> Result<String> {
    print!("Email: ");
    io::stdout().flush()?;

    let mut username = String::new();
    io::stdin().read_line(&mut username)?;
    let username = username.trim().to_string();
    if username.is_empty() {
        anyhow::bail!("Username required");
    }
    Ok(username)
}

fn describe_identity(identity: &Identity) -> String {
    format!(
        "{} <{}> ({}{})",
        identity.display_name(),
        identity.email,
        identity.role.as_str(),
        if identity.is_superuser { ", superuser" } else { "" }
    )
}

fn describe_outcome(outcome: &NavigationOutcome) -> String {
    match outcome {
        NavigationOutcome::Rendered(route) => {
            format!("{} ({})", route.full_path, route.name.as_deref().unwrap_or("-"))
        }
        NavigationOutcome::Redirected { from, to } => format!("{} -> {}", from, to.full_path),
        NavigationOutcome::Superseded { requested, current } => format!(
            "{} abandoned, now at {}",
            requested,
            current.as_deref().unwrap_or("-")
        ),
    }
}

fn format_routes(table: &RouteTable) -> String {
    let mut out = String::new();
    for route in table.flatten() {
        out.push_str(&format!(
            "{:<12} {:<14}{}\n",
            route.path,
            route.name.as_deref().unwrap_or("-"),
            if route.requires_auth { " [auth]" } else { "" }
        ));
    }
    out
}
