//! CLI entry point for device-grant.

pub mod login;
pub mod presenter;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::config::ConfigFile;

/// OAuth 2.0 device authorization grant client
#[derive(Parser, Debug)]
#[command(name = "device-grant", version, about = "OAuth 2.0 device authorization grant client")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in with the device code flow and print the issued tokens
    Login(LoginArgs),
}

/// Arguments for `device-grant login`.
#[derive(Parser, Debug)]
pub struct LoginArgs {
    /// Issuer base URL (the device code and token endpoints hang off it)
    #[arg(long, conflicts_with = "tenant")]
    pub issuer: Option<String>,

    /// Microsoft identity platform tenant id or domain
    #[arg(long)]
    pub tenant: Option<String>,

    /// OAuth client id
    #[arg(long)]
    pub client_id: Option<String>,

    /// Space-delimited scopes to request
    #[arg(long)]
    pub scope: Option<String>,

    /// Config file (defaults to ~/.device-grant/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Do not try to open a browser
    #[arg(long)]
    pub no_browser: bool,

    /// Stop polling once the device code's lifetime has elapsed
    #[arg(long)]
    pub enforce_expiry: bool,

    /// Print the token set as JSON
    #[arg(long)]
    pub json: bool,
}

impl LoginArgs {
    /// The configuration layer contributed by command-line flags.
    pub fn config_layer(&self) -> ConfigFile {
        ConfigFile {
            issuer: self.issuer.clone(),
            tenant: self.tenant.clone(),
            client_id: self.client_id.clone(),
            scope: self.scope.clone(),
            enforce_expiry: self.enforce_expiry.then_some(true),
            ..ConfigFile::default()
        }
    }
}
