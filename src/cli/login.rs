//! `device-grant login` handler.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::presenter::TerminalPresenter;
use super::LoginArgs;
use crate::auth::TokenResult;
use crate::config::DeviceGrantConfig;
use crate::flow::DeviceFlow;

/// Handle `device-grant login`.
pub async fn handle_login(args: LoginArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = DeviceGrantConfig::load_with(args.config.as_deref(), args.config_layer())?;
    tracing::info!(issuer = config.issuer(), "starting device authorization");

    let flow = DeviceFlow::new(config, Arc::new(TerminalPresenter))?.with_browser(!args.no_browser);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let token = flow.run(&cancel).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&token)?);
    } else {
        print_token(&token);
    }
    Ok(())
}

fn print_token(token: &TokenResult) {
    println!("Access token: ");
    println!("{}", token.access_token);
    if let Some(id_token) = &token.id_token {
        println!("ID token: ");
        println!("{id_token}");
    }
    if let Some(refresh_token) = &token.refresh_token {
        println!("Refresh token: ");
        println!("{refresh_token}");
    }
}
