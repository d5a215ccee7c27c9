//! CLI handlers for `login` and `config`.

use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use crate::config::FlowConfig;
use crate::flow::{FlowDriver, FlowState, Intent, IntentSender, Model, TracingObserver};
use crate::transport::HttpTransport;

use super::LoginArgs;

/// Handle `device-flow login`.
pub async fn handle_login(
    config_path: Option<&Path>,
    args: &LoginArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = FlowConfig::resolve(config_path)?;
    args.apply(&mut config);
    config.validate()?;
    let manual = !config.polling_enabled;

    let handle = FlowDriver::new(config, Arc::new(HttpTransport::new()))
        .with_observer(Arc::new(TracingObserver))
        .spawn();
    handle.send(Intent::Connect)?;

    let issued = handle
        .wait_for(|m| !matches!(m.state, FlowState::Welcome | FlowState::Connecting))
        .await?;
    if let Some(codes) = &issued.codes {
        println!("🔗 Visit: {}", codes.verification_url);
        println!("📋 Enter code: {}", codes.user_code);
        match codes.expires_at() {
            Some(expires_at) => println!(
                "⏳ Waiting for authorization (code expires {})...",
                expires_at.format("%H:%M:%S")
            ),
            None => println!("⏳ Waiting for authorization..."),
        }
        if manual {
            println!("   Polling is off; press Enter to check for a token.");
            check_on_enter(handle.sender());
        }
    }

    let done = handle.wait_for(|m| m.state.is_terminal()).await?;
    handle.shutdown().await;
    report(&done)
}

/// Forward each line on stdin as a `GetToken` intent.
///
/// Runs on a detached OS thread; a read pending on the runtime's blocking
/// pool would keep the process alive after the flow ends.
fn check_on_enter(sender: IntentSender) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if line.is_err() || sender.send(Intent::GetToken).is_err() {
                break;
            }
        }
    });
}

fn report(model: &Model) -> Result<(), Box<dyn std::error::Error>> {
    match model.state {
        FlowState::Authorized => {
            println!("✅ Authorized!");
            if let Some(token) = &model.token {
                println!("   Token type: {}", token.token_type);
                println!("   Access token: {}", mask(&token.access_token));
                println!("   Expires in: {}s", token.expires_in_secs);
            }
            Ok(())
        }
        FlowState::Denied => Err("authorization denied".into()),
        _ => Err(model
            .last_error
            .clone()
            .unwrap_or_else(|| "device flow failed".to_string())
            .into()),
    }
}

fn mask(secret: &str) -> String {
    let prefix: String = secret.chars().take(4).collect();
    format!("{prefix}…")
}

/// Handle `device-flow config`.
pub fn handle_config(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = FlowConfig::resolve(config_path)?;
    if let Some(path) = config_path.map(Path::to_path_buf).or_else(FlowConfig::default_path) {
        println!("# {}", path.display());
    }
    print!("{}", config.to_redacted_toml()?);
    Ok(())
}
