use {
    anyhow::Result,
    chrono::{Local, TimeZone},
    clap::Subcommand,
    nestread_oauth::{TokenManager, TokenStatus},
};

#[derive(Subcommand)]
pub enum TokenAction {
    /// Show whether the stored access token is still valid.
    Status,
    /// Request a new access token now, even if the current one is valid.
    Refresh,
}

pub async fn handle_token(action: TokenAction, tokens: &TokenManager<'_>) -> Result<()> {
    match action {
        TokenAction::Status => status(tokens),
        TokenAction::Refresh => refresh(tokens).await,
    }
}

fn status(tokens: &TokenManager<'_>) -> Result<()> {
    let line = match tokens.status()? {
        TokenStatus::NeverExpires => "valid (never expires)".to_string(),
        TokenStatus::Unknown => "unknown (no lifetime recorded, will refresh on next use)".to_string(),
        TokenStatus::Valid { expires_at } => {
            let remaining = expires_at - Local::now().timestamp();
            let hours = remaining / 3600;
            let mins = (remaining % 3600) / 60;
            format!(
                "valid ({hours}h {mins}m remaining, expires {})",
                describe(expires_at)
            )
        },
        TokenStatus::Expired { expires_at } => format!("expired ({})", describe(expires_at)),
    };
    println!("access token: {line}");
    Ok(())
}

async fn refresh(tokens: &TokenManager<'_>) -> Result<()> {
    let token = tokens.get_valid_token(true).await?;
    let expiry = token
        .timing
        .and_then(|t| t.expires_at())
        .map_or_else(|| "never".to_string(), describe);
    println!("access token refreshed, expires {expiry}");
    Ok(())
}

fn describe(epoch_secs: i64) -> String {
    Local
        .timestamp_opt(epoch_secs, 0)
        .single()
        .map_or_else(|| epoch_secs.to_string(), |t| t.to_rfc3339())
}
