//! Login, logout and the cached profile.

use pantry_client::ApiClient;
use secrecy::SecretString;

use super::{CliError, accepted};

/// Log in and persist the session.
pub async fn login(
    client: &ApiClient,
    identifier: &str,
    password: Option<String>,
) -> Result<(), CliError> {
    let password = password
        .filter(|p| !p.is_empty())
        .map(SecretString::from)
        .ok_or(CliError::MissingPassword)?;

    accepted(client.login(identifier, &password).await?)?;

    let profile = client.user_data();
    tracing::info!(
        "Logged in as {} ({})",
        profile.email.as_deref().unwrap_or(identifier),
        profile.role.as_deref().unwrap_or("unknown role")
    );
    Ok(())
}

/// Forget the stored session.
pub fn logout(client: &ApiClient) -> Result<(), CliError> {
    client.logout()?;
    Ok(())
}

/// Show the cached profile without touching the network.
pub fn whoami(client: &ApiClient) -> Result<(), CliError> {
    if !client.is_authenticated() {
        tracing::info!("Not logged in");
        return Ok(());
    }
    super::print_json(&client.user_data())
}
