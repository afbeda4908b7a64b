// Cloud account operations
//
// First stage of the remote handshake: trade account credentials for an
// account-level token, then list the devices linked to the account. The
// per-device second stage lives on `Controller::login_remote`.

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tracing::debug;

use crate::auth::CloudEndpoints;
use crate::error::Error;
use crate::models::{Sprinkler, SprinklerList, TokenResponse};
use crate::transport::{PendingRequest, Transport};

fn user_body(email: &str, password: &SecretString) -> Value {
    json!({
        "user": {
            "email": email,
            "pwd": password.expose_secret(),
            "remember": 1,
        }
    })
}

/// Exchange account email/password for an account-level access token.
///
/// `POST {account}/login/auth`
pub async fn account_login(
    transport: &Transport,
    cloud: &CloudEndpoints,
    email: &str,
    password: &SecretString,
) -> Result<SecretString, Error> {
    let url = cloud.account("login/auth")?;
    debug!(email, "logging in to cloud account at {}", url);

    let resp: TokenResponse = transport
        .dispatch(PendingRequest::post(url).json(user_body(email, password)))
        .await?;
    Ok(SecretString::from(resp.access_token))
}

/// List the devices ("sprinklers") linked to the account.
///
/// `POST {account}/devices/get-sprinklers`
pub async fn list_sprinklers(
    transport: &Transport,
    cloud: &CloudEndpoints,
    account_token: &SecretString,
    email: &str,
    password: &SecretString,
) -> Result<Vec<Sprinkler>, Error> {
    let url = cloud.account("devices/get-sprinklers")?;
    debug!("listing linked devices");

    let resp: SprinklerList = transport
        .dispatch(
            PendingRequest::post(url)
                .access_token(account_token.clone(), None)
                .json(user_body(email, password)),
        )
        .await?;
    debug!(count = resp.sprinklers.len(), "linked devices listed");
    Ok(resp.sprinklers)
}
