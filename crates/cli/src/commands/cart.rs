//! Cart commands, run through the same engine the storefront uses.
//!
//! With `JERSEY_SHOP_TOKEN` set the cart is the signed-in user's server
//! cart; otherwise it is the guest cart stored under `JERSEY_SHOP_DATA_DIR`.
//! Every command prints the resulting checkout summary as JSON.

use jersey_shop_core::{Customization, JerseyId, PatchSet, Size, UserId};
use jersey_shop_storefront::StorefrontConfig;
use jersey_shop_storefront::cart::{CartEngine, MutationOutcome};
use jersey_shop_storefront::catalog::CatalogClient;
use jersey_shop_storefront::models::{AuthSession, AuthStatus, SessionUser};
use jersey_shop_storefront::remote::RemoteCartClient;
use jersey_shop_storefront::storage::FileStorage;

use super::print_json;

/// One cart line configuration as given on the command line.
#[derive(Debug, Clone)]
pub struct LineArgs {
    pub jersey_id: i32,
    pub size: Size,
    pub name: Option<String>,
    pub number: Option<String>,
    pub patches: Vec<String>,
}

impl LineArgs {
    fn customization(&self) -> Customization {
        Customization::new(self.name.clone(), self.number.clone())
    }

    fn patch_set(&self) -> PatchSet {
        self.patches.iter().map(String::as_str).collect()
    }
}

type Engine = CartEngine<FileStorage, RemoteCartClient>;

fn auth_status(config: &StorefrontConfig, user_id: i32) -> AuthStatus {
    config.access_token.clone().map_or(AuthStatus::Guest, |token| {
        AuthStatus::Authenticated(AuthSession::new(
            SessionUser {
                id: UserId::new(user_id),
                display_name: String::new(),
            },
            token,
        ))
    })
}

async fn open(user_id: i32) -> Result<(StorefrontConfig, Engine), Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;
    let engine = CartEngine::from_config(&config, auth_status(&config, user_id))?;
    engine.load_current().await;
    Ok((config, engine))
}

fn report(outcome: MutationOutcome) -> Result<(), Box<dyn std::error::Error>> {
    match outcome {
        MutationOutcome::Applied => Ok(()),
        MutationOutcome::Skipped => {
            tracing::warn!("No matching cart line; nothing changed");
            Ok(())
        }
        MutationOutcome::Failed => Err("cart update failed (see log)".into()),
    }
}

/// Print the cart.
///
/// # Errors
///
/// Returns an error if configuration is missing or storage cannot be opened.
pub async fn show(user_id: i32) -> Result<(), Box<dyn std::error::Error>> {
    let (_, engine) = open(user_id).await?;
    let store = engine.lock().await;
    print_json(&store.checkout_summary())
}

/// Add one unit of a configuration.
///
/// # Errors
///
/// Returns an error if the jersey cannot be read or the update fails.
pub async fn add(user_id: i32, line: &LineArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (config, engine) = open(user_id).await?;
    let jersey = CatalogClient::new(&config)?
        .get_jersey(JerseyId::new(line.jersey_id))
        .await?;

    let mut store = engine.lock().await;
    let outcome = store
        .add_item(jersey, line.size, line.customization(), line.patch_set())
        .await;
    report(outcome)?;
    print_json(&store.checkout_summary())
}

/// Remove the line matching a configuration.
///
/// # Errors
///
/// Returns an error if the update fails.
pub async fn remove(user_id: i32, line: &LineArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (_, engine) = open(user_id).await?;
    let mut store = engine.lock().await;
    let outcome = store
        .remove_item(
            JerseyId::new(line.jersey_id),
            line.size,
            line.customization(),
            line.patch_set(),
        )
        .await;
    report(outcome)?;
    print_json(&store.checkout_summary())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if the update fails.
pub async fn clear(user_id: i32) -> Result<(), Box<dyn std::error::Error>> {
    let (_, engine) = open(user_id).await?;
    let mut store = engine.lock().await;
    report(store.clear().await)?;
    print_json(&store.checkout_summary())
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    #[test]
    fn test_line_args_normalise() {
        let line = LineArgs {
            jersey_id: 1,
            size: Size::M,
            name: Some("  ".to_owned()),
            number: Some("9".to_owned()),
            patches: vec!["Liga".to_owned(), "Liga".to_owned()],
        };
        assert_eq!(line.customization(), Customization::new(None, Some("9".to_owned())));
        assert_eq!(line.patch_set().len(), 1);
    }

    #[test]
    fn test_token_selects_server_cart() {
        let mut config = StorefrontConfig::for_api_url("http://127.0.0.1:8000/api")
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(!auth_status(&config, 1).is_authenticated());

        config.access_token = Some(SecretString::from("abc"));
        let status = auth_status(&config, 7);
        assert_eq!(status.session().map(|s| s.user.id), Some(UserId::new(7)));
    }
}
