use crate::{
    browser::MemoryBrowser,
    config::{AuthorizationConfig, SESSION_KEY_ACCESS_TOKEN, SESSION_KEY_REFRESH_TOKEN},
    error,
    management::AuthManager,
    session::{FileSessionStore, SessionStore},
    warning,
};

pub async fn token() {
    let config = match AuthorizationConfig::from_env() {
        Ok(config) => config,
        Err(e) => error!("{}", e),
    };

    let mut store = FileSessionStore::new();
    if let Err(e) = store.load().await {
        error!("Failed to read session cache: {}", e);
    }

    if store.get(SESSION_KEY_ACCESS_TOKEN).is_none()
        && store.get(SESSION_KEY_REFRESH_TOKEN).is_none()
    {
        error!("Not authenticated. Run: sporauth auth");
    }

    // Non-interactive command: a headless browser environment keeps the
    // state machine from opening an authorization redirect here.
    let mut manager = AuthManager::new(config, store, MemoryBrowser::new());
    let authorized = match manager.login().await {
        Ok(authorized) => authorized,
        Err(e) => error!("{}", e),
    };
    if !authorized {
        error!(
            "Session could not be restored: {}\nRun: sporauth auth",
            manager.state().error
        );
    }

    match manager.get_token().await {
        Ok(Some(token)) => {
            // A refresh may have rotated the persisted pair.
            if let Err(e) = manager.store().persist().await {
                warning!("Failed to save session cache: {}", e);
            }
            println!("{}", token);
        }
        Ok(None) => error!("Failed to obtain an access token: {}", manager.state().error),
        Err(e) => error!("{}", e),
    }
}
