use crate::{
    browser::MemoryBrowser, config::AuthorizationConfig, error, management::AuthManager,
    session::FileSessionStore, success, warning,
};

pub async fn logout() {
    let config = match AuthorizationConfig::from_env() {
        Ok(config) => config,
        Err(e) => error!("{}", e),
    };

    let mut store = FileSessionStore::new();
    if let Err(e) = store.load().await {
        warning!("Could not read session cache: {}", e);
    }

    let mut manager = AuthManager::new(config, store, MemoryBrowser::new());
    manager.logout();

    if let Err(e) = manager.store().persist().await {
        error!("Failed to update session cache: {}", e);
    }

    success!("Logged out.");
}
