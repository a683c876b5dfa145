use crate::{
    config::{SESSION_KEY_ACCESS_TOKEN, SESSION_KEY_REFRESH_TOKEN},
    error, info,
    session::{FileSessionStore, SessionStore},
    success,
};

pub async fn status() {
    let mut store = FileSessionStore::new();
    if let Err(e) = store.load().await {
        error!("Failed to read session cache: {}", e);
    }

    let token = store.get(SESSION_KEY_ACCESS_TOKEN);
    let refresh = store.get(SESSION_KEY_REFRESH_TOKEN);

    match (token, refresh) {
        (Some(_), Some(_)) => success!("Authenticated. Access token is current."),
        (None, Some(_)) => {
            info!("Access token expired. It will be renewed from the refresh token on next use.")
        }
        _ => info!("Not authenticated. Run: sporauth auth"),
    }
}
