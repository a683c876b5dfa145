use std::sync::Arc;

use axum::{Extension, extract::RawQuery, response::Html};
use tokio::sync::Mutex;

use crate::utils;

pub async fn callback(
    RawQuery(query): RawQuery,
    Extension(captured): Extension<Arc<Mutex<Option<String>>>>,
) -> Html<&'static str> {
    let Some(query) = query else {
        return Html("<h4>Missing authorization response parameters.</h4>");
    };

    let params = utils::parse_query(&format!("/callback?{}", query));
    let page = if params.contains_key("code") {
        Html("<h2>Authentication successful.</h2><p>Close browser window.</p>")
    } else if params.contains_key("error") {
        Html("<h4>Authorization was denied.</h4>")
    } else {
        Html("<h4>Missing authorization code.</h4>")
    };

    // Hand the raw query to the waiting auth flow; the state machine does
    // the code exchange, not this handler.
    let mut capture = captured.lock().await;
    *capture = Some(query);

    page
}
