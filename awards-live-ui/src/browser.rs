//! Browser signals forwarded to the chart host

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::StorageEvent;

use crate::state::{ClientMessage, GlobalState};

/// Default host API base when nothing is configured
const DEFAULT_API_BASE: &str = "http://localhost:8090/api/v1";

/// Local storage key overriding the host API base
const API_BASE_KEY: &str = "awards_live_api_url";

/// Written by whichever tab resets the votes; other tabs see a `storage`
/// event for it and refetch.
pub const RESET_KEY: &str = "awards:votes-reset";

/// Host API base from local storage, or the default
pub fn get_api_base() -> String {
    let url = web_sys::window()
        .and_then(|window| window.local_storage().ok().flatten())
        .and_then(|storage| storage.get_item(API_BASE_KEY).ok().flatten())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

    // Normalize: remove trailing slash
    url.trim_end_matches('/').to_string()
}

pub fn document_hidden() -> bool {
    web_sys::window()
        .and_then(|window| window.document())
        .map(|document| document.hidden())
        .unwrap_or(false)
}

/// Forward page visibility and the cross-tab reset marker to the host
pub fn install_listeners(state: GlobalState) {
    let Some(window) = web_sys::window() else {
        return;
    };

    if let Some(document) = window.document() {
        let state_clone = state.clone();
        let on_visibility = Closure::wrap(Box::new(move |_: JsValue| {
            state_clone.send(ClientMessage::Visibility {
                hidden: document_hidden(),
            });
        }) as Box<dyn FnMut(JsValue)>);
        let _ = document.add_event_listener_with_callback(
            "visibilitychange",
            on_visibility.as_ref().unchecked_ref(),
        );
        on_visibility.forget();
    }

    let on_storage = Closure::wrap(Box::new(move |event: StorageEvent| {
        if is_reset_event(event.key().as_deref()) {
            state.send(ClientMessage::ResetSignal);
        }
    }) as Box<dyn FnMut(StorageEvent)>);
    let _ = window.add_event_listener_with_callback("storage", on_storage.as_ref().unchecked_ref());
    on_storage.forget();
}

/// Only the reset marker counts; `None` (storage cleared) does not
fn is_reset_event(key: Option<&str>) -> bool {
    key == Some(RESET_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_event_key() {
        assert!(is_reset_event(Some("awards:votes-reset")));
        assert!(!is_reset_event(Some("theme")));
        assert!(!is_reset_event(None));
    }
}
