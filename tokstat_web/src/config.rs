use tokstat::ClientConfig;
use tracing::{info, warn};
use wasm_bindgen::JsValue;

/// Global a page may define before loading the bundle to override endpoints
/// or timings, e.g. `window.TOKSTAT_CONFIG = { toast_ms: 5000 }`.
const CONFIG_GLOBAL: &str = "TOKSTAT_CONFIG";

pub fn load() -> ClientConfig {
    let raw = js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str(CONFIG_GLOBAL))
        .unwrap_or(JsValue::UNDEFINED);
    if raw.is_undefined() || raw.is_null() {
        return ClientConfig::default();
    }
    match serde_wasm_bindgen::from_value::<ClientConfig>(raw) {
        Ok(config) => {
            info!(?config, "using page-supplied client config");
            config
        }
        Err(err) => {
            warn!(error = %err, "ignoring malformed {CONFIG_GLOBAL}");
            ClientConfig::default()
        }
    }
}
