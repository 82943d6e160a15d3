use tokstat::{KeyValueStore, TsError};

/// `window.localStorage`. Reads from a missing or blocked store come back
/// empty instead of throwing.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStore;

fn local_storage() -> Result<web_sys::Storage, TsError> {
    web_sys::window()
        .ok_or_else(|| TsError::Storage("no window".to_string()))?
        .local_storage()
        .map_err(|err| TsError::Storage(format!("{err:?}")))?
        .ok_or_else(|| TsError::Storage("localStorage disabled".to_string()))
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        local_storage().ok()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), TsError> {
        local_storage()?
            .set_item(key, value)
            .map_err(|err| TsError::Storage(format!("{err:?}")))
    }
}
