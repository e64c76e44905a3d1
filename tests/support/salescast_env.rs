use std::{
    ffi::OsString,
    path::Path,
    sync::{Mutex, MutexGuard},
};

const CONFIG_HOME_ENV: &str = "SALESCAST_CONFIG_HOME";

/// Serializes every test that touches process environment variables.
static ENV_SERIAL: Mutex<()> = Mutex::new(());

/// Redirects `SALESCAST_CONFIG_HOME` until dropped, then restores the prior value.
pub struct SalescastEnvGuard {
    saved: Option<OsString>,
    _serial: MutexGuard<'static, ()>,
}

impl SalescastEnvGuard {
    pub fn set_config_home(path: impl AsRef<Path>) -> Self {
        let serial = ENV_SERIAL
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let saved = std::env::var_os(CONFIG_HOME_ENV);
        // SAFETY: ENV_SERIAL is held for the guard's lifetime.
        unsafe { std::env::set_var(CONFIG_HOME_ENV, path.as_ref()) };
        Self {
            saved,
            _serial: serial,
        }
    }
}

impl Drop for SalescastEnvGuard {
    fn drop(&mut self) {
        // SAFETY: ENV_SERIAL is still held until this guard finishes dropping.
        unsafe {
            match self.saved.take() {
                Some(value) => std::env::set_var(CONFIG_HOME_ENV, value),
                None => std::env::remove_var(CONFIG_HOME_ENV),
            }
        }
    }
}
