//! Fixed network and locale collaborators

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::{LocaleProvider, NetworkProbe};

/// Network probe whose answer is set by the caller
#[derive(Debug, Clone)]
pub struct StaticNetwork {
    online: Arc<AtomicBool>,
}

impl StaticNetwork {
    #[must_use]
    pub fn new(online: bool) -> Self {
        Self {
            online: Arc::new(AtomicBool::new(online)),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

impl NetworkProbe for StaticNetwork {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

/// Locale provider that always answers with the same locale
#[derive(Debug, Clone)]
pub struct FixedLocale(String);

impl FixedLocale {
    pub fn new(locale: impl Into<String>) -> Self {
        Self(locale.into())
    }
}

impl LocaleProvider for FixedLocale {
    fn locale(&self) -> String {
        self.0.clone()
    }
}
