use leptos::prelude::*;
use leptos_dom::helpers::{set_timeout_with_handle, TimeoutHandle};
use std::time::Duration;

/// Single pending auto-clear timeout for a page's banner.
///
/// Arming replaces (and cancels) the previous timeout; the pending one is
/// cancelled when the owning component unmounts.
#[derive(Clone, Copy)]
pub(crate) struct BannerTimer {
    handle: StoredValue<Option<TimeoutHandle>>,
}

impl BannerTimer {
    pub fn new() -> Self {
        let timer = Self {
            handle: StoredValue::new(None),
        };
        on_cleanup(move || timer.cancel());
        timer
    }

    pub fn arm(&self, ttl: Duration, on_expire: impl FnOnce() + 'static) {
        self.cancel();
        match set_timeout_with_handle(on_expire, ttl) {
            Ok(handle) => {
                self.handle.try_update_value(|h| *h = Some(handle));
            }
            Err(_) => tracing::warn!("failed to schedule banner timeout"),
        }
    }

    pub fn cancel(&self) {
        if let Some(Some(handle)) = self.handle.try_update_value(|h| h.take()) {
            handle.clear();
        }
    }
}
