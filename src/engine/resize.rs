/// Trailing-edge debounce for layout invalidation: a burst of resize
/// notifications collapses into one recomputation once the burst has been
/// quiet for `wait_ms`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ResizeDebouncer {
    wait_ms: f64,
    due_ms: Option<f64>,
    coalesced: u32,
}

impl ResizeDebouncer {
    pub(crate) fn new(wait_ms: f64) -> Self {
        Self {
            wait_ms: wait_ms.max(0.0),
            due_ms: None,
            coalesced: 0,
        }
    }

    /// Record a resize at `now_ms`, pushing the deadline back.
    pub(crate) fn notify(&mut self, now_ms: f64) {
        self.due_ms = Some(now_ms + self.wait_ms);
        self.coalesced = self.coalesced.saturating_add(1);
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.due_ms.is_some()
    }

    /// Fire once the deadline has passed, returning how many notifications
    /// the recomputation covers.
    pub(crate) fn poll(&mut self, now_ms: f64) -> Option<u32> {
        let due = self.due_ms?;
        if now_ms < due {
            return None;
        }
        self.due_ms = None;
        Some(std::mem::take(&mut self.coalesced))
    }

    pub(crate) fn cancel(&mut self) {
        self.due_ms = None;
        self.coalesced = 0;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/resize.rs"]
mod tests;
