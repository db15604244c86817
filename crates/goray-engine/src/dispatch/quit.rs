use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Single-use stop flag shared between the owner loop and its tasks.
///
/// Raised at most once; later raises are ignored. Readers only ever observe the
/// transition `false -> true`.
#[derive(Debug, Clone, Default)]
pub struct QuitSignal {
    raised: Arc<AtomicBool>,
}

impl QuitSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the signal. Returns `true` if this call performed the write.
    pub fn raise(&self) -> bool {
        let first = !self.raised.swap(true, Ordering::AcqRel);
        if first {
            log::debug!("quit signal raised");
        }
        first
    }

    #[inline]
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }
}
