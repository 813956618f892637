//! Provider session bookkeeping.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use rand::Rng;

/// The coordinator's handle for one registered provider.
#[derive(Clone, Debug)]
pub struct ProviderSession {
    /// The provider's self-chosen identifier, unique among live sessions.
    pub provider_id: String,
    /// Devices this provider owns; commands fan out by device name.
    pub device_ids: Vec<String>,
    /// Last activity, used for stale-session eviction.
    pub last_update: Instant,
    /// The generation this provider last submitted updates for.
    ///
    /// `None` until the first `UpdateSignals` (and again after a reset),
    /// so every provider must submit generation 0 before the next tick.
    pub last_tick_generation: Option<u64>,
}

impl ProviderSession {
    /// Create a fresh session that has not yet submitted any updates.
    pub fn new(provider_id: impl Into<String>, device_ids: Vec<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            device_ids,
            last_update: Instant::now(),
            last_tick_generation: None,
        }
    }

    /// Whether this session owns the named device.
    pub fn owns_device(&self, device: &str) -> bool {
        self.device_ids.iter().any(|d| d == device)
    }
}

/// Generate a process-unique session ID.
///
/// Format: `{provider_id}_{wall_ms}_{suffix}` with a 4-digit random
/// suffix. The provider ID prefix makes session ownership greppable in
/// logs; the wall-clock and random parts make collisions across the
/// process lifetime implausible.
pub(crate) fn generate_session_id(provider_id: &str) -> String {
    let wall_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let suffix: u32 = rand::thread_rng().gen_range(1000..=9999);
    format!("{provider_id}_{wall_ms}_{suffix}")
}
