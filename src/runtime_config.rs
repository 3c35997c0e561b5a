//! Environment-variable configuration of the coroutine runtime.
//!
//! `TRELLIS_STACK_SIZE` sets the stack size of handler coroutines, in
//! decimal (`65536`) or hexadecimal (`0x10000`). Total memory is
//! `stack_size × spawned handlers`, so tune it to the deepest handler call
//! chain rather than leaving every coroutine at a generous default.

use std::env;

const DEFAULT_STACK_SIZE: usize = 0x10000; // 64 KB

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    /// Stack size for handler coroutines in bytes.
    pub stack_size: usize,
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let stack_size = env::var("TRELLIS_STACK_SIZE")
            .ok()
            .and_then(|val| {
                if let Some(hex) = val.strip_prefix("0x") {
                    usize::from_str_radix(hex, 16).ok()
                } else {
                    val.parse().ok()
                }
            })
            .unwrap_or(DEFAULT_STACK_SIZE);
        RuntimeConfig { stack_size }
    }
}
