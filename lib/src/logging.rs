//! Process-wide logging setup. A thin wrapper over `env_logger` so
//! every binary and test harness initializes diagnostics the same
//! way; call sites use the plain `log::{debug,info,warn,error}!`
//! macros directly afterwards.

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize the global logger. Safe to call more than once (and
/// from multiple tests in the same process); only the first call has
/// an effect. Honors `RUST_LOG`, defaulting to `info`.
pub fn init_logging() {
    INIT.call_once(|| {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .format_timestamp_millis()
            .init();
    });
}
