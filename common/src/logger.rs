use once_cell::sync::OnceCell;
use tracing_subscriber::{EnvFilter, fmt};
use uuid::Uuid;

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Install the global tracing subscriber once per process.
///
/// Honors `RUST_LOG`; defaults to `info` when unset. Safe to call from
/// multiple entry points (service startup, workers, tests).
pub fn init_logger(service_name: &'static str) {
    LOGGER_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_line_number(true)
            .init();

        tracing::info!(service = service_name, "logger initialized");
    });
}

/// Correlation id that follows one mutation or cascade run end to end.
#[derive(Clone, Debug)]
pub struct TraceId(Uuid);

impl TraceId {
    pub fn to_field(&self) -> String {
        self.0.as_hyphenated().to_string()
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self(Uuid::new_v4())
    }
}
