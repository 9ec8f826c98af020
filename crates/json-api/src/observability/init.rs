//! Observability lifecycle.

use std::time::Instant;

use tracing::info;

use crate::config::ServerConfig;

use super::{ObservabilityError, logging, settings};

/// Runtime observability state.
#[derive(Debug)]
pub(crate) struct Observability {
    started: Instant,
}

impl Observability {
    /// Install the global subscriber and apply request logging settings.
    pub(crate) fn init(config: &ServerConfig) -> Result<Self, ObservabilityError> {
        settings::apply_runtime_config(config);
        logging::init_subscriber(config)?;

        Ok(Self {
            started: Instant::now(),
        })
    }

    /// Log the final uptime once serving has stopped.
    pub(crate) fn shutdown(self) {
        info!(
            uptime_secs = self.started.elapsed().as_secs(),
            "server stopped"
        );
    }
}
