//! Development log tabs.
//!
//! The pipeline writes compiler output to named tabs of a [`LogSink`]. The
//! multi-tab viewer is external; [`TracingLogSink`] routes every tab to
//! `tracing` with the tab name as a field.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

/// One named stream of log output.
pub trait LogTab: Send + Sync {
    fn log(&self, message: &str);
}

/// Source of log tabs.
#[async_trait]
pub trait LogSink: Send + Sync {
    fn create_tab(&self, name: &str) -> Arc<dyn LogTab>;

    async fn start(&self) -> Result<()> {
        Ok(())
    }

    async fn stop(&self) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn create_tab(&self, name: &str) -> Arc<dyn LogTab> {
        Arc::new(TracingTab {
            name: name.to_string(),
        })
    }
}

#[derive(Debug)]
struct TracingTab {
    name: String,
}

impl LogTab for TracingTab {
    fn log(&self, message: &str) {
        for line in message.lines() {
            tracing::info!(tab = %self.name, "{}", line);
        }
    }
}
