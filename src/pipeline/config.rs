//! Pipeline configuration

/// Knobs for a [`ValidationPipeline`](super::ValidationPipeline)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Serialize saves and destroys per record type. Without it, the
    /// exclusivity rules are only as good as the caller's own locking.
    pub serialize_writes: bool,
    /// Write a JSON log line for every event. Counters run either way.
    pub emit_events: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            serialize_writes: true,
            emit_events: true,
        }
    }
}

impl PipelineConfig {
    /// Defaults without log output
    pub fn quiet() -> Self {
        Self {
            emit_events: false,
            ..Self::default()
        }
    }

    /// No writer lock; the host serializes writes itself.
    pub fn unserialized() -> Self {
        Self {
            serialize_writes: false,
            ..Self::default()
        }
    }

    pub fn with_emit_events(mut self, emit_events: bool) -> Self {
        self.emit_events = emit_events;
        self
    }
}
