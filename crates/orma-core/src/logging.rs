//! Logging integration for the orma runtime.
//!
//! Provides a helper for installing a [`tracing`]-based subscriber. The ORM
//! itself only emits `tracing` events; applications decide how to render
//! them by calling [`setup_logging`] (or installing their own subscriber).

/// Sets up the global tracing subscriber.
///
/// The `filter` string follows the `EnvFilter` syntax (e.g. `"debug"`,
/// `"orma_db=debug,info"`). When `pretty` is true a human-readable format
/// with file/line information is used; otherwise a structured JSON format
/// suitable for log aggregation.
///
/// Installing a subscriber twice is a no-op rather than an error, so tests
/// and embedding applications can call this freely.
pub fn setup_logging(filter: &str, pretty: bool) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

    if pretty {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span covering one ORM operation on one entity type.
///
/// # Examples
///
/// ```
/// use orma_core::logging::operation_span;
///
/// let span = operation_span("save", "person");
/// let _guard = span.enter();
/// tracing::debug!("persisting record");
/// ```
pub fn operation_span(op: &str, entity: &str) -> tracing::Span {
    tracing::debug_span!("orm_op", op = op, entity = entity)
}
