use crate::config::WriterConfig;
use crate::error::InitError;
use crate::tracker::ErrorTracker;
use crate::writer::ErrorWriter;
use std::sync::Arc;
use tracing::Subscriber;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Registry;

/// `fmt` layer that renders every event as one flattened JSON object and
/// writes it into `writer`.
///
/// Event fields land at the top level of the record, so
/// `error!(error = %err, "request failed")` produces
/// `{"level":"ERROR","message":"request failed","error":"..",..}`.
///
/// Stack traces captured through this layer keep the subscriber's own
/// dispatch frames after the caller's; see
/// [`WriterConfig::internal_module`].
pub fn json_layer<S>(writer: ErrorWriter) -> impl Layer<S> + Send + Sync + 'static
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    tracing_subscriber::fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_writer(writer)
}

/// Initialize global `tracing` subscriber that reports errors to `tracker`.
///
/// **Parameters**
/// - `tracker`: implementation of [`ErrorTracker`] that receives the
///   built events.
/// - `config`: [`WriterConfig`] controlling reporting and shutdown.
///
/// **Returns**
///
/// The [`ErrorWriter`] behind the installed layer. Call
/// [`ErrorWriter::close`] on it at shutdown to drain the tracker.
pub fn init_tracing_with_config(
    tracker: Arc<dyn ErrorTracker>,
    config: WriterConfig,
) -> Result<ErrorWriter, InitError> {
    let writer = ErrorWriter::with_config(tracker, &config);
    let layer = json_layer(writer.clone());

    // Two subscriber shapes because the optional console layer changes the
    // subscriber type.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(writer)
}

/// Initialize tracing with [`WriterConfig::default`].
pub fn init_tracing(tracker: Arc<dyn ErrorTracker>) -> Result<ErrorWriter, InitError> {
    init_tracing_with_config(tracker, WriterConfig::default())
}
