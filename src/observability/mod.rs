//! OpenTelemetry tracing with file-based OTLP export.
//!
//! ```text
//! tracing spans → tracing-opentelemetry → SDK provider → FileSpanExporter → rotating JSON file
//! ```
//!
//! Spans cover every handled event and worker request. Worker messages carry
//! the caller's span context so worker spans join the caller's trace.
//!
//! The level comes from the `trace_level` config option (default `"info"`);
//! the file location from `data_dir`. Rotation keeps the trace file under
//! `trace_max_bytes` with `trace_backups` numbered backups.
//!
//! - [`init`]: subscriber installation
//! - [`exporter`]: the span exporter and provider builder
//! - [`otlp`]: OTLP/JSON encoding
//! - [`rotation`]: size-based file rotation

pub mod exporter;
pub mod init;
pub mod otlp;
pub mod rotation;

pub use init::init_tracing;
