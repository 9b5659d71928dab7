//! Span exporter that appends OTLP/JSON batches to a rotating file.

use super::otlp;
use super::rotation::{RotatingFile, RotationPolicy};
use futures_util::future::BoxFuture;
use opentelemetry::trace::TraceError;
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::TracerProvider;
use std::path::PathBuf;

pub const SCOPE: &str = "Pokedex";

#[derive(Debug)]
pub struct FileSpanExporter {
    sink: RotatingFile,
    resource: Resource,
    is_shutdown: bool,
}

impl FileSpanExporter {
    #[must_use]
    pub const fn new(sink: RotatingFile, resource: Resource) -> Self {
        Self {
            sink,
            resource,
            is_shutdown: false,
        }
    }
}

impl SpanExporter for FileSpanExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        let result = if self.is_shutdown {
            Err(TraceError::from("trace exporter already shut down"))
        } else {
            let line = otlp::encode_batch(&self.resource, SCOPE, &batch).to_string();
            self.sink
                .write_line(&line)
                .map_err(|e| TraceError::from(e.to_string()))
        };
        Box::pin(std::future::ready(result))
    }

    fn shutdown(&mut self) {
        self.is_shutdown = true;
    }

    fn set_resource(&mut self, resource: &Resource) {
        self.resource = resource.clone();
    }
}

/// Builds a provider exporting every finished span synchronously to `path`.
#[must_use]
pub fn create_tracer_provider(
    path: PathBuf,
    policy: RotationPolicy,
    resource: Resource,
) -> TracerProvider {
    let exporter = FileSpanExporter::new(RotatingFile::new(path, policy), resource.clone());

    TracerProvider::builder()
        .with_config(opentelemetry_sdk::trace::Config::default().with_resource(resource))
        .with_simple_exporter(exporter)
        .build()
}
