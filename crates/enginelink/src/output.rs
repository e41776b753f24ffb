use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use enginelink_client::{CancelToken, Sink, StatusEvent, TelemetryRecord};
use enginelink_transport::Endpoint;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct RecordOutput<'a> {
    rpm: i32,
    temperature: f32,
    oil_pressure: i32,
    endpoint: &'a str,
    timestamp: String,
}

pub fn render_record(record: &TelemetryRecord, endpoint: &Endpoint, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            let endpoint = endpoint.to_string();
            let out = RecordOutput {
                rpm: record.rpm(),
                temperature: record.temperature(),
                oil_pressure: record.oil_pressure(),
                endpoint: &endpoint,
                timestamp: now_unix_seconds(),
            };
            serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["RPM", "TEMP", "OIL", "ENDPOINT"])
                .add_row(vec![
                    record.rpm().to_string(),
                    record.temperature().to_string(),
                    record.oil_pressure().to_string(),
                    endpoint.to_string(),
                ]);
            table.to_string()
        }
        OutputFormat::Pretty => format!("Received: {record}"),
    }
}

pub fn print_record(record: &TelemetryRecord, endpoint: &Endpoint, format: OutputFormat) {
    println!("{}", render_record(record, endpoint, format));
}

/// Prints records to stdout and status lines to stderr.
///
/// With a limit set, the sink cancels the run once that many records have
/// been printed.
pub struct ConsoleSink {
    endpoint: Endpoint,
    format: OutputFormat,
    limit: Option<u64>,
    printed: u64,
    cancel: CancelToken,
}

impl ConsoleSink {
    pub fn new(endpoint: Endpoint, format: OutputFormat, cancel: CancelToken) -> Self {
        Self {
            endpoint,
            format,
            limit: None,
            printed: 0,
            cancel,
        }
    }

    pub fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    pub fn printed(&self) -> u64 {
        self.printed
    }
}

impl Sink for ConsoleSink {
    fn record(&mut self, record: &TelemetryRecord) {
        if self.limit.is_some_and(|limit| self.printed >= limit) {
            return;
        }
        print_record(record, &self.endpoint, self.format);
        self.printed = self.printed.saturating_add(1);
        if self.limit.is_some_and(|limit| self.printed >= limit) {
            self.cancel.cancel();
        }
    }

    fn status(&mut self, event: &StatusEvent<'_>) {
        eprintln!("{event}");
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
