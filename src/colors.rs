//! Terminal colouring for request log lines.
//!
//! Colour is applied by the subscriber's field formatter rather than baked
//! into log messages: `tracing-subscriber` escapes control sequences found in
//! recorded values, so pre-coloured strings would print as literal `\x1b[`.
//! Handlers log plain `id`, `status` and `latency_ms` fields and
//! [`RequestFields`] renders them.

use axum::http::StatusCode;
use owo_colors::{AnsiColors, OwoColorize};
use std::fmt::{self, Write as _};
use tracing::field::{Field, Visit};
use tracing_subscriber::{
    field::RecordFields,
    fmt::{FormatFields, format::Writer},
};

/// Palette for request ids; each entry stays readable on light and dark
/// backgrounds.
const ID_PALETTE: [AnsiColors; 12] = [
    AnsiColors::Red,
    AnsiColors::Green,
    AnsiColors::Yellow,
    AnsiColors::Blue,
    AnsiColors::Magenta,
    AnsiColors::Cyan,
    AnsiColors::BrightRed,
    AnsiColors::BrightGreen,
    AnsiColors::BrightYellow,
    AnsiColors::BrightBlue,
    AnsiColors::BrightMagenta,
    AnsiColors::BrightCyan,
];

/// Stable colour for a request id, so every line of one request matches.
pub fn color_for_id(id: &str) -> AnsiColors {
    let hash = id
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)));
    ID_PALETTE[hash as usize % ID_PALETTE.len()]
}

/// Colour by status class: success green, redirects cyan, client errors
/// yellow, everything else red.
pub fn status_color(status: u16) -> AnsiColors {
    match status {
        200..=299 => AnsiColors::Green,
        300..=399 => AnsiColors::Cyan,
        400..=499 => AnsiColors::Yellow,
        _ => AnsiColors::Red,
    }
}

/// Field formatter for request log lines.
///
/// Renders an event as `[id] message STATUS (Nms) key=value...`:
/// - `id` is bracketed and drawn in its [`color_for_id`] colour
/// - `status` is shown with its reason phrase in its [`status_color`]
/// - `latency_ms` becomes a trailing `(Nms)`
/// - any other field is appended as `key=value`
///
/// Colours are only emitted when the writer supports ANSI escapes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestFields;

impl<'writer> FormatFields<'writer> for RequestFields {
    fn format_fields<R: RecordFields>(&self, mut writer: Writer<'writer>, fields: R) -> fmt::Result {
        let mut line = RequestLine::default();
        fields.record(&mut line);
        line.write_to(&mut writer)
    }
}

#[derive(Debug, Default)]
struct RequestLine {
    id: Option<String>,
    message: String,
    status: Option<u16>,
    latency_ms: Option<u64>,
    extra: Vec<(&'static str, String)>,
}

impl RequestLine {
    fn record_text(&mut self, field: &Field, text: String) {
        match field.name() {
            "id" => self.id = Some(text),
            "message" => self.message = text,
            name => self.extra.push((name, text)),
        }
    }

    fn write_to(&self, writer: &mut Writer<'_>) -> fmt::Result {
        let ansi = writer.has_ansi_escapes();
        let mut separator = "";

        if let Some(id) = &self.id {
            let tag = format!("[{id}]");
            if ansi {
                write!(writer, "{}", tag.color(color_for_id(id)))?;
            } else {
                writer.write_str(&tag)?;
            }
            separator = " ";
        }

        if !self.message.is_empty() {
            write!(writer, "{separator}{}", self.message)?;
            separator = " ";
        }

        if let Some(code) = self.status {
            let label = StatusCode::from_u16(code)
                .map(|status| status.to_string())
                .unwrap_or_else(|_| code.to_string());
            if ansi {
                write!(writer, "{separator}{}", label.color(status_color(code)))?;
            } else {
                write!(writer, "{separator}{label}")?;
            }
            separator = " ";
        }

        if let Some(ms) = self.latency_ms {
            write!(writer, "{separator}({ms}ms)")?;
            separator = " ";
        }

        for (name, value) in &self.extra {
            write!(writer, "{separator}{name}={value}")?;
            separator = " ";
        }
        Ok(())
    }
}

impl Visit for RequestLine {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_text(field, value.to_owned());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "status" => self.status = u16::try_from(value).ok(),
            "latency_ms" => self.latency_ms = Some(value),
            _ => self.record_text(field, value.to_string()),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record_text(field, format!("{value:?}"));
    }
}
