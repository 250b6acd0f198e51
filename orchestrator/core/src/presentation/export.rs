// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Comparison export: pretty JSON (the HTTP response shape) or CSV, one row
// per model, RFC 4180 quoting.

use crate::domain::query::ComparisonResult;

pub const CSV_HEADER: [&str; 7] = [
    "prompt",
    "timestamp",
    "model_id",
    "model_name",
    "response",
    "latency_ms",
    "error",
];

pub fn to_json(result: &ComparisonResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

pub fn to_csv(result: &ComparisonResult) -> String {
    let mut out = String::new();
    push_record(&mut out, CSV_HEADER.iter().copied());

    let timestamp = result.timestamp().to_rfc3339();
    for response in result.responses() {
        let latency = response.latency_ms().to_string();
        push_record(
            &mut out,
            [
                result.prompt(),
                timestamp.as_str(),
                response.model_id(),
                response.model_name(),
                response.response().unwrap_or(""),
                latency.as_str(),
                response.error().unwrap_or(""),
            ],
        );
    }

    out
}

fn push_record<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape_field(field));
    }
    out.push_str("\r\n");
}

fn escape_field(field: &str) -> std::borrow::Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\"")).into()
    } else {
        field.into()
    }
}
