use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

use color_eyre::eyre::{Result, eyre};
use serde::Serialize;
use serde_json::Value;

const TRACKED_SPANS: [&str; 2] = ["app.compute_layout", "ui.treemap_widget.render"];

pub fn init_tracing_json(output_path: &Path) -> Result<()> {
    use tracing_subscriber::fmt::format::FmtSpan;

    ensure_parent_dir(output_path)?;
    let file = File::create(output_path)?;
    let make_writer = move || {
        file.try_clone()
            .expect("failed to clone perf tracing output file")
    };

    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(make_writer)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| eyre!("failed to set tracing subscriber: {e}"))?;
    Ok(())
}

/// Aggregates the captured span log into per-span timing stats and writes
/// them as JSON next to the log.
pub fn write_span_stats(span_log_path: &Path, iterations: usize) -> Result<std::path::PathBuf> {
    let spans = parse_span_stats(span_log_path)?;
    let report = PerfReport { iterations, spans };

    let stats_path = span_log_path.with_extension("stats.json");
    let json = serde_json::to_string_pretty(&report)?;
    fs::write(&stats_path, json)?;
    Ok(stats_path)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct PerfReport {
    iterations: usize,
    spans: BTreeMap<String, SpanStats>,
}

#[derive(Debug, Serialize)]
struct SpanStats {
    samples: usize,
    min_us: f64,
    max_us: f64,
    mean_us: f64,
}

fn parse_span_stats(path: &Path) -> Result<BTreeMap<String, SpanStats>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut samples: HashMap<String, Vec<f64>> = HashMap::new();
    for &name in &TRACKED_SPANS {
        samples.insert(name.to_string(), Vec::new());
    }

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let Ok(value) = serde_json::from_str::<Value>(&line) else {
            continue;
        };

        let Some(span_name) = extract_span_name(&value) else {
            continue;
        };
        if !TRACKED_SPANS.contains(&span_name.as_str()) {
            continue;
        }
        let Some(busy_us) = extract_busy_us(&value) else {
            continue;
        };
        samples.entry(span_name).or_default().push(busy_us);
    }

    let mut stats = BTreeMap::new();
    for (name, mut values) in samples {
        if values.is_empty() {
            continue;
        }
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let sum: f64 = values.iter().sum();
        stats.insert(
            name,
            SpanStats {
                samples: values.len(),
                min_us: values[0],
                max_us: values[values.len() - 1],
                mean_us: sum / values.len() as f64,
            },
        );
    }
    Ok(stats)
}

fn extract_span_name(value: &Value) -> Option<String> {
    value
        .pointer("/span/name")
        .or_else(|| value.pointer("/fields/name"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// `tracing-subscriber` reports close timings as strings like `"12.3µs"` or
/// `"4.56ms"`; normalize to microseconds.
fn extract_busy_us(value: &Value) -> Option<f64> {
    let busy = value
        .pointer("/fields/time.busy")
        .and_then(Value::as_str)?;
    parse_duration_us(busy)
}

fn parse_duration_us(s: &str) -> Option<f64> {
    let s = s.trim();
    let (number, scale) = if let Some(v) = s.strip_suffix("µs") {
        (v, 1.0)
    } else if let Some(v) = s.strip_suffix("us") {
        (v, 1.0)
    } else if let Some(v) = s.strip_suffix("ms") {
        (v, 1_000.0)
    } else if let Some(v) = s.strip_suffix("ns") {
        (v, 0.001)
    } else if let Some(v) = s.strip_suffix('s') {
        (v, 1_000_000.0)
    } else {
        (s, 1.0)
    };
    number.trim().parse::<f64>().ok().map(|v| v * scale)
}
