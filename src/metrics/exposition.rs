//! Prometheus text exposition helpers.
//!
//! Shared by the counter and histogram families when rendering a snapshot.

use std::fmt::Write;

/// Content type served by the metrics endpoint.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Write the `# HELP` and `# TYPE` header lines of a metric family.
pub(crate) fn write_header(out: &mut String, name: &str, help: &str, kind: &str) {
    let _ = writeln!(out, "# HELP {} {}", name, escape_help(help));
    let _ = writeln!(out, "# TYPE {} {}", name, kind);
}

/// Write a single sample line.
///
/// `extra` is appended after the declared labels, which is how histograms
/// attach the `le` label to their bucket lines.
pub(crate) fn write_sample(
    out: &mut String,
    name: &str,
    keys: &[String],
    values: &[String],
    extra: Option<(&str, &str)>,
    value: &str,
) {
    out.push_str(name);

    if !keys.is_empty() || extra.is_some() {
        out.push('{');
        let mut first = true;
        for (key, value) in keys.iter().zip(values) {
            if !first {
                out.push(',');
            }
            first = false;
            let _ = write!(out, "{}=\"{}\"", key, escape_label_value(value));
        }
        if let Some((key, value)) = extra {
            if !first {
                out.push(',');
            }
            let _ = write!(out, "{}=\"{}\"", key, escape_label_value(value));
        }
        out.push('}');
    }

    out.push(' ');
    out.push_str(value);
    out.push('\n');
}

/// Format a float the way Prometheus expects (`+Inf`, `-Inf`, `NaN`).
pub(crate) fn format_float(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        value.to_string()
    }
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(0.1), "0.1");
        assert_eq!(format_float(1.0), "1");
        assert_eq!(format_float(2.5), "2.5");
        assert_eq!(format_float(f64::INFINITY), "+Inf");
        assert_eq!(format_float(f64::NEG_INFINITY), "-Inf");
        assert_eq!(format_float(f64::NAN), "NaN");
    }

    #[test]
    fn test_write_sample_without_labels() {
        let mut out = String::new();
        write_sample(&mut out, "served_total", &[], &[], None, "7");
        assert_eq!(out, "served_total 7\n");
    }

    #[test]
    fn test_write_sample_with_extra_label() {
        let mut out = String::new();
        let keys = vec!["method".to_string()];
        let values = vec!["GET".to_string()];
        write_sample(&mut out, "lat_bucket", &keys, &values, Some(("le", "0.5")), "2");
        assert_eq!(out, "lat_bucket{method=\"GET\",le=\"0.5\"} 2\n");
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape_label_value("a\"b\\c\nd"), "a\\\"b\\\\c\\nd");
        assert_eq!(escape_help("line\\one\ntwo"), "line\\\\one\\ntwo");
    }
}
