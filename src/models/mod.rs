//! Core data structures for `.http` files.
//!
//! Two families of types live here:
//!
//! - **Raw**: [`HttpFile`] and [`HttpRequest`] as produced by the parser.
//!   URLs, header values, and bodies may still contain `{{ … }}` template
//!   expressions, and timeouts may be unset.
//! - **Resolved**: [`ResolvedFile`] and [`ResolvedRequest`] as produced by
//!   the resolver. All templates substituted, URLs validated as absolute,
//!   defaults applied. These are the concrete request plans the executor
//!   consumes.

pub mod file;
pub mod request;
pub mod resolved;
pub mod response;

pub use file::{HttpFile, Prompt};
pub use request::{HttpMethod, HttpRequest};
pub use resolved::{ResolvedFile, ResolvedRequest};
pub use response::HttpResponse;

use std::time::Duration;

/// Formats a [`Duration`] in the same unit-suffixed notation the directive
/// grammar accepts (`ns`, `us`, `ms`, `s`, `m`, `h`), so rendered files
/// parse back to the same value.
pub(crate) fn format_duration(duration: Duration) -> String {
    if duration.is_zero() {
        return "0s".to_string();
    }

    let nanos = u64::from(duration.subsec_nanos());
    let secs = duration.as_secs();

    // Sub-second durations use the largest unit that divides evenly
    if secs == 0 {
        if nanos % 1_000_000 == 0 {
            return format!("{}ms", nanos / 1_000_000);
        }
        if nanos % 1_000 == 0 {
            return format!("{}us", nanos / 1_000);
        }
        return format!("{nanos}ns");
    }

    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    if seconds > 0 || nanos > 0 {
        if nanos == 0 {
            out.push_str(&format!("{seconds}s"));
        } else {
            let fractional = format!("{:.9}", seconds as f64 + f64::from(duration.subsec_nanos()) / 1e9);
            out.push_str(fractional.trim_end_matches('0'));
            out.push('s');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        let tests = [
            (Duration::ZERO, "0s"),
            (Duration::from_secs(5), "5s"),
            (Duration::from_secs(30), "30s"),
            (Duration::from_secs(90), "1m30s"),
            (Duration::from_secs(60), "1m"),
            (Duration::from_secs(3600), "1h"),
            (Duration::from_secs(3600 + 120 + 3), "1h2m3s"),
            (Duration::from_millis(500), "500ms"),
            (Duration::from_micros(250), "250us"),
            (Duration::from_nanos(42), "42ns"),
            (Duration::from_millis(1500), "1.5s"),
        ];

        for (duration, want) in tests {
            assert_eq!(format_duration(duration), want, "{duration:?}");
        }
    }

    #[test]
    fn test_format_duration_round_trips() {
        use crate::parser::duration::parse_duration;

        for duration in [
            Duration::from_secs(30),
            Duration::from_secs(90),
            Duration::from_millis(250),
            Duration::from_micros(7),
            Duration::from_nanos(999),
            Duration::from_secs(7200),
            Duration::from_millis(1500),
        ] {
            let rendered = format_duration(duration);
            let parsed = parse_duration(&rendered).unwrap();
            assert_eq!(parsed, duration, "{rendered}");
        }
    }
}
