use std::time::Duration;

use bevy::prelude::*;
use shared::WALK_ACK_TIMEOUT;

/// One-way delay of the loopback transport when nothing is configured.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(80);

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetSettings {
    /// Simulated one-way latency, applied in both directions.
    pub latency: Duration,
    /// How long a walk request may go unanswered before the client resyncs.
    pub ack_timeout: Duration,
}

impl Default for NetSettings {
    fn default() -> Self {
        Self {
            latency: DEFAULT_LATENCY,
            ack_timeout: WALK_ACK_TIMEOUT,
        }
    }
}

impl NetSettings {
    pub fn from_cli_env() -> Self {
        Self::from_sources(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// Read settings from CLI arguments, falling back to environment variables.
    ///
    /// Supported:
    ///   --latency-ms <ms>, --latency-ms=<ms>         (WALK_LATENCY_MS)
    ///   --ack-timeout-ms <ms>, --ack-timeout-ms=<ms> (WALK_ACK_TIMEOUT_MS)
    fn from_sources(
        args: impl IntoIterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let mut latency = None;
        let mut ack_timeout = None;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let (key, inline) = match arg.split_once('=') {
                Some((key, value)) => (key.to_string(), Some(value.to_string())),
                None => (arg, None),
            };
            let slot = match key.as_str() {
                "--latency-ms" => &mut latency,
                "--ack-timeout-ms" => &mut ack_timeout,
                _ => continue,
            };
            let Some(value) = inline.or_else(|| args.next()) else {
                warn!("{key} expects a value in milliseconds");
                continue;
            };
            *slot = parse_millis(&key, &value);
        }

        let defaults = Self::default();
        Self {
            latency: latency
                .or_else(|| env("WALK_LATENCY_MS").and_then(|v| parse_millis("WALK_LATENCY_MS", &v)))
                .unwrap_or(defaults.latency),
            ack_timeout: ack_timeout
                .or_else(|| {
                    env("WALK_ACK_TIMEOUT_MS")
                        .and_then(|v| parse_millis("WALK_ACK_TIMEOUT_MS", &v))
                })
                .unwrap_or(defaults.ack_timeout),
        }
    }
}

fn parse_millis(source: &str, value: &str) -> Option<Duration> {
    match value.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(err) => {
            warn!("ignoring {source}={value:?}: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_without_any_source() {
        assert_eq!(NetSettings::from_sources(args(&[]), |_| None), NetSettings::default());
    }

    #[test]
    fn cli_accepts_both_spellings() {
        let settings = NetSettings::from_sources(
            args(&["--latency-ms", "150", "--ack-timeout-ms=900"]),
            |_| None,
        );
        assert_eq!(settings.latency, Duration::from_millis(150));
        assert_eq!(settings.ack_timeout, Duration::from_millis(900));
    }

    #[test]
    fn cli_wins_over_env() {
        let settings = NetSettings::from_sources(args(&["--latency-ms=5"]), |key| match key {
            "WALK_LATENCY_MS" => Some("500".into()),
            "WALK_ACK_TIMEOUT_MS" => Some("2500".into()),
            _ => None,
        });
        assert_eq!(settings.latency, Duration::from_millis(5));
        assert_eq!(settings.ack_timeout, Duration::from_millis(2500));
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let settings = NetSettings::from_sources(args(&["--latency-ms", "soon"]), |_| None);
        assert_eq!(settings.latency, DEFAULT_LATENCY);
    }
}
