//! `tracing-subscriber` installation.
//!
//! Filtering follows `RUST_LOG` and defaults to `info`.

use tracing_subscriber::EnvFilter;

/// Selects the output format of [`init_with`].
pub const LOG_FORMAT_ENV_VAR: &str = "HBNB_LOG_FORMAT";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    Text,
}

impl LogFormat {
    /// `text` (any case) selects [`LogFormat::Text`]; anything else is JSON.
    pub fn from_setting(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("text") => Self::Text,
            _ => Self::Json,
        }
    }

    pub fn from_env() -> Self {
        Self::from_setting(std::env::var(LOG_FORMAT_ENV_VAR).ok().as_deref())
    }
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Returns `false` when one was already set.
pub fn init_with(format: LogFormat) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false);

    match format {
        LogFormat::Json => builder.json().try_init().is_ok(),
        LogFormat::Text => builder.try_init().is_ok(),
    }
}

pub(crate) fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_defaults_to_json() {
        assert_eq!(LogFormat::from_setting(None), LogFormat::Json);
        assert_eq!(LogFormat::from_setting(Some("json")), LogFormat::Json);
        assert_eq!(LogFormat::from_setting(Some("pretty")), LogFormat::Json);
    }

    #[test]
    fn text_is_case_insensitive() {
        assert_eq!(LogFormat::from_setting(Some("TEXT")), LogFormat::Text);
        assert_eq!(LogFormat::from_setting(Some(" text ")), LogFormat::Text);
    }

    #[test]
    fn second_install_is_a_no_op() {
        let _ = init_with(LogFormat::Text);
        assert!(!init_with(LogFormat::Json));
        crate::init();
    }
}
