use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub const LOG_ENV: &str = "REG_LIN_LOG";

/// Maps the number of `-v` flags to a level, warnings are shown by default.
pub fn verbosity_level(occurrences: u8) -> LevelFilter {
    match occurrences {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Builds the log filter. A set `REG_LIN_LOG` wins over the verbosity flags and must parse.
pub fn filter(
    env_value: Option<&str>,
    verbosity: LevelFilter,
) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
    match env_value {
        Some(directives) => EnvFilter::try_new(directives),
        None => EnvFilter::try_new(format!("skostr_hoyde={verbosity},reg_lin={verbosity}")),
    }
}

/// Initialises tracing.
pub fn init(verbosity: LevelFilter) -> Result<(), tracing_subscriber::filter::ParseError> {
    let env_value = std::env::var(LOG_ENV).ok();
    let format_filter = filter(env_value.as_deref(), verbosity)?;

    let format_layer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_writer(std::io::stderr)
        .with_filter(format_filter);

    tracing_subscriber::registry().with(format_layer).init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn more_flags_mean_more_output() {
        assert_eq!(verbosity_level(0), LevelFilter::WARN);
        assert_eq!(verbosity_level(1), LevelFilter::INFO);
        assert_eq!(verbosity_level(2), LevelFilter::DEBUG);
        assert_eq!(verbosity_level(7), LevelFilter::TRACE);
    }

    #[test]
    fn env_directives_override_verbosity() {
        let filter = filter(Some("skostr_hoyde=trace"), LevelFilter::WARN).unwrap();

        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn malformed_env_directives_are_rejected() {
        assert!(filter(Some("skostr_hoyde=loud"), LevelFilter::WARN).is_err());
    }

    #[test]
    fn verbosity_applies_without_env() {
        let filter = filter(None, LevelFilter::DEBUG).unwrap();

        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
