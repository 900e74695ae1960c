use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    version = concat!(
        env!("CARGO_PKG_VERSION"), " - ",
        env!("VERGEN_GIT_DESCRIBE"), "(",
        env!("VERGEN_BUILD_DATE"), ")"
    ),
    about
)]
pub struct Args {
    /// Query result JSON file, `-` reads it from stdin
    #[arg(short, long, env = "SQLLAB_RESULTS", value_name = "PATH")]
    pub results: PathBuf,

    /// Path to config file
    #[arg(short, long, env = "SQLLAB_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Title of the query, shown in the header and the SQL viewer
    #[arg(long, default_value = "Query")]
    pub title: String,

    /// Initial label of scheduled queries
    #[arg(long)]
    pub label: Option<String>,

    /// Initial filter text
    #[arg(long, value_name = "TEXT")]
    pub filter: Option<String>,

    /// Tick rate, i.e. number of ticks per second
    #[arg(long, value_name = "FLOAT", default_value_t = 4.0, value_parser = positive_rate)]
    pub tick_rate: f64,

    /// Frame rate, i.e. number of frames per second
    #[arg(long, value_name = "FLOAT", default_value_t = 60.0, value_parser = positive_rate)]
    pub frame_rate: f64,
}

/// Rates are per second and must be finite and above zero.
fn positive_rate(s: &str) -> Result<f64, String> {
    let rate: f64 = s.parse().map_err(|e| format!("`{s}` is not a number: {e}"))?;
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(format!("`{s}` must be a positive number"))
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_args() {
        Args::command().debug_assert();

        let args = Args::parse_from(["sqllab-tui", "-r", "-", "--filter", "b1", "--label", "daily"]);
        assert_eq!(args.results, PathBuf::from("-"));
        assert_eq!(args.title, "Query");
        assert_eq!(args.filter.as_deref(), Some("b1"));
        assert_eq!(args.label.as_deref(), Some("daily"));
        assert_eq!(args.tick_rate, 4.0);
    }

    #[test]
    fn test_rates_must_be_positive() {
        let args = Args::parse_from(["sqllab-tui", "-r", "-", "--tick-rate", "0.5"]);
        assert_eq!(args.tick_rate, 0.5);

        for bad in ["0", "-1", "inf", "NaN", "fast"] {
            let result = Args::try_parse_from(["sqllab-tui", "-r", "-", "--tick-rate", bad]);
            assert!(result.is_err(), "--tick-rate {bad} should be rejected");
            let result = Args::try_parse_from(["sqllab-tui", "-r", "-", "--frame-rate", bad]);
            assert!(result.is_err(), "--frame-rate {bad} should be rejected");
        }
    }
}
