use std::path::PathBuf;

use clap::Parser;
use clap::builder::TypedValueParser;

use crate::data::clean::CleanPolicy;
use crate::data::stats::DEFAULT_TOP_N;

/// Movie analytics dashboard.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Config {
    /// Movie table to open at startup (.csv, .json or .parquet).
    #[arg(value_name = "PATH", default_value = "sample_data.csv")]
    pub data: PathBuf,

    /// Number of entries in every "top" chart and table.
    #[arg(long, default_value_t = DEFAULT_TOP_N, value_parser = clap::value_parser!(u16).range(1..).map(usize::from))]
    pub top: usize,

    /// Abort on the first row with an undecodable genre list or score
    /// instead of skipping it.
    #[arg(long)]
    pub strict: bool,
}

impl Config {
    pub fn clean_policy(&self) -> CleanPolicy {
        if self.strict {
            CleanPolicy::Strict
        } else {
            CleanPolicy::Lenient
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: PathBuf::from("sample_data.csv"),
            top: DEFAULT_TOP_N,
            strict: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stock_dataset() {
        let cfg = Config::try_parse_from(["movie-dashboard"]).unwrap();
        assert_eq!(cfg.data, PathBuf::from("sample_data.csv"));
        assert_eq!(cfg.top, 10);
        assert_eq!(cfg.clean_policy(), CleanPolicy::Lenient);
    }

    #[test]
    fn flags_override_defaults() {
        let cfg = Config::try_parse_from(["movie-dashboard", "films.parquet", "--top", "5", "--strict"])
            .unwrap();
        assert_eq!(cfg.data, PathBuf::from("films.parquet"));
        assert_eq!(cfg.top, 5);
        assert_eq!(cfg.clean_policy(), CleanPolicy::Strict);
    }

    #[test]
    fn zero_top_is_rejected() {
        assert!(Config::try_parse_from(["movie-dashboard", "--top", "0"]).is_err());
    }
}
