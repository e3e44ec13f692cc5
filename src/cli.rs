use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{loader::InputFormat, output::OutputFormat};

#[derive(Debug, Parser)]
#[command(author, version, about = "Profile tabular data and recommend charts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Profile a CSV or JSON file: column types, statistics, insights and chart recommendations
    Profile(ProfileArgs),
    /// List the insights derived from a dataset
    Insights(InputArgs),
    /// List the chart recommendations for a dataset
    Recommend(InputArgs),
    /// Generate dashboard chart specifications from the recommendations
    Dashboard(DashboardArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input CSV or JSON file (`-` reads stdin and needs --input-format)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Input format (defaults to the file extension)
    #[arg(long = "input-format", value_enum)]
    pub input_format: Option<InputFormat>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Maximum rows to load (0 = all)
    #[arg(long, default_value_t = 0)]
    pub limit: usize,
    /// YAML file overriding the profiling thresholds
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Output file for the chart specifications (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_delimiter_accepts_names_and_single_chars() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter("pipe"), Ok(b'|'));
        assert_eq!(parse_delimiter(":"), Ok(b':'));
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("::").is_err());
        assert!(parse_delimiter("é").is_err());
    }

    #[test]
    fn profile_args_parse_with_defaults() {
        let cli = Cli::try_parse_from(["csv-insight", "profile", "-i", "data.csv"]).expect("parse");
        match cli.command {
            Commands::Profile(args) => {
                assert_eq!(args.format, OutputFormat::Table);
                assert_eq!(args.input.limit, 0);
                assert!(args.input.config.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
