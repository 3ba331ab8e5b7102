use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "subhunt")]
#[command(about = "Locates and downloads subtitles for video files", long_about = None)]
#[command(version)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download the best-matching subtitles for a video file or directory
    Download {
        /// Video file, or directory scanned recursively for video files
        path: PathBuf,

        /// Comma-separated list of subtitle languages (e.g. "en,pt-br")
        #[arg(short, long)]
        languages: Option<String>,

        /// Comma-separated list of services to query (default: all)
        #[arg(short, long)]
        services: Option<String>,

        /// Service configuration value, as "service.key=value" (repeatable)
        #[arg(long = "set", value_name = "SERVICE.KEY=VALUE")]
        set: Vec<String>,

        /// Language renames for saved file names, as "from=to"
        /// (e.g. "pt-br=pt", repeatable)
        #[arg(long = "lang-name", value_name = "FROM=TO")]
        lang_names: Vec<String>,
    },

    /// Parse a release name and print the extracted information as JSON
    Guess {
        /// Release name to parse (e.g. "Alien.1979.1080p.BluRay.x264.mkv")
        name: String,
    },

    /// List the available subtitle services
    Services,
}

/// Splits a comma-separated option into lowercase items, falling back to
/// the given defaults when absent.
pub fn split_list(value: Option<&str>, defaults: &[String]) -> Vec<String> {
    match value {
        Some(value) => value
            .split(',')
            .map(|item| item.trim().to_lowercase())
            .filter(|item| !item.is_empty())
            .collect(),
        None => defaults.iter().map(|item| item.to_lowercase()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list_from_option() {
        let defaults = vec!["en".to_string()];
        assert_eq!(
            split_list(Some("en, pt-BR"), &defaults),
            vec!["en", "pt-br"]
        );
        assert_eq!(split_list(None, &defaults), vec!["en"]);
        assert!(split_list(Some(""), &defaults).is_empty());
    }

    #[test]
    fn test_parse_download_command() {
        let args = Args::parse_from([
            "subhunt",
            "download",
            "/videos",
            "--languages",
            "en,fr",
            "--set",
            "opensubtitles.apikey=abc123",
        ]);

        match args.command {
            Commands::Download {
                path,
                languages,
                set,
                ..
            } => {
                assert_eq!(path, PathBuf::from("/videos"));
                assert_eq!(languages.as_deref(), Some("en,fr"));
                assert_eq!(set, vec!["opensubtitles.apikey=abc123"]);
            }
            _ => panic!("expected download command"),
        }
    }

    #[test]
    fn test_parse_guess_command() {
        let args = Args::parse_from(["subhunt", "guess", "Alien.1979.1080p.BluRay.x264.mkv"]);
        match args.command {
            Commands::Guess { name } => {
                assert_eq!(name, "Alien.1979.1080p.BluRay.x264.mkv");
            }
            _ => panic!("expected guess command"),
        }
    }
}
