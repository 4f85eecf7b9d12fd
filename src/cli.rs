//! CLI argument parsing with clap

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// Media Mover - inbox watcher for photo and video organization
///
/// Watches a source directory for arriving media files and moves each
/// into an organized destination tree named from its capture timestamp.
/// Legacy video containers are remuxed to mp4 and successfully renamed
/// videos get a downscaled preview.
#[derive(Parser, Debug)]
#[command(name = "media-mover")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (TOML format)
    ///
    /// CLI arguments override config file settings.
    #[arg(short = 'C', long, env = "MEDIA_MOVER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Source directory to watch for arriving files
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Destination root for organized files
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// strftime-style naming pattern for the destination file
    #[arg(short = 'p', long)]
    pub pattern: Option<String>,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Merge CLI arguments with config from file.
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        if let Some(ref source) = self.source {
            config.source_dir = source.clone();
        }
        if let Some(ref dest) = self.dest {
            config.dest_dir = dest.clone();
        }
        if let Some(ref pattern) = self.pattern {
            config.file_pattern = pattern.clone();
        }
        if let Some(ref log_file) = self.log_file {
            config.log_file = log_file.clone();
        }
        if let Some(ref log_level) = self.log_level {
            config.log_level = log_level.clone();
        }
        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        self.merge_with_config(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_config_file_settings() {
        let cli = Cli::parse_from([
            "media-mover",
            "--source",
            "/cli/inbox",
            "--log-level",
            "debug",
        ]);
        let config = Config {
            source_dir: PathBuf::from("/file/inbox"),
            dest_dir: PathBuf::from("/file/out"),
            ..Config::default()
        };
        let merged = cli.merge_with_config(config);
        assert_eq!(merged.source_dir, PathBuf::from("/cli/inbox"));
        assert_eq!(merged.dest_dir, PathBuf::from("/file/out"));
        assert_eq!(merged.log_level, "debug");
    }

    #[test]
    fn to_config_starts_from_defaults() {
        let cli = Cli::parse_from(["media-mover", "-s", "/inbox", "-d", "/out"]);
        let config = cli.to_config();
        assert_eq!(config.source_dir, PathBuf::from("/inbox"));
        assert_eq!(config.file_pattern, "%Y/%m-%d_%H%M%S");
    }
}
