//! Clap CLI definitions for `melodica`.

use std::path::PathBuf;

use clap::{ArgAction, CommandFactory, Parser};

/// Console audio player.
///
/// Plays the MP3 tracks listed in a playlist file, one URL or path per line.
#[derive(Parser, Debug)]
#[command(
    name = "melodica",
    version,
    override_usage = "melodica <playlist.txt>",
    disable_help_flag = true,
    help_template = "{usage-heading} {usage}\n\n{about-with-newline}\n{all-args}{after-help}"
)]
pub struct Cli {
    /// Text file listing one track URL or path per line.
    pub playlist: Option<PathBuf>,

    /// Configuration file (default: $MELODICA_CONFIG, then
    /// ~/.config/melodica/config.yaml).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Initial volume, 0.0 (mute) to the configured maximum.
    #[arg(long, value_name = "LEVEL")]
    pub volume: Option<f64>,

    /// File to append the log to.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Print the effective configuration as YAML and exit.
    #[arg(long)]
    pub print_config: bool,

    /// Print help.
    #[arg(short = 'h', long = "help", action = ArgAction::SetTrue)]
    pub help: bool,
}

/// Full help text, starting with the usage line.
pub fn help_text() -> String {
    Cli::command().render_help().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn help_starts_with_usage() {
        let help = help_text();
        assert!(
            help.starts_with("Usage: melodica <playlist.txt>"),
            "got: {help}"
        );
        assert!(help.contains("--print-config"));
    }

    #[test]
    fn parses_overrides() {
        let cli = Cli::try_parse_from([
            "melodica",
            "list.txt",
            "--volume",
            "0.5",
            "--log-file",
            "/tmp/m.log",
        ])
        .unwrap();
        assert_eq!(cli.playlist, Some(PathBuf::from("list.txt")));
        assert_eq!(cli.volume, Some(0.5));
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/m.log")));
        assert!(!cli.help);
    }
}
