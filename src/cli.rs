/// Command-line flags.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "ledbadge-sim",
    version,
    about = "A terminal mock of an 11x44 LED name badge",
    after_help = "KEYS (terminal view):\n    q, Esc, Ctrl+C    quit"
)]
pub struct Args {
    /// Read settings from this config.toml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show this text at start-up (\n for a line break)
    #[arg(long, allow_hyphen_values = true)]
    pub text: Option<String>,

    /// Feed display directives from a file
    #[arg(long, value_name = "PATH")]
    pub script: Option<PathBuf>,

    /// Centre text instead of scrolling it
    #[arg(long = "static")]
    pub static_mode: bool,

    /// Print frames as text instead of the terminal view (reads directives
    /// from stdin when no --script is given)
    #[arg(long)]
    pub plain: bool,

    /// Stop after N render ticks
    #[arg(long, value_name = "N")]
    pub ticks: Option<u64>,

    /// List the builtin icon tokens and exit
    #[arg(long = "icons")]
    pub list_icons: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("ledbadge-sim").chain(args.iter().copied()))
    }

    #[test]
    fn command_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn no_flags() {
        let a = parse(&[]).unwrap();
        assert_eq!(a.config, None);
        assert_eq!(a.text, None);
        assert!(!a.static_mode && !a.plain && !a.list_icons);
        assert_eq!(a.ticks, None);
    }

    #[test]
    fn all_flags() {
        let a = parse(&[
            "--config", "my.toml", "--text", "Hi :heart:", "--script", "demo.txt", "--static", "--plain", "--ticks",
            "20", "--icons",
        ])
        .unwrap();
        assert_eq!(a.config, Some(PathBuf::from("my.toml")));
        assert_eq!(a.text.as_deref(), Some("Hi :heart:"));
        assert_eq!(a.script, Some(PathBuf::from("demo.txt")));
        assert!(a.static_mode && a.plain && a.list_icons);
        assert_eq!(a.ticks, Some(20));
    }

    #[test]
    fn text_may_start_with_a_dash() {
        assert_eq!(parse(&["--text", "-5 C"]).unwrap().text.as_deref(), Some("-5 C"));
    }

    #[test]
    fn errors() {
        assert!(parse(&["--text"]).is_err());
        assert_eq!(parse(&["--ticks", "many"]).unwrap_err().kind(), ErrorKind::ValueValidation);
        assert_eq!(parse(&["--loud"]).unwrap_err().kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn help_and_version() {
        assert_eq!(parse(&["--help"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
        assert_eq!(parse(&["--version"]).unwrap_err().kind(), ErrorKind::DisplayVersion);
        let help = Args::command().render_long_help().to_string();
        assert!(help.contains("--script") && help.contains("Ctrl+C"));
    }
}
