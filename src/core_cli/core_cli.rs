use clap::Parser;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "minftpd", about = "A minimal FTP server written in Rust.")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Control connection port, overrides the config file
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Sandbox root directory, overrides the config file and FTP_PREFIX
    #[arg(short, long)]
    pub root: Option<String>,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_overrides() {
        let cli = Cli::parse_from(["minftpd", "-c", "/etc/minftpd.toml", "-p", "2121", "-r", "/srv/ftp", "-v"]);
        assert_eq!(cli.config.as_deref(), Some("/etc/minftpd.toml"));
        assert_eq!(cli.port, Some(2121));
        assert_eq!(cli.root.as_deref(), Some("/srv/ftp"));
        assert!(cli.verbose);

        let cli = Cli::parse_from(["minftpd"]);
        assert!(cli.config.is_none() && cli.port.is_none() && cli.root.is_none());
        assert!(!cli.verbose);
    }
}
