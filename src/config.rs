use crate::constants::{
    DEFAULT_BUFFER_SIZE, DEFAULT_LISTEN_ADDRESS, DEFAULT_LISTEN_PORT, DEFAULT_PASV_PORT_COUNT,
    DEFAULT_PASV_PORT_START, DEFAULT_ROOT_SUBDIR, ROOT_ENV_VAR,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_address: String,
    pub listen_port: u16,
    pub pasv_address: Option<String>, // Advertised in 227 replies, control socket address if unset
    pub root_dir: Option<String>,
    pub pasv_port_start: u16,
    pub pasv_port_count: u16,
    pub upload_buffer_size: Option<usize>,
    pub download_buffer_size: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: String::from(DEFAULT_LISTEN_ADDRESS),
            listen_port: DEFAULT_LISTEN_PORT,
            pasv_address: None,
            root_dir: None,
            pasv_port_start: DEFAULT_PASV_PORT_START,
            pasv_port_count: DEFAULT_PASV_PORT_COUNT,
            upload_buffer_size: Some(DEFAULT_BUFFER_SIZE),
            download_buffer_size: Some(DEFAULT_BUFFER_SIZE),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path))?;
        Self::from_toml(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {}", path))
    }

    pub fn from_toml(config_str: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(config_str)?;

        // Set defaults if not specified
        if config.server.upload_buffer_size.is_none() {
            config.server.upload_buffer_size = Some(DEFAULT_BUFFER_SIZE);
        }
        if config.server.download_buffer_size.is_none() {
            config.server.download_buffer_size = Some(DEFAULT_BUFFER_SIZE);
        }

        Ok(config)
    }
}

impl ServerConfig {
    pub fn upload_buffer(&self) -> usize {
        self.upload_buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE).max(1)
    }

    pub fn download_buffer(&self) -> usize {
        self.download_buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE).max(1)
    }

    /// The IPv4 address to advertise in PASV replies, if one is configured.
    pub fn pasv_ipv4(&self) -> Result<Option<Ipv4Addr>> {
        self.pasv_address
            .as_deref()
            .map(|addr| {
                addr.parse::<Ipv4Addr>()
                    .with_context(|| format!("Invalid pasv_address: {}", addr))
            })
            .transpose()
    }

    /// Picks the sandbox root: `root_dir`, then `$FTP_PREFIX`, then a
    /// per-user data directory. The result is made absolute but not
    /// canonicalized, since it may not exist yet.
    pub fn sandbox_root(&self) -> Result<PathBuf> {
        let env_root = std::env::var(ROOT_ENV_VAR).ok().filter(|v| !v.is_empty());
        let home = std::env::var("HOME").ok();
        select_root(self.root_dir.as_deref(), env_root.as_deref(), home.as_deref())
    }
}

fn select_root(
    configured: Option<&str>,
    env_root: Option<&str>,
    home: Option<&str>,
) -> Result<PathBuf> {
    let chosen = match (configured, env_root) {
        (Some(dir), _) if !dir.is_empty() => PathBuf::from(dir),
        (_, Some(dir)) => PathBuf::from(dir),
        _ => {
            let home = home.context("HOME is not set and no sandbox root was configured")?;
            Path::new(home).join(DEFAULT_ROOT_SUBDIR)
        }
    };

    if chosen.is_absolute() {
        Ok(chosen)
    } else {
        let cwd = std::env::current_dir().context("Failed to read the working directory")?;
        Ok(cwd.join(chosen))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_table_missing() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.server.listen_port, DEFAULT_LISTEN_PORT);
        assert_eq!(config.server.pasv_port_start, 12040);
        assert_eq!(config.server.pasv_port_count, 50);
        assert_eq!(config.server.download_buffer(), DEFAULT_BUFFER_SIZE);
        assert!(config.server.pasv_address.is_none());
    }

    #[test]
    fn test_partial_server_table() {
        let config = Config::from_toml(
            r#"
            [server]
            listen_port = 2121
            pasv_address = "10.0.0.5"
            pasv_port_count = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.server.listen_port, 2121);
        assert_eq!(config.server.pasv_port_count, 5);
        assert_eq!(config.server.listen_address, DEFAULT_LISTEN_ADDRESS);
        assert_eq!(
            config.server.pasv_ipv4().unwrap(),
            Some(Ipv4Addr::new(10, 0, 0, 5))
        );
    }

    #[test]
    fn test_bad_pasv_address() {
        let config = Config::from_toml("[server]\npasv_address = \"::1\"\n").unwrap();
        assert!(config.server.pasv_ipv4().is_err());
    }

    #[test]
    fn test_root_precedence() {
        let root = select_root(Some("/srv/ftp"), Some("/env/ftp"), Some("/home/u")).unwrap();
        assert_eq!(root, PathBuf::from("/srv/ftp"));

        let root = select_root(None, Some("/env/ftp"), Some("/home/u")).unwrap();
        assert_eq!(root, PathBuf::from("/env/ftp"));

        let root = select_root(None, None, Some("/home/u")).unwrap();
        assert_eq!(root, PathBuf::from("/home/u/.local/share/minftpd"));

        assert!(select_root(None, None, None).is_err());
    }

    #[test]
    fn test_relative_root_made_absolute() {
        let root = select_root(Some("data"), None, None).unwrap();
        assert!(root.is_absolute());
        assert!(root.ends_with("data"));
    }
}
