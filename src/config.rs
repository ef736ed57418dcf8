use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ConsoleConfig {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "default_keystore_dir")]
    pub keystore_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Accounts to unlock at startup: addresses or indexes into the keystore.
    #[serde(default)]
    pub unlock: Vec<String>,
    /// Newline-separated password list, one entry per unlock request.
    #[serde(default)]
    pub password_file: Option<String>,
}

fn default_rpc_url() -> String {
    "http://127.0.0.1:9000".to_string()
}

fn default_keystore_dir() -> String {
    "./keystore".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            keystore_dir: default_keystore_dir(),
            log_level: default_log_level(),
            unlock: vec![],
            password_file: None,
        }
    }
}

impl ConsoleConfig {
    pub fn load_or_default(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            match std::fs::read_to_string(path) {
                Ok(s) => match toml::from_str(&s) {
                    Ok(c) => c,
                    Err(e) => {
                        eprintln!("Error parsing config: {}. Using Defaults.", e);
                        Self::default()
                    }
                },
                Err(e) => {
                    eprintln!("Error reading config: {}. Using Defaults.", e);
                    Self::default()
                }
            }
        } else {
            let config = Self::default();
            if let Ok(s) = toml::to_string_pretty(&config) {
                let _ = std::fs::write(path, s);
            }
            config
        }
    }
}
