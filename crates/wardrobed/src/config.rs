use std::path::PathBuf;

/// Which D-Bus bus to serve on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusKind {
    Session,
    System,
}

impl BusKind {
    /// `"system"` selects the system bus; anything else the session bus.
    pub fn from_env_value(value: &str) -> Self {
        if value.eq_ignore_ascii_case("system") {
            Self::System
        } else {
            Self::Session
        }
    }
}

/// Daemon configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite database file.
    pub db_path: PathBuf,
    /// Directory garment photos are copied into.
    pub upload_dir: PathBuf,
    /// Bus to register `org.freedesktop.Wardrobe1` on.
    pub bus: BusKind,
}

impl Config {
    /// Load configuration from `WARDROBE_*` environment variables with defaults.
    pub fn from_env() -> Self {
        let data_dir = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
                PathBuf::from(home).join(".local/share")
            })
            .join("wardrobe");

        Self {
            db_path: env_path("WARDROBE_DB_PATH").unwrap_or_else(|| data_dir.join("wardrobe.db")),
            upload_dir: env_path("WARDROBE_UPLOAD_DIR").unwrap_or_else(|| data_dir.join("uploads")),
            bus: std::env::var("WARDROBE_BUS")
                .map(|v| BusKind::from_env_value(&v))
                .unwrap_or(BusKind::Session),
        }
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_kind_parsing() {
        assert_eq!(BusKind::from_env_value("system"), BusKind::System);
        assert_eq!(BusKind::from_env_value("SYSTEM"), BusKind::System);
        assert_eq!(BusKind::from_env_value("session"), BusKind::Session);
        assert_eq!(BusKind::from_env_value(""), BusKind::Session);
    }

    #[test]
    fn test_default_paths_share_data_dir() {
        let config = Config::from_env();
        if std::env::var_os("WARDROBE_DB_PATH").is_none()
            && std::env::var_os("WARDROBE_UPLOAD_DIR").is_none()
        {
            assert_eq!(config.db_path.parent(), config.upload_dir.parent());
            assert!(config.db_path.ends_with("wardrobe/wardrobe.db"));
        }
    }
}
