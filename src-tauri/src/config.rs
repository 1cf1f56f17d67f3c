use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::Service;
use crate::error::{ConsoleError, ConsoleResult};

pub const CONFIG_FILE: &str = "cims.toml";
pub const DEFAULT_PLACEHOLDER_IMAGE: &str = "/user/images/default_image.jpg";

/// Runtime settings for the console, read from `cims.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Origin of the CIMS gateway, e.g. `http://localhost:8080`.
    pub base_url: String,
    pub services: ServicePrefixes,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub log_level: String,
    pub placeholder_image: String,
}

/// Path prefix of each backend service behind the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicePrefixes {
    pub user: String,
    pub employee: String,
    pub equipment: String,
    pub project: String,
    pub client: String,
}

impl Default for ServicePrefixes {
    fn default() -> Self {
        Self {
            user: "/user".to_string(),
            employee: "/employee".to_string(),
            equipment: "/equipment".to_string(),
            project: "/project".to_string(),
            client: "/client".to_string(),
        }
    }
}

impl ServicePrefixes {
    pub fn prefix(&self, service: Service) -> &str {
        match service {
            Service::User => self.user.as_str(),
            Service::Employee => self.employee.as_str(),
            Service::Equipment => self.equipment.as_str(),
            Service::Project => self.project.as_str(),
            Service::Client => self.client.as_str(),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            services: ServicePrefixes::default(),
            connect_timeout_ms: 5_000,
            read_timeout_ms: 30_000,
            log_level: "info".to_string(),
            placeholder_image: DEFAULT_PLACEHOLDER_IMAGE.to_string(),
        }
    }
}

impl ConsoleConfig {
    /// Loads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> ConsoleResult<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn parse(text: &str) -> ConsoleResult<Self> {
        let config: ConsoleConfig = toml::from_str(text)
            .map_err(|err| ConsoleError::InvalidConfig(err.to_string()))?;
        config.validate()
    }

    /// Applies `CIMS_BASE_URL` and `CIMS_LOG` on top of the file settings.
    pub fn apply_env(self) -> ConsoleResult<Self> {
        self.apply_overrides(
            std::env::var("CIMS_BASE_URL").ok(),
            std::env::var("CIMS_LOG").ok(),
        )
    }

    pub fn apply_overrides(
        mut self,
        base_url: Option<String>,
        log_level: Option<String>,
    ) -> ConsoleResult<Self> {
        if let Some(base_url) = base_url.filter(|value| !value.trim().is_empty()) {
            self.base_url = base_url.trim().to_string();
        }
        if let Some(level) = log_level.filter(|value| !value.trim().is_empty()) {
            self.log_level = level.trim().to_ascii_lowercase();
        }
        self.validate()
    }

    fn validate(mut self) -> ConsoleResult<Self> {
        let base = self.base_url.trim().trim_end_matches('/').to_string();
        let lower = base.to_ascii_lowercase();
        if !lower.starts_with("http://") && !lower.starts_with("https://") {
            return Err(ConsoleError::InvalidConfig(format!(
                "base_url '{}' must start with http:// or https://",
                self.base_url
            )));
        }
        if self.read_timeout_ms == 0 {
            return Err(ConsoleError::InvalidConfig(
                "read_timeout_ms must be greater than zero".to_string(),
            ));
        }
        self.base_url = base;
        Ok(self)
    }

    /// Absolute URL for a gateway path such as `/user/login`.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Gateway path of `rest` under the prefix of `service`.
    pub fn service_path(&self, service: Service, rest: &str) -> String {
        format!(
            "{}/{}",
            self.services.prefix(service).trim_end_matches('/'),
            rest.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = ConsoleConfig::load(&dir.path().join(CONFIG_FILE)).expect("load");
        assert_eq!(config, ConsoleConfig::default());
    }

    #[test]
    fn file_settings_are_read_and_normalised() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "base_url = \"https://cims.example.com/\"\nread_timeout_ms = 1500\n\n[services]\nemployee = \"/hr\""
        )
        .expect("write config");
        let config = ConsoleConfig::load(file.path()).expect("load");
        assert_eq!(config.base_url, "https://cims.example.com");
        assert_eq!(config.read_timeout_ms, 1500);
        assert_eq!(config.services.employee, "/hr");
        assert_eq!(config.services.user, "/user");
        assert_eq!(
            config.service_path(Service::Employee, "employee/getAll"),
            "/hr/employee/getAll"
        );
    }

    #[test]
    fn base_url_without_scheme_is_rejected() {
        let err = ConsoleConfig::parse("base_url = \"cims.local\"").expect_err("invalid");
        assert!(matches!(err, ConsoleError::InvalidConfig(_)));
    }

    #[test]
    fn overrides_replace_file_values() {
        let config = ConsoleConfig::default()
            .apply_overrides(Some("http://10.0.0.5:9000".to_string()), Some("DEBUG".to_string()))
            .expect("overrides");
        assert_eq!(config.url("/user/login"), "http://10.0.0.5:9000/user/login");
        assert_eq!(config.log_level, "debug");
    }
}
