//! Gateway configuration with validation.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

/// Main gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP server configuration
    pub http: HttpConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Request body limits
    pub limits: LimitsConfig,
    /// Which operations require a valid signature
    pub auth: AuthConfig,
    /// Debug affordances
    pub debug: DebugConfig,
}

impl GatewayConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        if self.cors.enabled && self.cors.allowed_origin.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "cors.allowed_origin cannot be empty while CORS is enabled".into(),
            ));
        }

        if self.limits.max_request_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_request_size cannot be 0".into(),
            ));
        }

        for name in &self.auth.protected_routes {
            Operation::from_str(name)?;
        }

        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }

    /// Whether the signature guard wraps `op`
    pub fn is_protected(&self, op: Operation) -> bool {
        self.auth
            .protected_routes
            .iter()
            .any(|name| name.trim() == op.as_str())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 3000)
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 3000,
        }
    }
}

/// CORS configuration. Cross-origin access is limited to one origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Enable CORS
    pub enabled: bool,
    /// The single origin allowed to call the API
    pub allowed_origin: String,
    /// Allowed methods
    pub allowed_methods: Vec<String>,
    /// Allowed request headers
    pub allowed_headers: Vec<String>,
    /// Max age for preflight cache (seconds)
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origin: "http://localhost:4200".to_string(),
            allowed_methods: ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
            allowed_headers: ["content-type", "x-key", "x-route", "x-signature"]
                .iter()
                .map(|h| h.to_string())
                .collect(),
            max_age: 86400, // 24 hours
        }
    }
}

/// Request limits configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Max request body size in bytes (default: 1MB)
    pub max_request_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_request_size: 1024 * 1024, // 1MB
        }
    }
}

/// Signature guard placement.
///
/// Empty by default: every operation is reachable without a signature, which
/// matches the behavior clients of the board already depend on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Operation names (see [`Operation`]) that require a valid signature
    pub protected_routes: Vec<String>,
}

/// Debug affordances
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Mount `GET /credentials`.
    ///
    /// INSECURE: the dump returns every shared secret in clear text.
    pub expose_credentials: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            expose_credentials: true,
        }
    }
}

/// Operations exposed over HTTP, by the names used in `auth.protected_routes`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `PUT /credential`
    RegisterCredential,
    /// `GET /credentials`
    ListCredentials,
    /// `POST /message`
    CreateMessage,
    /// `GET /message/:id`
    GetMessage,
    /// `GET /messages/:tag`
    SearchMessages,
    /// `DELETE /message/:id`
    DeleteMessage,
}

impl Operation {
    /// Every operation, in route-table order
    pub const ALL: [Operation; 6] = [
        Operation::RegisterCredential,
        Operation::ListCredentials,
        Operation::CreateMessage,
        Operation::GetMessage,
        Operation::SearchMessages,
        Operation::DeleteMessage,
    ];

    /// Configuration name
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::RegisterCredential => "register_credential",
            Operation::ListCredentials => "list_credentials",
            Operation::CreateMessage => "create_message",
            Operation::GetMessage => "get_message",
            Operation::SearchMessages => "search_messages",
            Operation::DeleteMessage => "delete_message",
        }
    }
}

impl FromStr for Operation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s.trim())
            .ok_or_else(|| ConfigError::UnknownOperation(s.to_string()))
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// HTTP port is zero
    #[error("http.port cannot be 0")]
    InvalidPort,
    /// Invalid size limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Name in `auth.protected_routes` matches no operation
    #[error("unknown operation in auth.protected_routes: {0}")]
    UnknownOperation(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.http.port, 3000);
        assert_eq!(config.cors.allowed_origin, "http://localhost:4200");
        assert!(config.auth.protected_routes.is_empty());
        assert!(config.debug.expose_credentials);
    }

    #[test]
    fn test_config_addresses() {
        let config = GatewayConfig::default();
        assert_eq!(config.http_addr().port(), 3000);
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut config = GatewayConfig::default();
        config.http.port = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPort)));
    }

    #[test]
    fn test_unknown_operation_rejected() {
        let mut config = GatewayConfig::default();
        config.auth.protected_routes = vec!["create_message".into(), "eth_call".into()];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownOperation(name)) if name == "eth_call"
        ));
    }

    #[test]
    fn test_is_protected() {
        let mut config = GatewayConfig::default();
        config.auth.protected_routes = vec!["delete_message".into()];
        assert!(config.is_protected(Operation::DeleteMessage));
        assert!(!config.is_protected(Operation::GetMessage));
    }

    #[test]
    fn test_operation_names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GatewayConfig =
            serde_json::from_str(r#"{"http":{"port":8080},"auth":{"protected_routes":["get_message"]}}"#)
                .unwrap();
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.limits.max_request_size, 1024 * 1024);
        assert!(config.is_protected(Operation::GetMessage));
    }
}
