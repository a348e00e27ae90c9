use serde::Deserialize;

/// Top-level configuration settings for the application.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub server: ServerSettings,
    pub broker: BrokerSettings,
    pub tracking: TrackingSettings,
    pub logging: LoggingSettings,
}

/// Address the WebSocket listener binds to.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BrokerSettings {
    /// Connections past this count are refused at accept time.
    pub max_connections: usize,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TrackingSettings {
    /// Answer malformed identifiers with an `error` frame instead of
    /// dropping them silently.
    pub strict_identifiers: bool,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
}

/// Partial configuration loaded from files or environment. Missing values
/// are filled from `Settings::default()`.
#[derive(Debug, Default, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub broker: Option<PartialBrokerSettings>,
    pub tracking: Option<PartialTrackingSettings>,
    pub logging: Option<PartialLoggingSettings>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PartialBrokerSettings {
    pub max_connections: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PartialTrackingSettings {
    pub strict_identifiers: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
}

impl PartialSettings {
    /// Overlay the provided values on top of `defaults`.
    pub fn merge(self, defaults: Settings) -> Settings {
        let server = self.server.unwrap_or_default();
        let broker = self.broker.unwrap_or_default();
        let tracking = self.tracking.unwrap_or_default();
        let logging = self.logging.unwrap_or_default();

        Settings {
            server: ServerSettings {
                host: server.host.unwrap_or(defaults.server.host),
                port: server.port.unwrap_or(defaults.server.port),
            },
            broker: BrokerSettings {
                max_connections: broker
                    .max_connections
                    .unwrap_or(defaults.broker.max_connections),
            },
            tracking: TrackingSettings {
                strict_identifiers: tracking
                    .strict_identifiers
                    .unwrap_or(defaults.tracking.strict_identifiers),
            },
            logging: LoggingSettings {
                level: logging.level.unwrap_or(defaults.logging.level),
            },
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 5000,
            },
            broker: BrokerSettings {
                max_connections: 1000,
            },
            tracking: TrackingSettings {
                strict_identifiers: true,
            },
            logging: LoggingSettings {
                level: "info".to_string(),
            },
        }
    }
}
