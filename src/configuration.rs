use std::time::Duration;

use secrecy::SecretString;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::domain::SubscriberEmail;
use crate::email_client::EmailClient;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Settings {
    pub app: ApplicationSettings,
    pub auth: AuthSettings,
    pub email_client: EmailClientSettings,
    pub storage: StorageSettings,
    pub intake: IntakeSettings,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub base_url: String,
}

/// Shared Basic-auth credentials for the admin and download routes.
#[derive(serde::Deserialize, Debug, Clone)]
pub struct AuthSettings {
    pub username: String,
    pub password: SecretString,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct EmailClientSettings {
    pub base_url: String,
    pub sender_email: String,
    pub auth_token: SecretString,
    pub timeout_ms: u64,
    /// Recipient for new-subscriber notifications. No notification is
    /// attempted when unset.
    pub admin_email: Option<String>,
}

impl EmailClientSettings {
    pub fn client(self) -> EmailClient {
        let sender_email = self.sender().expect("Invalid sender email address.");
        let timeout = self.timeout();
        EmailClient::new(self.base_url, sender_email, self.auth_token, timeout)
    }

    pub fn sender(&self) -> Result<SubscriberEmail, String> {
        SubscriberEmail::parse(self.sender_email.clone())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Which of the platform-provided stores are bound in this environment.
/// An unbound namespace degrades the handlers that need it, the same way
/// a missing binding does on the hosting platform.
#[derive(serde::Deserialize, Debug, Clone)]
pub struct StorageSettings {
    pub subscribers: bool,
    pub submissions: bool,
    pub bucket: bool,
    /// Public base URL of the bucket, when it is exposed directly.
    pub public_base_url: Option<String>,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct IntakeSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub subscribe_cooldown_secs: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub share_cooldown_secs: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_file_bytes: usize,
    pub allowed_file_types: Vec<String>,
}

impl IntakeSettings {
    pub fn subscribe_cooldown(&self) -> Duration {
        Duration::from_secs(self.subscribe_cooldown_secs)
    }

    pub fn share_cooldown(&self) -> Duration {
        Duration::from_secs(self.share_cooldown_secs)
    }
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "production" => Ok(Environment::Production),
            other => Err(format!(
                "{other} is not supported environment. Try to use `local` or `production`",
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine current directory");
    let conf_dir = base_path.join("configuration");
    let env: Environment = std::env::var("APP_ENV")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .expect("Failed to parse APP_ENV");

    let settings = config::Config::builder()
        .add_source(
            config::File::with_name(
                conf_dir
                    .join("base")
                    .to_str()
                    .expect("Failed to read base configuration"),
            )
            .required(true),
        )
        .add_source(
            config::File::with_name(
                conf_dir
                    .join(env.as_str())
                    .to_str()
                    .expect("Failed to read environment configuration"),
            )
            .required(true),
        )
        .add_source(
            config::Environment::with_prefix("APP")
                .separator("__")
                .prefix_separator("_"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
