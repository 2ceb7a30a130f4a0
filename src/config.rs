use std::env;
use std::path::PathBuf;

use log::warn;

/// Email collaborator settings. Everything here is optional or defaulted:
/// a deployment without mail credentials starts up, warns, and skips sending.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_key: Option<String>,
    pub admin_email: Option<String>,
    pub from_email: String,
    pub site_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub mail: MailConfig,
    pub status_cache_path: PathBuf,
}

impl Config {
    /// Read configuration from the environment. Only `DATABASE_URL` is fatal
    /// when absent; missing email settings degrade to warnings.
    pub fn from_env() -> Config {
        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .expect("PORT must be a valid number");

        let api_key = non_empty(env::var("RESEND_API_KEY").ok());
        if api_key.is_none() {
            warn!("RESEND_API_KEY is not set; transactional emails are disabled");
        }
        let admin_email = non_empty(env::var("ADMIN_EMAIL").ok());
        if admin_email.is_none() {
            warn!("ADMIN_EMAIL is not set; receipt notifications are disabled");
        }
        let from_email = env::var("RESEND_FROM_EMAIL")
            .unwrap_or_else(|_| "Storefront <onboarding@resend.dev>".to_string());
        let site_url = trim_trailing_slash(
            env::var("SITE_URL").unwrap_or_else(|_| format!("http://localhost:{port}")),
        );

        let status_cache_path = env::var("STATUS_CACHE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("order_status_updates.json"));

        Config {
            database_url,
            host,
            port,
            mail: MailConfig {
                api_key,
                admin_email,
                from_email,
                site_url,
            },
            status_cache_path,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn trim_trailing_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_credentials_count_as_absent() {
        assert_eq!(non_empty(Some("".to_string())), None);
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(
            non_empty(Some("re_123".to_string())),
            Some("re_123".to_string())
        );
    }

    #[test]
    fn site_url_loses_its_trailing_slash() {
        assert_eq!(
            trim_trailing_slash("https://shop.example/".to_string()),
            "https://shop.example"
        );
        assert_eq!(
            trim_trailing_slash("https://shop.example".to_string()),
            "https://shop.example"
        );
    }
}
