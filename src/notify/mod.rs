// Notification composition and publishing

pub mod http;
pub mod publisher;

pub use http::HttpTopicPublisher;
pub use publisher::{DryRunPublisher, Publisher, publish};

use crate::certificates::CertificateInfo;
use crate::config::Configuration;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Message handed to a [`Publisher`], consumed once
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishInput {
    pub message: String,
    pub subject: String,
    pub destination: String,
}

/// Build the expiry warning for `config.domain_name`
pub fn compose(config: &Configuration, info: &CertificateInfo) -> PublishInput {
    let message = format!(
        "{} certificate will expire in {} days on {}.",
        config.domain_name,
        info.days_remaining,
        format_expiration(&info.expiration)
    );
    let subject = format!("{} Certificate Expiring Soon", config.domain_name);

    PublishInput {
        message,
        subject,
        destination: config.notification_channel.clone(),
    }
}

/// RFC 822 style calendar date, e.g. `02 Jan 27 15:04 UTC`
pub fn format_expiration(expiration: &DateTime<Utc>) -> String {
    expiration.format("%d %b %y %H:%M %Z").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificates::evaluate;
    use chrono::{Duration, TimeZone};

    fn config() -> Configuration {
        Configuration {
            domain_name: "example.com".to_string(),
            notification_channel: "topic-1".to_string(),
            buffer_days: 30,
        }
    }

    #[test]
    fn test_format_expiration() {
        let expiration = Utc.with_ymd_and_hms(2027, 1, 2, 15, 4, 5).unwrap();
        assert_eq!(format_expiration(&expiration), "02 Jan 27 15:04 UTC");
    }

    #[test]
    fn test_compose() {
        let now = Utc.with_ymd_and_hms(2026, 12, 28, 15, 4, 0).unwrap();
        let info = evaluate(now, 30, now + Duration::days(5));

        let input = compose(&config(), &info);

        assert_eq!(input.subject, "example.com Certificate Expiring Soon");
        assert_eq!(
            input.message,
            "example.com certificate will expire in 5 days on 02 Jan 27 15:04 UTC."
        );
        assert_eq!(input.destination, "topic-1");
    }

    #[test]
    fn test_compose_expired() {
        let now = Utc.with_ymd_and_hms(2026, 12, 28, 0, 0, 0).unwrap();
        let info = evaluate(now, 30, now - Duration::days(3));

        let input = compose(&config(), &info);
        assert!(input.message.contains("expire in -3 days"));
    }
}
