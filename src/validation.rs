use url::Url;

use crate::error::EngineError;

/// Supported check intervals and their human labels, in seconds
///
/// Closed vocabulary: administrative callers may only pick from this set.
pub const SUPPORTED_INTERVALS: [(u64, &str); 10] = [
    (10, "10sec"),
    (30, "30sec"),
    (60, "1min"),
    (120, "2min"),
    (180, "3min"),
    (300, "5min"),
    (600, "10min"),
    (900, "15min"),
    (1800, "30min"),
    (3600, "1hour"),
];

/// Validate an HTTP/HTTPS endpoint URL
pub fn validate_endpoint(endpoint: &str) -> Result<(), EngineError> {
    if endpoint.trim().is_empty() {
        return Err(EngineError::InvalidEndpoint("endpoint cannot be empty".into()));
    }

    match Url::parse(endpoint) {
        Ok(url) => {
            let scheme = url.scheme();
            if scheme != "http" && scheme != "https" {
                return Err(EngineError::InvalidEndpoint(format!(
                    "invalid scheme '{scheme}', must be http or https"
                )));
            }

            if url.host_str().is_none() {
                return Err(EngineError::InvalidEndpoint("URL must have a valid host".into()));
            }

            Ok(())
        }
        Err(e) => {
            if !endpoint.contains("://") {
                Err(EngineError::InvalidEndpoint(
                    "URL must include scheme (http:// or https://)".into(),
                ))
            } else {
                Err(EngineError::InvalidEndpoint(format!("invalid URL: {e}")))
            }
        }
    }
}

/// Validate a check interval against the supported vocabulary
pub fn validate_interval(interval_seconds: u64) -> Result<(), EngineError> {
    if SUPPORTED_INTERVALS.iter().any(|(s, _)| *s == interval_seconds) {
        Ok(())
    } else {
        Err(EngineError::InvalidInterval(interval_seconds))
    }
}

/// Human label for a supported interval ("5min", "1hour", ...)
pub fn interval_label(interval_seconds: u64) -> Option<&'static str> {
    SUPPORTED_INTERVALS
        .iter()
        .find(|(s, _)| *s == interval_seconds)
        .map(|(_, label)| *label)
}

/// Interval seconds for a human label
pub fn parse_interval_label(label: &str) -> Option<u64> {
    SUPPORTED_INTERVALS
        .iter()
        .find(|(_, l)| *l == label)
        .map(|(s, _)| *s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_validation() {
        assert!(validate_endpoint("http://example.com").is_ok());
        assert!(validate_endpoint("https://example.com").is_ok());
        assert!(validate_endpoint("https://example.com:8080/path").is_ok());

        assert!(validate_endpoint("").is_err());
        assert!(validate_endpoint("example.com").is_err());
        assert!(validate_endpoint("ftp://example.com").is_err());
    }

    #[test]
    fn interval_vocabulary_is_closed() {
        assert!(validate_interval(10).is_ok());
        assert!(validate_interval(300).is_ok());
        assert!(validate_interval(3600).is_ok());

        assert!(validate_interval(0).is_err());
        assert!(validate_interval(15).is_err());
        assert!(validate_interval(7200).is_err());
    }

    #[test]
    fn interval_labels_round_trip() {
        for (seconds, label) in SUPPORTED_INTERVALS {
            assert_eq!(interval_label(seconds), Some(label));
            assert_eq!(parse_interval_label(label), Some(seconds));
        }
        assert_eq!(interval_label(42), None);
        assert_eq!(parse_interval_label("2hour"), None);
    }
}
