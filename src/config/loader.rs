//! Configuration file loading.

use std::fs;
use std::path::Path;

use crate::config::ClientConfig;
use crate::errors::{AnalyticsError, Result};

/// Read, parse and validate a client configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ClientConfig> {
    let contents = fs::read_to_string(path)
        .map_err(|e| AnalyticsError::io_with_path(format!("failed to read config: {e}"), path))?;
    let config = parse_config(&contents)?;
    log::debug!(
        "loaded config for '{}' from {}",
        config.client_id,
        path.display()
    );
    Ok(config)
}

/// Parse and validate a configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<ClientConfig> {
    let config: ClientConfig = toml::from_str(contents)
        .map_err(|e| AnalyticsError::config(format!("failed to parse config: {e}")))?;
    config.validate()?;
    Ok(config)
}

const STARTER_CONFIG: &str = r#"# searchdelta client configuration
client_id = "generic"

# Dimensions to analyze: "query", "page", or both.
dimensions = ["query", "page"]

# Non-brand queries tracked in their own report table.
# Top-level keys must stay above the [[brand_groups]] tables; TOML assigns
# anything below a table header to that table.
important_keywords = ["buy acme online", "acme coupon"]

# Physical column names in the source CSVs.
date_column = "date"

[metric_columns]
clicks = "clicks"
impressions = "impressions"
ctr = "ctr"
position = "position"

# Brand groups in priority order: when phrases overlap, the first listed
# group claims the record.
[[brand_groups]]
name = "brand"
phrases = ["acme", "acme store"]

[[brand_groups]]
name = "payments"
phrases = ["acme pay", "acmepay"]
"#;

/// Write a starter configuration for a new client.
pub fn write_starter_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(AnalyticsError::io_with_path(
            "config already exists (pass --force to overwrite)",
            path,
        ));
    }
    fs::write(path, STARTER_CONFIG)
        .map_err(|e| AnalyticsError::io_with_path(format!("failed to write config: {e}"), path))?;
    log::info!("wrote starter config to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Dimension;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            client_id = "transbank"
            dimensions = ["query", "page"]
            important_keywords = ["link de pago"]

            [[brand_groups]]
            name = "webpay"
            phrases = ["webpay", "web pay"]

            [[brand_groups]]
            name = "onepay"
            phrases = ["onepay"]
            "#,
        )
        .unwrap();
        assert_eq!(config.client_id, "transbank");
        assert_eq!(config.brand_groups.len(), 2);
        assert_eq!(config.brand_groups[0].name, "webpay");
        assert_eq!(config.important_keywords, vec!["link de pago"]);
        assert!(config.has_dimension(Dimension::Page));
        assert_eq!(config.date_column, "date");
        assert_eq!(config.metric_columns.clicks, "clicks");
    }

    #[test]
    fn test_parse_rejects_unknown_dimension() {
        let result = parse_config(r#"dimensions = ["query", "device"]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_rejects_ambiguous_phrase() {
        let result = parse_config(
            r#"
            [[brand_groups]]
            name = "a"
            phrases = ["shared"]

            [[brand_groups]]
            name = "b"
            phrases = ["Shared"]
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_starter_config_parses() {
        let config = parse_config(STARTER_CONFIG).unwrap();
        assert_eq!(config.brand_groups.len(), 2);
        assert!(config.has_dimension(Dimension::Query));
        assert_eq!(
            config.important_keywords,
            vec!["buy acme online", "acme coupon"]
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.client_id, "generic");
        assert_eq!(config.dimensions, vec![Dimension::Query]);
        assert!(config.brand_groups.is_empty());
    }
}
