//! Client taxonomy configuration.
//!
//! A `ClientConfig` names the brand groups (ordered, first match wins),
//! the business-critical keywords, the dimensions to analyze and the
//! physical column names of the source data. Construction is validated:
//! a phrase owned by two groups is a configuration error rather than a
//! silent last-write-wins.

pub mod loader;
pub mod matcher;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{AnalyticsError, Result};

/// Dimensions a record batch can be analyzed along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Query,
    Page,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Query => "query",
            Dimension::Page => "page",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "query" => Ok(Dimension::Query),
            "page" => Ok(Dimension::Page),
            other => Err(AnalyticsError::argument(format!(
                "dimension '{other}' not supported, use 'query' or 'page'"
            ))),
        }
    }
}

/// One named set of phrases identifying a brand or product line.
///
/// Matching is case-insensitive substring over the full phrase, never
/// whole-word. Group order in the config file is significant: when two
/// groups share vocabulary the earlier group claims the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandGroup {
    pub name: String,
    pub phrases: Vec<String>,
}

/// Physical column names for the metric fields of the source schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricColumns {
    pub clicks: String,
    pub impressions: String,
    pub ctr: String,
    pub position: String,
}

impl Default for MetricColumns {
    fn default() -> Self {
        Self {
            clicks: "clicks".to_string(),
            impressions: "impressions".to_string(),
            ctr: "ctr".to_string(),
            position: "position".to_string(),
        }
    }
}

/// Per-client analysis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// Brand groups in priority order.
    #[serde(default)]
    pub brand_groups: Vec<BrandGroup>,

    /// Phrases flagging business-critical queries regardless of brand.
    #[serde(default)]
    pub important_keywords: Vec<String>,

    /// Dimensions active for this client.
    #[serde(default = "default_dimensions")]
    pub dimensions: Vec<Dimension>,

    /// Physical name of the date column in source files.
    #[serde(default = "default_date_column")]
    pub date_column: String,

    #[serde(default)]
    pub metric_columns: MetricColumns,
}

fn default_client_id() -> String {
    "generic".to_string()
}

fn default_dimensions() -> Vec<Dimension> {
    vec![Dimension::Query]
}

fn default_date_column() -> String {
    "date".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            brand_groups: Vec::new(),
            important_keywords: Vec::new(),
            dimensions: default_dimensions(),
            date_column: default_date_column(),
            metric_columns: MetricColumns::default(),
        }
    }
}

impl ClientConfig {
    /// Validate the configuration, failing on duplicate dimensions or a
    /// brand phrase claimed by more than one group.
    pub fn validate(&self) -> Result<()> {
        let mut seen_dims = Vec::new();
        for dim in &self.dimensions {
            if seen_dims.contains(dim) {
                return Err(AnalyticsError::config(format!(
                    "dimension '{dim}' listed more than once"
                )));
            }
            seen_dims.push(*dim);
        }

        let mut seen_groups: Vec<&str> = Vec::new();
        for group in &self.brand_groups {
            if group.name.trim().is_empty() {
                return Err(AnalyticsError::config("brand group with empty name"));
            }
            if seen_groups.contains(&group.name.as_str()) {
                return Err(AnalyticsError::config(format!(
                    "brand group '{}' defined twice",
                    group.name
                )));
            }
            seen_groups.push(&group.name);
        }

        // Ambiguous phrase ownership would make the owner map disagree with
        // first-match classification, so it is rejected up front.
        self.phrase_owner_map()?;
        Ok(())
    }

    /// Flat list of every brand phrase across all groups, lower-cased.
    pub fn all_brand_phrases(&self) -> Vec<String> {
        self.brand_groups
            .iter()
            .flat_map(|g| g.phrases.iter())
            .map(|p| p.to_lowercase())
            .collect()
    }

    /// Map from lower-cased phrase to owning group name. Errors when a
    /// phrase appears in two groups.
    pub fn phrase_owner_map(&self) -> Result<HashMap<String, String>> {
        let mut owners: HashMap<String, String> = HashMap::new();
        for group in &self.brand_groups {
            for phrase in &group.phrases {
                let key = phrase.to_lowercase();
                if let Some(owner) = owners.get(&key) {
                    if owner != &group.name {
                        return Err(AnalyticsError::config(format!(
                            "brand phrase '{key}' owned by both '{owner}' and '{}'",
                            group.name
                        )));
                    }
                } else {
                    owners.insert(key, group.name.clone());
                }
            }
        }
        Ok(owners)
    }

    /// First group (in configured order) with a phrase contained in `text`,
    /// case-insensitive. `None` when nothing matches.
    pub fn classify_group(&self, text: &str) -> Option<&str> {
        let lower = text.to_lowercase();
        for group in &self.brand_groups {
            for phrase in &group.phrases {
                if lower.contains(&phrase.to_lowercase()) {
                    return Some(&group.name);
                }
            }
        }
        None
    }

    pub fn is_brand(&self, text: &str) -> bool {
        self.classify_group(text).is_some()
    }

    pub fn is_important(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.important_keywords
            .iter()
            .any(|kw| lower.contains(&kw.to_lowercase()))
    }

    pub fn has_dimension(&self, dim: Dimension) -> bool {
        self.dimensions.contains(&dim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_group_config() -> ClientConfig {
        ClientConfig {
            client_id: "acme".to_string(),
            brand_groups: vec![
                BrandGroup {
                    name: "webpay".to_string(),
                    phrases: vec!["webpay".to_string(), "web pay".to_string()],
                },
                BrandGroup {
                    name: "onepay".to_string(),
                    phrases: vec!["onepay".to_string(), "webpay plus".to_string()],
                },
            ],
            important_keywords: vec!["link de pago".to_string()],
            dimensions: vec![Dimension::Query, Dimension::Page],
            ..ClientConfig::default()
        }
    }

    #[test]
    fn test_classify_group_first_match_wins() {
        let config = two_group_config();
        // Matches both "webpay" (group 1) and "webpay plus" (group 2);
        // the earlier group claims it.
        assert_eq!(config.classify_group("comprar webpay plus"), Some("webpay"));
    }

    #[test]
    fn test_classify_group_case_insensitive() {
        let config = two_group_config();
        assert_eq!(config.classify_group("Comprar WEBPAY hoy"), Some("webpay"));
        assert_eq!(config.classify_group("tarjeta de credito"), None);
    }

    #[test]
    fn test_is_brand_and_important() {
        let config = two_group_config();
        assert!(config.is_brand("pagar con onepay"));
        assert!(!config.is_brand("tarjeta"));
        assert!(config.is_important("crear Link de Pago rapido"));
        assert!(!config.is_important("webpay"));
    }

    #[test]
    fn test_validate_rejects_shared_phrase() {
        let mut config = two_group_config();
        config.brand_groups[1].phrases.push("Web Pay".to_string());
        let err = config.validate().unwrap_err();
        assert!(matches!(err, AnalyticsError::Config { .. }));
        assert!(err.to_string().contains("web pay"));
    }

    #[test]
    fn test_validate_rejects_duplicate_dimension() {
        let mut config = two_group_config();
        config.dimensions = vec![Dimension::Query, Dimension::Query];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dimension_from_str() {
        assert_eq!("query".parse::<Dimension>().unwrap(), Dimension::Query);
        assert_eq!("page".parse::<Dimension>().unwrap(), Dimension::Page);
        assert!("device".parse::<Dimension>().is_err());
    }

    #[test]
    fn test_all_brand_phrases_lowercased() {
        let mut config = two_group_config();
        config.brand_groups[0].phrases[1] = "Web Pay".to_string();
        let phrases = config.all_brand_phrases();
        assert!(phrases.contains(&"web pay".to_string()));
        assert_eq!(phrases.len(), 4);
    }
}
