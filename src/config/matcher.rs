//! Compiled phrase matchers.
//!
//! Each phrase set becomes a single case-insensitive alternation, built
//! once and reused for every record. Semantics are plain substring
//! containment (not whole-word), identical to checking each phrase with
//! `contains` on lower-cased text.

use regex::{escape, Regex, RegexBuilder};

use crate::config::ClientConfig;
use crate::errors::{AnalyticsError, Result};

/// A compiled OR-of-substrings matcher over one phrase set.
///
/// An empty phrase set matches nothing.
#[derive(Debug, Clone)]
pub struct PhraseMatcher {
    regex: Option<Regex>,
}

impl PhraseMatcher {
    pub fn new<S: AsRef<str>>(phrases: &[S]) -> Result<Self> {
        if phrases.is_empty() {
            return Ok(Self { regex: None });
        }
        let pattern = phrases
            .iter()
            .map(|p| escape(p.as_ref()))
            .collect::<Vec<_>>()
            .join("|");
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| AnalyticsError::config(format!("failed to compile phrase set: {e}")))?;
        Ok(Self { regex: Some(regex) })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.as_ref().is_some_and(|r| r.is_match(text))
    }
}

/// The full client taxonomy with every matcher pre-compiled: one per brand
/// group (in configured priority order), one over all brand phrases and one
/// over the important keywords.
#[derive(Debug, Clone)]
pub struct CompiledTaxonomy {
    groups: Vec<(String, PhraseMatcher)>,
    all_brands: PhraseMatcher,
    important: PhraseMatcher,
}

impl CompiledTaxonomy {
    pub fn compile(config: &ClientConfig) -> Result<Self> {
        let mut groups = Vec::with_capacity(config.brand_groups.len());
        for group in &config.brand_groups {
            groups.push((group.name.clone(), PhraseMatcher::new(&group.phrases)?));
        }
        let all_brands = PhraseMatcher::new(&config.all_brand_phrases())?;
        let important = PhraseMatcher::new(&config.important_keywords)?;
        Ok(Self {
            groups,
            all_brands,
            important,
        })
    }

    /// First group whose matcher hits `text`, in configured order.
    pub fn classify_group(&self, text: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|(_, matcher)| matcher.is_match(text))
            .map(|(name, _)| name.as_str())
    }

    pub fn is_brand(&self, text: &str) -> bool {
        self.all_brands.is_match(text)
    }

    pub fn is_important(&self, text: &str) -> bool {
        self.important.is_match(text)
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &PhraseMatcher)> {
        self.groups.iter().map(|(name, m)| (name.as_str(), m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BrandGroup;

    #[test]
    fn test_empty_matcher_matches_nothing() {
        let matcher = PhraseMatcher::new::<&str>(&[]).unwrap();
        assert!(!matcher.is_match("anything"));
        assert!(!matcher.is_match(""));
    }

    #[test]
    fn test_matcher_escapes_metacharacters() {
        let matcher = PhraseMatcher::new(&["pago (qr)", "c++ pos"]).unwrap();
        assert!(matcher.is_match("como funciona pago (qr) hoy"));
        assert!(matcher.is_match("terminal C++ POS"));
        assert!(!matcher.is_match("pago qr"));
    }

    #[test]
    fn test_matcher_substring_not_whole_word() {
        let matcher = PhraseMatcher::new(&["webpay"]).unwrap();
        assert!(matcher.is_match("miwebpayplus"));
    }

    #[test]
    fn test_taxonomy_preserves_group_order() {
        let config = ClientConfig {
            brand_groups: vec![
                BrandGroup {
                    name: "first".to_string(),
                    phrases: vec!["shared".to_string()],
                },
                BrandGroup {
                    name: "second".to_string(),
                    phrases: vec!["shared thing".to_string()],
                },
            ],
            ..ClientConfig::default()
        };
        let taxonomy = CompiledTaxonomy::compile(&config).unwrap();
        assert_eq!(taxonomy.classify_group("a shared thing"), Some("first"));
    }

    #[test]
    fn test_taxonomy_matches_config_semantics() {
        let config = ClientConfig {
            brand_groups: vec![BrandGroup {
                name: "webpay".to_string(),
                phrases: vec!["webpay".to_string(), "web pay".to_string()],
            }],
            important_keywords: vec!["link de pago".to_string()],
            ..ClientConfig::default()
        };
        let taxonomy = CompiledTaxonomy::compile(&config).unwrap();
        for text in ["comprar webpay plus", "Web Pay", "nada que ver", "LINK de pago ya"] {
            assert_eq!(taxonomy.is_brand(text), config.is_brand(text), "{text}");
            assert_eq!(
                taxonomy.is_important(text),
                config.is_important(text),
                "{text}"
            );
            assert_eq!(
                taxonomy.classify_group(text),
                config.classify_group(text),
                "{text}"
            );
        }
    }
}
