//! The report facade: owns one analyzer per active dimension and composes
//! the fixed multi-table report.

use serde::Serialize;

use crate::analysis::page::PageAnalyzer;
use crate::analysis::query::QueryAnalyzer;
use crate::analysis::DimensionAnalyzer;
use crate::config::{ClientConfig, Dimension};
use crate::core::{
    DistributionRow, GroupComparisonRow, Metric, NamedTable, Period, Record,
    SubdomainComparisonRow, SubsetVariationRow, TopMoverRow,
};
use crate::errors::{AnalyticsError, Result};

/// Unified entry point over the query and page analyzers.
///
/// Dimensions not active in the configuration simply have no analyzer;
/// report entries for them are omitted, and the single-purpose accessors
/// reject them with an argument error.
pub struct SearchAnalyzer {
    config: ClientConfig,
    query: Option<QueryAnalyzer>,
    page: Option<PageAnalyzer>,
}

impl SearchAnalyzer {
    pub fn new(records: Vec<Record>, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let query = if config.has_dimension(Dimension::Query) {
            Some(QueryAnalyzer::new(records.clone(), &config)?)
        } else {
            None
        };
        let page = config
            .has_dimension(Dimension::Page)
            .then(|| PageAnalyzer::new(records));
        Ok(Self {
            config,
            query,
            page,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn analyzer(&self, dimension: Dimension) -> Result<&dyn DimensionAnalyzer> {
        let analyzer: Option<&dyn DimensionAnalyzer> = match dimension {
            Dimension::Query => self.query.as_ref().map(|a| a as &dyn DimensionAnalyzer),
            Dimension::Page => self.page.as_ref().map(|a| a as &dyn DimensionAnalyzer),
        };
        analyzer.ok_or_else(|| {
            AnalyticsError::argument(format!(
                "dimension '{dimension}' not active for client '{}'",
                self.config.client_id
            ))
        })
    }

    /// Per-subset comparison along one dimension.
    pub fn compare_periods(
        &self,
        dimension: Dimension,
        period_1: &Period,
        period_2: &Period,
    ) -> Result<Vec<SubsetVariationRow>> {
        Ok(self.analyzer(dimension)?.compare(period_1, period_2))
    }

    /// Top movers along one dimension.
    pub fn top_movers(
        &self,
        dimension: Dimension,
        period_1: &Period,
        period_2: &Period,
        metric: Metric,
        n: usize,
        subdomain_filter: Option<&[String]>,
    ) -> Result<Vec<TopMoverRow>> {
        Ok(self
            .analyzer(dimension)?
            .top_movers(period_1, period_2, metric, n, subdomain_filter))
    }

    /// Traffic distribution along one dimension.
    pub fn distribution(
        &self,
        dimension: Dimension,
        period: Option<&Period>,
    ) -> Result<Vec<DistributionRow>> {
        Ok(self.analyzer(dimension)?.distribution(period))
    }

    /// The full fixed report. Entries for inactive dimensions are omitted.
    pub fn generate_full_report(
        &self,
        period_1: &Period,
        period_2: &Period,
        subdomain_filters: Option<&[String]>,
        top_n: usize,
    ) -> Result<FullReport> {
        let mut report = FullReport::default();

        if let Some(query) = &self.query {
            report.overview = Some(query.compare(period_1, period_2));

            let records_1 = query.filter_by_period(period_1);
            let records_2 = query.filter_by_period(period_2);
            let groups = &self.config.brand_groups;
            report.brand_groups_clicks =
                Some(query.compare_by_groups(&records_1, &records_2, groups, Metric::Clicks)?);
            report.brand_groups_impressions = Some(query.compare_by_groups(
                &records_1,
                &records_2,
                groups,
                Metric::Impressions,
            )?);

            if !self.config.important_keywords.is_empty() {
                let important_1: Vec<&Record> = records_1
                    .iter()
                    .copied()
                    .filter(|r| r.is_important)
                    .collect();
                let important_2: Vec<&Record> = records_2
                    .iter()
                    .copied()
                    .filter(|r| r.is_important)
                    .collect();
                report.important_keywords_clicks = Some(query.compare_by_groups(
                    &important_1,
                    &important_2,
                    groups,
                    Metric::Clicks,
                )?);
            }

            report.top_queries_clicks = Some(query.top_movers(
                period_1,
                period_2,
                Metric::Clicks,
                top_n,
                subdomain_filters,
            ));
            report.top_queries_impressions = Some(query.top_movers(
                period_1,
                period_2,
                Metric::Impressions,
                top_n,
                subdomain_filters,
            ));

            report.category_distribution = Some(query.distribution(None));
        }

        if let Some(page) = &self.page {
            report.top_pages_clicks = Some(page.top_movers(
                period_1,
                period_2,
                Metric::Clicks,
                top_n,
                subdomain_filters,
            ));
            report.top_pages_impressions = Some(page.top_movers(
                period_1,
                period_2,
                Metric::Impressions,
                top_n,
                subdomain_filters,
            ));

            if let Some(patterns) = subdomain_filters {
                if !patterns.is_empty() {
                    report.subdomains =
                        Some(page.compare_subdomains(period_1, period_2, patterns));
                }
            }

            report.subdomain_distribution = Some(page.distribution(None));
            report.subdomain_distribution_p1 = Some(page.distribution(Some(period_1)));
            report.subdomain_distribution_p2 = Some(page.distribution(Some(period_2)));
        }

        Ok(report)
    }
}

/// The fixed multi-table report. `None` entries belong to dimensions or
/// inputs not active for the run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FullReport {
    pub overview: Option<Vec<SubsetVariationRow>>,
    pub brand_groups_clicks: Option<Vec<GroupComparisonRow>>,
    pub brand_groups_impressions: Option<Vec<GroupComparisonRow>>,
    pub important_keywords_clicks: Option<Vec<GroupComparisonRow>>,
    pub top_queries_clicks: Option<Vec<TopMoverRow>>,
    pub top_queries_impressions: Option<Vec<TopMoverRow>>,
    pub top_pages_clicks: Option<Vec<TopMoverRow>>,
    pub top_pages_impressions: Option<Vec<TopMoverRow>>,
    pub subdomains: Option<Vec<SubdomainComparisonRow>>,
    pub category_distribution: Option<Vec<DistributionRow>>,
    pub subdomain_distribution: Option<Vec<DistributionRow>>,
    pub subdomain_distribution_p1: Option<Vec<DistributionRow>>,
    pub subdomain_distribution_p2: Option<Vec<DistributionRow>>,
}

impl FullReport {
    /// Every present table in fixed order, in generic form.
    pub fn tables(&self) -> Vec<NamedTable> {
        let mut tables = Vec::new();
        if let Some(rows) = &self.overview {
            tables.push(NamedTable::from_rows("overview", rows));
        }
        if let Some(rows) = &self.brand_groups_clicks {
            tables.push(NamedTable::from_rows("brand_groups_clicks", rows));
        }
        if let Some(rows) = &self.brand_groups_impressions {
            tables.push(NamedTable::from_rows("brand_groups_impressions", rows));
        }
        if let Some(rows) = &self.important_keywords_clicks {
            tables.push(NamedTable::from_rows("important_keywords_clicks", rows));
        }
        if let Some(rows) = &self.top_queries_clicks {
            tables.push(NamedTable::from_rows("top_queries_clicks", rows));
        }
        if let Some(rows) = &self.top_queries_impressions {
            tables.push(NamedTable::from_rows("top_queries_impressions", rows));
        }
        if let Some(rows) = &self.top_pages_clicks {
            tables.push(NamedTable::from_rows("top_pages_clicks", rows));
        }
        if let Some(rows) = &self.top_pages_impressions {
            tables.push(NamedTable::from_rows("top_pages_impressions", rows));
        }
        if let Some(rows) = &self.subdomains {
            tables.push(NamedTable::from_rows("subdomains", rows));
        }
        if let Some(rows) = &self.category_distribution {
            tables.push(NamedTable::from_rows("category_distribution", rows));
        }
        if let Some(rows) = &self.subdomain_distribution {
            tables.push(NamedTable::from_rows("subdomain_distribution", rows));
        }
        if let Some(rows) = &self.subdomain_distribution_p1 {
            tables.push(NamedTable::from_rows("subdomain_distribution_p1", rows));
        }
        if let Some(rows) = &self.subdomain_distribution_p2 {
            tables.push(NamedTable::from_rows("subdomain_distribution_p2", rows));
        }
        tables
    }
}
