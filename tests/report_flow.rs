//! End-to-end report generation over a synthetic two-period batch.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use searchdelta::analysis::query::QueryAnalyzer;
use searchdelta::{
    BrandGroup, ClientConfig, Dimension, Metric, Period, Record, SearchAnalyzer,
};

fn config() -> ClientConfig {
    ClientConfig {
        client_id: "transbank".to_string(),
        brand_groups: vec![
            BrandGroup {
                name: "webpay".to_string(),
                phrases: vec!["webpay".to_string(), "web pay".to_string()],
            },
            BrandGroup {
                name: "onepay".to_string(),
                phrases: vec!["onepay".to_string()],
            },
        ],
        important_keywords: vec!["link de pago".to_string()],
        dimensions: vec![Dimension::Query, Dimension::Page],
        ..ClientConfig::default()
    }
}

fn record(day: u32, query: &str, page: &str, clicks: u64) -> Record {
    Record::new(
        NaiveDate::from_ymd_opt(2026, 6, day).unwrap(),
        Some(query.to_string()),
        Some(page.to_string()),
        clicks,
        clicks * 10,
        0.1,
        4.0,
    )
}

fn batch() -> Vec<Record> {
    vec![
        // period 1: June 1-7
        record(1, "comprar Webpay", "https://www.example.cl/webpay", 100),
        record(2, "link de pago webpay", "https://pay.example.cl/link", 40),
        record(3, "maquina pos", "https://www.example.cl/pos", 60),
        // period 2: June 8-14
        record(9, "comprar Webpay", "https://www.example.cl/webpay", 150),
        record(10, "link de pago webpay", "https://pay.example.cl/link", 20),
        record(11, "maquina pos", "https://www.example.cl/pos", 60),
        record(12, "pagar onepay", "https://www.example.cl/onepay", 30),
    ]
}

fn periods() -> (Period, Period) {
    (
        Period::new(
            NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 6, 7).unwrap(),
        ),
        Period::new(
            NaiveDate::from_ymd_opt(2026, 6, 8).unwrap(),
            NaiveDate::from_ymd_opt(2026, 6, 14).unwrap(),
        ),
    )
}

#[test]
fn full_report_overview_totals() {
    let analyzer = SearchAnalyzer::new(batch(), config()).unwrap();
    let (p1, p2) = periods();
    let report = analyzer.generate_full_report(&p1, &p2, None, 10).unwrap();

    let overview = report.overview.unwrap();
    let totals = overview.iter().find(|r| r.category == "totals").unwrap();
    assert_eq!(totals.clicks_initial, 200);
    assert_eq!(totals.clicks_final, 260);
    assert_eq!(totals.var_clicks, 60);
    assert_eq!(totals.var_clicks_pct, Some(30.0));
    // Share denominators sum clicks over every summarized subset, the
    // overlapping ones included: 540 in the initial period (totals 200 +
    // branded 140 + non_branded 60 + solo_webpay 140 + solo_onepay 0) and
    // 720 in the final (260 + 200 + 60 + 170 + 30).
    assert_eq!(totals.share_initial_pct, 37.04);
    assert_eq!(totals.share_final_pct, 36.11);

    // onepay only exists in the final period; zero-defaulted initial side.
    let solo_onepay = overview.iter().find(|r| r.category == "solo_onepay").unwrap();
    assert_eq!(solo_onepay.clicks_initial, 0);
    assert_eq!(solo_onepay.clicks_final, 30);
    assert_eq!(solo_onepay.var_clicks_pct, None);
}

#[test]
fn full_report_top_queries_ranked_by_absolute_variation() {
    let analyzer = SearchAnalyzer::new(batch(), config()).unwrap();
    let (p1, p2) = periods();
    let report = analyzer.generate_full_report(&p1, &p2, None, 3).unwrap();

    let movers = report.top_queries_clicks.unwrap();
    let items: Vec<&str> = movers.iter().map(|r| r.item.as_str()).collect();
    // |150-100|=50, |20-40|=20, |30-0|=30, |60-60|=0; queries are lower-cased.
    assert_eq!(items, vec!["comprar webpay", "pagar onepay", "link de pago webpay"]);
    assert_eq!(movers[0].group.as_deref(), Some("webpay"));
    assert_eq!(movers[1].variation, 30);
    assert_eq!(movers[2].variation, -20);
}

#[test]
fn important_comparison_matches_prefiltered_group_comparison() {
    let cfg = config();
    let analyzer = SearchAnalyzer::new(batch(), cfg.clone()).unwrap();
    let (p1, p2) = periods();
    let report = analyzer.generate_full_report(&p1, &p2, None, 10).unwrap();
    let from_report = report.important_keywords_clicks.unwrap();

    // Same comparison, run over a batch reduced to important queries first.
    let important: Vec<Record> = batch()
        .into_iter()
        .filter(|r| {
            r.query
                .as_deref()
                .is_some_and(|q| q.to_lowercase().contains("link de pago"))
        })
        .collect();
    let prefiltered = QueryAnalyzer::new(important, &cfg).unwrap();
    let manual = prefiltered
        .compare_by_groups(
            &prefiltered.filter_by_period(&p1),
            &prefiltered.filter_by_period(&p2),
            &cfg.brand_groups,
            Metric::Clicks,
        )
        .unwrap();
    assert_eq!(from_report, manual);
}

#[test]
fn subdomain_tables_present_only_with_filters() {
    let analyzer = SearchAnalyzer::new(batch(), config()).unwrap();
    let (p1, p2) = periods();

    let without = analyzer.generate_full_report(&p1, &p2, None, 10).unwrap();
    assert!(without.subdomains.is_none());

    let filters = vec!["pay.example.cl".to_string()];
    let with = analyzer
        .generate_full_report(&p1, &p2, Some(&filters), 10)
        .unwrap();
    let subdomains = with.subdomains.unwrap();
    assert_eq!(subdomains.len(), 1);
    assert_eq!(subdomains[0].subdomain, "pay.example.cl");
    assert_eq!(subdomains[0].clicks_initial, 40);
    assert_eq!(subdomains[0].clicks_final, 20);
    assert_eq!(subdomains[0].var_clicks, -20);
    assert_eq!(subdomains[0].var_clicks_pct, Some(-50.0));
}

#[test]
fn subdomain_distribution_by_hostname() {
    let analyzer = SearchAnalyzer::new(batch(), config()).unwrap();
    let (p1, p2) = periods();
    let report = analyzer.generate_full_report(&p1, &p2, None, 10).unwrap();

    let distribution = report.subdomain_distribution.unwrap();
    // Combined clicks: www 400, pay 60; sorted by clicks descending.
    assert_eq!(distribution[0].category, "www.example.cl");
    assert_eq!(distribution[0].clicks, 400);
    assert_eq!(distribution[1].category, "pay.example.cl");
    assert_eq!(distribution[1].clicks, 60);

    let p1_only = report.subdomain_distribution_p1.unwrap();
    assert_eq!(p1_only[0].clicks, 160);
}
