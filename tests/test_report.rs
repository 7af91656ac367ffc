mod common;

use common::{day, healthy, row, setup, setup_with_source, FailingSource, RecordingNotifier, StaticSource};
use std::sync::Arc;

fn rows() -> Vec<adwatch::domain::entities::ad_record::RawAdRow> {
    let mut poor = row("a1", day(10));
    poor.spend = 25.0;
    vec![poor, healthy("b1", day(10))]
}

#[tokio::test]
async fn test_report_is_served_from_cache_within_ttl() {
    let source = StaticSource::new(rows());
    let aw = setup_with_source(source.clone(), RecordingNotifier::new());

    let first = aw.campaign_report_as_of(day(10)).await;
    assert!(!first.cached);
    assert_eq!(first.summary.total_spend, 225.0);
    assert_eq!(first.summary.total_purchases, 5);
    assert_eq!(first.summary.avg_cost_per_purchase, 45.0);

    let second = aw.campaign_report_as_of(day(10)).await;
    assert!(second.cached);
    assert_eq!(second.generated_at, first.generated_at);
    assert_eq!(
        second.evaluation.recommendations[0].id,
        first.evaluation.recommendations[0].id
    );
    assert_eq!(source.fetches(), 1);
}

#[tokio::test]
async fn test_invalidate_forces_fresh_report() {
    let source = StaticSource::new(rows());
    let aw = setup_with_source(source.clone(), RecordingNotifier::new());

    aw.campaign_report_as_of(day(10)).await;
    aw.invalidate_report();
    assert!(aw.report_cache_metadata().is_none());

    let fresh = aw.campaign_report_as_of(day(10)).await;
    assert!(!fresh.cached);
    assert_eq!(source.fetches(), 2);
}

#[tokio::test]
async fn test_cache_metadata_reports_thirty_minute_ttl() {
    let aw = setup();
    aw.import_rows(rows()).unwrap();
    assert!(aw.report_cache_metadata().is_none());

    aw.campaign_report_as_of(day(10)).await;
    let meta = aw.report_cache_metadata().unwrap();
    assert_eq!(meta.expires_at - meta.created_at, chrono::Duration::minutes(30));
}

#[tokio::test]
async fn test_report_for_another_day_is_not_served_from_cache() {
    let source = StaticSource::new(rows());
    let aw = setup_with_source(source.clone(), RecordingNotifier::new());

    aw.campaign_report_as_of(day(10)).await;
    let other = aw.campaign_report_as_of(day(11)).await;
    assert!(!other.cached);
    assert_eq!(other.evaluation.as_of, day(11));
    assert_eq!(source.fetches(), 2);
}

#[tokio::test]
async fn test_partial_report_is_not_cached() {
    let aw = setup_with_source(Arc::new(FailingSource), RecordingNotifier::new());
    let report = aw.campaign_report_as_of(day(10)).await;
    assert!(report.evaluation.partial);
    assert!(aw.report_cache_metadata().is_none());
    assert!(!aw.campaign_report_as_of(day(10)).await.cached);
}

#[tokio::test]
async fn test_find_recommendation_in_cached_report() {
    let aw = setup();
    aw.import_rows(rows()).unwrap();

    let report = aw.campaign_report_as_of(day(10)).await;
    let id = report.evaluation.recommendations[0].id.clone();
    let cached = aw.campaign_report_as_of(day(10)).await;
    let rec = cached.evaluation.find_recommendation(&id).unwrap();
    assert_eq!(rec.ad_id, "a1");
    assert!(cached.evaluation.find_recommendation("missing").is_none());
}
