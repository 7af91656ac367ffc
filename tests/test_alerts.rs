mod common;

use adwatch::application::alert_dispatcher::{CheckOutcome, CheckResult, DispatchReport};
use adwatch::domain::values::alert_type::AlertType;
use adwatch::domain::values::campaign_filter::CampaignFilter;
use adwatch::domain::values::policy::Policy;
use adwatch::infrastructure::cache::memory::MemoryReportCache;
use adwatch::AdWatch;
use common::{at, day, healthy, setup, setup_with, setup_with_source, FailingSource, RecordingNotifier};
use std::sync::Arc;
use std::time::Duration;

/// $70 CPP over 10 purchases; click-to-purchase is a healthy 10%.
fn expensive_rows() -> Vec<adwatch::domain::entities::ad_record::RawAdRow> {
    let mut r = healthy("a1", day(10));
    r.spend = 700.0;
    r.link_clicks = 100;
    r.landing_page_views = 90;
    r.leads = 40;
    r.purchases = 10;
    vec![r]
}

fn check(report: &DispatchReport, alert_type: AlertType) -> &CheckResult {
    report
        .checks
        .iter()
        .find(|c| c.alert_type == alert_type)
        .unwrap()
}

#[tokio::test]
async fn test_second_run_ten_minutes_later_is_suppressed() {
    let notifier = RecordingNotifier::new();
    let aw = setup_with(notifier.clone());
    aw.import_rows(expensive_rows()).unwrap();

    let first = aw.dispatch_alerts_at(at(10, 12, 0)).await;
    assert!(matches!(
        check(&first, AlertType::HighCpp).outcome,
        CheckOutcome::Fired { notification_sent: true, .. }
    ));
    assert_eq!(check(&first, AlertType::HighCpp).metric_value, Some(70.0));
    assert_eq!(check(&first, AlertType::LowClickToPurchase).outcome, CheckOutcome::Clear);
    assert_eq!(check(&first, AlertType::HighFrequency).outcome, CheckOutcome::NoData);

    let second = aw.dispatch_alerts_at(at(10, 12, 10)).await;
    assert_eq!(check(&second, AlertType::HighCpp).outcome, CheckOutcome::Suppressed);

    assert_eq!(notifier.count(), 1);
    assert_eq!(aw.recent_alerts(10).unwrap().len(), 1);
}

#[tokio::test]
async fn test_resolved_alert_allows_next_fire() {
    let notifier = RecordingNotifier::new();
    let aw = setup_with(notifier.clone());
    aw.import_rows(expensive_rows()).unwrap();

    aw.dispatch_alerts_at(at(10, 12, 0)).await;
    let alert = aw.recent_alerts(1).unwrap().remove(0);
    assert_eq!(alert.alert_type, AlertType::HighCpp);
    aw.resolve_alert(&alert.id).unwrap();

    let again = aw.dispatch_alerts_at(at(10, 13, 0)).await;
    assert_eq!(again.fired(), 1);
    assert_eq!(notifier.count(), 2);
}

#[tokio::test]
async fn test_fires_again_once_dedup_window_has_passed() {
    let aw = setup();
    aw.import_rows(expensive_rows()).unwrap();

    aw.dispatch_alerts_at(at(10, 12, 0)).await;
    let next_day = aw.dispatch_alerts_at(at(11, 12, 1)).await;
    assert!(matches!(
        check(&next_day, AlertType::HighCpp).outcome,
        CheckOutcome::Fired { .. }
    ));
    assert_eq!(aw.recent_alerts(10).unwrap().len(), 2);
}

#[tokio::test]
async fn test_failed_notification_still_records_alert() {
    let notifier = RecordingNotifier::failing();
    let aw = setup_with(notifier.clone());
    aw.import_rows(expensive_rows()).unwrap();

    let report = aw.dispatch_alerts_at(at(10, 12, 0)).await;
    assert!(matches!(
        check(&report, AlertType::HighCpp).outcome,
        CheckOutcome::Fired { notification_sent: false, .. }
    ));
    let alerts = aw.recent_alerts(10).unwrap();
    assert_eq!(alerts.len(), 1);
    assert!(!alerts[0].notification_sent);
    assert!(alerts[0].message.contains("$70.00"));

    // no synchronous retry: the unsent alert still holds the dedup window
    let later = aw.dispatch_alerts_at(at(10, 12, 10)).await;
    assert_eq!(check(&later, AlertType::HighCpp).outcome, CheckOutcome::Suppressed);
    assert_eq!(notifier.count(), 1);
}

#[tokio::test]
async fn test_concurrent_dispatches_fire_once() {
    let notifier = RecordingNotifier::slow(Duration::from_millis(50));
    let aw = setup_with(notifier.clone());
    aw.import_rows(expensive_rows()).unwrap();

    let (a, b) = tokio::join!(
        aw.dispatch_alerts_at(at(10, 12, 0)),
        aw.dispatch_alerts_at(at(10, 12, 0))
    );
    assert_eq!(a.fired() + b.fired(), 1);
    assert_eq!(notifier.count(), 1);
    assert_eq!(aw.recent_alerts(10).unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_dispatches_on_worker_threads_fire_once() {
    let notifier = RecordingNotifier::slow(Duration::from_millis(20));
    let aw = Arc::new(setup_with(notifier.clone()));
    aw.import_rows(expensive_rows()).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let aw = aw.clone();
            tokio::spawn(async move { aw.dispatch_alerts_at(at(10, 12, 0)).await.fired() })
        })
        .collect();
    let mut fired = 0;
    for handle in handles {
        fired += handle.await.unwrap();
    }
    assert_eq!(fired, 1);
    assert_eq!(notifier.count(), 1);
    assert_eq!(aw.recent_alerts(10).unwrap().len(), 1);
}

#[tokio::test]
async fn test_two_instances_sharing_a_database_dedup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("adwatch.db");
    let path = path.to_str().unwrap();

    let open = |notifier: Arc<RecordingNotifier>| {
        AdWatch::with_providers(
            path,
            notifier,
            Arc::new(MemoryReportCache::new()),
            Policy::default(),
            CampaignFilter::default(),
        )
        .unwrap()
    };
    let first_notifier = RecordingNotifier::new();
    let second_notifier = RecordingNotifier::new();
    let first = open(first_notifier.clone());
    let second = open(second_notifier.clone());
    first.import_rows(expensive_rows()).unwrap();

    assert_eq!(first.dispatch_alerts_at(at(10, 12, 0)).await.fired(), 1);
    let report = second.dispatch_alerts_at(at(10, 12, 10)).await;
    assert_eq!(check(&report, AlertType::HighCpp).outcome, CheckOutcome::Suppressed);

    assert_eq!(first_notifier.count() + second_notifier.count(), 1);
    assert_eq!(second.recent_alerts(10).unwrap().len(), 1);
}

#[tokio::test]
async fn test_low_click_to_purchase_and_frequency_checks() {
    let notifier = RecordingNotifier::new();
    let aw = setup_with(notifier.clone());
    let mut a = healthy("a1", day(10));
    a.link_clicks = 100;
    a.purchases = 4;
    a.spend = 100.0;
    a.frequency = Some(4.0);
    let mut b = healthy("b1", day(9));
    b.link_clicks = 100;
    b.purchases = 4;
    b.spend = 100.0;
    b.frequency = Some(3.5);
    let mut c = healthy("c1", day(9));
    c.link_clicks = 0;
    c.purchases = 0;
    c.spend = 0.0;
    c.frequency = Some(2.0);
    aw.import_rows(vec![a, b, c]).unwrap();

    let report = aw.dispatch_alerts_at(at(10, 12, 0)).await;
    let ctp = check(&report, AlertType::LowClickToPurchase);
    assert_eq!(ctp.metric_value, Some(0.04));
    assert!(matches!(ctp.outcome, CheckOutcome::Fired { .. }));

    let freq = check(&report, AlertType::HighFrequency);
    assert_eq!(freq.metric_value, Some(3.75));
    assert!(matches!(freq.outcome, CheckOutcome::Fired { .. }));

    assert_eq!(check(&report, AlertType::HighCpp).outcome, CheckOutcome::Clear);
    let mut titles = notifier.titles();
    titles.sort();
    assert_eq!(
        titles,
        vec!["Creative Fatigue Alert", "Low Click-to-Purchase Rate Alert"]
    );
}

#[tokio::test]
async fn test_no_rows_means_no_alerts() {
    let notifier = RecordingNotifier::new();
    let aw = setup_with(notifier.clone());
    let report = aw.dispatch_alerts_at(at(10, 12, 0)).await;
    assert!(!report.partial);
    assert!(report
        .checks
        .iter()
        .all(|c| c.outcome == CheckOutcome::NoData));
    assert_eq!(notifier.count(), 0);
}

#[tokio::test]
async fn test_source_failure_is_contained() {
    let notifier = RecordingNotifier::new();
    let aw = setup_with_source(Arc::new(FailingSource), notifier.clone());
    let report = aw.dispatch_alerts_at(at(10, 12, 0)).await;
    assert!(report.partial);
    assert_eq!(report.fired(), 0);
    assert_eq!(notifier.count(), 0);
    assert!(aw.recent_alerts(10).unwrap().is_empty());
}
