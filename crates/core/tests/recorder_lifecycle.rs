//! Integration tests for the behavior recorder and tracking service.

mod support;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use support::{deps, manual_sync, ManualClock, MockCollector};
use wayfare_core::{BehaviorEvent, BehaviorRecorder, BehaviorTrackingService};
use wayfare_domain::constants::{MAX_CLICK_PATTERNS, MAX_NAVIGATION_PATHS};
use wayfare_domain::{
    ClickInput, ClickPosition, Density, Preferences, PreferencesUpdate, SidebarPosition,
    StoredBehavior, SyncConfig,
};

fn click(id: &str) -> ClickInput {
    ClickInput {
        element_id: id.to_string(),
        element_type: "button".to_string(),
        position: ClickPosition { x: 10.0, y: 20.0 },
        context: "toolbar".to_string(),
    }
}

async fn recorder(collector: &Arc<MockCollector>, clock: &Arc<ManualClock>) -> BehaviorRecorder {
    BehaviorRecorder::start("user-1", deps(Arc::clone(collector), Arc::clone(clock)), &manual_sync())
        .await
        .unwrap()
}

#[tokio::test]
async fn start_records_a_session() {
    let clock = ManualClock::new();
    let recorder = recorder(&MockCollector::new(), &clock).await;

    let behavior = recorder.snapshot();
    assert_eq!(behavior.user_id(), "user-1");
    assert_eq!(behavior.session_times.len(), 1);
    assert!(behavior.feature_usage.is_empty());
    assert!(!recorder.is_syncing_periodically().await);
}

#[tokio::test]
async fn empty_user_id_is_rejected() {
    let err = BehaviorRecorder::start("  ", deps(MockCollector::new(), ManualClock::new()), &manual_sync())
        .await
        .unwrap_err();
    assert_eq!(err.label(), "invalid_input");
}

#[tokio::test]
async fn feature_counts_grow_by_one() {
    let clock = ManualClock::new();
    let recorder = recorder(&MockCollector::new(), &clock).await;

    for expected in 1..=3u64 {
        recorder.track_feature_usage("search");
        assert_eq!(recorder.snapshot().feature_usage["search"], expected);
    }
    recorder.track_feature_usage("");
    assert_eq!(recorder.snapshot().feature_usage.len(), 1);
}

#[tokio::test]
async fn histories_stay_bounded() {
    let clock = ManualClock::new();
    let recorder = recorder(&MockCollector::new(), &clock).await;

    for i in 0..(MAX_CLICK_PATTERNS + 5) {
        recorder.track_click(click(&format!("btn-{i}")));
    }
    for i in 0..(MAX_NAVIGATION_PATHS + 7) {
        recorder.track_navigation(&format!("/page/{i}"));
    }

    let behavior = recorder.snapshot();
    assert_eq!(behavior.click_patterns.len(), MAX_CLICK_PATTERNS);
    assert_eq!(behavior.click_patterns[0].element_id, "btn-5");
    assert_eq!(behavior.navigation_paths.len(), MAX_NAVIGATION_PATHS);
    assert_eq!(behavior.navigation_paths[0], "/page/7");
    assert_eq!(
        behavior.navigation_paths.last().map(String::as_str),
        Some(format!("/page/{}", MAX_NAVIGATION_PATHS + 6).as_str())
    );
}

#[tokio::test]
async fn dwell_accumulates_elapsed_time() {
    let clock = ManualClock::new();
    let recorder = recorder(&MockCollector::new(), &clock).await;

    recorder.start_dwell("hero");
    clock.advance_ms(1500);
    recorder.end_dwell("hero");

    recorder.start_dwell("hero");
    clock.advance_ms(250);
    recorder.end_dwell("hero");

    assert_eq!(recorder.snapshot().dwell_times["hero"], 1750);
}

#[tokio::test]
async fn dwell_end_without_start_is_ignored() {
    let clock = ManualClock::new();
    let recorder = recorder(&MockCollector::new(), &clock).await;

    recorder.end_dwell("ghost");
    recorder.start_dwell("card");
    clock.advance_ms(100);
    recorder.end_dwell("card");
    recorder.end_dwell("card");

    let behavior = recorder.snapshot();
    assert!(!behavior.dwell_times.contains_key("ghost"));
    assert_eq!(behavior.dwell_times["card"], 100);
}

#[tokio::test]
async fn last_active_never_moves_backwards() {
    let clock = ManualClock::new();
    let recorder = recorder(&MockCollector::new(), &clock).await;

    clock.advance_ms(60_000);
    recorder.track_feature_usage("search");
    let later = recorder.snapshot().last_active;

    clock.advance_ms(-120_000);
    recorder.track_navigation("/home");
    assert_eq!(recorder.snapshot().last_active, later);
}

#[tokio::test]
async fn frequent_features_follow_analysis() {
    let clock = ManualClock::new();
    let recorder = recorder(&MockCollector::new(), &clock).await;

    recorder.track_feature_usage("export");
    recorder.track_feature_usage("search");
    recorder.track_feature_usage("search");

    let behavior = recorder.snapshot();
    assert_eq!(behavior.preferences.frequent_features, vec!["search".to_string(), "export".to_string()]);
    assert_eq!(recorder.latest_analysis().unwrap().preferred_features, behavior.preferences.frequent_features);
}

#[tokio::test]
async fn preference_update_merges_and_pushes() {
    let collector = MockCollector::new();
    let clock = ManualClock::new();
    let recorder = recorder(&collector, &clock).await;

    recorder
        .update_preferences(PreferencesUpdate {
            preferred_density: Some(Density::Compact),
            ..PreferencesUpdate::default()
        })
        .await;

    let preferences = recorder.snapshot().preferences;
    assert_eq!(preferences.preferred_density, Density::Compact);
    assert_eq!(preferences.preferred_sidebar_position, SidebarPosition::Left);
    assert_eq!(collector.push_count(), 1);
    assert_eq!(collector.last_push().unwrap().preferences.preferred_density, Density::Compact);
}

#[tokio::test]
async fn preference_update_survives_push_failure() {
    let collector = MockCollector::new();
    collector.set_push_failure(true);
    let recorder = recorder(&collector, &ManualClock::new()).await;

    recorder
        .update_preferences(PreferencesUpdate {
            timezone: Some("Europe/Berlin".into()),
            ..PreferencesUpdate::default()
        })
        .await;

    assert_eq!(recorder.snapshot().preferences.timezone, "Europe/Berlin");
    assert!(recorder.sync_now().await.is_err());
}

#[tokio::test]
async fn load_restores_stored_fields() {
    let stored = StoredBehavior {
        feature_usage: Some(BTreeMap::from([("search".to_string(), 42)])),
        dwell_times: Some(BTreeMap::from([("hero".to_string(), 900)])),
        navigation_paths: Some((0..600).map(|i| format!("/p/{i}")).collect()),
        preferences: Some(Preferences { preferred_density: Density::Spacious, ..Preferences::default() }),
    };
    let collector = MockCollector::with_stored(stored);
    let recorder = recorder(&collector, &ManualClock::new()).await;
    recorder.track_click(click("kept"));

    assert!(recorder.load_from_backend().await);

    let behavior = recorder.snapshot();
    assert_eq!(behavior.feature_usage["search"], 42);
    assert_eq!(behavior.dwell_times["hero"], 900);
    assert_eq!(behavior.navigation_paths.len(), MAX_NAVIGATION_PATHS);
    assert_eq!(behavior.preferences.preferred_density, Density::Spacious);
    assert_eq!(behavior.click_patterns.len(), 1, "clicks are not part of the stored copy");
    assert_eq!(behavior.session_times.len(), 1);
}

#[tokio::test]
async fn load_keeps_memory_when_collector_has_nothing_or_fails() {
    let collector = MockCollector::new();
    let recorder = recorder(&collector, &ManualClock::new()).await;
    recorder.track_feature_usage("search");

    assert!(!recorder.load_from_backend().await);
    collector.set_fetch_failure(true);
    assert!(!recorder.load_from_backend().await);

    assert_eq!(collector.fetch_count(), 2);
    assert_eq!(recorder.snapshot().feature_usage["search"], 1);
}

#[tokio::test(start_paused = true)]
async fn periodic_sync_pushes_every_interval() {
    let collector = MockCollector::new();
    let sync = SyncConfig { interval_seconds: 30, ..SyncConfig::default() };
    let recorder = BehaviorRecorder::start("user-1", deps(Arc::clone(&collector), ManualClock::new()), &sync)
        .await
        .unwrap();
    assert!(recorder.is_syncing_periodically().await);

    tokio::time::sleep(Duration::from_secs(29)).await;
    assert_eq!(collector.push_count(), 0);

    recorder.track_navigation("/home");
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(collector.push_count(), 1);
    assert_eq!(collector.last_push().unwrap().navigation_paths, vec!["/home".to_string()]);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(collector.push_count(), 2);

    recorder.destroy().await;
}

#[tokio::test(start_paused = true)]
async fn periodic_sync_keeps_running_after_failures() {
    let collector = MockCollector::new();
    collector.set_push_failure(true);
    let recorder =
        BehaviorRecorder::start("user-1", deps(Arc::clone(&collector), ManualClock::new()), &SyncConfig::default())
            .await
            .unwrap();

    tokio::time::sleep(Duration::from_secs(61)).await;
    assert!(recorder.is_syncing_periodically().await);

    collector.set_push_failure(false);
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(collector.push_count(), 1);

    recorder.destroy().await;
}

#[tokio::test(start_paused = true)]
async fn destroy_stops_timer_and_syncs_once() {
    let collector = MockCollector::new();
    let recorder =
        BehaviorRecorder::start("user-1", deps(Arc::clone(&collector), ManualClock::new()), &SyncConfig::default())
            .await
            .unwrap();
    recorder.track_feature_usage("search");

    recorder.destroy().await;
    assert!(recorder.is_destroyed());
    assert!(!recorder.is_syncing_periodically().await);
    assert_eq!(collector.push_count(), 1);
    assert_eq!(collector.last_push().unwrap().feature_usage["search"], 1);

    recorder.destroy().await;
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(collector.push_count(), 1);
}

#[tokio::test]
async fn subscribers_receive_analyses_until_unsubscribed() {
    let recorder = recorder(&MockCollector::new(), &ManualClock::new()).await;
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&calls);
    let id = recorder.subscribe(BehaviorEvent::PatternsUpdated, move |analysis| {
        assert!(!analysis.frequent_paths.is_empty() || !analysis.preferred_features.is_empty());
        counter.fetch_add(1, Ordering::SeqCst);
    });

    recorder.track_navigation("/home");
    recorder.track_feature_usage("search");
    recorder.track_click(click("no-analysis"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    assert!(recorder.unsubscribe(BehaviorEvent::PatternsUpdated, id));
    assert!(!recorder.unsubscribe(BehaviorEvent::PatternsUpdated, id));
    recorder.track_navigation("/chat");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn service_replaces_previous_recorder() {
    let collector = MockCollector::new();
    let mut service = BehaviorTrackingService::new(collector.clone(), manual_sync())
        .with_clock(ManualClock::new());

    let first = service.initialize("alice").await.unwrap();
    first.track_feature_usage("search");

    let second = service.initialize("bob").await.unwrap();
    assert!(first.is_destroyed());
    assert!(!second.is_destroyed());
    assert_eq!(collector.push_count(), 1);
    assert_eq!(collector.last_push().unwrap().user_id, "alice");

    assert_eq!(service.active().map(BehaviorRecorder::user_id), Some("bob"));
    assert!(second.snapshot().feature_usage.is_empty());

    service.shutdown().await;
    assert!(second.is_destroyed());
    assert!(service.active().is_none());
}
