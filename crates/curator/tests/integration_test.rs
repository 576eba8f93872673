//! End-to-end curation runs against the in-memory platform.

use catalog::{FilterRules, PlaylistTarget, Settings, VideoCandidate};
use chrono::{TimeZone, Utc};
use curator::{Curator, CuratorError, ReconciliationPlan, EXIT_FATAL, EXIT_OK, EXIT_PARTIAL};
use platform_client::{InMemoryPlatform, Operation, PlatformCall, PlatformError, RetryPolicy};
use std::sync::Arc;

fn video(id: &str, title: &str, day: u32) -> VideoCandidate {
    VideoCandidate {
        id: id.to_string(),
        title: title.to_string(),
        channel_id: "c1".to_string(),
        channel_name: "Channel One".to_string(),
        published_at: Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap(),
        duration_seconds: 600,
    }
}

fn settings() -> Settings {
    let mut settings = Settings::default();
    settings.filter = FilterRules {
        required_keywords: vec!["babymetal".into(), "reaction".into()],
        excluded_keywords: vec!["cover".into()],
        min_duration_seconds: Some(120),
        ..FilterRules::default()
    };
    settings.reconcile.pause_between_calls_ms = 0;
    settings
}

fn target(id: &str) -> PlaylistTarget {
    PlaylistTarget {
        playlist_id: id.to_string(),
        additional_query: vec![],
    }
}

/// Playlist holds [v1, v3]; discovery finds v1 and v2 (plus a rejected cover).
fn scenario_platform() -> InMemoryPlatform {
    InMemoryPlatform::new()
        .with_videos(vec![
            video("v1", "BABYMETAL reaction!!", 2),
            video("v2", "First BABYMETAL reaction", 1),
            video("v4", "Metal cover reaction", 3),
        ])
        .with_playlist("PL1", &["v1", "v3"])
}

fn curator(platform: Arc<InMemoryPlatform>) -> Curator {
    Curator::new(platform, &settings()).with_retry_policy(RetryPolicy::immediate(3))
}

#[tokio::test]
async fn test_plan_adds_v2_and_removes_v3() {
    let platform = Arc::new(scenario_platform());
    let summary = curator(platform.clone()).with_dry_run(true).run(&[target("PL1")]).await;

    let report = &summary.targets[0];
    assert_eq!(
        report.plan,
        ReconciliationPlan {
            playlist_id: "PL1".into(),
            additions: vec!["v2".into()],
            removals: vec!["v3".into()],
            duplicates: vec![],
        }
    );
    assert_eq!(report.discovered, 3);
    assert_eq!(report.accepted, 2);
    assert_eq!(report.rejected.get("excluded_keyword"), Some(&1));
}

#[tokio::test]
async fn test_failed_add_is_reported_and_siblings_complete() {
    // first attempt plus three retries, all transient
    let platform = Arc::new(scenario_platform().fail_add(
        "v2",
        PlatformError::Transient("connection reset".into()),
        4,
    ));

    let summary = curator(platform.clone()).run(&[target("PL1")]).await;

    assert_eq!(summary.failed_ids(), vec!["v2"]);
    assert_eq!(summary.removed(), 1);
    assert_eq!(summary.added(), 0);
    assert_eq!(summary.exit_code(), EXIT_PARTIAL);
    assert!(matches!(
        summary.check(),
        Err(CuratorError::PartialReconciliation { ref failed_ids }) if failed_ids == &vec!["v2".to_string()]
    ));
    assert_eq!(platform.playlist("PL1").unwrap(), vec!["v1"]);

    let adds = platform
        .calls()
        .iter()
        .filter(|c| c.operation() == Operation::Add)
        .count();
    assert_eq!(adds, 4);
}

#[tokio::test]
async fn test_transient_add_recovers_within_retries() {
    let platform = Arc::new(scenario_platform().fail_add(
        "v2",
        PlatformError::Transient("timeout".into()),
        3,
    ));

    let summary = curator(platform.clone()).run(&[target("PL1")]).await;

    assert_eq!(summary.exit_code(), EXIT_OK);
    assert_eq!(summary.added(), 1);
    assert_eq!(platform.playlist("PL1").unwrap(), vec!["v1", "v2"]);
}

#[tokio::test]
async fn test_removals_issued_before_additions() {
    let platform = Arc::new(scenario_platform());
    curator(platform.clone()).run(&[target("PL1")]).await;

    assert_eq!(
        platform.mutations(),
        vec![
            PlatformCall::Remove {
                playlist_id: "PL1".into(),
                video_id: "v3".into(),
            },
            PlatformCall::Add {
                playlist_id: "PL1".into(),
                video_id: "v2".into(),
            },
        ]
    );
}

#[tokio::test]
async fn test_reconciliation_is_idempotent() {
    let platform = Arc::new(scenario_platform());
    let curator = curator(platform.clone());

    let first = curator.run(&[target("PL1")]).await;
    assert_eq!(first.exit_code(), EXIT_OK);
    let mutations_after_first = platform.mutations().len();

    let second = curator.run(&[target("PL1")]).await;

    assert!(second.targets[0].plan.is_empty());
    assert_eq!(platform.mutations().len(), mutations_after_first);
}

#[tokio::test]
async fn test_rate_limit_during_discovery_is_fatal() {
    let platform = Arc::new(scenario_platform().fail_search(
        PlatformError::RateLimited {
            reason: "quotaExceeded".into(),
        },
        1,
    ));

    let summary = curator(platform.clone()).run(&[target("PL1")]).await;

    assert!(summary.is_rate_limited());
    assert_eq!(summary.exit_code(), EXIT_FATAL);
    assert!(platform.mutations().is_empty());
}

#[tokio::test]
async fn test_rate_limit_on_second_target_keeps_first_target_summary() {
    let platform = Arc::new(
        scenario_platform()
            .with_playlist("PL2", &[])
            .with_playlist("PL3", &[])
            .fail_add(
                "v1",
                PlatformError::RateLimited {
                    reason: "quotaExceeded".into(),
                },
                1,
            ),
    );

    let summary = curator(platform.clone())
        .run(&[target("PL1"), target("PL2"), target("PL3")])
        .await;

    // PL1 was already changed and is still reported
    assert_eq!(platform.playlist("PL1").unwrap(), vec!["v1", "v2"]);
    assert_eq!(summary.targets[0].added, 1);
    assert_eq!(summary.targets[0].removed, 1);
    assert!(summary.targets[0].halted.is_none());

    let stopped = &summary.targets[1];
    assert!(stopped.halted.as_ref().is_some_and(|h| h.rate_limited));
    assert_eq!(stopped.failed_ids(), vec!["v1", "v2"]);
    assert_eq!(summary.skipped_targets, vec!["PL3"]);
    assert_eq!(summary.exit_code(), EXIT_FATAL);
    assert!(matches!(
        summary.check(),
        Err(CuratorError::Halted { ref playlist_id, .. }) if playlist_id == "PL2"
    ));

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["targets"][0]["added"], 1);
    assert_eq!(json["skipped_targets"][0], "PL3");
}

#[tokio::test]
async fn test_duplicated_playlist_item_is_collapsed() {
    let platform = Arc::new(scenario_platform().with_playlist("PL2", &["v1", "v2", "v1"]));
    let curator = curator(platform.clone());

    let summary = curator.run(&[target("PL2")]).await;

    assert_eq!(summary.targets[0].collapsed, 1);
    let contents = platform.playlist("PL2").unwrap();
    assert_eq!(contents.iter().filter(|id| *id == "v1").count(), 1);
    assert!(contents.contains(&"v2".to_string()));

    let again = curator.run(&[target("PL2")]).await;
    assert!(again.targets[0].plan.is_empty());
}

#[tokio::test]
async fn test_targets_run_independently() {
    let platform = Arc::new(scenario_platform().with_playlist("PL2", &["v2"]));

    let summary = curator(platform.clone())
        .run(&[target("PL1"), target("PL2")])
        .await;

    assert_eq!(summary.targets.len(), 2);
    assert_eq!(platform.playlist("PL1").unwrap(), vec!["v1", "v2"]);
    assert_eq!(platform.playlist("PL2").unwrap(), vec!["v2", "v1"]);
}
