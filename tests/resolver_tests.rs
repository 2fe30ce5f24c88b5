//! Version resolution and answer tree navigation tests

use survey_export_sdk::models::{ResponseItem, SurveyItemResponse, SurveyVersionPreview};
use survey_export_sdk::navigation::{get_by_full_path, get_by_short_key};
use survey_export_sdk::resolver::{Resolution, ResolveError, resolve, resolve_with_tier};

fn versions() -> Vec<SurveyVersionPreview> {
    vec![
        SurveyVersionPreview::new("v1", 100, 200),
        SurveyVersionPreview::new("v2", 200, 0),
    ]
}

mod resolver_tests {
    use super::*;

    #[test]
    fn test_timestamp_tiers() {
        let versions = versions();
        let cases = [
            (150, "v1", Resolution::Active),
            (250, "v2", Resolution::Active),
            (200, "v2", Resolution::Active),
            (50, "v1", Resolution::NearestFollowing),
        ];
        for (submitted_at, expected, tier) in cases {
            let resolved = resolve_with_tier("", submitted_at, &versions).unwrap();
            assert_eq!(resolved.version.version_id, expected, "t={submitted_at}");
            assert_eq!(resolved.resolution, tier, "t={submitted_at}");
        }
    }

    #[test]
    fn test_reported_id_wins_over_timestamp() {
        let versions = versions();
        assert_eq!(resolve("v1", 5_000, &versions).unwrap().version_id, "v1");
        assert_eq!(resolve("v2", 0, &versions).unwrap().version_id, "v2");
    }

    #[test]
    fn test_unknown_id_falls_back_to_timestamp() {
        let versions = versions();
        let resolved = resolve_with_tier("v7", 150, &versions).unwrap();
        assert_eq!(resolved.version.version_id, "v1");
        assert!(!resolved.resolution.is_fallback());
    }

    #[test]
    fn test_no_candidates() {
        let err = resolve("", 150, &[]).unwrap_err();
        assert_eq!(
            err,
            ResolveError::VersionNotFound {
                reported: String::new(),
                submitted_at: 150
            }
        );
    }
}

mod navigation_tests {
    use super::*;

    fn answer() -> SurveyItemResponse {
        SurveyItemResponse::new(
            "weekly.Q1",
            ResponseItem::group(
                "rg",
                vec![ResponseItem::group(
                    "scg",
                    vec![ResponseItem::group(
                        "c",
                        vec![ResponseItem::with_value("d", "2024-03-01")],
                    )],
                )],
            ),
        )
    }

    #[test]
    fn test_full_path() {
        let answer = answer();
        assert_eq!(get_by_full_path(&answer, "rg").unwrap().key, "rg");
        assert_eq!(
            get_by_full_path(&answer, "rg.scg.c.d").unwrap().value.as_deref(),
            Some("2024-03-01")
        );
        assert!(get_by_full_path(&answer, "xg.scg").is_none());
        assert!(get_by_full_path(&answer, "rg.mcg.c").is_none());
        assert!(get_by_full_path(&answer, "rg.scg.x").is_none());
    }

    #[test]
    fn test_short_key() {
        let answer = answer();
        assert_eq!(get_by_short_key(&answer, "d").unwrap().key, "d");
        assert!(get_by_short_key(&answer, "missing").is_none());
        assert!(get_by_short_key(&SurveyItemResponse::empty("weekly.Q1"), "rg").is_none());
    }
}
