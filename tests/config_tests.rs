// Tests for configuration persistence under an override root.
use datecal::config::Config;
use datecal::context::{AppContext, StandardContext, TestContext};
use datecal::extract::DateExtractor;
use std::fs;

#[test]
fn test_override_root_roundtrip() {
    let tmp = TestContext::new();
    let ctx = StandardContext::new(Some(tmp.root.clone()));

    assert_eq!(Config::load_or_default(&ctx).unwrap(), Config::default());

    let cfg = Config {
        output_dir: Some(tmp.root.join("ics").to_string_lossy().into_owned()),
        min_confidence: 0.75,
        generic_fallback_for_unknown_family: true,
        ..Config::default()
    };
    cfg.save(&ctx).unwrap();

    let path = ctx.get_config_file_path().unwrap();
    assert!(path.starts_with(&tmp.root));
    assert!(!path.with_extension("tmp").exists());

    let loaded = Config::load(&ctx).unwrap();
    assert_eq!(loaded, cfg);
    assert_eq!(loaded.resolve_output_dir(&ctx).unwrap(), tmp.root.join("ics"));
}

#[test]
fn test_narrow_windows_from_config_are_honoured() {
    let tmp = TestContext::new();
    fs::write(
        tmp.get_config_file_path().unwrap(),
        "time_window_chars = 10\n",
    )
    .unwrap();
    let cfg = Config::load(&tmp).unwrap();

    // The time sits well outside a 10 character window.
    let text = "Review on 2026-03-05, doors open at the usual place around 6pm";
    let now = chrono::NaiveDate::from_ymd_opt(2025, 6, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let events = DateExtractor::new(&cfg).extract_events_at(text, now);
    assert_eq!(events[0].formatted_date, "2026-03-05T00:00");

    let events = DateExtractor::default().extract_events_at(text, now);
    assert_eq!(events[0].formatted_date, "2026-03-05T18:00");
}
