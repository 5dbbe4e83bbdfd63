// tests/feed_parse.rs
use appstore_review_notifier::source::feed::parse_feed;
use std::fs;

#[test]
fn feed_fixture_skips_metadata_and_maps_reviews() {
    let body =
        fs::read_to_string("tests/fixtures/rss_feed.json").expect("missing tests/fixtures/rss_feed.json");

    let reviews = parse_feed(&body, "kr", "123456789").expect("feed parse ok");
    assert_eq!(reviews.len(), 2, "metadata entry must not become a review");

    let first = &reviews[0];
    assert_eq!(first.id, "feed-2");
    assert_eq!(first.rating, 4);
    assert_eq!(first.title, "Nice");
    assert_eq!(first.body, "Good app, use it daily.");
    assert_eq!(first.author_name, "alice");
    assert_eq!(first.territory, "KR");
    assert_eq!(first.created_at.to_rfc3339(), "2024-03-02T16:00:00+00:00");
}

#[test]
fn missing_fields_get_placeholders_and_a_synthesized_id() {
    let body = fs::read_to_string("tests/fixtures/rss_feed.json").unwrap();

    let reviews = parse_feed(&body, "kr", "123456789").unwrap();
    let bare = &reviews[1];

    assert_eq!(bare.rating, 0);
    assert_eq!(bare.title, "Untitled");
    assert_eq!(bare.body, "No content");
    assert_eq!(bare.author_name, "Anonymous");
    assert_eq!(bare.territory, "KR");
    // region, app id and position are baked into the synthesized id; the
    // trailing timestamp makes it unique within the run but not across runs
    assert!(
        bare.id.starts_with("rss-kr-123456789-1-"),
        "unexpected synthesized id: {}",
        bare.id
    );
}

#[test]
fn metadata_only_feed_yields_nothing() {
    let body = fs::read_to_string("tests/fixtures/rss_feed_metadata_only.json").unwrap();
    let reviews = parse_feed(&body, "us", "123456789").unwrap();
    assert!(reviews.is_empty());
}

#[test]
fn feed_without_entries_yields_nothing() {
    assert!(parse_feed(r#"{ "feed": {} }"#, "jp", "1").unwrap().is_empty());
    assert!(parse_feed(r#"{}"#, "jp", "1").unwrap().is_empty());
}

#[test]
fn malformed_feed_is_a_parse_error() {
    assert!(parse_feed("<!DOCTYPE html>", "kr", "1").is_err());
}
