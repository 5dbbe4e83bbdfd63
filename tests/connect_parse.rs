// tests/connect_parse.rs
use appstore_review_notifier::source::connect::parse_envelope;
use std::fs;

#[test]
fn envelope_fixture_maps_reviews_in_server_order() {
    let body = fs::read_to_string("tests/fixtures/connect_reviews.json")
        .expect("missing tests/fixtures/connect_reviews.json");

    let reviews = parse_envelope(&body).expect("envelope parse ok");
    assert_eq!(reviews.len(), 3);

    // server order (newest first) must be preserved
    let ids: Vec<&str> = reviews.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["rev-003", "rev-002", "rev-001"]);

    let newest = &reviews[0];
    assert_eq!(newest.rating, 5);
    assert_eq!(newest.title, "Love it");
    assert_eq!(newest.author_name, "happy-user");
    assert_eq!(newest.territory, "USA");
    assert_eq!(newest.created_at.to_rfc3339(), "2024-03-03T10:00:00+00:00");

    // offset timestamps normalize to UTC
    assert_eq!(
        reviews[1].created_at.to_rfc3339(),
        "2024-03-02T15:30:00+00:00"
    );
}

#[test]
fn empty_and_missing_data_arrays_yield_no_reviews() {
    assert!(parse_envelope(r#"{ "data": [] }"#).unwrap().is_empty());
    assert!(parse_envelope(r#"{}"#).unwrap().is_empty());
}

#[test]
fn non_json_body_is_a_parse_error() {
    assert!(parse_envelope("<html>Service Unavailable</html>").is_err());
}
