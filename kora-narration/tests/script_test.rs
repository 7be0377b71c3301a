//! Tests for narration script composition

use kora_narration::script::{
    full_narration, marker_narration, short_narration, Site, SiteNarration,
};

fn rumtek() -> Site {
    Site {
        id: "rumtek".to_string(),
        name: "Rumtek Monastery".to_string(),
        location: "East Sikkim".to_string(),
        description: "The largest monastery in Sikkim.".to_string(),
    }
}

fn rumtek_narration() -> SiteNarration {
    SiteNarration {
        id: "rumtek".to_string(),
        introduction: "Welcome to Rumtek Monastery.".to_string(),
        full_description: "Rumtek is the seat of the Karmapa.".to_string(),
        location_info: "Located 24 kilometers from Gangtok.".to_string(),
        historical_info: "Founded in 1966.".to_string(),
        features_info: "Known for its Golden Stupa.".to_string(),
        visiting_info: "Open to visitors year round.".to_string(),
        conclusion: "A beacon of Buddhist spirituality.".to_string(),
    }
}

#[test]
fn test_full_narration_joins_all_fragments() {
    let text = full_narration(&rumtek(), Some(&rumtek_narration()));
    assert_eq!(
        text,
        "Welcome to Rumtek Monastery. Rumtek is the seat of the Karmapa. \
         Located 24 kilometers from Gangtok. Founded in 1966. \
         Known for its Golden Stupa. Open to visitors year round. \
         A beacon of Buddhist spirituality."
    );
}

#[test]
fn test_full_narration_fallback() {
    let text = full_narration(&rumtek(), None);
    assert_eq!(
        text,
        "Welcome to Rumtek Monastery. The largest monastery in Sikkim."
    );
}

#[test]
fn test_short_narration_uses_three_fragments() {
    let text = short_narration(&rumtek(), Some(&rumtek_narration()));
    assert_eq!(
        text,
        "Welcome to Rumtek Monastery. Rumtek is the seat of the Karmapa. \
         Located 24 kilometers from Gangtok."
    );
}

#[test]
fn test_short_narration_fallback() {
    let text = short_narration(&rumtek(), None);
    assert_eq!(text, "Rumtek Monastery. The largest monastery in Sikkim.");
}

#[test]
fn test_marker_narration() {
    let text = marker_narration(&rumtek(), Some(&rumtek_narration()));
    assert_eq!(
        text,
        "Welcome to Rumtek Monastery. Located 24 kilometers from Gangtok."
    );
}

#[test]
fn test_marker_narration_fallback() {
    let text = marker_narration(&rumtek(), None);
    assert_eq!(text, "Rumtek Monastery, located in East Sikkim");
}

#[test]
fn test_site_narration_deserialize() {
    let raw = r#"{
        "id": "tashiding",
        "introduction": "Welcome to Tashiding Monastery.",
        "full_description": "One of the holiest sites in Sikkim.",
        "location_info": "Perched between two rivers.",
        "historical_info": "Established in 1717.",
        "features_info": "Sacred chortens and holy springs.",
        "visiting_info": "Best visited in spring.",
        "conclusion": "Worth the difficult journey."
    }"#;

    let narration: SiteNarration = serde_json::from_str(raw).unwrap();
    assert_eq!(narration.id, "tashiding");
    assert_eq!(narration.historical_info, "Established in 1717.");

    let site: Site = serde_json::from_str(
        r#"{"id":"tashiding","name":"Tashiding Monastery",
            "location":"West Sikkim","description":"A sacred hilltop site."}"#,
    )
    .unwrap();
    assert!(full_narration(&site, Some(&narration)).starts_with("Welcome to Tashiding"));
}
