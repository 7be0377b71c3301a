//! Narration script composition
//!
//! Pure assembly of narration prose from static per-site fragments.
//! The records carry opaque display text; nothing here is interpreted.

use serde::{Deserialize, Serialize};

/// Basic display data for a site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    pub name: String,
    pub location: String,
    pub description: String,
}

/// Per-site narration fragments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteNarration {
    pub id: String,
    pub introduction: String,
    pub full_description: String,
    pub location_info: String,
    pub historical_info: String,
    pub features_info: String,
    pub visiting_info: String,
    pub conclusion: String,
}

/// Full spoken tour of a site: all fragments in narrative order.
///
/// Falls back to a minimal greeting when no narration record exists
/// for the site.
pub fn full_narration(site: &Site, narration: Option<&SiteNarration>) -> String {
    match narration {
        Some(n) => [
            n.introduction.as_str(),
            n.full_description.as_str(),
            n.location_info.as_str(),
            n.historical_info.as_str(),
            n.features_info.as_str(),
            n.visiting_info.as_str(),
            n.conclusion.as_str(),
        ]
        .join(" "),
        None => format!("Welcome to {}. {}", site.name, site.description),
    }
}

/// Short spoken summary: introduction, description, and location.
pub fn short_narration(site: &Site, narration: Option<&SiteNarration>) -> String {
    match narration {
        Some(n) => [
            n.introduction.as_str(),
            n.full_description.as_str(),
            n.location_info.as_str(),
        ]
        .join(" "),
        None => format!("{}. {}", site.name, site.description),
    }
}

/// One-line blurb for a map marker.
pub fn marker_narration(site: &Site, narration: Option<&SiteNarration>) -> String {
    match narration {
        Some(n) => format!("{} {}", n.introduction, n.location_info),
        None => format!("{}, located in {}", site.name, site.location),
    }
}
