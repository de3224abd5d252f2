//! The fixed set of quote topic tags.

/// Tag selected when nothing else is configured.
pub const DEFAULT_TAG: &str = "technology";

/// Every topic tag the quote service is queried with.
pub const TAGS: &[&str] = &[
    "business",
    "change",
    "character",
    "competition",
    "courage",
    "creativity",
    "education",
    "faith",
    "famous-quotes",
    "film",
    "freedom",
    "friendship",
    "future",
    "happiness",
    "history",
    "honor",
    "humor",
    "humorous",
    "imagination",
    "inspirational",
    "leadership",
    "life",
    "literature",
    "love",
    "motivational",
    "nature",
    "opportunity",
    "pain",
    "perseverance",
    "philosophy",
    "politics",
    "power",
    "religion",
    "sadness",
    "science",
    "self",
    "self-help",
    "social-justice",
    "spirituality",
    "sports",
    "success",
    "technology",
    "time",
    "truth",
    "virtue",
    "war",
    "weakness",
    "wisdom",
    "work",
];

/// Validate that a tag belongs to the fixed set.
///
/// # Errors
///
/// Returns an error naming the tag if it is not recognized.
pub fn validate_tag(tag: &str) -> Result<(), String> {
    if TAGS.contains(&tag) {
        Ok(())
    } else {
        Err(format!("Unknown tag '{tag}'. Use --list-tags to see the valid tags."))
    }
}

/// Human-readable label for a tag: first letter uppercased, hyphens as spaces.
#[must_use]
pub fn tag_label(tag: &str) -> String {
    let mut chars = tag.chars();
    match chars.next() {
        Some(first) => {
            let rest: String = chars.map(|c| if c == '-' { ' ' } else { c }).collect();
            format!("{}{rest}", first.to_uppercase())
        }
        None => String::new(),
    }
}
