//! "Did you mean" suggestions for unknown manifest fields.

/// Field names suggestions are drawn from, before schema-specific names.
pub const CANONICAL_FIELDS: &[&str] = &[
    "spec",
    "metadata",
    "apiVersion",
    "kind",
    "name",
    "labels",
    "annotations",
];

const COMMON_TYPOS: &[(&str, &str)] = &[
    ("spc", "spec"),
    ("sepc", "spec"),
    ("specs", "spec"),
    ("meta", "metadata"),
    ("metdata", "metadata"),
    ("metadat", "metadata"),
    ("apiversion", "apiVersion"),
    ("api_version", "apiVersion"),
    ("apiVerison", "apiVersion"),
    ("knd", "kind"),
    ("kinds", "kind"),
    ("king", "kind"),
    ("lables", "labels"),
    ("label", "labels"),
    ("annotation", "annotations"),
    ("anotations", "annotations"),
];

const MAX_DISTANCE: usize = 2;

/// Suggest a replacement for `unknown`.
///
/// The typo table wins; otherwise the closest canonical field, then the
/// closest name from `candidates`, within an edit distance of two.
pub fn suggest_field(unknown: &str, candidates: &[&str]) -> Option<String> {
    if let Some((_, fix)) = COMMON_TYPOS.iter().find(|(typo, _)| *typo == unknown) {
        return Some(fix.to_string());
    }

    closest(unknown, CANONICAL_FIELDS).or_else(|| closest(unknown, candidates))
}

fn closest(unknown: &str, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .filter(|c| **c != unknown)
        .map(|c| (levenshtein(unknown, c), *c))
        .filter(|(distance, _)| *distance <= MAX_DISTANCE)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, c)| c.to_string())
}

/// Edit distance between two strings, counted in characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.iter().enumerate() {
        let mut current = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            current[j + 1] = (previous[j] + cost)
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        previous = current;
    }
    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("spec", "spec"), 0);
        assert_eq!(levenshtein("spc", "spec"), 1);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
    }

    #[test]
    fn test_typo_table_first() {
        assert_eq!(suggest_field("spc", &[]), Some("spec".to_string()));
        assert_eq!(suggest_field("api_version", &[]), Some("apiVersion".to_string()));
        assert_eq!(suggest_field("king", &[]), Some("kind".to_string()));
    }

    #[test]
    fn test_distance_fallback() {
        assert_eq!(suggest_field("metadta", &[]), Some("metadata".to_string()));
        assert_eq!(suggest_field("lbels", &[]), Some("labels".to_string()));
    }

    #[test]
    fn test_schema_candidates() {
        assert_eq!(
            suggest_field("masterPasword", &["masterPassword", "port"]),
            Some("masterPassword".to_string())
        );
    }

    #[test]
    fn test_no_suggestion_when_far() {
        assert_eq!(suggest_field("completelyDifferent", &["port"]), None);
    }
}
