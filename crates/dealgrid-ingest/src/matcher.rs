//! Fuzzy matching of scraped product names against the tool catalog.
//!
//! The matcher is a heuristic, not an authority. It prefers false
//! negatives (an unmatched deal is stored as an orphan and merely less
//! discoverable) over false positives (a wrong link corrupts the deal
//! history of two unrelated tools). Ambiguity therefore always resolves
//! to "no match".

use dealgrid_db::ToolRow;

/// Generic trailing words that carry no identity: "Notion AI", "Notion
/// app", and "Notion Pro" should all normalize to "notion".
const GENERIC_SUFFIXES: &[&str] = &[
    "ai", "app", "tool", "software", "pro", "premium", "lifetime", "deal", "ltd",
];

/// Containment matching (step 3) is skipped for normalized names shorter
/// than this: two-character fragments are substrings of half the catalog.
const MIN_CONTAINMENT_LEN: usize = 3;

/// Normalizes a product name for comparison: lowercase, strip everything
/// non-alphanumeric, then trim one generic trailing suffix (longest match
/// wins, never down to an empty string).
#[must_use]
pub fn normalize_tool_name(name: &str) -> String {
    let normalized: String = name
        .to_lowercase()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();

    let mut best_strip = 0usize;
    for suffix in GENERIC_SUFFIXES {
        if suffix.len() > best_strip
            && normalized.len() > suffix.len()
            && normalized.ends_with(suffix)
        {
            best_strip = suffix.len();
        }
    }

    normalized[..normalized.len() - best_strip].to_string()
}

/// A matcher over one snapshot of the active tool catalog.
///
/// Normalized forms are computed once at construction; `find_match` is
/// then a pure scan, called once per scraped deal.
pub struct ToolMatcher {
    tools: Vec<ToolRow>,
    normalized: Vec<(String, String)>,
}

impl ToolMatcher {
    #[must_use]
    pub fn new(tools: Vec<ToolRow>) -> Self {
        let normalized = tools
            .iter()
            .map(|t| (normalize_tool_name(&t.slug), normalize_tool_name(&t.name)))
            .collect();
        Self { tools, normalized }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Finds the best catalog match for a free-text product name.
    ///
    /// Order, first hit wins: exact normalized slug, exact normalized
    /// name, then substring containment in either direction (first
    /// catalog entry in iteration order). Containment requires both
    /// normalized names to be at least [`MIN_CONTAINMENT_LEN`] long.
    #[must_use]
    pub fn find_match(&self, tool_name: &str) -> Option<&ToolRow> {
        let needle = normalize_tool_name(tool_name);
        if needle.is_empty() {
            return None;
        }

        if let Some(idx) = self
            .normalized
            .iter()
            .position(|(slug, _)| *slug == needle)
        {
            return Some(&self.tools[idx]);
        }

        if let Some(idx) = self
            .normalized
            .iter()
            .position(|(_, name)| *name == needle)
        {
            return Some(&self.tools[idx]);
        }

        if needle.len() >= MIN_CONTAINMENT_LEN {
            if let Some(idx) = self.normalized.iter().position(|(_, name)| {
                name.len() >= MIN_CONTAINMENT_LEN
                    && (needle.contains(name.as_str()) || name.contains(needle.as_str()))
            }) {
                return Some(&self.tools[idx]);
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(id: i64, name: &str, slug: &str) -> ToolRow {
        ToolRow {
            id,
            name: name.to_string(),
            slug: slug.to_string(),
            status: "active".to_string(),
        }
    }

    fn catalog() -> ToolMatcher {
        ToolMatcher::new(vec![
            tool(1, "Notion", "notion"),
            tool(2, "Figma", "figma"),
            tool(3, "Jasper AI", "jasper-ai"),
            tool(4, "Loom Video", "screen-recorder"),
        ])
    }

    #[test]
    fn normalize_strips_punctuation_and_case() {
        assert_eq!(normalize_tool_name("Notion!"), "notion");
        assert_eq!(normalize_tool_name("Get-Stuff Done"), "getstuffdone");
    }

    #[test]
    fn normalize_trims_one_generic_suffix() {
        assert_eq!(normalize_tool_name("Notion AI"), "notion");
        assert_eq!(normalize_tool_name("Figma Pro"), "figma");
        assert_eq!(normalize_tool_name("Writer Lifetime"), "writer");
    }

    #[test]
    fn normalize_never_strips_to_empty() {
        assert_eq!(normalize_tool_name("Pro"), "pro");
        assert_eq!(normalize_tool_name("AI"), "ai");
    }

    #[test]
    fn matches_exact_slug_after_normalization() {
        let matcher = catalog();
        let hit = matcher.find_match("Notion AI").expect("match");
        assert_eq!(hit.id, 1);
    }

    #[test]
    fn matches_slug_whose_own_suffix_normalizes_away() {
        let matcher = catalog();
        // Slug "jasper-ai" normalizes to "jasper", same as the input.
        let hit = matcher.find_match("Jasper").expect("match");
        assert_eq!(hit.id, 3);
    }

    #[test]
    fn matches_normalized_name_when_slug_differs() {
        let matcher = catalog();
        // Slug "screen-recorder" shares nothing with the input; the
        // normalized display name "loomvideo" is the exact hit.
        let hit = matcher.find_match("Loom Video Pro").expect("match");
        assert_eq!(hit.id, 4);
    }

    #[test]
    fn matches_by_containment_in_either_direction() {
        let matcher = catalog();
        let hit = matcher.find_match("Figma Design Suite").expect("match");
        assert_eq!(hit.id, 2);
    }

    #[test]
    fn unrelated_name_returns_none() {
        let matcher = catalog();
        assert!(matcher.find_match("CompletelyUnrelatedTool").is_none());
    }

    #[test]
    fn short_fragments_do_not_containment_match() {
        let matcher = ToolMatcher::new(vec![tool(9, "Go", "go")]);
        // "go" normalizes below the containment threshold; only exact
        // matches may link it.
        assert!(matcher.find_match("Golang Course Bundle").is_none());
        assert!(matcher.find_match("Go").is_some());
    }

    #[test]
    fn empty_catalog_matches_nothing() {
        let matcher = ToolMatcher::new(Vec::new());
        assert!(matcher.is_empty());
        assert!(matcher.find_match("Notion").is_none());
    }
}
