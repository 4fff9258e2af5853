//! Tag handling for the editor and the sidebar.
//!
//! Tags are free-form strings kept in the order the user typed them. The tag
//! input field edits them as a single `;`-separated string, so intermediate
//! states routinely contain empty entries (`"a;;b"`, a trailing `;`). Those
//! are kept while editing and dropped by [`clean_tags`] before anything is
//! sent to the server.

use crate::defaults::TAG_SEPARATOR;
use crate::models::NoteSummary;

/// Drop empty (or whitespace-only) tags, preserving order and duplicates.
pub fn clean_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .filter(|tag| !tag.trim().is_empty())
        .cloned()
        .collect()
}

/// Split the tag input field into tags.
///
/// Empty segments are retained; `"a;b;"` yields `["a", "b", ""]`.
pub fn parse_tag_input(input: &str) -> Vec<String> {
    input.split(TAG_SEPARATOR).map(str::to_string).collect()
}

/// Render tags for the tag input field.
pub fn format_tag_input(tags: &[String]) -> String {
    let separator = TAG_SEPARATOR.to_string();
    tags.join(&separator)
}

/// One sidebar section: a tag and the notes carrying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagGroup<'a> {
    pub tag: &'a str,
    pub notes: Vec<&'a NoteSummary>,
}

/// Distinct non-empty tags across `summaries`, in first-seen order.
pub fn unique_tags(summaries: &[NoteSummary]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for tag in summaries.iter().flat_map(|s| s.tags.iter()) {
        let tag = tag.as_str();
        if !tag.trim().is_empty() && !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}

/// Group summaries by tag for the sidebar.
///
/// Groups follow [`unique_tags`] order; notes within a group keep list order.
/// A note carrying the same tag twice appears once in that group.
pub fn group_by_tag(summaries: &[NoteSummary]) -> Vec<TagGroup<'_>> {
    unique_tags(summaries)
        .into_iter()
        .map(|tag| TagGroup {
            tag,
            notes: filter_by_tag(summaries, tag),
        })
        .collect()
}

/// Summaries carrying `tag`, in list order.
pub fn filter_by_tag<'a>(summaries: &'a [NoteSummary], tag: &str) -> Vec<&'a NoteSummary> {
    summaries
        .iter()
        .filter(|s| s.tags.iter().any(|t| t == tag))
        .collect()
}

/// Summaries without any non-empty tag. These never show up in [`group_by_tag`].
pub fn untagged(summaries: &[NoteSummary]) -> Vec<&NoteSummary> {
    summaries
        .iter()
        .filter(|s| s.tags.iter().all(|t| t.trim().is_empty()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Allowance;

    fn summary(id: &str, tags: &[&str]) -> NoteSummary {
        NoteSummary {
            note_id: id.to_string(),
            title: format!("Note {}", id),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            allowance: Allowance::Owner,
        }
    }

    fn strings(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_clean_tags_drops_empty() {
        assert_eq!(clean_tags(&strings(&["a", "", "b"])), strings(&["a", "b"]));
        assert_eq!(clean_tags(&strings(&["x", "", "y", ""])), strings(&["x", "y"]));
    }

    #[test]
    fn test_clean_tags_keeps_duplicates_and_order() {
        assert_eq!(
            clean_tags(&strings(&["b", "a", "b"])),
            strings(&["b", "a", "b"])
        );
    }

    #[test]
    fn test_clean_tags_drops_whitespace_only() {
        assert_eq!(clean_tags(&strings(&[" ", "ok", "\t"])), strings(&["ok"]));
    }

    #[test]
    fn test_parse_tag_input_keeps_empty_segments() {
        assert_eq!(parse_tag_input("a;b;"), strings(&["a", "b", ""]));
        assert_eq!(parse_tag_input(""), strings(&[""]));
    }

    #[test]
    fn test_format_tag_input() {
        assert_eq!(format_tag_input(&strings(&["a", "b"])), "a;b");
        assert_eq!(format_tag_input(&[]), "");
    }

    #[test]
    fn test_parse_format_inverse_on_input() {
        let input = "work;;ideas";
        assert_eq!(format_tag_input(&parse_tag_input(input)), input);
    }

    #[test]
    fn test_unique_tags_first_seen_order() {
        let list = vec![
            summary("1", &["work", "ideas"]),
            summary("2", &["home", "work"]),
            summary("3", &["", "ideas"]),
        ];
        assert_eq!(unique_tags(&list), vec!["work", "ideas", "home"]);
    }

    #[test]
    fn test_group_by_tag() {
        let list = vec![
            summary("1", &["work"]),
            summary("2", &["home", "work", "work"]),
            summary("3", &[]),
        ];
        let groups = group_by_tag(&list);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].tag, "work");
        let ids: Vec<_> = groups[0].notes.iter().map(|n| n.note_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(groups[1].tag, "home");
        assert_eq!(groups[1].notes.len(), 1);
    }

    #[test]
    fn test_untagged() {
        let list = vec![summary("1", &["work"]), summary("2", &[]), summary("3", &[""])];
        let ids: Vec<_> = untagged(&list).iter().map(|n| n.note_id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[test]
    fn test_filter_by_tag_unknown() {
        let list = vec![summary("1", &["work"])];
        assert!(filter_by_tag(&list, "play").is_empty());
    }
}
