//! Keyword inclusion filter over notes.

use tracing::{debug, trace};

use defter_core::Note;

use crate::fold::fold_case;

/// Notes whose title or content contains any keyword, case-insensitively.
///
/// Both sides go through [`fold_case`], so `izmir` finds `İzmir`.
///
/// Blank keywords are ignored, so an empty (or all-blank) keyword list
/// matches nothing. The result is ordered newest first; notes with equal
/// timestamps keep their input order.
pub fn filter_notes(notes: &[Note], keywords: &[String]) -> Vec<Note> {
    let needles: Vec<String> = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(fold_case)
        .collect();

    if needles.is_empty() {
        debug!(
            subsystem = "search",
            component = "filter",
            "No usable keywords, nothing matches"
        );
        return Vec::new();
    }

    let mut matched: Vec<Note> = notes
        .iter()
        .filter(|note| {
            let title = fold_case(&note.title);
            let content = fold_case(&note.content);
            let hit = needles
                .iter()
                .find(|n| title.contains(n.as_str()) || content.contains(n.as_str()));
            if let Some(keyword) = hit {
                trace!(note_id = %note.id, keyword = %keyword, "Note matched");
            }
            hit.is_some()
        })
        .cloned()
        .collect();

    matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    debug!(
        subsystem = "search",
        component = "filter",
        keyword_count = needles.len(),
        result_count = matched.len(),
        "Filtered notes"
    );
    matched
}
