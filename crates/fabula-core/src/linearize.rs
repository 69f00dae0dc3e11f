//! Flattening a branching story into a single linear path.
//!
//! The search is a plain depth-first walk over the choice graph that refuses
//! to revisit any section already on the path. That keeps it terminating on
//! cyclic graphs, at the documented cost that a path requiring a revisit is
//! unreachable. Choices are tried in stored order and the first complete
//! path wins, so the result is deterministic.

use crate::interpolate::interpolate;
use crate::story::{MediaKind, Story};

/// Extend `path` one section at a time until its last element is `end_at`
/// and every id in `must_visit` appears on the path. Returns the complete
/// path, or `None` when no acyclic path from the given prefix satisfies the
/// constraints.
pub fn depth_first_search(
    path: Vec<String>,
    end_at: &str,
    must_visit: &[String],
    story: &Story,
) -> Option<Vec<String>> {
    let current = path.last()?.clone();

    if current == end_at {
        if must_visit.iter().all(|id| path.contains(id)) {
            return Some(path);
        }
        // Reached the end without the required stops; this branch is dead,
        // siblings above keep trying.
        return None;
    }

    let section = story.sections.get(&current)?;
    for choice in &section.next {
        let target = choice.next.as_id();
        if path.contains(&target) {
            continue;
        }
        let mut extended = path.clone();
        extended.push(target);
        if let Some(found) = depth_first_search(extended, end_at, must_visit, story) {
            return Some(found);
        }
    }
    None
}

/// Search for a linear path from `start` to `end_at` passing through every
/// id in `must_visit`.
pub fn linearize(
    story: &Story,
    start: &str,
    end_at: &str,
    must_visit: &[String],
) -> Option<Vec<String>> {
    depth_first_search(vec![start.to_string()], end_at, must_visit, story)
}

/// Flatten a section path to Markdown: each section's interpolated text,
/// blank-line separated, with image media embedded as an image tag.
pub fn markdown_from_section_id_list(ids: &[String], story: &Story) -> String {
    let variables = story.state.as_ref().map(|s| &s.variables);
    let mut out = String::new();
    for id in ids {
        let Some(section) = story.sections.get(id) else {
            continue;
        };
        out.push_str(&interpolate(Some(&section.body()), variables));
        out.push_str("\n\n");
        if let Some(media) = &section.media {
            if media.kind == MediaKind::Image {
                out.push_str(&format!("![]({})\n\n", media.src));
            }
        }
    }
    out
}
