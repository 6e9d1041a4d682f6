//! Context building: selected lessons concatenated into one grounding string.

use crate::store::LessonStore;
use lectern_core::LessonId;
use std::collections::BTreeSet;
use tracing::info;

/// Reported in place of lesson titles when no selection was given.
pub const ALL_LESSONS_LABEL: &str = "All available lessons";

const RULE_WIDTH: usize = 80;

/// Builds context strings from a [`LessonStore`].
#[derive(Debug, Clone, Copy)]
pub struct ContextBuilder<'a> {
    store: &'a LessonStore,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(store: &'a LessonStore) -> Self {
        Self { store }
    }

    /// Resolve a selection to known ids in ascending order, without
    /// duplicates. `None` or an empty slice selects every lesson.
    pub fn selection(&self, ids: Option<&[LessonId]>) -> Vec<LessonId> {
        match ids {
            Some(ids) if !ids.is_empty() => ids
                .iter()
                .copied()
                .filter(|id| self.store.contains(*id))
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            _ => self.store.ids(),
        }
    }

    /// Concatenate the selected lessons, each framed by a header block:
    ///
    /// ```text
    ///
    /// ====…====
    /// LESSON {id}: {title}
    /// Module: {module}
    /// ====…====
    ///
    /// {content}
    ///
    /// ```
    pub fn build(&self, ids: Option<&[LessonId]>) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let selected = self.selection(ids);

        let mut parts: Vec<String> = Vec::with_capacity(selected.len() * 6);
        for lesson in selected.iter().filter_map(|id| self.store.get(*id)) {
            parts.push(format!("\n{rule}"));
            parts.push(format!("LESSON {}: {}", lesson.id, lesson.title));
            parts.push(format!("Module: {}", lesson.module));
            parts.push(format!("{rule}\n"));
            parts.push(lesson.content.clone());
            parts.push("\n".to_string());
        }

        let context = parts.join("\n");
        info!(
            lessons = selected.len(),
            chars = context.chars().count(),
            "Built context"
        );
        context
    }

    /// `floor(chars(build(ids)) / 4)`. A rough heuristic, not a tokenizer.
    pub fn estimate_tokens(&self, ids: Option<&[LessonId]>) -> usize {
        Self::estimate_tokens_for(&self.build(ids))
    }

    pub fn estimate_tokens_for(context: &str) -> usize {
        context.chars().count() / 4
    }

    /// Titles reported back to the caller: the selected lessons' titles, or
    /// [`ALL_LESSONS_LABEL`] when nothing was selected.
    pub fn labels(&self, ids: Option<&[LessonId]>) -> Vec<String> {
        match ids {
            Some(ids) if !ids.is_empty() => self.store.titles_for(&self.selection(Some(ids))),
            _ => vec![ALL_LESSONS_LABEL.to_string()],
        }
    }
}
