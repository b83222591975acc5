use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::models::{CourseProgressSummary, Lesson, LessonId, Module, ModuleId};

/// A lesson together with the module it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedLesson {
    pub module_id: ModuleId,
    pub module_position: u32,
    pub lesson: Lesson,
}

/// Flattened, globally ordered view over a course's modules and lessons.
///
/// Ordering is (module position, lesson position). The sort is stable, so
/// colliding positions keep the order they arrived in and repeated builds
/// from the same input always agree. Snapshots are immutable: completion
/// changes produce a new index through [`LessonIndex::with_completed`].
#[derive(Debug, Clone, Default)]
pub struct LessonIndex {
    entries: Arc<[IndexedLesson]>,
    ranks: Arc<HashMap<LessonId, usize>>,
    completion_threshold: f64,
}

impl LessonIndex {
    pub fn build(modules: &[Module], completion_threshold: f64) -> Self {
        let mut ordered_modules: Vec<&Module> = modules.iter().collect();
        ordered_modules.sort_by_key(|module| module.position);

        let mut entries = Vec::new();
        for module in ordered_modules {
            let mut lessons: Vec<&Lesson> = module.lessons.iter().collect();
            lessons.sort_by_key(|lesson| lesson.position);
            entries.extend(lessons.into_iter().map(|lesson| IndexedLesson {
                module_id: module.id.clone(),
                module_position: module.position,
                lesson: lesson.clone(),
            }));
        }

        Self::from_entries(entries, completion_threshold)
    }

    fn from_entries(entries: Vec<IndexedLesson>, completion_threshold: f64) -> Self {
        let mut ranks = HashMap::with_capacity(entries.len());
        for (rank, entry) in entries.iter().enumerate() {
            // First occurrence wins if the backend ever repeats an id
            ranks.entry(entry.lesson.id.clone()).or_insert(rank);
        }

        Self {
            entries: entries.into(),
            ranks: Arc::new(ranks),
            completion_threshold,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn completion_threshold(&self) -> f64 {
        self.completion_threshold
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lesson> {
        self.entries.iter().map(|entry| &entry.lesson)
    }

    pub fn entries(&self) -> &[IndexedLesson] {
        &self.entries
    }

    pub fn ids(&self) -> Vec<LessonId> {
        self.iter().map(|lesson| lesson.id.clone()).collect()
    }

    pub fn contains(&self, id: &LessonId) -> bool {
        self.ranks.contains_key(id)
    }

    pub fn position_of(&self, id: &LessonId) -> Option<usize> {
        self.ranks.get(id).copied()
    }

    pub fn get(&self, id: &LessonId) -> Option<&Lesson> {
        self.position_of(id).map(|rank| &self.entries[rank].lesson)
    }

    pub fn entry(&self, id: &LessonId) -> Option<&IndexedLesson> {
        self.position_of(id).map(|rank| &self.entries[rank])
    }

    pub fn first(&self) -> Option<&Lesson> {
        self.entries.first().map(|entry| &entry.lesson)
    }

    pub fn last(&self) -> Option<&Lesson> {
        self.entries.last().map(|entry| &entry.lesson)
    }

    pub fn next(&self, id: &LessonId) -> Option<&Lesson> {
        let rank = self.position_of(id)?;
        self.entries.get(rank + 1).map(|entry| &entry.lesson)
    }

    pub fn previous(&self, id: &LessonId) -> Option<&Lesson> {
        let rank = self.position_of(id)?;
        let previous = rank.checked_sub(1)?;
        self.entries.get(previous).map(|entry| &entry.lesson)
    }

    pub fn is_complete(&self, id: &LessonId) -> bool {
        self.get(id)
            .is_some_and(|lesson| lesson.is_complete(self.completion_threshold))
    }

    pub fn first_incomplete(&self) -> Option<&Lesson> {
        self.iter()
            .find(|lesson| !lesson.is_complete(self.completion_threshold))
    }

    /// Lessons the loaded data already reports as complete
    pub fn completed_ids(&self) -> HashSet<LessonId> {
        self.iter()
            .filter(|lesson| lesson.is_complete(self.completion_threshold))
            .map(|lesson| lesson.id.clone())
            .collect()
    }

    /// New snapshot with completion flags projected from `completed`.
    /// Flags only ever turn on; nothing in the set clears a lesson.
    pub fn with_completed(&self, completed: &HashSet<LessonId>) -> Self {
        let entries = self
            .entries
            .iter()
            .map(|entry| {
                let mut entry = entry.clone();
                if completed.contains(&entry.lesson.id) && !entry.lesson.is_completed {
                    entry.lesson.is_completed = true;
                    entry.lesson.progress_percent = entry.lesson.progress_percent.max(
                        self.completion_threshold,
                    );
                }
                entry
            })
            .collect();

        Self {
            entries,
            ranks: Arc::clone(&self.ranks),
            completion_threshold: self.completion_threshold,
        }
    }

    /// New snapshot with one lesson's progress fields replaced. A lesson
    /// that was complete stays complete when it is watched again.
    pub fn with_lesson_progress(&self, id: &LessonId, percent: f64, time: f64) -> Self {
        let Some(rank) = self.position_of(id) else {
            return self.clone();
        };

        let mut entries = self.entries.to_vec();
        let lesson = &mut entries[rank].lesson;
        let was_complete = lesson.is_complete(self.completion_threshold);
        lesson.progress_percent = percent;
        lesson.last_video_time = time;
        if was_complete || percent >= self.completion_threshold {
            lesson.is_completed = true;
        }

        Self {
            entries: entries.into(),
            ranks: Arc::clone(&self.ranks),
            completion_threshold: self.completion_threshold,
        }
    }

    pub fn summary(&self) -> CourseProgressSummary {
        let completed = self
            .iter()
            .filter(|lesson| lesson.is_complete(self.completion_threshold))
            .count();
        CourseProgressSummary::new(completed, self.len())
    }
}
