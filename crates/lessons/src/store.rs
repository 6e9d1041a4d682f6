//! File-backed lesson store.
//!
//! Layout under the lessons root: `course/module/lesson.md`. The `extras`
//! course is flat (`extras/report.md`) and its module is always `extras`.
//! Course and module are the first two path segments, file name included:
//! `readme.md` at the root is its own course with module `root`, and
//! `course/setup.md` has the module `setup.md`.
//!
//! Ids are assigned sequentially from 1 in walk order: within a directory,
//! files come before subdirectories and each group is sorted by name. Ids
//! are stable for one process, not across edits to the tree.

use lectern_core::error::LessonError;
use lectern_core::{Lesson, LessonCategory, LessonId, LessonSummary};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Course whose files are not split into modules.
pub const EXTRAS_COURSE: &str = "extras";

/// Course/module name used when the path has no such segment.
pub const ROOT_SEGMENT: &str = "root";

const LESSON_EXTENSIONS: [&str; 2] = [".md", ".txt"];

/// `groups[course][module]`, lessons in id order.
pub type GroupedLessons = BTreeMap<String, BTreeMap<String, Vec<LessonEntry>>>;

/// A lesson as listed inside a course/module group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonEntry {
    pub id: LessonId,
    pub title: String,
    pub filename: String,
}

/// All lessons, keyed by id. Read-only after [`LessonStore::load`].
#[derive(Debug, Default)]
pub struct LessonStore {
    root: PathBuf,
    lessons: BTreeMap<LessonId, Lesson>,
}

impl LessonStore {
    /// Walk `root` and load every lesson file.
    ///
    /// Never fails: a missing root yields an empty store, and a file that
    /// cannot be read as UTF-8 text is logged and skipped without using up
    /// an id.
    pub fn load(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let mut lessons = BTreeMap::new();

        if !root.is_dir() {
            warn!(dir = %root.display(), "Lessons directory not found");
            return Self { root, lessons };
        }

        let walker = WalkDir::new(&root)
            .sort_by(|a, b| {
                (a.file_type().is_dir(), a.file_name()).cmp(&(b.file_type().is_dir(), b.file_name()))
            })
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

        let mut next_id: LessonId = 1;
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    error!(error = %e, "Error walking lessons directory");
                    continue;
                }
            };
            if !entry.file_type().is_file() || !is_lesson_file(&entry) {
                continue;
            }

            let path = entry.path();
            let content = match std::fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    error!(file = %path.display(), error = %e, "Error loading lesson, skipping");
                    continue;
                }
            };

            let filename = entry.file_name().to_string_lossy().into_owned();
            let (course, module) = classify(path.strip_prefix(&root).unwrap_or(path));
            let title = extract_title(&content, &filename);
            let lesson = Lesson {
                id: next_id,
                title,
                filename,
                content,
                category: LessonCategory::from_course(&course),
                course,
                module,
            };

            debug!(
                id = lesson.id,
                title = %lesson.title,
                course = %lesson.course,
                module = %lesson.module,
                "Loaded lesson"
            );
            lessons.insert(next_id, lesson);
            next_id += 1;
        }

        info!(dir = %root.display(), lessons = lessons.len(), "Lessons loaded");
        Self { root, lessons }
    }

    /// Build a store from already-constructed lessons.
    pub fn from_lessons(lessons: impl IntoIterator<Item = Lesson>) -> Self {
        Self {
            root: PathBuf::new(),
            lessons: lessons.into_iter().map(|l| (l.id, l)).collect(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get(&self, id: LessonId) -> Option<&Lesson> {
        self.lessons.get(&id)
    }

    /// Like [`LessonStore::get`], but absence is an error naming the id.
    pub fn require(&self, id: LessonId) -> Result<&Lesson, LessonError> {
        self.get(id).ok_or(LessonError::NotFound(id))
    }

    pub fn contains(&self, id: LessonId) -> bool {
        self.lessons.contains_key(&id)
    }

    /// All lessons in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Lesson> {
        self.lessons.values()
    }

    /// All ids in ascending order.
    pub fn ids(&self) -> Vec<LessonId> {
        self.lessons.keys().copied().collect()
    }

    /// Summaries of all lessons, sorted by id.
    pub fn list(&self) -> Vec<LessonSummary> {
        self.iter().map(Lesson::summary).collect()
    }

    pub fn grouped(&self) -> GroupedLessons {
        let mut groups = GroupedLessons::new();
        for lesson in self.iter() {
            groups
                .entry(lesson.course.clone())
                .or_default()
                .entry(lesson.module.clone())
                .or_default()
                .push(LessonEntry {
                    id: lesson.id,
                    title: lesson.title.clone(),
                    filename: lesson.filename.clone(),
                });
        }
        groups
    }

    /// Titles for `ids` in the given order; unknown ids are skipped.
    pub fn titles_for(&self, ids: &[LessonId]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| self.get(*id))
            .map(|l| l.title.clone())
            .collect()
    }

    pub fn total(&self) -> usize {
        self.lessons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    /// Ids of the lessons in one course module, in id order.
    pub fn lessons_in_module(&self, course: &str, module: &str) -> Vec<LessonId> {
        self.iter()
            .filter(|l| l.course == course && l.module == module)
            .map(|l| l.id)
            .collect()
    }

    /// Lessons whose module matches `module`, ignoring case, across courses.
    pub fn by_module(&self, module: &str) -> Vec<&Lesson> {
        let module = module.to_lowercase();
        self.iter()
            .filter(|l| l.module.to_lowercase() == module)
            .collect()
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn is_lesson_file(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    LESSON_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Derive `(course, module)` from a path relative to the lessons root.
/// The first segment is the course and the second the module; the file
/// name counts as a segment, so shallow files name their own course or
/// module.
fn classify(relative: &Path) -> (String, String) {
    let segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let course = segments
        .first()
        .cloned()
        .unwrap_or_else(|| ROOT_SEGMENT.into());
    let module = if course == EXTRAS_COURSE {
        EXTRAS_COURSE.into()
    } else {
        segments
            .get(1)
            .cloned()
            .unwrap_or_else(|| ROOT_SEGMENT.into())
    };
    (course, module)
}

/// First `# ` or `## ` heading, else a title made from the filename.
fn extract_title(content: &str, filename: &str) -> String {
    for line in content.lines() {
        let line = line.trim();
        if line.starts_with("# ") || (line.starts_with("## ") && line.len() > 3) {
            return line.trim_start_matches(['#', ' ']).trim().to_string();
        }
    }

    let stem = LESSON_EXTENSIONS
        .iter()
        .find_map(|ext| filename.strip_suffix(ext))
        .unwrap_or(filename);
    stem.replace(['-', '_'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn course_tree() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(root, "ai-web-learning/1-basics/lesson-02.md", "# HTML Tags\nbody 2");
        write(root, "ai-web-learning/1-basics/lesson-01.md", "intro\n## What is the Web\nbody 1");
        write(root, "ai-web-learning/2-css/colors_and-fonts.txt", "no heading here");
        write(root, "extras/report.md", "# Final Report\n");
        write(root, "project-setup-guide/setup.md", "# Setup\n");
        write(root, "ai-web-learning/1-basics/.draft.md", "# Hidden\n");
        write(root, "ai-web-learning/1-basics/notes.pdf", "binary");
        tmp
    }

    #[test]
    fn ids_follow_walk_order() {
        let tmp = course_tree();
        let store = LessonStore::load(tmp.path());

        let listed: Vec<(LessonId, String)> = store
            .list()
            .into_iter()
            .map(|s| (s.id, s.filename))
            .collect();
        assert_eq!(
            listed,
            vec![
                (1, "lesson-01.md".to_string()),
                (2, "lesson-02.md".to_string()),
                (3, "colors_and-fonts.txt".to_string()),
                (4, "report.md".to_string()),
                (5, "setup.md".to_string()),
            ]
        );
    }

    #[test]
    fn titles_from_headings_or_filename() {
        let tmp = course_tree();
        let store = LessonStore::load(tmp.path());
        assert_eq!(store.get(1).unwrap().title, "What is the Web");
        assert_eq!(store.get(2).unwrap().title, "HTML Tags");
        assert_eq!(store.get(3).unwrap().title, "colors and fonts");
    }

    #[test]
    fn course_module_and_category() {
        let tmp = course_tree();
        let store = LessonStore::load(tmp.path());

        let basics = store.get(1).unwrap();
        assert_eq!(basics.course, "ai-web-learning");
        assert_eq!(basics.module, "1-basics");
        assert_eq!(basics.category, LessonCategory::AiWebLearning);

        let report = store.get(4).unwrap();
        assert_eq!(report.module, "extras");
        assert_eq!(report.category, LessonCategory::Extras);

        let setup = store.get(5).unwrap();
        assert_eq!(setup.course, "project-setup-guide");
        assert_eq!(setup.module, "setup.md");
        assert_eq!(setup.category, LessonCategory::ProjectSetupGuide);
    }

    #[test]
    fn shallow_files_use_path_segments() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "readme.md", "# Readme\n");
        write(tmp.path(), "project-setup-guide/setup.md", "# Setup\n");
        let store = LessonStore::load(tmp.path());

        let readme = store.get(1).unwrap();
        assert_eq!(readme.filename, "readme.md");
        assert_eq!(readme.course, "readme.md");
        assert_eq!(readme.module, ROOT_SEGMENT);

        let setup = store.get(2).unwrap();
        assert_eq!(setup.course, "project-setup-guide");
        assert_eq!(setup.module, "setup.md");
    }

    #[test]
    fn classify_segments() {
        assert_eq!(
            classify(Path::new("ai-web-learning/1-basics/a.md")),
            ("ai-web-learning".to_string(), "1-basics".to_string())
        );
        assert_eq!(
            classify(Path::new("extras/deep/report.md")),
            ("extras".to_string(), "extras".to_string())
        );
        assert_eq!(
            classify(Path::new("")),
            (ROOT_SEGMENT.to_string(), ROOT_SEGMENT.to_string())
        );
    }

    #[test]
    fn hidden_and_foreign_files_skipped() {
        let tmp = course_tree();
        let store = LessonStore::load(tmp.path());
        assert_eq!(store.total(), 5);
        assert!(store.iter().all(|l| l.title != "Hidden"));
    }

    #[test]
    fn unreadable_file_skipped_without_consuming_id() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "c/m/a.md", "# A");
        fs::write(tmp.path().join("c/m/b.md"), [0xff, 0xfe, 0x00]).unwrap();
        write(tmp.path(), "c/m/c.md", "# C");

        let store = LessonStore::load(tmp.path());
        assert_eq!(store.total(), 2);
        assert_eq!(store.get(2).unwrap().title, "C");
    }

    #[test]
    fn missing_root_yields_empty_store() {
        let store = LessonStore::load("/nonexistent/lessons");
        assert!(store.is_empty());
        assert!(store.list().is_empty());
    }

    #[test]
    fn require_names_missing_id() {
        let store = LessonStore::default();
        let err = store.require(99).unwrap_err();
        assert!(err.to_string().contains("99"));
    }

    #[test]
    fn grouped_by_course_then_module() {
        let tmp = course_tree();
        let store = LessonStore::load(tmp.path());
        let groups = store.grouped();

        let basics = &groups["ai-web-learning"]["1-basics"];
        assert_eq!(basics.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(groups["extras"]["extras"][0].title, "Final Report");

        let json = serde_json::to_value(&groups).unwrap();
        assert_eq!(json["project-setup-guide"]["setup.md"][0]["filename"], "setup.md");
    }

    #[test]
    fn module_lookups() {
        let tmp = course_tree();
        let store = LessonStore::load(tmp.path());
        assert_eq!(store.lessons_in_module("ai-web-learning", "1-basics"), vec![1, 2]);
        assert!(store.lessons_in_module("extras", "1-basics").is_empty());
        assert_eq!(store.by_module("EXTRAS").len(), 1);
    }

    #[test]
    fn titles_skip_unknown_ids() {
        let tmp = course_tree();
        let store = LessonStore::load(tmp.path());
        assert_eq!(store.titles_for(&[2, 42, 4]), vec!["HTML Tags", "Final Report"]);
    }

    #[test]
    fn title_extraction_rules() {
        assert_eq!(extract_title("  # Spaced  \n", "x.md"), "Spaced");
        assert_eq!(extract_title("### Deep\n## Second", "x.md"), "Second");
        assert_eq!(extract_title("#NoSpace", "my_file-name.md"), "my file name");
    }
}
