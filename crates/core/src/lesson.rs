//! Lesson records.
//!
//! A lesson is one course-material file, loaded once at startup and never
//! mutated afterwards.

use serde::{Deserialize, Serialize};

/// Lesson ids are sequential from 1 in directory-walk order.
pub type LessonId = u32;

/// An immutable lesson record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: LessonId,
    pub title: String,
    pub filename: String,
    /// Full markdown or text body, never truncated.
    pub content: String,
    pub course: String,
    pub module: String,
    pub category: LessonCategory,
}

impl Lesson {
    pub fn summary(&self) -> LessonSummary {
        LessonSummary {
            id: self.id,
            title: self.title.clone(),
            filename: self.filename.clone(),
            course: self.course.clone(),
            module: self.module.clone(),
        }
    }
}

/// The listing view of a lesson, without its body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonSummary {
    pub id: LessonId,
    pub title: String,
    pub filename: String,
    pub course: String,
    pub module: String,
}

/// Display category, derived from the course directory name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LessonCategory {
    #[default]
    AiWebLearning,
    ProjectSetupGuide,
    WebDesignFundamentals,
    ArtifactSystemGuide,
    Extras,
}

impl LessonCategory {
    /// Classify a course directory. Matching is case-insensitive and by
    /// substring, so `2024-extras` lands in [`LessonCategory::Extras`].
    /// Unrecognized courses fall back to `ai-web-learning`.
    pub fn from_course(course: &str) -> Self {
        let course = course.to_lowercase();
        [
            Self::AiWebLearning,
            Self::ProjectSetupGuide,
            Self::WebDesignFundamentals,
            Self::ArtifactSystemGuide,
            Self::Extras,
        ]
        .into_iter()
        .find(|category| course.contains(category.as_str()))
        .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AiWebLearning => "ai-web-learning",
            Self::ProjectSetupGuide => "project-setup-guide",
            Self::WebDesignFundamentals => "web-design-fundamentals",
            Self::ArtifactSystemGuide => "artifact-system-guide",
            Self::Extras => "extras",
        }
    }
}

impl std::fmt::Display for LessonCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
