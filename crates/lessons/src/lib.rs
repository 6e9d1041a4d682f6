//! Lesson content for lectern.
//!
//! [`LessonStore`] walks the course tree once at startup and keeps every
//! lesson in memory. [`ContextBuilder`] turns a lesson selection into the
//! context string handed to the prompt assembler.

pub mod context;
pub mod store;

pub use context::{ALL_LESSONS_LABEL, ContextBuilder};
pub use store::{GroupedLessons, LessonEntry, LessonStore};
