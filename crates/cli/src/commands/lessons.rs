//! `lectern lessons`: list the lessons the server would load.

use lectern_lessons::LessonStore;
use std::fmt::Write as _;
use std::path::Path;

pub fn run(config_path: Option<&Path>, grouped: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let store = LessonStore::load(&config.paths.lessons_dir);

    println!("📖 Lessons in {}", store.root().display());
    println!();
    if store.is_empty() {
        println!("  (none found)");
        return Ok(());
    }

    let report = if grouped {
        render_grouped(&store)
    } else {
        render_table(&store)
    };
    print!("{report}");
    println!();
    println!("  Total: {}", store.total());
    Ok(())
}

fn render_table(store: &LessonStore) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  {:>4}  {:<24} {:<24} Title", "ID", "Course", "Module");
    for lesson in store.iter() {
        let _ = writeln!(
            out,
            "  {:>4}  {:<24} {:<24} {}",
            lesson.id, lesson.course, lesson.module, lesson.title
        );
    }
    out
}

fn render_grouped(store: &LessonStore) -> String {
    let mut out = String::new();
    for (course, modules) in store.grouped() {
        let _ = writeln!(out, "  {course}");
        for (module, entries) in modules {
            let _ = writeln!(out, "    {module}");
            for entry in entries {
                let _ = writeln!(out, "      [{}] {}", entry.id, entry.title);
            }
        }
    }
    out
}
