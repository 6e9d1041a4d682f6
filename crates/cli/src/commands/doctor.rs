//! `lectern doctor`: diagnose configuration and content directories.

use lectern_config::AppConfig;
use lectern_core::PromptAssembler;
use lectern_lessons::LessonStore;
use std::path::Path;

#[derive(Debug, PartialEq, Eq)]
enum Level {
    Ok,
    Warn,
    Fail,
}

#[derive(Debug)]
struct Check {
    level: Level,
    message: String,
}

impl Check {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            level: Level::Ok,
            message: message.into(),
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            level: Level::Warn,
            message: message.into(),
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            level: Level::Fail,
            message: message.into(),
        }
    }
}

pub fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 lectern doctor");
    println!("=================\n");

    let checks = match super::load_config(config_path) {
        Ok(config) => {
            let mut checks = vec![Check::ok("Config valid")];
            checks.extend(diagnose(&config));
            checks
        }
        Err(e) => vec![Check::fail(format!("Config invalid: {e}"))],
    };

    for check in &checks {
        let icon = match check.level {
            Level::Ok => "✅",
            Level::Warn => "⚠️ ",
            Level::Fail => "❌",
        };
        println!("  {icon} {}", check.message);
    }

    let issues = checks.iter().filter(|c| c.level != Level::Ok).count();
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

fn diagnose(config: &AppConfig) -> Vec<Check> {
    let mut checks = Vec::new();

    checks.push(match config.require_api_key() {
        Ok(_) => Check::ok("API key configured"),
        Err(e) => Check::fail(e.to_string()),
    });

    let lessons_dir = &config.paths.lessons_dir;
    if lessons_dir.is_dir() {
        let store = LessonStore::load(lessons_dir);
        if store.is_empty() {
            checks.push(Check::warn(format!(
                "No lessons found in {}",
                lessons_dir.display()
            )));
        } else {
            checks.push(Check::ok(format!(
                "{} lessons in {}",
                store.total(),
                lessons_dir.display()
            )));
        }
    } else {
        checks.push(Check::warn(format!(
            "Lessons directory missing: {}",
            lessons_dir.display()
        )));
    }

    checks.push(match PromptAssembler::new(&config.paths.prompts_dir).check() {
        Ok(()) => Check::ok("System prompt template present"),
        Err(e) => Check::fail(e.to_string()),
    });

    let artifacts_dir = &config.paths.artifacts_dir;
    checks.push(if artifacts_dir.is_dir() {
        Check::ok(format!("Artifacts directory {}", artifacts_dir.display()))
    } else {
        Check::warn(format!(
            "Artifacts directory {} will be created on startup",
            artifacts_dir.display()
        ))
    });

    for (role, id) in [
        ("Default", &config.default_model),
        ("Fallback", &config.fallback_model),
    ] {
        if config.known_model(id).is_none() {
            checks.push(Check::warn(format!(
                "{role} model {id} is not in the catalog; its cost will be reported as $0"
            )));
        }
    }

    checks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn healthy_setup_passes() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("lessons/course/module")).unwrap();
        fs::write(root.join("lessons/course/module/a.md"), "# A").unwrap();
        fs::create_dir_all(root.join("prompts")).unwrap();
        fs::write(root.join("prompts/system_prompt.md"), "{context}").unwrap();
        fs::create_dir_all(root.join("artifacts")).unwrap();

        let mut config = AppConfig::default();
        config.api_key = Some("sk-or-test".into());
        config.paths.lessons_dir = root.join("lessons");
        config.paths.prompts_dir = root.join("prompts");
        config.paths.artifacts_dir = root.join("artifacts");

        let checks = diagnose(&config);
        assert!(checks.iter().all(|c| c.level == Level::Ok), "{checks:?}");
    }

    #[test]
    fn missing_key_and_template_fail() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.api_key = None;
        config.paths.lessons_dir = tmp.path().join("lessons");
        config.paths.prompts_dir = tmp.path().join("prompts");
        config.paths.artifacts_dir = tmp.path().join("artifacts");
        config.fallback_model = "someone/unlisted".into();

        let checks = diagnose(&config);
        let fails: Vec<_> = checks.iter().filter(|c| c.level == Level::Fail).collect();
        assert_eq!(fails.len(), 2);
        assert!(fails[0].message.contains("OPENROUTER_API_KEY"));
        assert!(
            checks
                .iter()
                .any(|c| c.level == Level::Warn && c.message.contains("someone/unlisted"))
        );
    }
}
