//! Static lesson and resource definitions read from JSON files.
//!
//! Several lesson files may be given at once. A `day_index` defined twice
//! with different content is an error naming both files, unless one of the
//! two is the caller's preferred file. The loader never picks a winner on
//! its own.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{Lesson, Resource};

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Day {day_index} is defined differently in {first} and {second}")]
    ConflictingLesson {
        day_index: u32,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Invalid record in {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, ContentError> {
    let raw = fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ContentError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn validate_lesson(lesson: &Lesson) -> Result<(), String> {
    if lesson.day_index == 0 {
        return Err("day_index must be a positive integer".to_string());
    }
    if lesson.title.trim().is_empty() {
        return Err(format!("day {} has an empty title", lesson.day_index));
    }
    if lesson.estimated_time_minutes == Some(0) {
        return Err(format!(
            "day {} has a zero estimated_time_minutes",
            lesson.day_index
        ));
    }
    Ok(())
}

fn validate_resource(resource: &Resource) -> Result<(), String> {
    if resource.lesson_day_index == 0 {
        return Err(format!(
            "resource '{}' has lesson_day_index 0",
            resource.title
        ));
    }
    if resource.title.trim().is_empty() {
        return Err(format!(
            "resource for day {} has an empty title",
            resource.lesson_day_index
        ));
    }
    if resource.url.trim().is_empty() {
        return Err(format!("resource '{}' has an empty url", resource.title));
    }
    Ok(())
}

/// Merges lesson lists, sorted by `day_index`. Identical repeats collapse.
/// A day defined differently in two sources is kept from `preferred` when
/// that is one of the two, and is an error otherwise.
pub fn merge_lessons(
    sources: Vec<(PathBuf, Vec<Lesson>)>,
    preferred: Option<&Path>,
) -> Result<Vec<Lesson>, ContentError> {
    let mut by_day: BTreeMap<u32, (PathBuf, Lesson)> = BTreeMap::new();

    for (path, lessons) in sources {
        for lesson in lessons {
            validate_lesson(&lesson).map_err(|reason| ContentError::Invalid {
                path: path.clone(),
                reason,
            })?;

            match by_day.entry(lesson.day_index) {
                Entry::Vacant(slot) => {
                    slot.insert((path.clone(), lesson));
                }
                Entry::Occupied(mut slot) => {
                    let (first, existing) = slot.get();
                    if *existing == lesson {
                        debug!(
                            "Day {} repeated in {} with identical content",
                            lesson.day_index,
                            path.display()
                        );
                    } else if preferred == Some(path.as_path()) {
                        warn!(
                            "Day {}: using {} over {}",
                            lesson.day_index,
                            path.display(),
                            first.display()
                        );
                        slot.insert((path.clone(), lesson));
                    } else if preferred == Some(first.as_path()) {
                        warn!(
                            "Day {}: using {} over {}",
                            lesson.day_index,
                            first.display(),
                            path.display()
                        );
                    } else {
                        return Err(ContentError::ConflictingLesson {
                            day_index: lesson.day_index,
                            first: first.clone(),
                            second: path.clone(),
                        });
                    }
                }
            }
        }
    }

    Ok(by_day.into_values().map(|(_, lesson)| lesson).collect())
}

pub fn load_lessons<P: AsRef<Path>>(
    paths: &[P],
    preferred: Option<&Path>,
) -> Result<Vec<Lesson>, ContentError> {
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        sources.push((path.to_path_buf(), read_json(path)?));
    }
    merge_lessons(sources, preferred)
}

/// Resources in file order. A repeated `(lesson_day_index, title)` pair is
/// dropped, keeping the first.
pub fn load_resources(path: &Path) -> Result<Vec<Resource>, ContentError> {
    let resources: Vec<Resource> = read_json(path)?;
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(resources.len());

    for resource in resources {
        validate_resource(&resource).map_err(|reason| ContentError::Invalid {
            path: path.to_path_buf(),
            reason,
        })?;
        if seen.insert((resource.lesson_day_index, resource.title.clone())) {
            unique.push(resource);
        } else {
            debug!(
                "Dropping repeated resource '{}' for day {}",
                resource.title, resource.lesson_day_index
            );
        }
    }

    Ok(unique)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn lesson(day_index: u32, title: &str) -> Lesson {
        serde_json::from_value(serde_json::json!({ "day_index": day_index, "title": title }))
            .unwrap()
    }

    fn resource(day: u32, title: &str, url: &str) -> Resource {
        Resource {
            lesson_day_index: day,
            title: title.to_string(),
            url: url.to_string(),
            image_url: String::new(),
        }
    }

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn bundled(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("content").join(name)
    }

    #[test]
    fn merge_sorts_and_collapses_identical_days() {
        let merged = merge_lessons(
            vec![
                (PathBuf::from("b.json"), vec![lesson(3, "Data Types"), lesson(1, "Setup")]),
                (PathBuf::from("a.json"), vec![lesson(1, "Setup"), lesson(2, "Variables")]),
            ],
            None,
        )
        .unwrap();

        let days: Vec<u32> = merged.iter().map(|l| l.day_index).collect();
        assert_eq!(days, vec![1, 2, 3]);
    }

    #[test]
    fn merge_rejects_conflicting_days() {
        let err = merge_lessons(
            vec![
                (PathBuf::from("lessons_6_12.json"), vec![lesson(11, "Loops")]),
                (PathBuf::from("lessons_13_20.json"), vec![lesson(11, "Ownership")]),
            ],
            None,
        )
        .unwrap_err();

        match err {
            ContentError::ConflictingLesson {
                day_index,
                first,
                second,
            } => {
                assert_eq!(day_index, 11);
                assert_eq!(first, PathBuf::from("lessons_6_12.json"));
                assert_eq!(second, PathBuf::from("lessons_13_20.json"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn merge_keeps_preferred_source_either_order() {
        let early = PathBuf::from("lessons_6_12.json");
        let late = PathBuf::from("lessons_13_20.json");
        let sources = || {
            vec![
                (early.clone(), vec![lesson(10, "Control Flow"), lesson(11, "Loops")]),
                (late.clone(), vec![lesson(11, "Ownership"), lesson(13, "Lifetimes")]),
            ]
        };

        let prefer_late = merge_lessons(sources(), Some(late.as_path())).unwrap();
        assert_eq!(prefer_late[1].title, "Ownership");
        assert_eq!(prefer_late.len(), 3);

        let prefer_early = merge_lessons(sources(), Some(early.as_path())).unwrap();
        assert_eq!(prefer_early[1].title, "Loops");
    }

    #[test]
    fn preference_does_not_cover_unrelated_files() {
        let err = merge_lessons(
            vec![
                (PathBuf::from("a.json"), vec![lesson(4, "Functions")]),
                (PathBuf::from("b.json"), vec![lesson(4, "Closures")]),
            ],
            Some(Path::new("c.json")),
        )
        .unwrap_err();
        assert!(matches!(err, ContentError::ConflictingLesson { day_index: 4, .. }));
    }

    #[test]
    fn merge_rejects_day_zero() {
        let err = merge_lessons(vec![(PathBuf::from("x.json"), vec![lesson(0, "Nope")])], None)
            .unwrap_err();
        assert!(matches!(err, ContentError::Invalid { .. }));
    }

    #[test]
    fn merge_rejects_blank_title() {
        let err = merge_lessons(vec![(PathBuf::from("x.json"), vec![lesson(2, "  ")])], None)
            .unwrap_err();
        match err {
            ContentError::Invalid { path, reason } => {
                assert_eq!(path, PathBuf::from("x.json"));
                assert_eq!(reason, "day 2 has an empty title");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn merge_rejects_zero_estimated_time() {
        let mut timed = lesson(3, "Data Types");
        timed.estimated_time_minutes = Some(0);
        let err = merge_lessons(vec![(PathBuf::from("x.json"), vec![timed])], None).unwrap_err();
        assert!(matches!(
            err,
            ContentError::Invalid { ref reason, .. } if reason.contains("estimated_time_minutes")
        ));

        let mut untimed = lesson(3, "Data Types");
        untimed.estimated_time_minutes = None;
        assert!(merge_lessons(vec![(PathBuf::from("x.json"), vec![untimed])], None).is_ok());
    }

    #[test]
    fn resource_validation() {
        let book = resource(1, "Rust Book", "https://doc.rust-lang.org/book/");
        assert!(validate_resource(&book).is_ok());
        assert_eq!(
            validate_resource(&resource(1, " ", "https://doc.rust-lang.org/book/")).unwrap_err(),
            "resource for day 1 has an empty title"
        );
        assert_eq!(
            validate_resource(&resource(1, "Rust Book", "")).unwrap_err(),
            "resource 'Rust Book' has an empty url"
        );
        assert!(validate_resource(&resource(0, "Rust Book", "https://x.dev")).is_err());
    }

    #[test]
    fn load_resources_rejects_blank_url() {
        let file = write_temp(r#"[{"lesson_day_index": 3, "title": "Data Types", "url": "  "}]"#);
        let err = load_resources(file.path()).unwrap_err();
        assert!(matches!(err, ContentError::Invalid { .. }));
    }

    #[test]
    fn load_resources_defaults_image_and_drops_repeats() {
        let file = write_temp(
            r#"[
                {"lesson_day_index": 1, "title": "Rust Book", "url": "https://rust-book.dev/"},
                {"lesson_day_index": 1, "title": "Rust Book", "url": "https://example.com/dup"},
                {"lesson_day_index": 2, "title": "Rust Book", "url": "https://rust-book.dev/ch03"}
            ]"#,
        );

        let resources = load_resources(file.path()).unwrap();
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].image_url, "");
        assert_eq!(resources[0].url, "https://rust-book.dev/");
        assert_eq!(resources[1].lesson_day_index, 2);
    }

    #[test]
    fn load_lessons_reports_parse_errors_with_path() {
        let file = write_temp("{ not json");
        let err = load_lessons(&[file.path()], None).unwrap_err();
        assert!(matches!(err, ContentError::Parse { .. }));
    }

    #[test]
    fn bundled_lesson_sets_disagree_on_days_11_and_12() {
        let err = load_lessons(
            &[bundled("lessons_6_12.json"), bundled("lessons_13_20.json")],
            None,
        )
        .unwrap_err();

        match err {
            ContentError::ConflictingLesson {
                day_index,
                first,
                second,
            } => {
                assert_eq!(day_index, 11);
                assert_eq!(first, bundled("lessons_6_12.json"));
                assert_eq!(second, bundled("lessons_13_20.json"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bundled_course_covers_thirty_days_with_a_preference() {
        let paths = [
            bundled("lessons.json"),
            bundled("lessons_6_12.json"),
            bundled("lessons_13_20.json"),
            bundled("lessons_21_30.json"),
        ];
        let preferred = bundled("lessons_13_20.json");
        let lessons = load_lessons(&paths, Some(preferred.as_path())).unwrap();

        let days: Vec<u32> = lessons.iter().map(|l| l.day_index).collect();
        assert_eq!(days, (1..=30).collect::<Vec<u32>>());
        assert!(lessons[10].title.starts_with("Understanding Ownership"));

        let resources = load_resources(&bundled("resources.json")).unwrap();
        assert!(resources.iter().all(|r| days.contains(&r.lesson_day_index)));
    }
}
