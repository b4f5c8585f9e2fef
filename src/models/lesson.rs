use serde::{Deserialize, Deserializer, Serialize};

use crate::store::RecordId;

/// One day of course content, keyed by `day_index`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub day_index: u32,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub topic_slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time_minutes: Option<u32>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub theory: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_example: Option<CoreExample>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitfall_example: Option<PitfallExample>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge: Option<Challenge>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreExample {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools_used: Vec<String>,
}

/// Some lesson sets explain the pitfall with `reason`, others with
/// `explanation` or `errorHint`; all three are kept as authored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PitfallExample {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(
        default,
        rename = "errorHint",
        alias = "error_hint",
        skip_serializing_if = "Option::is_none"
    )]
    pub error_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools_used: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    // The web client reads `expectedOutput`.
    #[serde(
        default,
        rename = "expectedOutput",
        alias = "expected_output",
        skip_serializing_if = "Option::is_none"
    )]
    pub expected_output: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools_used: Vec<String>,
}

impl PitfallExample {
    /// Whichever explanation the author provided, `reason` first.
    pub fn why(&self) -> Option<&str> {
        self.reason
            .as_deref()
            .or(self.explanation.as_deref())
            .or(self.error_hint.as_deref())
    }
}

impl Challenge {
    pub fn prompt(&self) -> Option<&str> {
        self.task.as_deref().or(self.instructions.as_deref())
    }
}

/// Hosted tables may hold SQL NULL in text columns the authored content
/// always fills.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A lesson as stored remotely, with its server-assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonRow {
    pub id: RecordId,
    #[serde(flatten)]
    pub lesson: Lesson,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_lesson_parses() {
        let lesson: Lesson =
            serde_json::from_str(r#"{"day_index": 1, "title": "Intro"}"#).unwrap();
        assert_eq!(lesson.day_index, 1);
        assert_eq!(lesson.title, "Intro");
        assert!(lesson.core_example.is_none());
        assert!(lesson.estimated_time_minutes.is_none());
    }

    #[test]
    fn pitfall_and_challenge_key_variants() {
        let lesson: Lesson = serde_json::from_str(
            r#"{
                "day_index": 6,
                "title": "Data Types",
                "pitfall_example": {"code": "let x: f32 = 1;", "errorHint": "no implicit casts"},
                "challenge": {
                    "instructions": "Declare three variables",
                    "expected_output": "A 25 true"
                }
            }"#,
        )
        .unwrap();

        let pitfall = lesson.pitfall_example.as_ref().unwrap();
        assert_eq!(pitfall.why(), Some("no implicit casts"));

        let challenge = lesson.challenge.as_ref().unwrap();
        assert_eq!(challenge.prompt(), Some("Declare three variables"));
        assert_eq!(challenge.expected_output.as_deref(), Some("A 25 true"));

        let json = serde_json::to_value(&lesson).unwrap();
        assert_eq!(json["challenge"]["expectedOutput"], "A 25 true");
        assert!(json["challenge"].get("task").is_none());
        assert!(json.get("core_example").is_none());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let lesson: Lesson = serde_json::from_str(
            r#"{
                "day_index": 2,
                "title": "Vars",
                "core_example": {"code": "let x = 1;", "note": "extra"}
            }"#,
        )
        .unwrap();
        assert_eq!(lesson.core_example.unwrap().code, "let x = 1;");
    }

    #[test]
    fn row_flattens_lesson_fields() {
        let row: LessonRow =
            serde_json::from_str(r#"{"id": 7, "day_index": 3, "title": "Functions"}"#).unwrap();
        assert_eq!(row.id, RecordId::Int(7));
        assert_eq!(row.lesson.title, "Functions");
    }
}
