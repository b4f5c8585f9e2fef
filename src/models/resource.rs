use serde::{Deserialize, Serialize};

use crate::models::lesson::null_as_empty;
use crate::store::RecordId;

/// A supplementary link, attached to its lesson by `day_index`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub lesson_day_index: u32,
    pub title: String,
    pub url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image_url: String,
}

/// Row body for `lesson_resources`, once the parent lesson id is known.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewLessonResource {
    pub lesson_id: RecordId,
    pub title: String,
    pub url: String,
    pub image_url: String,
}

impl NewLessonResource {
    pub fn for_lesson(lesson_id: RecordId, resource: &Resource) -> Self {
        Self {
            lesson_id,
            title: resource.title.clone(),
            url: resource.url.clone(),
            image_url: resource.image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonResource {
    pub id: RecordId,
    pub lesson_id: RecordId,
    pub title: String,
    pub url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image_url: String,
}
