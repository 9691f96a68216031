use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::asset::AssetSlot;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub created_by: String,
    #[serde(default)]
    pub thumbnail: AssetSlot,
    // Omitted by list projections.
    #[serde(default)]
    pub lectures: Vec<Lecture>,
    #[serde(default)]
    pub number_of_lectures: i32,
    #[serde(default)]
    pub views: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Lecture {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub video: AssetSlot,
}

impl Course {
    pub fn new(title: &str, description: &str, category: &str, created_by: &str) -> Self {
        Course {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            created_by: created_by.to_string(),
            thumbnail: AssetSlot::empty(),
            lectures: Vec::new(),
            number_of_lectures: 0,
            views: 0,
            created_at: Some(Utc::now()),
            modified_at: Some(Utc::now()),
        }
    }

    pub fn find_lecture(&self, lecture_id: &str) -> Option<&Lecture> {
        self.lectures.iter().find(|lecture| lecture.id == lecture_id)
    }

    pub fn push_lecture(&mut self, lecture: Lecture) {
        self.lectures.push(lecture);
        self.recount();
    }

    pub fn remove_lecture(&mut self, lecture_id: &str) -> Option<Lecture> {
        let index = self
            .lectures
            .iter()
            .position(|lecture| lecture.id == lecture_id)?;
        let removed = self.lectures.remove(index);
        self.recount();
        Some(removed)
    }

    pub fn touch(&mut self) {
        self.modified_at = Some(Utc::now());
    }

    fn recount(&mut self) {
        self.number_of_lectures = self.lectures.len() as i32;
    }
}

impl Lecture {
    pub fn new(title: &str, description: &str, video: AssetSlot) -> Self {
        Lecture {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: description.to_string(),
            video,
        }
    }
}
