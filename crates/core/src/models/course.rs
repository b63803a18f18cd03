use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub type CourseId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
}

/// Snapshot of a user's active courses, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseMap {
    courses: Vec<Course>,
    names: HashMap<CourseId, String>,
}

impl CourseMap {
    pub fn new(mut courses: Vec<Course>) -> Self {
        courses.retain(|c| !c.name.trim().is_empty());
        courses.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        let names = courses.iter().map(|c| (c.id, c.name.clone())).collect();
        Self { courses, names }
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn name_of(&self, id: CourseId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

/// Course folder as returned by the LMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFolder {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFile {
    pub id: i64,
    #[serde(default = "unnamed_file")]
    pub display_name: String,
    #[serde(default)]
    pub size: u64,
}

fn unnamed_file() -> String {
    "file".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_map_drops_nameless_and_sorts() {
        let map = CourseMap::new(vec![
            Course { id: 2, name: "MA1521 Calculus".to_string() },
            Course { id: 3, name: "  ".to_string() },
            Course { id: 1, name: "CS2030S Programming".to_string() },
        ]);

        assert_eq!(map.len(), 2);
        assert_eq!(map.courses()[0].id, 1);
        assert_eq!(map.name_of(2), Some("MA1521 Calculus"));
        assert_eq!(map.name_of(3), None);
    }
}
