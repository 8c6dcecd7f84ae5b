//! Read-only course catalog consumed by the course-selection step and the
//! catalog endpoints.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Level filter value that disables level filtering.
pub const ALL_LEVELS: &str = "All Levels";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    pub level: String,
    pub price: String,
    pub duration: String,
    pub short_description: String,
    pub color: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("unable to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog is not a valid course list: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("course id '{0}' appears more than once")]
    DuplicateCourse(String),
    #[error("course id must not be blank")]
    BlankCourseId,
    #[error("no course with id '{0}'")]
    UnknownCourse(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseCatalog {
    courses: Vec<Course>,
}

impl CourseCatalog {
    pub fn new(courses: Vec<Course>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for course in &courses {
            if course.id.trim().is_empty() {
                return Err(CatalogError::BlankCourseId);
            }
            if !seen.insert(course.id.as_str()) {
                return Err(CatalogError::DuplicateCourse(course.id.clone()));
            }
        }
        Ok(Self { courses })
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let courses: Vec<Course> = serde_json::from_str(raw)?;
        Self::new(courses)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// The programmes offered on the public site.
    pub fn standard() -> Self {
        let courses = [
            (
                "computer-science",
                "Computer Science",
                "Bachelor's Degree",
                "$12,000/year",
                "4 Years",
                "Master programming, algorithms, and software development",
                "from-violet-600 to-purple-600",
            ),
            (
                "business-administration",
                "Business Administration",
                "Bachelor's Degree",
                "$10,500/year",
                "3 Years",
                "Develop leadership and management expertise",
                "from-emerald-600 to-teal-600",
            ),
            (
                "data-science",
                "Data Science & Analytics",
                "Master's Degree",
                "$15,000/year",
                "2 Years",
                "Unlock insights from data with advanced analytics",
                "from-cyan-600 to-blue-600",
            ),
            (
                "graphic-design",
                "Graphic Design",
                "Bachelor's Degree",
                "$11,000/year",
                "3 Years",
                "Create stunning visual experiences",
                "from-pink-600 to-rose-600",
            ),
            (
                "digital-marketing",
                "Digital Marketing",
                "Diploma",
                "$6,500/year",
                "1 Year",
                "Master online marketing strategies",
                "from-orange-600 to-amber-600",
            ),
            (
                "cybersecurity",
                "Cybersecurity",
                "Master's Degree",
                "$14,500/year",
                "2 Years",
                "Protect digital assets and systems",
                "from-red-600 to-orange-600",
            ),
        ]
        .into_iter()
        .map(
            |(id, title, level, price, duration, short_description, color)| Course {
                id: id.to_string(),
                title: title.to_string(),
                level: level.to_string(),
                price: price.to_string(),
                duration: duration.to_string(),
                short_description: short_description.to_string(),
                color: color.to_string(),
            },
        )
        .collect();

        Self { courses }
    }

    pub fn find(&self, id: &str) -> Option<&Course> {
        self.courses.iter().find(|course| course.id == id)
    }

    pub fn get(&self, id: &str) -> Result<&Course, CatalogError> {
        self.find(id)
            .ok_or_else(|| CatalogError::UnknownCourse(id.to_string()))
    }

    /// Courses whose title or short description contains `query`
    /// (case-insensitive) and whose level equals `level`. A blank query or
    /// the [`ALL_LEVELS`] level matches everything.
    pub fn filter(&self, query: Option<&str>, level: Option<&str>) -> Vec<&Course> {
        let needle = query.map(str::trim).unwrap_or_default().to_lowercase();
        let level = level
            .map(str::trim)
            .filter(|level| !level.is_empty() && *level != ALL_LEVELS);

        self.courses
            .iter()
            .filter(|course| {
                needle.is_empty()
                    || course.title.to_lowercase().contains(&needle)
                    || course.short_description.to_lowercase().contains(&needle)
            })
            .filter(|course| level.map_or(true, |level| course.level == level))
            .collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Course> {
        self.courses.iter()
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

impl Default for CourseCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
