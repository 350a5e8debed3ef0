use super::wallet::Amount;
use crate::error::{MarketError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The subjects a tutor can teach.
///
/// Stored and displayed with the catalog's labels; the English slug is
/// accepted when parsing so that the subject can be typed on any keyboard.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Subject {
    #[serde(rename = "الرياضيات")]
    Mathematics,
    #[serde(rename = "الفيزياء")]
    Physics,
    #[serde(rename = "اللغة العربية")]
    Arabic,
    #[serde(rename = "اللغة الإنجليزية")]
    English,
    #[serde(rename = "البرمجة")]
    Programming,
    #[serde(rename = "العلوم")]
    Science,
}

impl Subject {
    pub const ALL: [Subject; 6] = [
        Subject::Mathematics,
        Subject::Physics,
        Subject::Arabic,
        Subject::English,
        Subject::Programming,
        Subject::Science,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Subject::Mathematics => "الرياضيات",
            Subject::Physics => "الفيزياء",
            Subject::Arabic => "اللغة العربية",
            Subject::English => "اللغة الإنجليزية",
            Subject::Programming => "البرمجة",
            Subject::Science => "العلوم",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Subject::Mathematics => "math",
            Subject::Physics => "physics",
            Subject::Arabic => "arabic",
            Subject::English => "english",
            Subject::Programming => "programming",
            Subject::Science => "science",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Subject {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Subject::ALL
            .into_iter()
            .find(|subject| {
                subject.label() == wanted || subject.slug().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| MarketError::ValidationError(format!("Unknown subject: {wanted}")))
    }
}

/// A day on which a tutor can be booked, with its time slots.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Availability {
    pub day: String,
    pub slots: Vec<String>,
}

impl Availability {
    pub fn offers(&self, day: &str, time: &str) -> bool {
        self.day == day && self.slots.iter().any(|slot| slot == time)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub student_name: String,
    pub rating: f32,
    pub comment: String,
    pub date: String,
}

/// A catalog entry. Read-only once the catalog is loaded.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Tutor {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub bio: String,
    pub rating: f32,
    pub reviews_count: u32,
    pub hourly_rate: Amount,
    pub avatar: String,
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub availability: Vec<Availability>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Tutor {
    pub fn teaches(&self, subject: Subject) -> bool {
        self.subjects.contains(&subject)
    }

    pub fn is_available(&self, day: &str, time: &str) -> bool {
        self.availability.iter().any(|a| a.offers(day, time))
    }

    pub fn summary(&self) -> TutorSummary {
        TutorSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            specialty: self.specialty.clone(),
            bio: self.bio.clone(),
            subjects: self.subjects.clone(),
        }
    }
}

/// The compact projection of a tutor that is sent to the recommender.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct TutorSummary {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub bio: String,
    pub subjects: Vec<Subject>,
}
