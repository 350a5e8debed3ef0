use super::tutor::{Availability, Review, Subject, Tutor};
use super::wallet::Amount;
use crate::error::Result;
use std::io::Read;

const DEFAULT_SLOTS: [&str; 4] = ["04:00 مساءً", "05:00 مساءً", "06:00 مساءً", "07:00 مساءً"];

/// The list of tutors students can browse and book.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    tutors: Vec<Tutor>,
}

impl Catalog {
    pub fn new(tutors: Vec<Tutor>) -> Self {
        Self { tutors }
    }

    /// Reads a JSON array of tutors.
    pub fn from_reader<R: Read>(source: R) -> Result<Self> {
        let tutors: Vec<Tutor> = serde_json::from_reader(source)?;
        Ok(Self::new(tutors))
    }

    /// The catalog bundled with the application.
    pub fn builtin() -> Self {
        Self::new(vec![
            Tutor {
                id: "1".to_string(),
                name: "د. أحمد علي".to_string(),
                specialty: "الرياضيات المتقدمة".to_string(),
                bio: "خبير في تدريس الرياضيات للثانوية العامة والجامعات لأكثر من 10 سنوات."
                    .to_string(),
                rating: 4.9,
                reviews_count: 124,
                hourly_rate: Amount::from(50u32),
                avatar: "https://picsum.photos/seed/tutor1/200".to_string(),
                subjects: vec![Subject::Mathematics, Subject::Physics],
                availability: vec![window("الاثنين"), window("الأربعاء")],
                reviews: vec![Review {
                    id: "r1".to_string(),
                    student_name: "ياسر خالد".to_string(),
                    rating: 5.0,
                    comment: "شرح ممتاز ومبسط جداً!".to_string(),
                    date: "2024-05-01".to_string(),
                }],
            },
            Tutor {
                id: "2".to_string(),
                name: "أ. سارة محمود".to_string(),
                specialty: "اللغة الإنجليزية".to_string(),
                bio: "متخصصة في التحضير لاختبارات IELTS و TOEFL بأساليب تفاعلية حديثة."
                    .to_string(),
                rating: 4.8,
                reviews_count: 89,
                hourly_rate: Amount::from(40u32),
                avatar: "https://picsum.photos/seed/tutor2/200".to_string(),
                subjects: vec![Subject::English],
                availability: vec![window("الأحد"), window("الثلاثاء")],
                reviews: Vec::new(),
            },
            Tutor {
                id: "3".to_string(),
                name: "المهندس خالد حسن".to_string(),
                specialty: "تطوير الويب والبرمجة".to_string(),
                bio: "مطور واجهات أمامية، أساعد الطلاب على بناء مشاريعهم البرمجية الأولى."
                    .to_string(),
                rating: 5.0,
                reviews_count: 45,
                hourly_rate: Amount::from(60u32),
                avatar: "https://picsum.photos/seed/tutor3/200".to_string(),
                subjects: vec![Subject::Programming],
                availability: vec![window("السبت"), window("الخميس")],
                reviews: Vec::new(),
            },
        ])
    }

    pub fn tutors(&self) -> &[Tutor] {
        &self.tutors
    }

    pub fn find(&self, tutor_id: &str) -> Option<&Tutor> {
        self.tutors.iter().find(|t| t.id == tutor_id)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn window(day: &str) -> Availability {
    Availability {
        day: day.to_string(),
        slots: DEFAULT_SLOTS.iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_builtin_catalog() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.tutors().len(), 3);
        assert_eq!(
            catalog.find("1").unwrap().hourly_rate.value(),
            dec!(50)
        );
        assert!(catalog.find("42").is_none());
    }

    #[test]
    fn test_hourly_rates_are_non_negative() {
        for tutor in Catalog::builtin().tutors() {
            assert!(tutor.hourly_rate.value() >= Decimal::ZERO);
        }
    }

    #[test]
    fn test_every_tutor_has_bookable_slots() {
        for tutor in Catalog::builtin().tutors() {
            assert!(!tutor.availability.is_empty());
            assert!(tutor.availability.iter().all(|a| a.slots.len() == 4));
        }
    }

    #[test]
    fn test_catalog_from_json() {
        let raw = r#"[{
            "id": "7", "name": "Mona", "specialty": "Chemistry", "bio": "Lab work",
            "rating": 4.5, "reviewsCount": 3, "hourlyRate": 25, "avatar": "",
            "subjects": ["العلوم"],
            "availability": [{"day": "Friday", "slots": ["10:00"]}]
        }]"#;
        let catalog = Catalog::from_reader(raw.as_bytes()).unwrap();
        let tutor = catalog.find("7").unwrap();
        assert!(tutor.teaches(Subject::Science));
        assert!(tutor.is_available("Friday", "10:00"));
        assert!(tutor.reviews.is_empty());
    }

    #[test]
    fn test_catalog_from_json_rejects_negative_rate() {
        let raw = r#"[{
            "id": "7", "name": "Mona", "specialty": "", "bio": "",
            "rating": 4.5, "reviewsCount": 3, "hourlyRate": -1, "avatar": "",
            "subjects": []
        }]"#;
        assert!(Catalog::from_reader(raw.as_bytes()).is_err());
    }
}
