use crate::domain::tutor::{Subject, Tutor};
use crate::error::{MarketError, Result};
use std::str::FromStr;

/// The subject chip selected above the tutor list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubjectFilter {
    #[default]
    All,
    Only(Subject),
}

impl SubjectFilter {
    pub fn accepts(&self, tutor: &Tutor) -> bool {
        match self {
            SubjectFilter::All => true,
            SubjectFilter::Only(subject) => tutor.teaches(*subject),
        }
    }
}

impl FromStr for SubjectFilter {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "all" | "الكل" => Ok(SubjectFilter::All),
            other => other.parse().map(SubjectFilter::Only),
        }
    }
}

/// Tutors whose name, specialty or bio contains `query` (ignoring case) and
/// who teach the selected subject. Catalog order is kept.
pub fn filter_tutors<'a>(
    tutors: &'a [Tutor],
    query: &str,
    subject: SubjectFilter,
) -> Vec<&'a Tutor> {
    let query = query.trim().to_lowercase();
    tutors
        .iter()
        .filter(|tutor| matches_query(tutor, &query) && subject.accepts(tutor))
        .collect()
}

fn matches_query(tutor: &Tutor, query: &str) -> bool {
    query.is_empty()
        || [&tutor.name, &tutor.specialty, &tutor.bio]
            .iter()
            .any(|field| field.to_lowercase().contains(query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Catalog;
    use rand::Rng;
    use rand::distributions::Alphanumeric;

    fn ids(tutors: Vec<&Tutor>) -> Vec<String> {
        tutors.into_iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn test_empty_query_and_all_subjects_returns_everything() {
        let catalog = Catalog::builtin();
        let found = filter_tutors(catalog.tutors(), "", SubjectFilter::All);
        assert_eq!(ids(found), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let catalog = Catalog::builtin();
        let found = filter_tutors(catalog.tutors(), "ielts", SubjectFilter::All);
        assert_eq!(ids(found), vec!["2"]);
    }

    #[test]
    fn test_query_matches_specialty() {
        let catalog = Catalog::builtin();
        let found = filter_tutors(catalog.tutors(), "البرمجة", SubjectFilter::All);
        assert_eq!(ids(found), vec!["3"]);
    }

    #[test]
    fn test_subject_filter() {
        let catalog = Catalog::builtin();
        let physics = filter_tutors(catalog.tutors(), "", SubjectFilter::Only(Subject::Physics));
        assert_eq!(ids(physics), vec!["1"]);

        let science = filter_tutors(catalog.tutors(), "", SubjectFilter::Only(Subject::Science));
        assert!(science.is_empty());
    }

    #[test]
    fn test_query_and_subject_must_both_match() {
        let catalog = Catalog::builtin();
        let found = filter_tutors(
            catalog.tutors(),
            "IELTS",
            SubjectFilter::Only(Subject::Mathematics),
        );
        assert!(found.is_empty());
    }

    #[test]
    fn test_subject_filter_parsing() {
        assert_eq!("all".parse::<SubjectFilter>().unwrap(), SubjectFilter::All);
        assert_eq!(
            "english".parse::<SubjectFilter>().unwrap(),
            SubjectFilter::Only(Subject::English)
        );
        assert!("astrology".parse::<SubjectFilter>().is_err());
    }

    #[test]
    fn test_filter_is_pure_and_repeatable() {
        let catalog = Catalog::builtin();
        let before = catalog.clone();
        let mut rng = rand::thread_rng();

        for _ in 0..200 {
            let len = rng.gen_range(0..4);
            let query: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(len)
                .map(char::from)
                .collect();
            let subject = if rng.gen_bool(0.5) {
                SubjectFilter::All
            } else {
                SubjectFilter::Only(Subject::ALL[rng.gen_range(0..Subject::ALL.len())])
            };

            let first = ids(filter_tutors(catalog.tutors(), &query, subject));
            let second = ids(filter_tutors(catalog.tutors(), &query, subject));
            assert_eq!(first, second, "query {query:?} gave different results");
        }
        assert_eq!(catalog, before);
    }
}
