use crate::domain::tutor::Tutor;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct TutorRow<'a> {
    id: &'a str,
    name: &'a str,
    specialty: &'a str,
    rating: f32,
    reviews: u32,
    hourly_rate: String,
    subjects: String,
}

#[derive(Serialize)]
struct SlotRow<'a> {
    day: &'a str,
    time: &'a str,
}

/// Writes catalog listings as CSV.
pub struct TutorWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> TutorWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// One row per tutor; subjects are joined with `|`.
    pub fn write_tutors<'a, I>(&mut self, tutors: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Tutor>,
    {
        for tutor in tutors {
            let subjects: Vec<&str> = tutor.subjects.iter().map(|s| s.slug()).collect();
            self.writer.serialize(TutorRow {
                id: &tutor.id,
                name: &tutor.name,
                specialty: &tutor.specialty,
                rating: tutor.rating,
                reviews: tutor.reviews_count,
                hourly_rate: tutor.hourly_rate.to_string(),
                subjects: subjects.join("|"),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// One row per bookable day and time.
    pub fn write_availability(&mut self, tutor: &Tutor) -> Result<()> {
        for window in &tutor.availability {
            for slot in &window.slots {
                self.writer.serialize(SlotRow {
                    day: &window.day,
                    time: slot,
                })?;
            }
        }
        self.writer.flush()?;
        Ok(())
    }
}
