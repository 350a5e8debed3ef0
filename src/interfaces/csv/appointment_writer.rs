use crate::domain::appointment::Appointment;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct AppointmentRow<'a> {
    id: &'a str,
    date: &'a str,
    time: &'a str,
    tutor: &'a str,
    student: &'a str,
    status: String,
    #[serde(rename = "type")]
    kind: String,
    price: String,
}

/// Writes dashboard rows as CSV.
pub struct AppointmentWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> AppointmentWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(sink),
        }
    }

    pub fn write_appointments<'a, I>(&mut self, appointments: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Appointment>,
    {
        // Header even when there is nothing to list.
        self.writer.write_record([
            "id", "date", "time", "tutor", "student", "status", "type", "price",
        ])?;
        for appointment in appointments {
            self.writer.serialize(AppointmentRow {
                id: &appointment.id,
                date: &appointment.date,
                time: &appointment.time,
                tutor: &appointment.tutor_name,
                student: &appointment.student_name,
                status: appointment.status.to_string(),
                kind: appointment.kind.to_string(),
                price: appointment.price.to_string(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
