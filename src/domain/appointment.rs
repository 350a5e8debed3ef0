use super::profile::UserProfile;
use super::tutor::Tutor;
use super::wallet::Amount;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Upcoming,
    Completed,
    Cancelled,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentType {
    Trial,
    #[default]
    Regular,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Upcoming => write!(f, "upcoming"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentType::Trial => write!(f, "trial"),
            AppointmentType::Regular => write!(f, "regular"),
        }
    }
}

/// An appointment before the store has assigned it an id.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub tutor_id: String,
    pub tutor_name: String,
    pub student_id: String,
    pub student_name: String,
    pub date: String,
    pub time: String,
    pub status: AppointmentStatus,
    #[serde(rename = "type")]
    pub kind: AppointmentType,
    pub price: Amount,
}

impl NewAppointment {
    /// A regular, upcoming session priced at the tutor's hourly rate.
    pub fn regular(student: &UserProfile, tutor: &Tutor, date: &str, time: &str) -> Self {
        Self {
            tutor_id: tutor.id.clone(),
            tutor_name: tutor.name.clone(),
            student_id: student.id.clone(),
            student_name: student.name.clone(),
            date: date.to_string(),
            time: time.to_string(),
            status: AppointmentStatus::Upcoming,
            kind: AppointmentType::Regular,
            price: tutor.hourly_rate,
        }
    }

    pub fn with_id(self, id: String) -> Appointment {
        Appointment {
            id,
            tutor_id: self.tutor_id,
            tutor_name: self.tutor_name,
            student_id: self.student_id,
            student_name: self.student_name,
            date: self.date,
            time: self.time,
            status: self.status,
            kind: self.kind,
            price: self.price,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub tutor_id: String,
    pub tutor_name: String,
    pub student_id: String,
    pub student_name: String,
    pub date: String,
    pub time: String,
    pub status: AppointmentStatus,
    #[serde(rename = "type")]
    pub kind: AppointmentType,
    pub price: Amount,
}

impl Appointment {
    pub fn involves(&self, user_id: &str) -> bool {
        self.student_id == user_id || self.tutor_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_appointment_wire_format() {
        let appointment = NewAppointment {
            tutor_id: "1".to_string(),
            tutor_name: "Ahmed".to_string(),
            student_id: "s1".to_string(),
            student_name: "Yasser".to_string(),
            date: "Monday".to_string(),
            time: "16:00".to_string(),
            status: AppointmentStatus::Upcoming,
            kind: AppointmentType::Regular,
            price: Amount::new(dec!(50)).unwrap(),
        }
        .with_id("a1".to_string());

        let json = serde_json::to_value(&appointment).unwrap();
        assert_eq!(json["type"], "regular");
        assert_eq!(json["status"], "upcoming");
        assert_eq!(json["tutorId"], "1");
        assert_eq!(json["studentName"], "Yasser");

        let back: Appointment = serde_json::from_value(json).unwrap();
        assert_eq!(back, appointment);
    }

    #[test]
    fn test_involves() {
        let appointment = NewAppointment {
            tutor_id: "t".to_string(),
            tutor_name: String::new(),
            student_id: "s".to_string(),
            student_name: String::new(),
            date: String::new(),
            time: String::new(),
            status: AppointmentStatus::default(),
            kind: AppointmentType::default(),
            price: Amount::ZERO,
        }
        .with_id("a".to_string());
        assert!(appointment.involves("t"));
        assert!(appointment.involves("s"));
        assert!(!appointment.involves("x"));
    }
}
