use crate::domain::appointment::{Appointment, AppointmentStatus};
use crate::domain::profile::{UserProfile, UserRole};
use crate::domain::wallet::Balance;

/// The appointments a user's dashboard shows: as a student, the sessions
/// they booked; as a tutor, the sessions booked with them.
pub fn visible_appointments<'a>(
    user: &UserProfile,
    appointments: &'a [Appointment],
) -> Vec<&'a Appointment> {
    appointments
        .iter()
        .filter(|a| match user.role {
            UserRole::Student => a.student_id == user.id,
            UserRole::Tutor => a.tutor_id == user.id,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub role: UserRole,
    pub wallet_balance: Balance,
    pub upcoming: usize,
    pub total: usize,
}

impl DashboardSummary {
    pub fn for_user(user: &UserProfile, appointments: &[Appointment]) -> Self {
        let visible = visible_appointments(user, appointments);
        Self {
            role: user.role,
            wallet_balance: user.wallet_balance,
            upcoming: visible
                .iter()
                .filter(|a| a.status == AppointmentStatus::Upcoming)
                .count(),
            total: visible.len(),
        }
    }
}
