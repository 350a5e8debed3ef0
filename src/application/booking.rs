use crate::domain::appointment::{Appointment, NewAppointment};
use crate::domain::ports::{AppointmentStoreRef, ProfileStoreRef};
use crate::domain::profile::UserProfile;
use crate::domain::tutor::Tutor;
use crate::domain::wallet::{Amount, Balance};
use crate::error::{MarketError, Result};
use tracing::{error, info, warn};

/// How many times the wallet debit is retried after losing a race.
const MAX_DEBIT_ATTEMPTS: usize = 3;

/// The state the caller should show after a successful booking.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingOutcome {
    /// Newest first.
    pub appointments: Vec<Appointment>,
    pub user: UserProfile,
}

/// Books sessions with tutors and pays for them from the student's wallet.
///
/// The wallet is debited with a compare-and-set before the appointment is
/// written, so two bookings racing on the same wallet cannot both spend the
/// same funds. If writing the appointment fails the debit is refunded.
pub struct BookingService {
    profiles: ProfileStoreRef,
    appointments: AppointmentStoreRef,
}

impl BookingService {
    pub fn new(profiles: ProfileStoreRef, appointments: AppointmentStoreRef) -> Self {
        Self {
            profiles,
            appointments,
        }
    }

    pub async fn confirm_booking(
        &self,
        current_user: &UserProfile,
        appointments: &[Appointment],
        tutor: &Tutor,
        date: &str,
        time: &str,
    ) -> Result<BookingOutcome> {
        if !tutor.is_available(date, time) {
            return Err(MarketError::ValidationError(format!(
                "{} is not available on {date} at {time}",
                tutor.name
            )));
        }
        if !current_user.wallet_balance.can_afford(tutor.hourly_rate) {
            return Err(MarketError::InsufficientFunds {
                balance: current_user.wallet_balance.0,
                price: tutor.hourly_rate.value(),
            });
        }

        let price = tutor.hourly_rate;
        let debited = self.debit(current_user, price).await?;

        let request = NewAppointment::regular(current_user, tutor, date, time);
        let created = match self.appointments.insert(request).await {
            Ok(created) => created,
            Err(e) => {
                self.refund(&debited, price).await;
                return Err(e);
            }
        };

        info!(
            appointment_id = %created.id,
            tutor_id = %tutor.id,
            student_id = %current_user.id,
            balance = %debited.wallet_balance,
            "Booking confirmed"
        );

        let mut updated = Vec::with_capacity(appointments.len() + 1);
        updated.push(created);
        updated.extend_from_slice(appointments);

        Ok(BookingOutcome {
            appointments: updated,
            user: debited,
        })
    }

    /// Takes `price` out of the stored wallet, re-reading it after a lost race.
    async fn debit(&self, user: &UserProfile, price: Amount) -> Result<UserProfile> {
        let mut current = user.clone();
        for attempt in 1..=MAX_DEBIT_ATTEMPTS {
            let remaining = current.wallet_balance.checked_debit(price)?;
            match self
                .profiles
                .update_wallet(&current.id, current.wallet_balance, remaining)
                .await
            {
                Ok(updated) => return Ok(updated),
                Err(MarketError::Conflict(reason)) if attempt < MAX_DEBIT_ATTEMPTS => {
                    warn!(user_id = %current.id, attempt, %reason, "Wallet changed during booking");
                    current = self
                        .profiles
                        .get(&current.id)
                        .await?
                        .ok_or_else(|| MarketError::NotFound(format!("Profile {}", current.id)))?;
                }
                Err(e) => return Err(e),
            }
        }
        Err(MarketError::Conflict(format!(
            "Wallet of {} kept changing",
            user.id
        )))
    }

    async fn refund(&self, debited: &UserProfile, price: Amount) {
        let mut current = debited.clone();
        for _ in 0..MAX_DEBIT_ATTEMPTS {
            let restored = current.wallet_balance + Balance::from(price);
            match self
                .profiles
                .update_wallet(&current.id, current.wallet_balance, restored)
                .await
            {
                Ok(_) => {
                    warn!(
                        user_id = %current.id,
                        %price,
                        "Refunded booking that could not be saved"
                    );
                    return;
                }
                Err(MarketError::Conflict(_)) => match self.profiles.get(&current.id).await {
                    Ok(Some(fresh)) => current = fresh,
                    Ok(None) => break,
                    Err(e) => {
                        error!(
                            user_id = %current.id,
                            error = %e,
                            "Could not re-read wallet for refund"
                        );
                        return;
                    }
                },
                Err(e) => {
                    error!(user_id = %current.id, %price, error = %e, "Refund failed");
                    return;
                }
            }
        }
        error!(user_id = %debited.id, %price, "Refund abandoned");
    }
}
