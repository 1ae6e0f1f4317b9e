use tracing::{debug, warn};

use crate::models::{AppointmentError, AppointmentStatus};

/// Status lifecycle rules. Queue numbers and roster actions hang off these
/// transitions, so they are validated before any status write.
pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_status_transition(
        &self,
        current_status: AppointmentStatus,
        new_status: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!(
            "Validating status transition from {} to {}",
            current_status, new_status
        );

        if !self.get_valid_transitions(current_status).contains(&new_status) {
            warn!(
                "Invalid status transition attempted: {} -> {}",
                current_status, new_status
            );
            return Err(AppointmentError::InvalidStatusTransition(
                current_status,
                new_status,
            ));
        }

        Ok(())
    }

    pub fn get_valid_transitions(&self, current_status: AppointmentStatus) -> Vec<AppointmentStatus> {
        match current_status {
            AppointmentStatus::Booked => vec![
                AppointmentStatus::Arrived,
                AppointmentStatus::NoShow,
            ],
            AppointmentStatus::Arrived => vec![
                AppointmentStatus::InConsultation,
                AppointmentStatus::NoShow,
            ],
            AppointmentStatus::InConsultation => vec![AppointmentStatus::Completed],
            // Terminal states - no transitions allowed
            AppointmentStatus::Completed => vec![],
            AppointmentStatus::NoShow => vec![],
        }
    }
}

impl Default for AppointmentLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn the_happy_path_walks_forward_only() {
        let lifecycle = AppointmentLifecycleService::new();

        assert!(lifecycle
            .validate_status_transition(AppointmentStatus::Booked, AppointmentStatus::Arrived)
            .is_ok());
        assert!(lifecycle
            .validate_status_transition(
                AppointmentStatus::Arrived,
                AppointmentStatus::InConsultation
            )
            .is_ok());
        assert!(lifecycle
            .validate_status_transition(
                AppointmentStatus::InConsultation,
                AppointmentStatus::Completed
            )
            .is_ok());
    }

    #[test]
    fn no_show_is_reachable_from_booked_and_arrived_only() {
        let lifecycle = AppointmentLifecycleService::new();

        assert!(lifecycle
            .validate_status_transition(AppointmentStatus::Booked, AppointmentStatus::NoShow)
            .is_ok());
        assert!(lifecycle
            .validate_status_transition(AppointmentStatus::Arrived, AppointmentStatus::NoShow)
            .is_ok());
        assert_matches!(
            lifecycle.validate_status_transition(
                AppointmentStatus::InConsultation,
                AppointmentStatus::NoShow
            ),
            Err(AppointmentError::InvalidStatusTransition(_, _))
        );
    }

    #[test]
    fn terminal_states_accept_nothing() {
        let lifecycle = AppointmentLifecycleService::new();

        for terminal in [AppointmentStatus::Completed, AppointmentStatus::NoShow] {
            for next in [
                AppointmentStatus::Booked,
                AppointmentStatus::Arrived,
                AppointmentStatus::InConsultation,
                AppointmentStatus::Completed,
                AppointmentStatus::NoShow,
            ] {
                assert!(lifecycle.validate_status_transition(terminal, next).is_err());
            }
        }
    }

    #[test]
    fn statuses_cannot_walk_backwards() {
        let lifecycle = AppointmentLifecycleService::new();

        assert_matches!(
            lifecycle.validate_status_transition(
                AppointmentStatus::InConsultation,
                AppointmentStatus::Arrived
            ),
            Err(AppointmentError::InvalidStatusTransition(_, _))
        );
        assert_matches!(
            lifecycle
                .validate_status_transition(AppointmentStatus::Arrived, AppointmentStatus::Booked),
            Err(AppointmentError::InvalidStatusTransition(_, _))
        );
    }
}
