#[cfg(test)]
mod tests {
    use crate::models::{AppointmentStatus, BookingSettings, RsvpStatus};
    use uuid::Uuid;

    #[test]
    fn test_blocking_statuses() {
        assert!(AppointmentStatus::PendingVerification.is_blocking());
        assert!(AppointmentStatus::Confirmed.is_blocking());
        assert!(AppointmentStatus::Scheduled.is_blocking());
        assert!(!AppointmentStatus::Completed.is_blocking());
        assert!(!AppointmentStatus::Cancelled.is_blocking());
        assert!(!AppointmentStatus::NoShow.is_blocking());
    }

    #[test]
    fn test_booking_lifecycle_transitions() {
        use AppointmentStatus::*;
        assert!(PendingVerification.can_transition_to(Confirmed));
        assert!(PendingVerification.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));
        // a booking can never become a session state
        assert!(!PendingVerification.can_transition_to(Scheduled));
        assert!(!Confirmed.can_transition_to(Completed));
        assert!(!Cancelled.can_transition_to(Confirmed));
    }

    #[test]
    fn test_session_lifecycle_transitions() {
        use AppointmentStatus::*;
        assert!(Scheduled.can_transition_to(Completed));
        assert!(Scheduled.can_transition_to(Cancelled));
        assert!(Scheduled.can_transition_to(NoShow));
        assert!(!Scheduled.can_transition_to(Confirmed));
        assert!(!Completed.can_transition_to(Scheduled));
    }

    #[test]
    fn test_status_string_round_trip() {
        for status in [
            AppointmentStatus::PendingVerification,
            AppointmentStatus::Confirmed,
            AppointmentStatus::Scheduled,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::NoShow,
        ] {
            assert_eq!(status.as_str().parse::<AppointmentStatus>().unwrap(), status);
        }
        assert!("definitely_not_a_status".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn test_rsvp_string_round_trip() {
        for rsvp in [
            RsvpStatus::Pending,
            RsvpStatus::Accepted,
            RsvpStatus::Declined,
            RsvpStatus::RescheduleRequested,
        ] {
            assert_eq!(rsvp.as_str().parse::<RsvpStatus>().unwrap(), rsvp);
        }
    }

    #[test]
    fn test_settings_timezone_parsing() {
        let mut settings = BookingSettings {
            practitioner_id: Uuid::new_v4(),
            slot_duration_minutes: 60,
            buffer_minutes: 15,
            min_booking_notice_hours: 24,
            max_booking_days_ahead: 30,
            timezone: "Europe/Zurich".to_string(),
            requires_approval: false,
        };
        assert!(settings.tz().is_ok());

        settings.timezone = "Mars/Olympus_Mons".to_string();
        assert!(settings.tz().is_err());
    }
}
