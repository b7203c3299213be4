use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::districts;
use crate::error::BookingError;

#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub organizer: String,
    pub venue: String,
    pub city: String,
    pub district: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub is_sound_included: bool,
    pub total: i64,
    pub advance: i64,
    pub contact: Option<String>,
    pub note: Option<String>,
    pub is_cancelled: bool,
}

impl Booking {
    pub fn remaining(&self) -> i64 {
        self.total - self.advance
    }

    pub fn is_paid_in_full(&self) -> bool {
        self.total == self.advance
    }

    /// Checks the rules the booking form enforces before saving.
    pub fn validate(&self, known_districts: &[String]) -> Result<(), BookingError> {
        for (label, value) in [
            ("organizer", &self.organizer),
            ("venue", &self.venue),
            ("city", &self.city),
        ] {
            if value.trim().is_empty() {
                return Err(BookingError::MissingField(label));
            }
        }

        match self.district.as_deref() {
            None => return Err(BookingError::MissingDistrict),
            Some(name) if !districts::is_known(known_districts, name) => {
                return Err(BookingError::UnknownDistrict(name.to_string()));
            }
            Some(_) => {}
        }

        if self.total < 0 || self.advance < 0 {
            return Err(BookingError::NegativeAmount);
        }
        if self.total < self.advance {
            return Err(BookingError::AdvanceExceedsTotal {
                total: self.total,
                advance: self.advance,
            });
        }
        Ok(())
    }
}

/// The slice of a booking the stats query returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsRow {
    pub date: String,
    pub district: Option<String>,
    pub is_cancelled: bool,
}

impl From<&Booking> for StatsRow {
    fn from(booking: &Booking) -> Self {
        StatsRow {
            date: booking.date.format("%Y-%m-%d").to_string(),
            district: booking.district.clone(),
            is_cancelled: booking.is_cancelled,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YearStats {
    pub previous: usize,
    pub current: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistrictCount {
    pub district: String,
    pub count: usize,
}


#[cfg(test)]
mod tests {
    use super::fixtures::booking;
    use super::*;

    #[test]
    fn valid_booking_passes() {
        let districts = districts::default_districts();
        let b = booking((2026, 3, 5), Some("Hooghly"));
        assert_eq!(b.validate(&districts), Ok(()));
        assert_eq!(b.remaining(), 100_000);
        assert!(!b.is_paid_in_full());
    }

    #[test]
    fn blank_text_fields_are_rejected() {
        let districts = districts::default_districts();
        let mut b = booking((2026, 3, 5), Some("Hooghly"));
        b.venue = "   ".to_string();
        assert_eq!(
            b.validate(&districts),
            Err(BookingError::MissingField("venue"))
        );
    }

    #[test]
    fn district_must_be_known() {
        let districts = districts::default_districts();
        let missing = booking((2026, 3, 5), None);
        assert_eq!(
            missing.validate(&districts),
            Err(BookingError::MissingDistrict)
        );
        let unknown = booking((2026, 3, 5), Some("Atlantis"));
        assert_eq!(
            unknown.validate(&districts),
            Err(BookingError::UnknownDistrict("Atlantis".to_string()))
        );
    }

    #[test]
    fn advance_cannot_exceed_total() {
        let districts = districts::default_districts();
        let mut b = booking((2026, 3, 5), Some("Nadia"));
        b.advance = b.total + 1;
        assert!(matches!(
            b.validate(&districts),
            Err(BookingError::AdvanceExceedsTotal { .. })
        ));
    }

    #[test]
    fn stats_row_carries_iso_date() {
        let b = booking((2026, 1, 9), Some("Howrah"));
        let row = StatsRow::from(&b);
        assert_eq!(row.date, "2026-01-09");
        assert_eq!(row.district.as_deref(), Some("Howrah"));
        assert!(!row.is_cancelled);
    }
}
