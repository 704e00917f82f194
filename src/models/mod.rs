// src/models/mod.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ───────────────────────────────────────
// Core tenancy
// ───────────────────────────────────────
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Property {
    pub property_id: i64,
    pub name: String,
    pub time_zone: String,
    pub status: String, // active | inactive
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ───────────────────────────────────────
// Bookable resources
// ───────────────────────────────────────
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Resource {
    pub resource_id: i64,
    pub property_id: i64,
    pub kind: String, // room | hall | spa | table
    pub name: String,
    pub capacity: i32, // identical units / concurrent slots
    pub price_cents: i64,
    pub amenities: serde_json::Value, // jsonb
    pub description: Option<String>,
    pub status: String, // ResourceStatus
}

/// Two-state flag on a resource, flipped as a side effect of booking
/// confirmation and cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    Available,
    Booked,
}

impl ResourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceStatus::Available => "available",
            ResourceStatus::Booked => "booked",
        }
    }
}

// ───────────────────────────────────────
// Bookings
// ───────────────────────────────────────
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub booking_id: i64,
    pub resource_id: i64,
    pub guest_name: String,
    pub guest_email: Option<String>,
    pub start_at: DateTime<Utc>, // half-open [start_at, end_at)
    pub end_at: DateTime<Utc>,
    pub quantity: i32, // ≥ 1
    pub status: String, // BookingStatus
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Booking lifecycle. Stored as text in the DB; parsed at the handler edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    CheckedIn,
    CheckedOut,
    NoShow,
}

impl BookingStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            "checked_in" => Some(BookingStatus::CheckedIn),
            "checked_out" => Some(BookingStatus::CheckedOut),
            "no_show" => Some(BookingStatus::NoShow),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::CheckedIn => "checked_in",
            BookingStatus::CheckedOut => "checked_out",
            BookingStatus::NoShow => "no_show",
        }
    }

    /// Whether a booking in this status holds capacity for its window.
    pub fn counts_against_capacity(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled | BookingStatus::NoShow)
    }

    /// Lifecycle state machine:
    /// pending → confirmed | cancelled | no_show
    /// confirmed → checked_in | cancelled | no_show
    /// checked_in → checked_out
    /// cancelled / checked_out / no_show are terminal.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Pending, NoShow)
                | (Confirmed, CheckedIn)
                | (Confirmed, Cancelled)
                | (Confirmed, NoShow)
                | (CheckedIn, CheckedOut)
        )
    }
}

// ───────────────────────────────────────
// Materialized availability
// ───────────────────────────────────────
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct AvailabilityDay {
    pub availability_day_id: i64,
    pub resource_id: i64,
    pub day: NaiveDate,
    pub total: i32,
    pub booked: i32,
    pub available: i32, // total - booked, floor 0
}

#[cfg(test)]
mod tests {
    use super::BookingStatus::{self, *};

    #[test]
    fn cancelled_and_no_show_release_capacity() {
        assert!(Pending.counts_against_capacity());
        assert!(Confirmed.counts_against_capacity());
        assert!(CheckedIn.counts_against_capacity());
        assert!(CheckedOut.counts_against_capacity());
        assert!(!Cancelled.counts_against_capacity());
        assert!(!NoShow.counts_against_capacity());
    }

    #[test]
    fn happy_path_transitions() {
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(CheckedIn));
        assert!(CheckedIn.can_transition_to(CheckedOut));
    }

    #[test]
    fn cancellation_and_no_show() {
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Pending.can_transition_to(NoShow));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(NoShow));
        assert!(!CheckedIn.can_transition_to(Cancelled));
    }

    #[test]
    fn terminal_states_stay_terminal() {
        for terminal in [Cancelled, CheckedOut, NoShow] {
            for next in [Pending, Confirmed, Cancelled, CheckedIn, CheckedOut, NoShow] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn no_self_or_backward_transitions() {
        assert!(!Confirmed.can_transition_to(Pending));
        assert!(!Confirmed.can_transition_to(Confirmed));
        assert!(!CheckedIn.can_transition_to(Confirmed));
        assert!(!Pending.can_transition_to(CheckedIn));
        assert!(!Pending.can_transition_to(CheckedOut));
    }

    #[test]
    fn status_round_trip() {
        for s in [Pending, Confirmed, Cancelled, CheckedIn, CheckedOut, NoShow] {
            assert_eq!(BookingStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(BookingStatus::parse("checked-in"), None);
        assert_eq!(BookingStatus::parse(""), None);
    }
}
