//! Static description of the queryable club schema.
//!
//! This text is embedded verbatim in every SQL-generation prompt. It must
//! stay structurally identical to the tables created by [`crate::migrate`],
//! or synthesized queries will systematically fail against the live store.

/// Fixed anchor the oracle uses for relative-date reasoning ("this month",
/// "last week"). Kept in lockstep with the seeded demo data.
pub const CURRENT_DATE_ANCHOR: &str = "2026-01-02";

/// Bumped whenever the table shapes below change.
pub const SCHEMA_VERSION: u32 = 1;

pub fn schema_descriptor() -> String {
    format!(
        r#"Database Schema for CourtDesk (Tennis Club Analytics):

TABLE: members
- member_id (INTEGER, PRIMARY KEY)
- name (TEXT)
- email (TEXT)
- phone (TEXT)
- membership_tier (TEXT: Premium, Standard, Junior)
- join_date (DATE)
- status (TEXT: active, inactive, churned)

TABLE: courts
- court_id (INTEGER, PRIMARY KEY)
- court_name (TEXT)
- surface_type (TEXT: hard, clay, grass)
- indoor (INTEGER: 0 or 1)

TABLE: coaches
- coach_id (INTEGER, PRIMARY KEY)
- name (TEXT)
- specialty (TEXT)
- hourly_rate (REAL)
- weekly_available_hours (INTEGER)

TABLE: bookings
- booking_id (INTEGER, PRIMARY KEY)
- member_id (INTEGER, FOREIGN KEY)
- coach_id (INTEGER, FOREIGN KEY, nullable)
- court_id (INTEGER, FOREIGN KEY)
- lesson_type (TEXT: private, semi-private, group, court-rental)
- booking_date (DATE)
- start_time (TEXT)
- end_time (TEXT)
- duration_minutes (INTEGER)
- price (REAL)
- status (TEXT: completed, cancelled, no-show, scheduled)
- cancellation_reason (TEXT: weather, member-request, coach-unavailable)
- created_at (TEXT)

Current date context: {CURRENT_DATE_ANCHOR}
"#
    )
}
