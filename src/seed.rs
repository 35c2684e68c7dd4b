//! Demo data loader.
//!
//! Fills an initialized database with a plausible six months of club
//! activity ending at the schema's current-date anchor. Generation is
//! deterministic (index arithmetic, no RNG) so repeated runs against a
//! fresh database produce identical data.

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use sqlx::sqlite::SqlitePool;

use crate::config::Config;
use crate::db;
use crate::schema;

const FIRST_NAMES: &[&str] = &[
    "Emma", "Liam", "Olivia", "Noah", "Ava", "Ethan", "Sophia", "Mason", "Isabella", "William",
];
const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez",
];
const TIERS: &[&str] = &["Premium", "Standard", "Junior"];
const LESSON_TYPES: &[&str] = &["private", "semi-private", "group", "court-rental"];

const MEMBER_COUNT: usize = 40;
const HISTORY_DAYS: i64 = 180;
const BOOKINGS_PER_DAY: usize = 4;

/// Load demo data. Refuses to run against a database that already has
/// members, so `seed` stays safe to re-run.
pub async fn run_seed(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Seed an already-open pool.
pub async fn apply(pool: &SqlitePool) -> Result<()> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        println!("Database already seeded ({} members), skipping.", existing);
        return Ok(());
    }

    let anchor = NaiveDate::parse_from_str(schema::CURRENT_DATE_ANCHOR, "%Y-%m-%d")?;

    // Courts
    let courts: &[(&str, &str, i64)] = &[
        ("Center Court", "hard", 1),
        ("Court 2", "hard", 1),
        ("Court 3", "clay", 0),
        ("Court 4", "clay", 0),
        ("Court 5", "grass", 0),
        ("Court 6", "hard", 0),
    ];
    for (idx, &(name, surface, indoor)) in courts.iter().enumerate() {
        sqlx::query("INSERT INTO courts (court_id, court_name, surface_type, indoor) VALUES (?, ?, ?, ?)")
            .bind(idx as i64 + 1)
            .bind(name)
            .bind(surface)
            .bind(indoor)
            .execute(pool)
            .await?;
    }

    // Coaches
    let coaches: &[(&str, &str, f64, i64)] = &[
        ("Carlos Vega", "serve technique", 85.0, 30),
        ("Mia Tanaka", "junior development", 60.0, 35),
        ("Pierre Dubois", "clay strategy", 90.0, 25),
        ("Anna Kovacs", "fitness", 70.0, 40),
        ("Jack O'Leary", "doubles tactics", 75.0, 30),
    ];
    for (idx, &(name, specialty, rate, hours)) in coaches.iter().enumerate() {
        sqlx::query(
            "INSERT INTO coaches (coach_id, name, specialty, hourly_rate, weekly_available_hours) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(idx as i64 + 1)
        .bind(name)
        .bind(specialty)
        .bind(rate)
        .bind(hours)
        .execute(pool)
        .await?;
    }

    // Members
    for i in 0..MEMBER_COUNT {
        let member_id = i as i64 + 1;
        let first = FIRST_NAMES[i % FIRST_NAMES.len()];
        let last = LAST_NAMES[(i / FIRST_NAMES.len() + i) % LAST_NAMES.len()];
        let name = format!("{} {}", first, last);
        let email = format!(
            "{}.{}.{}@email.com",
            first.to_lowercase(),
            last.to_lowercase(),
            member_id
        );
        let phone = format!("555-{:04}", 1000 + i * 97 % 9000);
        let tier = TIERS[i % TIERS.len()];
        let join_date = anchor - Duration::days((i as i64 * 31) % 365 + 1);
        let status = match i % 10 {
            8 => "inactive",
            9 => "churned",
            _ => "active",
        };

        sqlx::query(
            "INSERT INTO members (member_id, name, email, phone, membership_tier, join_date, status) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(member_id)
        .bind(&name)
        .bind(&email)
        .bind(&phone)
        .bind(tier)
        .bind(join_date.format("%Y-%m-%d").to_string())
        .bind(status)
        .execute(pool)
        .await?;
    }

    // Bookings: a steady daily mix over the trailing history, with a
    // cancellation every seventh slot.
    let mut booking_id: i64 = 1;
    for day in 0..HISTORY_DAYS {
        let date = anchor - Duration::days(HISTORY_DAYS - day);
        for slot in 0..BOOKINGS_PER_DAY {
            let n = (day as usize) * BOOKINGS_PER_DAY + slot;
            let member_id = (n % MEMBER_COUNT) as i64 + 1;
            let court_id = (n % courts.len()) as i64 + 1;
            let lesson_type = LESSON_TYPES[n % LESSON_TYPES.len()];
            // court rentals have no coach
            let coach_id = if lesson_type == "court-rental" {
                None
            } else {
                Some((n % coaches.len()) as i64 + 1)
            };
            let hour = 8 + (n % 12);
            let price = 35.0 + (n % 12) as f64 * 5.0;
            let (status, reason) = match n % 7 {
                6 => {
                    if n % 2 == 0 {
                        ("cancelled", Some("weather"))
                    } else {
                        ("cancelled", Some("member-request"))
                    }
                }
                5 if n % 21 == 5 => ("no-show", None),
                _ => ("completed", None),
            };
            let date_text = date.format("%Y-%m-%d").to_string();

            sqlx::query(
                "INSERT INTO bookings (booking_id, member_id, coach_id, court_id, lesson_type, \
                 booking_date, start_time, end_time, duration_minutes, price, status, \
                 cancellation_reason, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(booking_id)
            .bind(member_id)
            .bind(coach_id)
            .bind(court_id)
            .bind(lesson_type)
            .bind(&date_text)
            .bind(format!("{:02}:00", hour))
            .bind(format!("{:02}:00", hour + 1))
            .bind(60)
            .bind(price)
            .bind(status)
            .bind(reason)
            .bind(&date_text)
            .execute(pool)
            .await?;

            booking_id += 1;
        }
    }

    println!(
        "Seeded {} members, {} courts, {} coaches, {} bookings.",
        MEMBER_COUNT,
        courts.len(),
        coaches.len(),
        booking_id - 1
    );

    Ok(())
}
