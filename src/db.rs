use anyhow::Context;
use chrono::{NaiveDate, NaiveTime};
use sqlx::postgres::{PgQueryResult, PgRow};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::BookingError;
use crate::format::{parse_amount, parse_clock_time};
use crate::models::{Booking, StatsRow};
use crate::retry::{with_retry, RetryPolicy};

const BOOKING_COLUMNS: &str = "id, organizer, venue, city, district, concert_date, stage_time, \
     is_sound_included, total, advance, contact, note, is_cancelled";

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool, retry: RetryPolicy) -> anyhow::Result<usize> {
    let bookings = vec![
        (
            "6a1f4c1e-5d1b-4f55-9a0b-2f8f0c6f4a11",
            "Uttarpara Sporting Club",
            "Club Grounds, J.K. Street",
            "Uttarpara",
            Some("Hooghly"),
            (2026, 1, 26),
            (19, 30),
            true,
            150_000,
            50_000,
            false,
        ),
        (
            "0b9e2d37-8c4a-4c0e-b1f7-8d6a3e5f9c22",
            "Krishnanagar Sanskriti Parishad",
            "Town Hall",
            "Krishnanagar",
            Some("Nadia"),
            (2026, 3, 14),
            (18, 0),
            false,
            85_000,
            85_000,
            false,
        ),
        (
            "c3d5e7f9-1a2b-4c3d-8e9f-0a1b2c3d4e33",
            "Howrah Durga Puja Committee",
            "Puja Pandal, Shibpur",
            "Howrah",
            Some("Howrah"),
            (2025, 10, 1),
            (20, 15),
            true,
            1_20_000,
            40_000,
            true,
        ),
    ];

    let mut inserted = 0usize;
    for (id, organizer, venue, city, district, date, time, sound, total, advance, cancelled) in
        bookings
    {
        let booking = Booking {
            id: Uuid::parse_str(id)?,
            organizer: organizer.to_string(),
            venue: venue.to_string(),
            city: city.to_string(),
            district: district.map(str::to_string),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).context("invalid date")?,
            time: NaiveTime::from_hms_opt(time.0, time.1, 0).context("invalid time")?,
            is_sound_included: sound,
            total,
            advance,
            contact: None,
            note: Some("Seed booking".to_string()),
            is_cancelled: cancelled,
        };

        let booking = &booking;
        let result = with_retry(retry, "seed", || async move {
            sqlx::query(
                r#"
                INSERT INTO band_bookings.concerts
                (id, organizer, venue, city, district, concert_date, stage_time,
                 is_sound_included, total, advance, contact, note, is_cancelled)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(booking.id)
            .bind(&booking.organizer)
            .bind(&booking.venue)
            .bind(&booking.city)
            .bind(&booking.district)
            .bind(booking.date)
            .bind(booking.time)
            .bind(booking.is_sound_included)
            .bind(booking.total)
            .bind(booking.advance)
            .bind(&booking.contact)
            .bind(&booking.note)
            .bind(booking.is_cancelled)
            .execute(pool)
            .await
        })
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}

fn booking_from_row(row: &PgRow) -> Result<Booking, sqlx::Error> {
    Ok(Booking {
        id: row.try_get("id")?,
        organizer: row.try_get("organizer")?,
        venue: row.try_get("venue")?,
        city: row.try_get("city")?,
        district: row.try_get("district")?,
        date: row.try_get("concert_date")?,
        time: row.try_get("stage_time")?,
        is_sound_included: row.try_get("is_sound_included")?,
        total: row.try_get("total")?,
        advance: row.try_get("advance")?,
        contact: row.try_get("contact")?,
        note: row.try_get("note")?,
        is_cancelled: row.try_get("is_cancelled")?,
    })
}

/// Every booking, latest date first.
pub async fn list_bookings(pool: &PgPool, retry: RetryPolicy) -> anyhow::Result<Vec<Booking>> {
    let query = format!(
        "SELECT {BOOKING_COLUMNS} FROM band_bookings.concerts \
         ORDER BY concert_date DESC, stage_time DESC"
    );
    let rows = with_retry(retry, "list_bookings", || {
        sqlx::query(&query).fetch_all(pool)
    })
    .await?;

    let bookings = rows
        .iter()
        .map(booking_from_row)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(bookings)
}

pub async fn fetch_booking(
    pool: &PgPool,
    retry: RetryPolicy,
    id: Uuid,
) -> anyhow::Result<Option<Booking>> {
    let query = format!("SELECT {BOOKING_COLUMNS} FROM band_bookings.concerts WHERE id = $1");
    let row = with_retry(retry, "fetch_booking", || {
        sqlx::query(&query).bind(id).fetch_optional(pool)
    })
    .await?;

    Ok(row.as_ref().map(booking_from_row).transpose()?)
}

/// Non-cancelled bookings with `min <= date < max`, dates as ISO text.
pub async fn fetch_stats_rows(
    pool: &PgPool,
    retry: RetryPolicy,
    min: NaiveDate,
    max: NaiveDate,
) -> anyhow::Result<Vec<StatsRow>> {
    let rows = with_retry(retry, "fetch_stats_rows", || {
        sqlx::query(
            r#"
            SELECT to_char(concert_date, 'YYYY-MM-DD') AS concert_date, district, is_cancelled
            FROM band_bookings.concerts
            WHERE is_cancelled = FALSE
              AND concert_date >= $1
              AND concert_date < $2
            "#,
        )
        .bind(min)
        .bind(max)
        .fetch_all(pool)
    })
    .await?;

    let mut stats_rows = Vec::with_capacity(rows.len());
    for row in rows {
        stats_rows.push(StatsRow {
            date: row.try_get("concert_date")?,
            district: row.try_get("district")?,
            is_cancelled: row.try_get("is_cancelled")?,
        });
    }
    Ok(stats_rows)
}

async fn upsert(pool: &PgPool, booking: &Booking) -> Result<PgQueryResult, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO band_bookings.concerts
        (id, organizer, venue, city, district, concert_date, stage_time,
         is_sound_included, total, advance, contact, note, is_cancelled)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        ON CONFLICT (id) DO UPDATE
        SET organizer = EXCLUDED.organizer,
            venue = EXCLUDED.venue,
            city = EXCLUDED.city,
            district = EXCLUDED.district,
            concert_date = EXCLUDED.concert_date,
            stage_time = EXCLUDED.stage_time,
            is_sound_included = EXCLUDED.is_sound_included,
            total = EXCLUDED.total,
            advance = EXCLUDED.advance,
            contact = EXCLUDED.contact,
            note = EXCLUDED.note,
            is_cancelled = EXCLUDED.is_cancelled
        "#,
    )
    .bind(booking.id)
    .bind(&booking.organizer)
    .bind(&booking.venue)
    .bind(&booking.city)
    .bind(&booking.district)
    .bind(booking.date)
    .bind(booking.time)
    .bind(booking.is_sound_included)
    .bind(booking.total)
    .bind(booking.advance)
    .bind(&booking.contact)
    .bind(&booking.note)
    .bind(booking.is_cancelled)
    .execute(pool)
    .await
}

/// Inserts or replaces the booking with the same id.
pub async fn save_booking(
    pool: &PgPool,
    retry: RetryPolicy,
    booking: &Booking,
) -> anyhow::Result<()> {
    with_retry(retry, "save_booking", || upsert(pool, booking)).await?;
    tracing::info!(booking = %booking.id, date = %booking.date, "booking saved");
    Ok(())
}

/// Cancels (`true`) or restores (`false`) a booking. Returns whether it existed.
pub async fn set_cancelled(
    pool: &PgPool,
    retry: RetryPolicy,
    id: Uuid,
    cancelled: bool,
) -> anyhow::Result<bool> {
    let result = with_retry(retry, "set_cancelled", || {
        sqlx::query("UPDATE band_bookings.concerts SET is_cancelled = $2 WHERE id = $1")
            .bind(id)
            .bind(cancelled)
            .execute(pool)
    })
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_booking(pool: &PgPool, retry: RetryPolicy, id: Uuid) -> anyhow::Result<bool> {
    let result = with_retry(retry, "delete_booking", || {
        sqlx::query("DELETE FROM band_bookings.concerts WHERE id = $1")
            .bind(id)
            .execute(pool)
    })
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Settles the balance by raising the advance to the full total.
pub async fn mark_paid(
    pool: &PgPool,
    retry: RetryPolicy,
    id: Uuid,
) -> anyhow::Result<Option<Booking>> {
    let query = format!(
        "UPDATE band_bookings.concerts SET advance = total WHERE id = $1 \
         RETURNING {BOOKING_COLUMNS}"
    );
    let row = with_retry(retry, "mark_paid", || {
        sqlx::query(&query).bind(id).fetch_optional(pool)
    })
    .await?;

    Ok(row.as_ref().map(booking_from_row).transpose()?)
}

#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    id: Option<Uuid>,
    organizer: String,
    venue: String,
    city: String,
    district: Option<String>,
    date: NaiveDate,
    time: String,
    #[serde(default)]
    is_sound_included: bool,
    total: String,
    advance: String,
    contact: Option<String>,
    note: Option<String>,
    is_cancelled: Option<bool>,
}

impl CsvRow {
    /// Older exports may lack a district; those rows are kept and counted as "Other".
    fn into_booking(self, known_districts: &[String]) -> anyhow::Result<Booking> {
        let booking = Booking {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            organizer: self.organizer.trim().to_string(),
            venue: self.venue.trim().to_string(),
            city: self.city.trim().to_string(),
            district: self.district.filter(|d| !d.trim().is_empty()),
            date: self.date,
            time: parse_clock_time(&self.time)?,
            is_sound_included: self.is_sound_included,
            total: parse_amount(&self.total)?,
            advance: parse_amount(&self.advance)?,
            contact: self.contact.filter(|c| !c.trim().is_empty()),
            note: self.note.filter(|n| !n.trim().is_empty()),
            is_cancelled: self.is_cancelled.unwrap_or(false),
        };

        match booking.validate(known_districts) {
            Ok(()) | Err(BookingError::MissingDistrict) => Ok(booking),
            Err(err) => Err(err.into()),
        }
    }
}

fn read_csv<R: std::io::Read>(
    reader: R,
    known_districts: &[String],
) -> anyhow::Result<Vec<Booking>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut bookings = Vec::new();
    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let line = index + 2;
        let row = result.with_context(|| format!("malformed CSV row on line {line}"))?;
        let booking = row
            .into_booking(known_districts)
            .with_context(|| format!("invalid booking on line {line}"))?;
        bookings.push(booking);
    }
    Ok(bookings)
}

pub async fn import_csv(
    pool: &PgPool,
    retry: RetryPolicy,
    csv_path: &std::path::Path,
    known_districts: &[String],
) -> anyhow::Result<usize> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let bookings = read_csv(file, known_districts)?;

    let mut saved = 0usize;
    for booking in &bookings {
        let result = with_retry(retry, "import_csv", || upsert(pool, booking)).await?;
        if result.rows_affected() > 0 {
            saved += 1;
        }
    }

    tracing::info!(saved, path = %csv_path.display(), "imported bookings");
    Ok(saved)
}
