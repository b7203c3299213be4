use std::fmt::Write;

use chrono::{Datelike, Month, NaiveDate};

use crate::format::format_grouped_digits;
use crate::models::Booking;
use crate::stats::Stats;

pub fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("Unknown")
}

/// One line per booking for the `list` command.
pub fn booking_line(booking: &Booking, today: NaiveDate) -> String {
    let mut flags = Vec::new();
    if booking.is_cancelled {
        flags.push("CANCELLED");
    }
    if booking.date == today {
        flags.push("TODAY");
    }
    if booking.is_paid_in_full() {
        flags.push("PAID");
    }

    let organizer = if booking.is_sound_included {
        format!("{} [sound]", booking.organizer)
    } else {
        booking.organizer.clone()
    };
    let dash = |value: String| if value.is_empty() { "-".to_string() } else { value };

    let mut line = format!(
        "{} | {} | {} | {} | {} | {} | total {} | advance {} | {} | {}",
        booking.id,
        booking.date.format("%d %b, %Y"),
        booking.time.format("%I:%M %p"),
        organizer,
        dash(booking.venue.clone()),
        booking.district.as_deref().unwrap_or("-"),
        dash(format_grouped_digits(booking.total)),
        dash(format_grouped_digits(booking.advance)),
        booking.contact.as_deref().unwrap_or("-"),
        booking.note.as_deref().unwrap_or("-"),
    );
    if !flags.is_empty() {
        let _ = write!(line, " [{}]", flags.join(", "));
    }
    line
}

pub fn build_report(stats: &Stats, today: NaiveDate) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Concert Stats");
    let _ = writeln!(output, "Generated on {today}");
    let _ = writeln!(output);

    let _ = writeln!(output, "## Yearly Stats");
    let _ = writeln!(
        output,
        "- Last Year ({}): {}",
        today.year() - 1,
        stats.year.previous
    );
    let _ = writeln!(
        output,
        "- This Year ({}): {}",
        today.year(),
        stats.year.current
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Monthly Stats");
    for (month, count) in &stats.months {
        let _ = writeln!(output, "- {}: {}{}", month_name(*month), count, zero_flag(*count));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## District Stats");
    match (stats.busiest_district(), stats.quietest_district()) {
        (Some(high), Some(low)) => {
            let _ = writeln!(output, "Highest: {} ({})", high.district, high.count);
            let _ = writeln!(output, "Lowest: {} ({})", low.district, low.count);
        }
        _ => {
            let _ = writeln!(output, "No concerts booked this year.");
        }
    }
    let _ = writeln!(output);
    for entry in &stats.districts {
        let _ = writeln!(
            output,
            "- {}: {}{}",
            entry.district,
            entry.count,
            zero_flag(entry.count)
        );
    }

    output
}

fn zero_flag(count: usize) -> &'static str {
    if count == 0 {
        " (none)"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::districts::default_districts;
    use crate::models::fixtures::booking;
    use crate::models::StatsRow;
    use crate::stats::compute_stats;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn month_names() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(13), "Unknown");
    }

    #[test]
    fn report_lists_all_sections() {
        let rows: Vec<StatsRow> = [
            booking((2025, 5, 1), Some("Nadia")),
            booking((2026, 2, 14), Some("Hooghly")),
            booking((2026, 2, 20), Some("Hooghly")),
            booking((2026, 9, 1), Some("Howrah")),
        ]
        .iter()
        .map(StatsRow::from)
        .collect();
        let stats = compute_stats(&rows, &default_districts(), today()).unwrap();
        let report = build_report(&stats, today());

        assert!(report.contains("- Last Year (2025): 1"));
        assert!(report.contains("- This Year (2026): 3"));
        assert!(report.contains("- February: 2"));
        assert!(report.contains("- January: 0 (none)"));
        assert!(report.contains("Highest: Hooghly (2)"));
        assert!(report.contains("Lowest: Howrah (1)"));
        assert!(report.contains("- Nadia: 0 (none)"));

        let january = report.find("- January").unwrap();
        let december = report.find("- December").unwrap();
        assert!(january < december);
    }

    #[test]
    fn empty_year_is_called_out() {
        let stats = compute_stats(&[], &default_districts(), today()).unwrap();
        let report = build_report(&stats, today());
        assert!(report.contains("No concerts booked this year."));
    }

    #[test]
    fn booking_line_flags_state() {
        let mut b = booking((2026, 10, 18), Some("Hooghly"));
        b.is_cancelled = true;
        let line = booking_line(&b, today());
        assert!(line.contains("18 Oct, 2026"));
        assert!(line.contains("07:30 PM"));
        assert!(line.contains("[sound]"));
        assert!(line.contains("total 1,50,000"));
        assert!(line.contains("advance 50,000"));
        assert!(line.ends_with("[CANCELLED, TODAY]"));
    }
}
