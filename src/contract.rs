//! Printable booking contracts.
//!
//! A contract is a single HTML page rendered from the `templates/` directory:
//! the band's letterhead, the booking terms with every amount in grouped
//! digits and in words, signature lines, the terms and conditions, and a
//! tear-off copy for the band.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tera::{Context, Tera};

use crate::config::BandProfile;
use crate::error::ContractError;
use crate::format::{
    format_contract_date, format_grouped_digits, format_stage_time, lighten_color,
    number_to_words,
};
use crate::models::Booking;

const CONTRACT_TEMPLATE: &str = include_str!("../templates/contract.html.tera");
const DETAILS_TEMPLATE: &str = include_str!("../templates/contract_details.html.tera");
const SIGNATURES_TEMPLATE: &str = include_str!("../templates/contract_signatures.html.tera");

/// Characters Windows refuses in file names.
const RESERVED_FILENAME_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

#[derive(Debug, Clone)]
pub struct ContractOptions<'a> {
    pub band: &'a BandProfile,
    pub accent: &'a str,
    /// Print the contract as settled even if the stored advance is short.
    pub paid_in_full: bool,
}

/// An amount as printed: `Rs. {digits}/- ({words})`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmountText {
    pub digits: String,
    pub words: String,
}

impl AmountText {
    pub fn new(amount: i64) -> Self {
        let digits = format_grouped_digits(amount);
        Self {
            digits: if digits.is_empty() { "0".to_string() } else { digits },
            words: number_to_words(amount),
        }
    }
}

#[derive(Serialize)]
struct Colors {
    accent: String,
    shade: String,
    rule: String,
}

#[derive(Serialize)]
struct BookingView<'a> {
    organizer: &'a str,
    venue: &'a str,
    date: String,
    timing: String,
    sound: &'static str,
}

#[derive(Serialize)]
struct ContractContext<'a> {
    band: &'a BandProfile,
    booking: BookingView<'a>,
    total: AmountText,
    advance: AmountText,
    remaining: AmountText,
    paid_in_full: bool,
    colors: Colors,
}

fn templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    // `.html` names keep Tera's autoescaping on for every user-supplied field.
    tera.add_raw_templates(vec![
        ("contract.html", CONTRACT_TEMPLATE),
        ("contract_details.html", DETAILS_TEMPLATE),
        ("contract_signatures.html", SIGNATURES_TEMPLATE),
    ])?;
    Ok(tera)
}

pub fn render_contract(booking: &Booking, options: &ContractOptions) -> Result<String, ContractError> {
    let paid_in_full = options.paid_in_full || booking.is_paid_in_full();
    let (advance, remaining) = if paid_in_full {
        (AmountText::new(booking.total), AmountText::new(0))
    } else {
        (
            AmountText::new(booking.advance),
            AmountText::new(booking.remaining()),
        )
    };

    let context_data = ContractContext {
        band: options.band,
        booking: BookingView {
            organizer: &booking.organizer,
            venue: &booking.venue,
            date: format_contract_date(booking.date, true),
            timing: format_stage_time(booking.time),
            sound: if booking.is_sound_included {
                "With"
            } else {
                "Without"
            },
        },
        total: AmountText::new(booking.total),
        advance,
        remaining,
        paid_in_full,
        colors: Colors {
            accent: options.accent.to_string(),
            shade: lighten_color(options.accent, 0.6)?,
            rule: lighten_color(options.accent, 0.3)?,
        },
    };

    let context = Context::from_serialize(&context_data)?;
    Ok(templates()?.render("contract.html", &context)?)
}

/// `<root>/2026-03-March/5th March Uttarpara.html`
pub fn contract_path(root: &Path, booking: &Booking) -> PathBuf {
    let folder = booking.date.format("%Y-%m-%B").to_string();
    let city: String = booking
        .city
        .chars()
        .map(|c| {
            if RESERVED_FILENAME_CHARS.contains(&c) || c.is_control() {
                '-'
            } else {
                c
            }
        })
        .collect();
    root.join(folder).join(format!(
        "{} {}.html",
        format_contract_date(booking.date, false),
        city.trim()
    ))
}

/// Renders the contract to `path`, creating missing parent folders.
pub fn write_contract_to(
    path: &Path,
    booking: &Booking,
    options: &ContractOptions,
) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render_contract(booking, options)?)?;
    tracing::info!(path = %path.display(), booking = %booking.id, "contract written");
    Ok(())
}

/// Writes the contract into its month folder under `root`.
pub fn write_contract(
    root: &Path,
    booking: &Booking,
    options: &ContractOptions,
) -> anyhow::Result<PathBuf> {
    let path = contract_path(root, booking);
    write_contract_to(&path, booking, options)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::booking;

    fn options(band: &BandProfile, paid_in_full: bool) -> ContractOptions<'_> {
        ContractOptions {
            band,
            accent: "#1f3a5f",
            paid_in_full,
        }
    }

    #[test]
    fn amount_text_uses_grouping_and_words() {
        assert_eq!(
            AmountText::new(150_000),
            AmountText {
                digits: "1,50,000".to_string(),
                words: "Rupees One Lakh Fifty Thousand Only".to_string(),
            }
        );
        assert_eq!(AmountText::new(0).digits, "0");
        assert_eq!(AmountText::new(0).words, "Rupees Zero Only");
    }

    #[test]
    fn contract_carries_booking_terms() {
        let band = BandProfile::default();
        let b = booking((2026, 3, 5), Some("Hooghly"));
        let html = render_contract(&b, &options(&band, false)).unwrap();

        assert!(html.contains("CONTRACT FORM"));
        assert!(html.contains("TANMAY KAR AND FRIENDS"));
        assert!(html.contains("5th March, 2026"));
        assert!(html.contains("From 7:30 PM (1 Hour 30 Minutes + Sound Check)"));
        assert!(html.contains(
            "Rs. 1,50,000/- (Rupees One Lakh Fifty Thousand Only) With Input Sound"
        ));
        assert!(html.contains("Rs. 50,000/- (Rupees Fifty Thousand Only)"));
        assert!(html.contains("Rs. 1,00,000/- (Rupees One Lakh Only)"));
        assert!(html.contains("Force Majeure"));
        assert!(!html.contains("PAID IN FULL"));
        assert_eq!(html.matches("Signature of the Party").count(), 2);
    }

    #[test]
    fn letterhead_lines_are_optional() {
        let mut band = BandProfile::default();
        let b = booking((2026, 3, 5), Some("Hooghly"));
        let bare = render_contract(&b, &options(&band, false)).unwrap();
        assert!(!bare.contains("<i></i>"));

        band.address = "J.K. Street, Uttarpara".to_string();
        let with_address = render_contract(&b, &options(&band, false)).unwrap();
        assert!(with_address.contains("<i>J.K. Street, Uttarpara</i>"));
    }

    #[test]
    fn paid_in_full_zeroes_the_remainder() {
        let band = BandProfile::default();
        let mut b = booking((2026, 3, 5), Some("Hooghly"));
        b.is_sound_included = false;
        let html = render_contract(&b, &options(&band, true)).unwrap();

        assert!(html.contains("PAID IN FULL"));
        assert!(html.contains("Rs. 0/- (Rupees Zero Only)"));
        assert!(html.contains("Without Input Sound"));
        assert!(!html.contains("Rs. 50,000/-"));
    }

    #[test]
    fn settled_booking_prints_as_paid() {
        let band = BandProfile::default();
        let mut b = booking((2026, 3, 5), Some("Hooghly"));
        b.advance = b.total;
        let html = render_contract(&b, &options(&band, false)).unwrap();
        assert!(html.contains("PAID IN FULL"));
    }

    #[test]
    fn user_text_is_escaped() {
        let band = BandProfile::default();
        let mut b = booking((2026, 3, 5), Some("Hooghly"));
        b.organizer = "<Friends & Co>".to_string();
        b.venue = "<script>alert(1)</script>".to_string();
        let html = render_contract(&b, &options(&band, false)).unwrap();
        assert!(html.contains("&lt;Friends &amp; Co&gt;"));
        assert!(!html.contains("<Friends"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn bad_accent_is_reported() {
        let band = BandProfile::default();
        let b = booking((2026, 3, 5), Some("Hooghly"));
        let opts = ContractOptions {
            band: &band,
            accent: "blue",
            paid_in_full: false,
        };
        assert!(matches!(
            render_contract(&b, &opts),
            Err(ContractError::Format(_))
        ));
    }

    #[test]
    fn path_groups_by_month() {
        let b = booking((2026, 3, 5), Some("Hooghly"));
        let path = contract_path(Path::new("/contracts"), &b);
        assert_eq!(
            path,
            PathBuf::from("/contracts/2026-03-March/5th March Uttarpara.html")
        );
    }

    #[test]
    fn path_replaces_reserved_filename_characters() {
        let mut b = booking((2026, 3, 5), Some("Hooghly"));
        b.city = "Kol/kata: Salt*Lake? \"East\" <A>|B\\C".to_string();
        let path = contract_path(Path::new("/contracts"), &b);
        let name = path.file_name().unwrap().to_str().unwrap();
        assert_eq!(name, "5th March Kol-kata- Salt-Lake- -East- -A--B-C.html");
        assert_eq!(path.parent().unwrap(), Path::new("/contracts/2026-03-March"));
    }

    #[test]
    fn writes_contract_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let band = BandProfile::default();
        let b = booking((2026, 11, 22), Some("Nadia"));
        let path = write_contract(dir.path(), &b, &options(&band, false)).unwrap();
        assert!(path.starts_with(dir.path().join("2026-11-November")));
        let html = fs::read_to_string(path).unwrap();
        assert!(html.contains("22nd November, 2026"));
    }

    #[test]
    fn explicit_path_gets_its_folders_created() {
        let dir = tempfile::tempdir().unwrap();
        let band = BandProfile::default();
        let b = booking((2026, 11, 22), Some("Nadia"));
        let path = dir.path().join("printing").join("today").join("contract.html");
        write_contract_to(&path, &b, &options(&band, false)).unwrap();
        assert!(path.is_file());
    }
}
