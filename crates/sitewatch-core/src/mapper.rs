//! Positional mapping of a listing row into a [`ListingRecord`].
//!
//! The detail line is a comma-separated list whose meaning is fixed by
//! position on the source site. Reordering [`DetailSlot`] breaks
//! compatibility with already stored data.

use std::fmt;

use crate::error::AppError;
use crate::extract::{extract_int, extract_year_month};
use crate::models::{DetailFields, ListingRecord, RawListing};

/// Position of each value in the comma-separated detail line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailSlot {
    Engine,
    YearMonth,
    EngineSize,
    PowerKw,
    PowerHp,
    Kilometers,
}

impl DetailSlot {
    pub const ORDER: [DetailSlot; 6] = [
        DetailSlot::Engine,
        DetailSlot::YearMonth,
        DetailSlot::EngineSize,
        DetailSlot::PowerKw,
        DetailSlot::PowerHp,
        DetailSlot::Kilometers,
    ];

    pub fn at(index: usize) -> Option<Self> {
        Self::ORDER.get(index).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DetailSlot::Engine => "engine",
            DetailSlot::YearMonth => "year_month",
            DetailSlot::EngineSize => "engine_size",
            DetailSlot::PowerKw => "power_kw",
            DetailSlot::PowerHp => "power_hp",
            DetailSlot::Kilometers => "kilometers",
        }
    }
}

impl fmt::Display for DetailSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detail slot that could not be extracted and was left at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldWarning {
    pub slot: DetailSlot,
    pub text: String,
}

/// A mapped record plus the non-fatal warnings raised while mapping it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedListing {
    pub record: ListingRecord,
    pub warnings: Vec<FieldWarning>,
}

/// Build a record from one row's fragments.
///
/// Fails with [`AppError::MissingKey`] or [`AppError::MissingPrice`]; detail
/// slot failures only produce warnings.
pub fn map_listing(raw: &RawListing) -> Result<MappedListing, AppError> {
    let id = extract_int(&raw.id_text).ok_or_else(|| AppError::MissingKey(raw.id_text.clone()))?;
    let price = extract_int(&raw.price_text).ok_or_else(|| AppError::MissingPrice {
        id,
        text: raw.price_text.clone(),
    })?;

    let (details, warnings) = map_details(&raw.detail_text);

    Ok(MappedListing {
        record: ListingRecord {
            id,
            title: raw.title_text.trim().to_string(),
            price,
            details,
        },
        warnings,
    })
}

/// Split the detail line on `,` and fill the slots by position.
///
/// Pieces past the sixth are ignored; missing trailing pieces leave their
/// slots at zero without a warning.
pub fn map_details(detail_text: &str) -> (DetailFields, Vec<FieldWarning>) {
    let mut details = DetailFields::default();
    let mut warnings = Vec::new();

    if detail_text.trim().is_empty() {
        return (details, warnings);
    }

    for (index, piece) in detail_text.split(',').enumerate() {
        let Some(slot) = DetailSlot::at(index) else {
            break;
        };
        let piece = piece.trim();

        let ok = match slot {
            DetailSlot::Engine => {
                details.engine = piece.to_string();
                true
            }
            DetailSlot::YearMonth => match extract_year_month(piece) {
                Some(ym) => {
                    details.year_month = ym;
                    true
                }
                None => false,
            },
            DetailSlot::EngineSize => set_int(&mut details.engine_size_cc, piece),
            DetailSlot::PowerKw => set_int(&mut details.power_kw, piece),
            DetailSlot::PowerHp => set_int(&mut details.power_hp, piece),
            DetailSlot::Kilometers => set_int(&mut details.kilometers, piece),
        };

        if !ok {
            warnings.push(FieldWarning {
                slot,
                text: piece.to_string(),
            });
        }
    }

    (details, warnings)
}

fn set_int(slot: &mut i64, text: &str) -> bool {
    match extract_int(text) {
        Some(value) => {
            *slot = value;
            true
        }
        None => false,
    }
}
