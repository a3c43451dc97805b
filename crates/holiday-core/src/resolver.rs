use chrono::{Datelike, NaiveDate, Weekday};

use crate::day::{CalendarDay, DayStatus};
use crate::error::HolidayDataError;

/// Weekend days (Sat/Sun) tolerated after the rest run breaks before a
/// direction's scan gives up: two full weekends with no adjacent rest run
/// means the remaining days are unrelated to this holiday.
const WEEKEND_SCAN_LIMIT: u32 = 4;

/// Outcome of resolving one holiday window: the contiguous rest run around
/// the anchor and the make-up workdays attributed to it, both ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub rest_dates: Vec<NaiveDate>,
    pub makeup_dates: Vec<NaiveDate>,
}

/// Resolve the holiday containing `anchor` against a gap-free, date-ordered
/// calendar window.
///
/// The anchor must be present in the window and marked [`DayStatus::Rest`].
/// The rest run and its make-up days are found by two independent scans, one
/// walking backward from the anchor and one forward, each stopping at the
/// first neighboring rest run (after settling make-up ownership against it)
/// or after two further weekends pass without one.
pub fn resolve(
    window: &[CalendarDay],
    anchor: NaiveDate,
) -> Result<Resolution, HolidayDataError> {
    let anchor_idx = locate_anchor(window, anchor)?;

    // The backward pass includes the anchor day itself, so its rest
    // accumulator is never empty and the anchor lands in the result once.
    let backward = scan(window[..=anchor_idx].iter().rev(), anchor);
    let forward = scan(window[anchor_idx + 1..].iter(), anchor);

    let mut rest_dates: Vec<NaiveDate> = backward.rest.into_iter().rev().collect();
    rest_dates.extend(forward.rest);

    let mut makeup_dates = backward.makeup;
    makeup_dates.extend(forward.makeup);
    makeup_dates.sort();

    Ok(Resolution {
        rest_dates,
        makeup_dates,
    })
}

/// Locate the anchor's index by day-count arithmetic from the window's first
/// date, then verify the element found there actually carries the anchor
/// date. A mismatch means the window is not the gap-free sequence the
/// provider contract promises.
fn locate_anchor(window: &[CalendarDay], anchor: NaiveDate) -> Result<usize, HolidayDataError> {
    let first = window
        .first()
        .ok_or(HolidayDataError::AnchorNotFound { date: anchor })?;

    let offset = (anchor - first.date).num_days();
    if offset < 0 || offset >= window.len() as i64 {
        return Err(HolidayDataError::AnchorNotFound { date: anchor });
    }

    let idx = offset as usize;
    let day = &window[idx];
    if day.date != anchor {
        return Err(HolidayDataError::WindowIntegrity(format!(
            "expected {anchor} at offset {idx}, found {}",
            day.date
        )));
    }
    if day.status != DayStatus::Rest {
        return Err(HolidayDataError::AnchorNotFound { date: anchor });
    }

    Ok(idx)
}

struct DirectionScan {
    rest: Vec<NaiveDate>,
    makeup: Vec<NaiveDate>,
}

/// Walk one direction away from the anchor, accumulating the rest run while
/// it stays contiguous and make-up days after it breaks.
fn scan<'a, I>(days: I, anchor: NaiveDate) -> DirectionScan
where
    I: Iterator<Item = &'a CalendarDay>,
{
    let mut rest: Vec<NaiveDate> = Vec::new();
    let mut makeup: Vec<NaiveDate> = Vec::new();
    let mut contiguous = true;
    let mut weekend_count = 0u32;

    for day in days {
        if contiguous {
            match day.status {
                DayStatus::Rest => rest.push(day.date),
                status => {
                    // The day breaking the run does not count toward the
                    // weekend bound.
                    contiguous = false;
                    if status == DayStatus::MakeupWorkday {
                        makeup.push(day.date);
                    }
                }
            }
            continue;
        }

        match day.status {
            DayStatus::Rest => {
                // A neighboring holiday's rest run starts here; settle which
                // of the collected make-up days actually belong to it.
                let own_edge = rest.last().copied().unwrap_or(anchor);
                disambiguate(&mut makeup, own_edge, day.date);
                break;
            }
            DayStatus::MakeupWorkday => makeup.push(day.date),
            DayStatus::Workday => {}
        }

        if matches!(day.date.weekday(), Weekday::Sat | Weekday::Sun) {
            weekend_count += 1;
            if weekend_count >= WEEKEND_SCAN_LIMIT {
                break;
            }
        }
    }

    DirectionScan { rest, makeup }
}

/// Decide make-up ownership against a neighboring holiday whose rest run was
/// found at `boundary`. Walks the accumulated make-up days last-pushed first
/// (nearest the boundary first); days closer to the boundary than to
/// `own_edge` are dropped for the neighbor's own scan to claim. Equidistant
/// days go to the chronologically later holiday: kept when they precede
/// `own_edge`, dropped otherwise. The first day that is unambiguously ours
/// ends the walk.
fn disambiguate(makeup: &mut Vec<NaiveDate>, own_edge: NaiveDate, boundary: NaiveDate) {
    while let Some(&candidate) = makeup.last() {
        let to_own = (candidate - own_edge).num_days().abs();
        let to_boundary = (candidate - boundary).num_days().abs();

        if to_own > to_boundary {
            makeup.pop();
        } else if to_own == to_boundary {
            if candidate < own_edge {
                break;
            }
            makeup.pop();
        } else {
            break;
        }
    }
}
