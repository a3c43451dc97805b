use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One nominal holiday occurrence from the anchor source: a date known to
/// fall inside the holiday's rest run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayAnchor {
    pub year: i32,
    pub date: NaiveDate,
    pub name: String,
}

/// A resolved holiday: its contiguous rest run and the make-up workdays
/// exchanged for it. `rest_dates` is ascending, gap-free, and always contains
/// `anchor_date`; `makeup_dates` is ascending and disjoint from `rest_dates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub year: i32,
    pub anchor_date: NaiveDate,
    pub name: String,
    pub rest_dates: Vec<NaiveDate>,
    pub makeup_dates: Vec<NaiveDate>,
}
