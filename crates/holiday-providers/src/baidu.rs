use async_trait::async_trait;
use chrono::{Datelike, Duration, Months, NaiveDate, Utc};
use holiday_core::day::{CalendarDay, DayStatus};
use holiday_core::error::HolidayDataError;
use holiday_core::holiday::HolidayAnchor;
use holiday_core::provider::CalendarWindowProvider;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::ProviderError;

const BAIDU_OPENDATA_URL: &str = "https://sp0.baidu.com/8aQDcjqpAAV3otqbppnN2DJv/api.php";

/// Search resource serving the per-year statutory holiday list.
const HOLIDAY_RESOURCE_ID: &str = "39042";
/// Search resource serving the day-by-day almanac for a month, roughly three
/// months of days centered on the queried one.
const CALENDAR_RESOURCE_ID: &str = "39043";

const HOLIDAY_QUERY: &str = "法定节假日";

/// Baidu open-data calendar provider.
/// No authentication required. Holiday lists are published through 2050.
pub struct BaiduCalendarProvider {
    client: Client,
    base_url: String,
}

impl BaiduCalendarProvider {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .user_agent("Mozilla/5.0")
                .build()
                .expect("failed to build reqwest client"),
            base_url: BAIDU_OPENDATA_URL.to_string(),
        }
    }

    /// Create with a custom base URL (for testing).
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .user_agent("Mozilla/5.0")
                .build()
                .expect("failed to build reqwest client"),
            base_url,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        query: &str,
        resource_id: &str,
    ) -> Result<T, ProviderError> {
        let ts = Utc::now().timestamp_millis().to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("query", query),
                ("resource_id", resource_id),
                ("t", ts.as_str()),
                ("ie", "utf8"),
                ("oe", "utf8"),
                ("format", "json"),
                ("tn", "wisetpl"),
                ("_", ts.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status,
                message: body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("failed to parse response: {e}")))
    }

    /// Fetch the nominal holiday anchors for an inclusive year range.
    /// Entries outside the range are dropped; malformed entries are skipped.
    /// Returns anchors sorted by date.
    pub async fn fetch_holiday_anchors(
        &self,
        start_year: i32,
        end_year: i32,
    ) -> Result<Vec<HolidayAnchor>, ProviderError> {
        debug!("fetching holiday anchors for {start_year}..={end_year}");
        let response: YearHolidayResponse =
            self.get_json(HOLIDAY_QUERY, HOLIDAY_RESOURCE_ID).await?;
        anchors_from_response(response, start_year, end_year)
    }

    /// Fetch the almanac window around a date's month. The upstream returns
    /// roughly one month on each side of the queried one.
    pub async fn fetch_month_window(
        &self,
        center: NaiveDate,
    ) -> Result<Vec<CalendarDay>, ProviderError> {
        let query = month_query(center);
        debug!("fetching calendar window for {query}");
        let response: AlmanacResponse = self.get_json(&query, CALENDAR_RESOURCE_ID).await?;
        window_from_response(response, &query)
    }
}

impl Default for BaiduCalendarProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CalendarWindowProvider for BaiduCalendarProvider {
    fn name(&self) -> &str {
        "baidu"
    }

    async fn fetch_window(
        &self,
        center: NaiveDate,
        margin_days: i64,
    ) -> Result<Vec<CalendarDay>, HolidayDataError> {
        let days = self.fetch_month_window(center).await?;
        check_coverage(&days, center, margin_days)?;
        Ok(days)
    }
}

#[derive(Debug, Deserialize)]
struct YearHolidayResponse {
    data: Option<Vec<YearHolidayData>>,
}

#[derive(Debug, Deserialize)]
struct YearHolidayData {
    holiday: Option<Vec<YearHolidayEntry>>,
}

#[derive(Debug, Deserialize)]
struct YearHolidayEntry {
    year: Option<String>,
    list: Option<Vec<YearHolidayItem>>,
}

#[derive(Debug, Deserialize)]
struct YearHolidayItem {
    /// Date in "YYYY-M-D" form, unpadded.
    date: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlmanacResponse {
    data: Option<Vec<AlmanacData>>,
}

#[derive(Debug, Deserialize)]
struct AlmanacData {
    almanac: Option<Vec<AlmanacDay>>,
}

#[derive(Debug, Deserialize)]
struct AlmanacDay {
    year: Option<String>,
    month: Option<String>,
    day: Option<String>,
    /// "1" = rest day, "2" = make-up workday, absent or anything else =
    /// ordinary workday.
    status: Option<String>,
}

fn month_query(date: NaiveDate) -> String {
    format!("{}年{}月", date.year(), date.month())
}

fn anchors_from_response(
    response: YearHolidayResponse,
    start_year: i32,
    end_year: i32,
) -> Result<Vec<HolidayAnchor>, ProviderError> {
    let entries = response
        .data
        .and_then(|mut data| (!data.is_empty()).then(|| data.remove(0)))
        .and_then(|d| d.holiday)
        .filter(|entries| !entries.is_empty())
        .ok_or_else(|| ProviderError::NoData {
            query: HOLIDAY_QUERY.to_string(),
        })?;

    let mut anchors = Vec::new();
    for entry in entries {
        let Some(year) = entry.year.as_deref().and_then(|y| y.trim().parse::<i32>().ok()) else {
            warn!("year holiday entry without a usable year: {:?}", entry.year);
            continue;
        };
        if year < start_year || year > end_year {
            continue;
        }

        for item in entry.list.unwrap_or_default() {
            let Some(name) = item.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
            else {
                warn!("{year}: holiday entry without a name");
                continue;
            };
            let Some(date) = item
                .date
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
            else {
                warn!("{year}: holiday '{name}' has an unparseable date: {:?}", item.date);
                continue;
            };
            anchors.push(HolidayAnchor {
                year,
                date,
                name: name.to_string(),
            });
        }
    }

    if anchors.is_empty() {
        return Err(ProviderError::NoData {
            query: format!("{HOLIDAY_QUERY} {start_year}..={end_year}"),
        });
    }

    anchors.sort_by_key(|a| a.date);
    Ok(anchors)
}

fn window_from_response(
    response: AlmanacResponse,
    query: &str,
) -> Result<Vec<CalendarDay>, ProviderError> {
    let entries = response
        .data
        .and_then(|mut data| (!data.is_empty()).then(|| data.remove(0)))
        .and_then(|d| d.almanac)
        .filter(|entries| !entries.is_empty())
        .ok_or_else(|| ProviderError::NoData {
            query: query.to_string(),
        })?;

    let mut days = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let date = almanac_date(entry).ok_or_else(|| {
            ProviderError::Parse(format!(
                "almanac entry {i} has no usable date: year={:?} month={:?} day={:?}",
                entry.year, entry.month, entry.day
            ))
        })?;
        days.push(CalendarDay {
            date,
            status: almanac_status(entry.status.as_deref()),
        });
    }

    days.sort_by_key(|d| d.date);
    Ok(days)
}

fn almanac_date(entry: &AlmanacDay) -> Option<NaiveDate> {
    let year = entry.year.as_deref()?.trim().parse::<i32>().ok()?;
    let month = entry.month.as_deref()?.trim().parse::<u32>().ok()?;
    let day = entry.day.as_deref()?.trim().parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn almanac_status(status: Option<&str>) -> DayStatus {
    match status.map(str::trim) {
        Some("1") => DayStatus::Rest,
        Some("2") => DayStatus::MakeupWorkday,
        _ => DayStatus::Workday,
    }
}

/// The resolver assumes slack on both sides of the anchor's month; reject a
/// window the upstream returned short.
fn check_coverage(
    days: &[CalendarDay],
    center: NaiveDate,
    margin_days: i64,
) -> Result<(), ProviderError> {
    let month_start = center.with_day(1).unwrap_or(center);
    let month_end = month_start
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .unwrap_or(center);
    let need_start = month_start - Duration::days(margin_days);
    let need_end = month_end + Duration::days(margin_days);

    match (days.first(), days.last()) {
        (Some(first), Some(last)) if first.date <= need_start && last.date >= need_end => Ok(()),
        (Some(first), Some(last)) => Err(ProviderError::Parse(format!(
            "calendar window covers {}..{}, need {need_start}..{need_end}",
            first.date, last.date
        ))),
        _ => Err(ProviderError::NoData {
            query: month_query(center),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_year_holiday_json() {
        let json = r#"{
            "status": "0",
            "t": "1623495008826",
            "data": [{
                "holiday": [{
                    "list": [
                        {"date": "2021-1-1", "name": "元旦节"},
                        {"date": "2021-2-11", "name": "除夕"},
                        {"date": "2021-2-12", "name": "春节"},
                        {"date": "2021-4-4", "name": "清明节"},
                        {"date": "2021-5-1", "name": "劳动节"},
                        {"date": "2021-6-14", "name": "端午节"},
                        {"date": "2021-9-21", "name": "中秋节"},
                        {"date": "2021-10-1", "name": "国庆节"}
                    ],
                    "list#num#baidu": 8,
                    "year": "2021"
                }]
            }]
        }"#;

        let response: YearHolidayResponse = serde_json::from_str(json).unwrap();
        let anchors = anchors_from_response(response, 2021, 2021).unwrap();

        assert_eq!(anchors.len(), 8);
        assert_eq!(anchors[0].name, "元旦节");
        assert_eq!(anchors[0].date, date(2021, 1, 1));
        assert_eq!(anchors[0].year, 2021);
        // The eve anchor comes through; dropping it is the builder's call.
        assert!(anchors.iter().any(|a| a.name == "除夕"));
        assert!(anchors.windows(2).all(|pair| pair[0].date <= pair[1].date));
    }

    #[test]
    fn year_range_filters_entries() {
        let json = r#"{
            "data": [{
                "holiday": [
                    {"year": "2020", "list": [{"date": "2020-1-1", "name": "元旦节"}]},
                    {"year": "2021", "list": [{"date": "2021-1-1", "name": "元旦节"}]}
                ]
            }]
        }"#;

        let response: YearHolidayResponse = serde_json::from_str(json).unwrap();
        let anchors = anchors_from_response(response, 2021, 2021).unwrap();

        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].year, 2021);
    }

    #[test]
    fn malformed_holiday_entries_are_skipped() {
        let json = r#"{
            "data": [{
                "holiday": [{
                    "year": "2021",
                    "list": [
                        {"date": "2021-1-1", "name": "元旦节"},
                        {"date": "not-a-date", "name": "清明节"},
                        {"date": "2021-5-1", "name": "  "}
                    ]
                }]
            }]
        }"#;

        let response: YearHolidayResponse = serde_json::from_str(json).unwrap();
        let anchors = anchors_from_response(response, 2021, 2021).unwrap();

        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].name, "元旦节");
    }

    #[test]
    fn empty_holiday_payload_is_no_data() {
        let response: YearHolidayResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
        let result = anchors_from_response(response, 2021, 2021);
        assert!(matches!(result, Err(ProviderError::NoData { .. })));
    }

    #[test]
    fn parse_almanac_json() {
        let json = r#"{
            "status": "0",
            "data": [{
                "almanac": [
                    {"year": "2021", "month": "2", "day": "7", "status": "2", "cnDay": "日"},
                    {"year": "2021", "month": "2", "day": "8", "cnDay": "一"},
                    {"year": "2021", "month": "2", "day": "12", "status": "1", "desc": "春节"},
                    {"year": "2021", "month": "2", "day": "11", "status": "1", "desc": "除夕"}
                ]
            }]
        }"#;

        let response: AlmanacResponse = serde_json::from_str(json).unwrap();
        let days = window_from_response(response, "2021年2月").unwrap();

        assert_eq!(days.len(), 4);
        // Sorted by date even when the payload is not.
        assert_eq!(days[0].date, date(2021, 2, 7));
        assert_eq!(days[0].status, DayStatus::MakeupWorkday);
        assert_eq!(days[1].status, DayStatus::Workday);
        assert_eq!(days[2].date, date(2021, 2, 11));
        assert_eq!(days[2].status, DayStatus::Rest);
        assert_eq!(days[3].date, date(2021, 2, 12));
    }

    #[test]
    fn almanac_entry_without_date_is_a_parse_error() {
        let json = r#"{
            "data": [{
                "almanac": [
                    {"year": "2021", "month": "2", "status": "1"}
                ]
            }]
        }"#;

        let response: AlmanacResponse = serde_json::from_str(json).unwrap();
        let result = window_from_response(response, "2021年2月");
        assert!(matches!(result, Err(ProviderError::Parse(_))));
    }

    #[test]
    fn empty_almanac_payload_is_no_data() {
        let response: AlmanacResponse =
            serde_json::from_str(r#"{"data": [{"almanac": []}]}"#).unwrap();
        let result = window_from_response(response, "2021年2月");
        assert!(matches!(result, Err(ProviderError::NoData { .. })));
    }

    #[test]
    fn status_mapping() {
        assert_eq!(almanac_status(Some("1")), DayStatus::Rest);
        assert_eq!(almanac_status(Some("2")), DayStatus::MakeupWorkday);
        assert_eq!(almanac_status(Some("0")), DayStatus::Workday);
        assert_eq!(almanac_status(Some("")), DayStatus::Workday);
        assert_eq!(almanac_status(None), DayStatus::Workday);
    }

    #[test]
    fn month_query_format() {
        assert_eq!(month_query(date(2021, 5, 15)), "2021年5月");
        assert_eq!(month_query(date(2021, 11, 1)), "2021年11月");
    }

    #[test]
    fn coverage_accepts_a_full_window() {
        let days: Vec<CalendarDay> = (0..92)
            .map(|i| CalendarDay {
                date: date(2021, 4, 1) + Duration::days(i),
                status: DayStatus::Workday,
            })
            .collect();

        assert!(check_coverage(&days, date(2021, 5, 15), 28).is_ok());
    }

    #[test]
    fn coverage_rejects_a_short_window() {
        // May only, no slack on either side.
        let days: Vec<CalendarDay> = (0..31)
            .map(|i| CalendarDay {
                date: date(2021, 5, 1) + Duration::days(i),
                status: DayStatus::Workday,
            })
            .collect();

        assert!(matches!(
            check_coverage(&days, date(2021, 5, 15), 28),
            Err(ProviderError::Parse(_))
        ));
    }

    #[test]
    fn coverage_rejects_an_empty_window() {
        assert!(matches!(
            check_coverage(&[], date(2021, 5, 15), 28),
            Err(ProviderError::NoData { .. })
        ));
    }
}
