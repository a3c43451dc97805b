use tracing::{debug, warn};

use crate::error::HolidayDataError;
use crate::holiday::{Holiday, HolidayAnchor};
use crate::provider::CalendarWindowProvider;
use crate::resolver;

/// Calendar margin requested around each anchor's month, comfortably past
/// the resolver's two-weekend termination bound on both sides.
pub const DEFAULT_MARGIN_DAYS: i64 = 28;

/// Predicate marking anchors that are announced as their own entry but whose
/// rest days belong to the following holiday's run, so resolving them would
/// duplicate it.
pub type SkipPredicate = Box<dyn Fn(&HolidayAnchor) -> bool + Send + Sync>;

/// Stock skip rule: the Spring Festival eve is published as a separate
/// anchor but its rest days are part of the Spring Festival run.
pub fn absorbed_into_next(anchor: &HolidayAnchor) -> bool {
    anchor.name.trim() == "除夕"
}

/// A holiday anchor that failed to resolve, with the error that stopped it.
#[derive(Debug)]
pub struct AnchorFailure {
    pub anchor: HolidayAnchor,
    pub error: HolidayDataError,
}

/// Result of one build run: the resolved holidays in anchor-date order and
/// the anchors that failed, reported side by side rather than aborting.
#[derive(Debug)]
pub struct BuildReport {
    pub holidays: Vec<Holiday>,
    pub failures: Vec<AnchorFailure>,
}

/// Resolves a batch of holiday anchors into [`Holiday`] records, one calendar
/// window fetch per anchor. Anchors are independent: a failure is recorded
/// and the rest of the batch continues.
pub struct HolidaySetBuilder {
    margin_days: i64,
    skip: SkipPredicate,
}

impl Default for HolidaySetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HolidaySetBuilder {
    pub fn new() -> Self {
        Self {
            margin_days: DEFAULT_MARGIN_DAYS,
            skip: Box::new(absorbed_into_next),
        }
    }

    /// Replace the anchor skip rule.
    pub fn with_skip_predicate(
        mut self,
        skip: impl Fn(&HolidayAnchor) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.skip = Box::new(skip);
        self
    }

    /// Resolve every anchor, including ones the stock rule would skip.
    pub fn keep_all_anchors(self) -> Self {
        self.with_skip_predicate(|_| false)
    }

    pub fn with_margin_days(mut self, margin_days: i64) -> Self {
        self.margin_days = margin_days;
        self
    }

    pub async fn build(
        &self,
        provider: &dyn CalendarWindowProvider,
        anchors: &[HolidayAnchor],
    ) -> BuildReport {
        let mut ordered: Vec<&HolidayAnchor> = anchors.iter().collect();
        ordered.sort_by_key(|a| a.date);

        let mut holidays = Vec::new();
        let mut failures = Vec::new();

        for anchor in ordered {
            if (self.skip)(anchor) {
                debug!(
                    "skipping '{}' ({}): absorbed into the following holiday",
                    anchor.name, anchor.date
                );
                continue;
            }

            match self.resolve_anchor(provider, anchor).await {
                Ok(holiday) => holidays.push(holiday),
                Err(error) => {
                    warn!("{} ({}): resolution failed: {error}", anchor.name, anchor.date);
                    failures.push(AnchorFailure {
                        anchor: anchor.clone(),
                        error,
                    });
                }
            }
        }

        BuildReport { holidays, failures }
    }

    async fn resolve_anchor(
        &self,
        provider: &dyn CalendarWindowProvider,
        anchor: &HolidayAnchor,
    ) -> Result<Holiday, HolidayDataError> {
        let window = provider.fetch_window(anchor.date, self.margin_days).await?;
        debug!(
            "{}: fetched {} day(s) around {} from {}",
            anchor.name,
            window.len(),
            anchor.date,
            provider.name()
        );

        let resolution = resolver::resolve(&window, anchor.date)?;
        Ok(Holiday {
            year: anchor.year,
            anchor_date: anchor.date,
            name: anchor.name.clone(),
            rest_dates: resolution.rest_dates,
            makeup_dates: resolution.makeup_dates,
        })
    }
}
