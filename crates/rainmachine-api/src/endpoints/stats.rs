use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::date_segment;
use crate::controller::Controller;
use crate::error::Error;
use crate::models::DailyStat;

#[derive(Deserialize)]
struct DailyStatsEnvelope {
    #[serde(rename = "DailyStats", default)]
    daily_stats: Vec<DailyStat>,
}

#[derive(Deserialize)]
struct DailyStatsDetailsEnvelope {
    #[serde(rename = "DailyStatsDetails", default)]
    daily_stats_details: Vec<DailyStat>,
}

/// Computed watering statistics.
pub struct Stats<'a> {
    controller: &'a Controller,
}

impl Controller {
    pub fn stats(&self) -> Stats<'_> {
        Stats { controller: self }
    }
}

impl Stats<'_> {
    /// `GET dailystats/{date}`
    pub async fn on_date(&self, date: Option<NaiveDate>) -> Result<Value, Error> {
        let path = format!("dailystats/{}", date_segment(date));
        debug!(%path, "fetching daily stats");
        self.controller.get(&path).await
    }

    /// Forecast statistics for the coming days.
    ///
    /// `GET dailystats[/details]`
    pub async fn upcoming(&self, details: bool) -> Result<Vec<DailyStat>, Error> {
        debug!(details, "fetching upcoming stats");
        if details {
            let envelope: DailyStatsDetailsEnvelope =
                self.controller.get("dailystats/details").await?;
            Ok(envelope.daily_stats_details)
        } else {
            let envelope: DailyStatsEnvelope = self.controller.get("dailystats").await?;
            Ok(envelope.daily_stats)
        }
    }
}
