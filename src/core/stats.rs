use crate::core::aggregate::{GroupKey, GroupSpec};
use crate::core::resolve::{field_equals, resolve_bool};
use crate::domain::model::Record;
use serde::{Deserialize, Serialize};

/// One `{_id, count}` row as the stats endpoint returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountRow {
    #[serde(rename = "_id")]
    pub id: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityCountRow {
    #[serde(rename = "_id")]
    pub id: String,
    pub count: u64,
    #[serde(default)]
    pub confirmed: u64,
    #[serde(default)]
    pub launched: u64,
}

/// Waitlist statistics payload from `GET waitlist/stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignStats {
    pub total: u64,
    pub confirmed: u64,
    pub launched: u64,
    pub marketing_opt_in: u64,
    #[serde(default)]
    pub recent_signups: Vec<CountRow>,
    #[serde(default)]
    pub city_stats: Vec<CityCountRow>,
    #[serde(default)]
    pub role_stats: Vec<CountRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityChartRow {
    pub name: String,
    pub total: u64,
    pub confirmed: u64,
    pub launched: u64,
}

impl CityChartRow {
    pub fn confirmation_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.confirmed as f64 / self.total as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleChartRow {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: String,
    pub count: u64,
}

pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn display_name(key: &str) -> String {
    if key.is_empty() {
        "Unknown".to_string()
    } else {
        capitalize(key)
    }
}

impl CampaignStats {
    pub fn confirmation_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.confirmed as f64 / self.total as f64
        }
    }

    /// Chart-ready city rows: `_id` becomes a capitalized `name`, `count`
    /// becomes `total`, drill-down counts ride along.
    pub fn city_chart(&self) -> Vec<CityChartRow> {
        self.city_stats
            .iter()
            .map(|row| CityChartRow {
                name: display_name(&row.id),
                total: row.count,
                confirmed: row.confirmed,
                launched: row.launched,
            })
            .collect()
    }

    /// Largest cities first; ties keep the payload order.
    pub fn top_cities(&self, limit: usize) -> Vec<CityChartRow> {
        let mut rows = self.city_chart();
        rows.sort_by(|a, b| b.total.cmp(&a.total));
        rows.truncate(limit);
        rows
    }

    pub fn role_chart(&self) -> Vec<RoleChartRow> {
        self.role_stats
            .iter()
            .map(|row| RoleChartRow {
                name: display_name(&row.id),
                count: row.count,
            })
            .collect()
    }

    /// Day-by-day signups, oldest first. The `_id` here is already a
    /// `YYYY-MM-DD` string, so lexical order is chronological order.
    pub fn signup_trend(&self) -> Vec<TrendPoint> {
        let mut points: Vec<TrendPoint> = self
            .recent_signups
            .iter()
            .map(|row| TrendPoint {
                date: row.id.clone(),
                count: row.count,
            })
            .collect();
        points.sort_by(|a, b| a.date.cmp(&b.date));
        points
    }
}

/// Locally computed counterpart of `CampaignStats`, used when the report
/// job already holds the waitlist records and a second API round-trip
/// would be wasted.
#[derive(Debug, Clone, Serialize)]
pub struct WaitlistSummary {
    pub total: usize,
    pub confirmed: usize,
    pub launched: usize,
    pub marketing_opt_in: usize,
    pub city_stats: Vec<CityChartRow>,
    pub role_stats: Vec<RoleChartRow>,
    pub signup_trend: Vec<TrendPoint>,
}

pub fn waitlist_summary(records: &[Record]) -> WaitlistSummary {
    let confirmed = records
        .iter()
        .filter(|r| field_equals(r, "status", "confirmed"))
        .count();
    let launched = records
        .iter()
        .filter(|r| field_equals(r, "status", "launched"))
        .count();
    let marketing_opt_in = records
        .iter()
        .filter(|r| resolve_bool(r, "marketingOptIn") == Some(true))
        .count();

    let mut city_stats: Vec<CityChartRow> = GroupSpec::by(GroupKey::field("city"))
        .derive("confirmed", |r| field_equals(r, "status", "confirmed"))
        .derive("launched", |r| field_equals(r, "status", "launched"))
        .run(records)
        .iter()
        .map(|bucket| CityChartRow {
            name: display_name(&bucket.key),
            total: bucket.count as u64,
            confirmed: bucket.derived("confirmed") as u64,
            launched: bucket.derived("launched") as u64,
        })
        .collect();
    city_stats.sort_by(|a, b| b.total.cmp(&a.total));

    let role_stats: Vec<RoleChartRow> = GroupSpec::by(GroupKey::field("role"))
        .run(records)
        .iter()
        .map(|bucket| RoleChartRow {
            name: display_name(&bucket.key),
            count: bucket.count as u64,
        })
        .collect();

    // 沒有可解析日期的記錄不畫在趨勢圖上
    let mut signup_trend: Vec<TrendPoint> = GroupSpec::by(GroupKey::day("createdAt"))
        .run(records)
        .iter()
        .filter(|bucket| !bucket.key.is_empty())
        .map(|bucket| TrendPoint {
            date: bucket.key.clone(),
            count: bucket.count as u64,
        })
        .collect();
    signup_trend.sort_by(|a, b| a.date.cmp(&b.date));

    WaitlistSummary {
        total: records.len(),
        confirmed,
        launched,
        marketing_opt_in,
        city_stats,
        role_stats,
        signup_trend,
    }
}
