use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::aggregate;
use crate::client::{ApiClient, RequestBody};
use crate::config::endpoints;
use crate::error::{ApiError, ApiResult};
use crate::models::{Acknowledgement, WeeklyModFormData, WeeklyRecord};

pub async fn get_all(client: &ApiClient) -> ApiResult<Vec<WeeklyRecord>> {
    client
        .get(endpoints::GET_ALL)
        .await?
        .ok_or_else(|| ApiError::MissingBody {
            endpoint: endpoints::GET_ALL.to_string(),
        })
}

pub async fn get_by_week(client: &ApiClient, week: i64) -> ApiResult<Vec<WeeklyRecord>> {
    let endpoint = format!("{}/{week}", endpoints::GET_BY_WEEK);
    client
        .get(&endpoint)
        .await?
        .ok_or(ApiError::MissingBody { endpoint })
}

/// Distinct week numbers, ascending. Refetches the full list every call.
pub async fn get_existing_weeks(client: &ApiClient) -> ApiResult<Vec<i64>> {
    let records = get_all(client).await?;
    Ok(aggregate::unique_weeks(&records))
}

pub async fn create(client: &ApiClient, draft: &WeeklyModFormData) -> ApiResult<Acknowledgement> {
    let body = client
        .post(endpoints::CREATE, RequestBody::json(draft)?)
        .await?;
    info!(week = draft.week_number, "weekly plan created");
    Ok(Acknowledgement::from_body(body))
}

pub async fn update(
    client: &ApiClient,
    week: i64,
    draft: &WeeklyModFormData,
) -> ApiResult<Acknowledgement> {
    let endpoint = format!("{}/{week}", endpoints::UPDATE);
    let body = client.put(&endpoint, RequestBody::json(draft)?).await?;
    info!(week, "weekly plan updated");
    Ok(Acknowledgement::from_body(body))
}

pub fn report_filename(week: i64, requested_on: NaiveDate) -> String {
    format!(
        "Reporte_Semana_{week}_{}.xlsx",
        requested_on.format("%Y-%m-%d")
    )
}

pub async fn download_weekly_report(client: &ApiClient, week: i64) -> ApiResult<PathBuf> {
    download_weekly_report_on(client, week, Utc::now().date_naive()).await
}

pub async fn download_weekly_report_on(
    client: &ApiClient,
    week: i64,
    requested_on: NaiveDate,
) -> ApiResult<PathBuf> {
    let filename = report_filename(week, requested_on);
    let endpoint = format!("{}/{week}", endpoints::DOWNLOAD_REPORT);
    client.download(&endpoint, &filename, None).await
}
