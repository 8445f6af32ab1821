use std::collections::BTreeMap;
use std::path::Path;

use tracing::{info, warn};

use crate::client::ApiClient;
use crate::error::FormError;
use crate::form::WeeklyPlanForm;
use crate::models::{MaterialDraft, MaterialType, WeeklyModFormData};
use crate::weeks::WeekValidation;

#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    week_number: i64,
    material_type: String,
    productivity_target: f64,
    production_volume: i64,
    #[serde(rename = "mod")]
    mod_count: i64,
}

/// Groups CSV rows into one draft per week, ordered by week.
pub fn read_plans(csv_path: &Path) -> anyhow::Result<Vec<WeeklyModFormData>> {
    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut drafts: BTreeMap<i64, (WeeklyModFormData, Vec<MaterialType>)> = BTreeMap::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        // header is line 1
        let line = index + 2;
        let material: MaterialType = row
            .material_type
            .parse()
            .map_err(|message| FormError::InvalidRow { row: line, message })?;

        let (draft, seen) = drafts.entry(row.week_number).or_insert_with(|| {
            (
                WeeklyModFormData {
                    week_number: row.week_number,
                    ..WeeklyModFormData::default()
                },
                Vec::new(),
            )
        });
        if seen.contains(&material) {
            return Err(FormError::InvalidRow {
                row: line,
                message: format!("duplicate {material} entry for week {}", row.week_number),
            }
            .into());
        }
        seen.push(material);
        *draft.material_mut(material) = MaterialDraft {
            productivity_target: row.productivity_target,
            production_volume: row.production_volume,
            mod_count: row.mod_count,
        };
    }

    Ok(drafts.into_values().map(|(draft, _)| draft).collect())
}

/// Creates every week found in the CSV. Weeks that already exist remotely
/// are skipped; any other validation failure aborts the import.
pub async fn import_csv(client: &ApiClient, csv_path: &Path) -> anyhow::Result<usize> {
    let drafts = read_plans(csv_path)?;
    let mut weeks = WeekValidation::new();
    weeks.refetch_weeks(client).await;

    let mut inserted = 0usize;
    for draft in drafts {
        let form = WeeklyPlanForm::from_draft(draft, weeks.clone());
        match form.validate() {
            Ok(()) => {}
            Err(FormError::WeekExists(week)) => {
                warn!(week, "week already exists, skipping");
                continue;
            }
            Err(err) => return Err(err.into()),
        }
        form.submit(client).await?;
        inserted += 1;
    }

    info!(inserted, "import finished");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{endpoints, ApiConfig};
    use crate::service::tests::{mount_get_all, week_46_payload};
    use serde_json::json;
    use std::io::Write;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn groups_rows_by_week() {
        let file = write_csv(
            "week_number,material_type,productivity_target,production_volume,mod\n\
             48,AL,5.0,7200,72\n\
             47,CU,5.5,45000,330\n\
             48,cu,5.2,41000,315\n",
        );

        let drafts = read_plans(file.path()).unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].week_number, 47);
        assert_eq!(drafts[0].al_data, MaterialDraft::default());
        assert_eq!(drafts[1].cu_data.production_volume, 41000);
        assert_eq!(drafts[1].al_data.mod_count, 72);
    }

    #[test]
    fn rejects_unknown_material() {
        let file = write_csv(
            "week_number,material_type,productivity_target,production_volume,mod\n\
             48,ZN,5.0,7200,72\n",
        );

        let err = read_plans(file.path()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<FormError>(),
            Some(&FormError::InvalidRow {
                row: 2,
                message: "unknown material type 'ZN'".to_string()
            })
        );
    }

    #[test]
    fn rejects_duplicate_material_for_a_week() {
        let file = write_csv(
            "week_number,material_type,productivity_target,production_volume,mod\n\
             48,CU,5.0,7200,72\n\
             48,CU,5.1,7300,73\n",
        );

        let err = read_plans(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("row 3:"));
    }

    #[tokio::test]
    async fn skips_weeks_that_already_exist() {
        let server = MockServer::start().await;
        mount_get_all(&server, week_46_payload()).await;
        Mock::given(method("POST"))
            .and(path(endpoints::CREATE))
            .and(body_partial_json(json!({"weekNumber": 47})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        let client = ApiClient::new(ApiConfig::new(server.uri())).unwrap();

        let file = write_csv(
            "week_number,material_type,productivity_target,production_volume,mod\n\
             46,CU,5.2,40000,311\n\
             47,CU,5.5,45000,330\n",
        );

        let inserted = import_csv(&client, file.path()).await.unwrap();
        assert_eq!(inserted, 1);
    }

    #[tokio::test]
    async fn out_of_range_week_aborts() {
        let server = MockServer::start().await;
        mount_get_all(&server, json!([])).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;
        let client = ApiClient::new(ApiConfig::new(server.uri())).unwrap();

        let file = write_csv(
            "week_number,material_type,productivity_target,production_volume,mod\n\
             60,CU,5.2,40000,311\n",
        );

        let err = import_csv(&client, file.path()).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<FormError>(),
            Some(&FormError::WeekOutOfRange(60))
        );
    }
}
