//! Local-only report list used by the demo backend.
//!
//! The whole list lives as one JSON array under
//! [`DEMO_REPORTS_STORAGE_KEY`]; nothing leaves the machine.

use aasrah_shared::constants::DEMO_REPORTS_STORAGE_KEY;
use aasrah_shared::{NewReport, Report, ReportFilter, ReportId, ReportStore, ServiceError, StatusUpdate};
use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::local_storage::LocalStorage;

pub struct DemoReportStore {
    storage: LocalStorage,
}

impl DemoReportStore {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    fn all(&self) -> Result<Vec<Report>, ServiceError> {
        match self.storage.get_json::<Vec<Report>>(DEMO_REPORTS_STORAGE_KEY) {
            Ok(list) => Ok(list.unwrap_or_default()),
            Err(crate::StoreError::Json(e)) => {
                warn!(error = %e, "Demo report list unreadable, treating as empty");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl ReportStore for DemoReportStore {
    async fn query(&self, filter: &ReportFilter) -> Result<Vec<Report>, ServiceError> {
        let reports: Vec<Report> = self
            .all()?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();
        debug!(?filter, count = reports.len(), "Demo query");
        Ok(reports)
    }

    async fn create(&self, report: &NewReport) -> Result<ReportId, ServiceError> {
        let id = ReportId(Uuid::new_v4().simple().to_string());
        let record = report.clone().into_report(id.clone());
        self.storage
            .modify_json(DEMO_REPORTS_STORAGE_KEY, |list: &mut Vec<Report>| {
                list.push(record)
            })?;
        debug!(report_id = %id, "Demo report stored");
        Ok(id)
    }

    async fn update_status(
        &self,
        id: &ReportId,
        update: &StatusUpdate,
    ) -> Result<(), ServiceError> {
        let found = self
            .storage
            .modify_json(DEMO_REPORTS_STORAGE_KEY, |list: &mut Vec<Report>| {
                match list.iter_mut().find(|r| r.id == *id) {
                    Some(report) => {
                        report.apply_status(update);
                        true
                    }
                    None => false,
                }
            })?;
        if !found {
            return Err(ServiceError::NotFound(format!("report {id}")));
        }
        Ok(())
    }
}
