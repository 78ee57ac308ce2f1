//! The `reports` collection in Firestore.

use std::sync::Arc;

use aasrah_shared::{
    constants::REPORTS_COLLECTION, NewReport, Report, ReportFilter, ReportId, ReportStore,
    ServiceError, StatusUpdate,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use super::auth::FirebaseAuth;
use super::value::{new_report_fields, report_from_document, status_fields, Document, Fields, Value};
use super::{check, invalid, network, FirebaseConfig};

#[derive(Deserialize)]
struct RunQueryItem {
    #[serde(default)]
    document: Option<Document>,
}

#[derive(Serialize)]
struct WriteBody<'a> {
    fields: &'a Fields,
}

fn structured_query(filter: &ReportFilter) -> serde_json::Value {
    let (field, value) = filter.clause();
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": REPORTS_COLLECTION }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": field },
                    "op": "EQUAL",
                    "value": Value::string(value),
                }
            }
        }
    })
}

pub struct FirestoreReports {
    http: reqwest::Client,
    auth: Arc<FirebaseAuth>,
    documents_url: String,
}

impl FirestoreReports {
    pub fn new(http: reqwest::Client, auth: Arc<FirebaseAuth>, config: &FirebaseConfig) -> Self {
        Self {
            http,
            auth,
            documents_url: config.documents_url(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.documents_url, REPORTS_COLLECTION)
    }
}

#[async_trait]
impl ReportStore for FirestoreReports {
    async fn query(&self, filter: &ReportFilter) -> Result<Vec<Report>, ServiceError> {
        let token = self.auth.id_token().await?;
        let resp = self
            .http
            .post(format!("{}:runQuery", self.documents_url))
            .bearer_auth(token)
            .json(&structured_query(filter))
            .send()
            .await
            .map_err(network)?;
        let items: Vec<RunQueryItem> = check(resp).await?.json().await.map_err(invalid)?;

        let reports: Vec<Report> = items
            .into_iter()
            .filter_map(|item| item.document)
            .filter_map(|doc| match report_from_document(&doc) {
                Ok(report) => Some(report),
                Err(e) => {
                    warn!(name = %doc.name, error = %e, "Skipping undecodable report");
                    None
                }
            })
            .collect();

        debug!(?filter, count = reports.len(), "Queried reports");
        Ok(reports)
    }

    async fn create(&self, report: &NewReport) -> Result<ReportId, ServiceError> {
        let token = self.auth.id_token().await?;
        let fields = new_report_fields(report);
        let resp = self
            .http
            .post(self.collection_url())
            .bearer_auth(token)
            .json(&WriteBody { fields: &fields })
            .send()
            .await
            .map_err(network)?;
        let doc: Document = check(resp).await?.json().await.map_err(invalid)?;

        let id = doc
            .id()
            .map(ReportId::from)
            .ok_or_else(|| ServiceError::InvalidResponse("Created document has no name".into()))?;
        debug!(%id, "Created report document");
        Ok(id)
    }

    async fn update_status(
        &self,
        id: &ReportId,
        update: &StatusUpdate,
    ) -> Result<(), ServiceError> {
        let token = self.auth.id_token().await?;
        let (fields, mask) = status_fields(update);

        let mut params: Vec<(&str, &str)> = mask
            .iter()
            .map(|field| ("updateMask.fieldPaths", *field))
            .collect();
        params.push(("currentDocument.exists", "true"));

        let resp = self
            .http
            .patch(format!("{}/{}", self.collection_url(), id))
            .bearer_auth(token)
            .query(&params)
            .json(&WriteBody { fields: &fields })
            .send()
            .await
            .map_err(network)?;

        match check(resp).await {
            Ok(_) => {
                debug!(%id, status = %update.status, "Updated report status");
                Ok(())
            }
            Err(ServiceError::Rejected { status: 404, .. }) => {
                Err(ServiceError::NotFound(format!("report {id}")))
            }
            Err(e) => Err(e),
        }
    }
}
