use std::path::Path;

use aasrah_shared::constants::{MAX_IMAGE_SIZE, REPORT_IMAGE_PREFIX};
use aasrah_shared::validation::require;
use aasrah_shared::{
    Coordinates, NewReport, Report, ReportFilter, ReportId, ReportStatus, ValidationError,
};
use bytes::Bytes;
use chrono::Utc;
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::events::Toast;
use crate::router::Route;
use crate::state::AppState;

/// Photo attached to a report form.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl ImageAttachment {
    pub async fn from_path(path: &Path) -> Result<Self> {
        let data = tokio::fs::read(path)
            .await
            .map_err(aasrah_store::StoreError::from)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self {
            content_type: content_type_for(&file_name).to_string(),
            file_name,
            data: Bytes::from(data),
        })
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

/// Object key of an uploaded photo: `report-images/<unix millis>_<file name>`.
pub fn image_key(millis: i64, file_name: &str) -> String {
    format!("{REPORT_IMAGE_PREFIX}/{millis}_{file_name}")
}

#[derive(Debug, Clone, Default)]
pub struct ReportForm {
    pub description: String,
    pub animal_type: Option<String>,
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub image: Option<ImageAttachment>,
}

/// Upload the photo (if any), then write the report with status
/// `Submitted`. A failed document write after a successful upload leaves the
/// object behind.
pub async fn submit_report(state: &AppState, form: ReportForm) -> Result<ReportId> {
    let Some(user) = state.current_user() else {
        let err = AppError::Auth("Please log in to submit a report.".to_string());
        state.fail("Authentication Error", &err);
        state.events.navigate(Route::UserRegistration);
        return Err(err);
    };

    match write_report(state, &user, form).await {
        Ok(id) => {
            info!(report_id = %id, "Report submitted");
            state.events.toast(Toast::info(
                "Report Submitted Successfully!",
                "Your emergency report has been sent to nearby NGOs. Help is on the way.",
            ));
            state.events.navigate(Route::MyReports);
            Ok(id)
        }
        Err(e) => {
            tracing::error!(error = %e, "Report submission failed");
            state.events.toast(Toast::error(
                "Error",
                "Failed to submit report. Please try again.",
            ));
            Err(e)
        }
    }
}

async fn write_report(state: &AppState, user: &aasrah_shared::User, form: ReportForm) -> Result<ReportId> {
    let description = require(&form.description, "Description")?.to_string();
    let location = require(&form.location, "Location")?.to_string();
    let animal_type = form
        .animal_type
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    let image = match form.image {
        Some(attachment) => {
            if attachment.data.len() > MAX_IMAGE_SIZE {
                return Err(ValidationError::ImageTooLarge {
                    size: attachment.data.len(),
                    max: MAX_IMAGE_SIZE,
                }
                .into());
            }
            let key = image_key(Utc::now().timestamp_millis(), &attachment.file_name);
            let url = state
                .services
                .objects
                .upload(&key, attachment.data, &attachment.content_type)
                .await?;
            debug!(%key, "Report image uploaded");
            Some(url)
        }
        None => None,
    };

    let now = Utc::now();
    let report = NewReport {
        description,
        animal_type,
        location,
        coordinates: form.coordinates,
        image,
        date: now,
        created_at: now,
        status: ReportStatus::Submitted,
        user_id: user.id.clone().unwrap_or_default(),
        user_email: user.email.clone(),
    };
    Ok(state.services.reports.create(&report).await?)
}

#[derive(Debug, Clone, PartialEq)]
pub struct MyReports {
    pub email: String,
    /// Newest first.
    pub reports: Vec<Report>,
}

/// Reports filed by the signed-in user, or by `search_email` for admins.
pub async fn my_reports(state: &AppState, search_email: Option<&str>) -> Result<MyReports> {
    let Some(user) = state.current_user() else {
        let err = AppError::Auth("Please log in to view reports.".to_string());
        state.fail("Authentication Required", &err);
        state.events.navigate(Route::UserRegistration);
        return Err(err);
    };

    let email = match search_email {
        None => user.email.clone(),
        Some(_) if !state.is_admin(&user) => {
            let err = AppError::Forbidden(aasrah_shared::Role::Admin);
            state.fail("Access Denied", &err);
            return Err(err);
        }
        Some(email) => match require(email, "Email") {
            Ok(email) => email.to_string(),
            Err(e) => {
                let err = AppError::from(e);
                state.fail("Email Required", &err);
                return Err(err);
            }
        },
    };

    let mut reports = match state
        .services
        .reports
        .query(&ReportFilter::OwnerEmail(email.clone()))
        .await
    {
        Ok(reports) => reports,
        Err(e) => {
            let err = AppError::from(e);
            tracing::error!(error = %err, "Failed to fetch reports");
            state.events.toast(Toast::error(
                "Error",
                "Failed to fetch reports. Please try again.",
            ));
            return Err(err);
        }
    };
    reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    if reports.is_empty() {
        state.events.toast(Toast::info(
            "No Reports Found",
            format!("No reports found for email: {email}"),
        ));
    } else {
        state.events.toast(Toast::info(
            "Reports Found",
            format!("Found {} reports for {email}", reports.len()),
        ));
    }
    Ok(MyReports { email, reports })
}
