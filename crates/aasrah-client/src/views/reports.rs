use aasrah_shared::Report;

use super::heading;
use crate::commands::reports::MyReports;

/// One report as a short card.
pub fn card(report: &Report) -> String {
    let category = report.animal_type.as_deref().unwrap_or("Uncategorised");
    let mut out = format!(
        "  [{}] {} | {} | {}\n    {}\n    at {}\n",
        report.id.short(),
        category,
        report.status,
        report.created_at.format("%Y-%m-%d %H:%M"),
        report.description,
        report.location,
    );
    if let Some(image) = &report.image {
        out.push_str(&format!("    photo {image}\n"));
    }
    out
}

pub fn my_reports(mine: &MyReports) -> String {
    let mut out = heading(&format!("Reports for {}", mine.email));
    if mine.reports.is_empty() {
        out.push_str("No reports yet. File one at /report\n");
    }
    for report in &mine.reports {
        out.push_str(&card(report));
    }
    out
}
