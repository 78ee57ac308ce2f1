use aasrah_shared::User;

use super::reports::card;
use super::{heading, stat};
use crate::poller::{Bucket, Buckets};

pub fn user(user: &User) -> String {
    let mut out = heading(&format!("Welcome back, {}!", user.display_name()));
    out.push_str(&stat("Total Reports", "24", "+2 this week"));
    out.push_str(&stat("Total Donations", "₹45,230", "+12% from last month"));
    out.push_str(
        "\nActions\n  /report      Report an emergency\n  /donate      Donate\n  /my-reports  My reports\n",
    );
    out
}

pub fn ngo(buckets: &Buckets) -> String {
    let mut out = heading("Hello Saviours!");
    out.push_str("Your dedication saves lives every day\n");
    for bucket in Bucket::ALL {
        let reports = buckets.get(bucket);
        out.push_str(&format!("\n{} ({})\n", bucket.title(), reports.len()));
        if reports.is_empty() {
            out.push_str("  (none)\n");
        }
        for report in reports {
            out.push_str(&card(report));
            match bucket {
                Bucket::New => out.push_str(&format!(
                    "    accept {id} | decline {id}\n",
                    id = report.id.short()
                )),
                Bucket::InProgress => {
                    out.push_str(&format!("    complete {}\n", report.id.short()))
                }
                Bucket::Completed => {}
            }
        }
    }
    out.push('\n');
    out.push_str(&stat("Total Donations Received", "₹25,000", "+15% from last month"));
    out.push_str(&stat("Total Reports Completed", "156", "+8% from last month"));
    out
}

const ADMIN_TOOLS: [(&str, &str); 6] = [
    ("NGO Management", "Verify and manage registered NGOs"),
    ("Report Analytics", "Trends across submitted reports"),
    ("System Monitor", "Service health and alerts"),
    ("System Settings", "Platform configuration"),
    ("Content Moderation", "Review flagged content"),
    ("Performance Reports", "NGO response metrics"),
];

pub fn admin() -> String {
    let mut out = heading("Admin Dashboard");
    out.push_str("System monitoring and management tools for platform administration\n\n");
    out.push_str(&stat("Total NGOs", "156", "+12 this month"));
    out.push_str(&stat("Active Reports", "89", "23 pending review"));
    out.push_str(&stat("System Uptime", "99.9%", "Last 30 days"));
    out.push_str(&stat("Response Time", "2.3min", "Average"));
    out.push_str("\nAdmin Tools\n");
    for (name, blurb) in ADMIN_TOOLS {
        out.push_str(&format!("  {name:<22} {blurb}\n"));
    }
    out
}
