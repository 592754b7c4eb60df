//! CSV export of the student and request lists.
//!
//! Files are named `<entity>_<YYYYMMDD>.csv` inside the configured export
//! directory. An empty list writes nothing and leaves a warning instead.

use chrono::{Local, NaiveDate};
use log::info;
use serde::Serialize;
use shared::{Request, RequestTaxonomy, Student};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::AdminResult;
use crate::services::notifications::NotificationCenter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written { path: PathBuf, rows: usize },
    NoData,
}

#[derive(Serialize)]
struct StudentRow<'a> {
    roll_number: &'a str,
    name: &'a str,
    dob: &'a str,
    gender: String,
    address: &'a str,
    parent: &'a str,
    bus: &'a str,
    checkpoint: &'a str,
    status: String,
}

impl<'a> From<&'a Student> for StudentRow<'a> {
    fn from(s: &'a Student) -> Self {
        Self {
            roll_number: &s.roll_number,
            name: &s.name,
            dob: &s.dob,
            gender: format!("{:?}", s.gender).to_uppercase(),
            address: &s.address,
            parent: s.parent.as_ref().map(|p| p.full_name.as_str()).unwrap_or(""),
            bus: s.bus_name.as_deref().unwrap_or(""),
            checkpoint: s.checkpoint_name.as_deref().unwrap_or(""),
            status: format!("{:?}", s.status).to_uppercase(),
        }
    }
}

#[derive(Serialize)]
struct RequestRow<'a> {
    request_id: &'a str,
    category: &'static str,
    student: &'a str,
    from_date: &'a str,
    to_date: &'a str,
    checkpoint: &'a str,
    reason: &'a str,
    status: String,
    reply: &'a str,
}

impl<'a> RequestRow<'a> {
    fn new(r: &'a Request, taxonomy: &RequestTaxonomy) -> Self {
        Self {
            request_id: &r.request_id,
            category: taxonomy.classify(&r.request_type_id).label(),
            student: r
                .student_name
                .as_deref()
                .or(r.student_id.as_deref())
                .unwrap_or(""),
            from_date: r.from_date.as_deref().unwrap_or(""),
            to_date: r.to_date.as_deref().unwrap_or(""),
            checkpoint: r
                .checkpoint_name
                .as_deref()
                .or(r.checkpoint_id.as_deref())
                .unwrap_or(""),
            reason: &r.reason,
            status: r.status.to_string(),
            reply: r.reply.as_deref().unwrap_or(""),
        }
    }
}

pub fn export_file_name(entity: &str, day: NaiveDate) -> String {
    format!("{}_{}.csv", entity, day.format("%Y%m%d"))
}

pub struct CsvExporter {
    dir: PathBuf,
}

impl CsvExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn export_students(
        &self,
        students: &[Student],
        notifications: &mut NotificationCenter,
    ) -> AdminResult<ExportOutcome> {
        let rows: Vec<StudentRow> = students.iter().map(StudentRow::from).collect();
        self.write_rows("students", &rows, notifications)
    }

    pub fn export_requests(
        &self,
        requests: &[Request],
        taxonomy: &RequestTaxonomy,
        notifications: &mut NotificationCenter,
    ) -> AdminResult<ExportOutcome> {
        let rows: Vec<RequestRow> = requests
            .iter()
            .map(|r| RequestRow::new(r, taxonomy))
            .collect();
        self.write_rows("requests", &rows, notifications)
    }

    fn write_rows<R: Serialize>(
        &self,
        entity: &str,
        rows: &[R],
        notifications: &mut NotificationCenter,
    ) -> AdminResult<ExportOutcome> {
        if rows.is_empty() {
            notifications.warning(format!("No data to export for {}", entity));
            return Ok(ExportOutcome::NoData);
        }

        let path = self
            .dir
            .join(export_file_name(entity, Local::now().date_naive()));
        info!("📄 Exporting {} {} to {}", rows.len(), entity, path.display());

        match write_csv(&self.dir, &path, rows) {
            Ok(()) => {
                notifications.success(format!(
                    "Exported {} {} to {}",
                    rows.len(),
                    entity,
                    path.display()
                ));
                Ok(ExportOutcome::Written {
                    path,
                    rows: rows.len(),
                })
            }
            Err(e) => {
                notifications.error(format!("Export of {} failed: {}", entity, e));
                Err(e)
            }
        }
    }
}

fn write_csv<R: Serialize>(dir: &Path, path: &Path, rows: &[R]) -> AdminResult<()> {
    fs::create_dir_all(dir)?;
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
