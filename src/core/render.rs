use std::path::PathBuf;

use tracing::info;

use crate::{core::report::ReportPayload, storage::Result, utils::persistence::write_atomic};

const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";

/// Where a rendered report ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedReport {
    pub location: PathBuf,
    pub bytes: usize,
}

/// External backend that turns a payload into a document (chart, PDF, file).
pub trait RenderSurface: Send + Sync {
    fn render(&self, payload: &ReportPayload) -> Result<RenderedReport>;
}

/// Writes payloads as pretty JSON files, one per export.
#[derive(Debug, Clone)]
pub struct JsonReportSurface {
    dir: PathBuf,
}

impl JsonReportSurface {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn file_name(payload: &ReportPayload) -> String {
        format!(
            "report_{}_{}.json",
            payload.period,
            payload.generated_at.format(FILE_TIMESTAMP_FORMAT)
        )
    }
}

impl RenderSurface for JsonReportSurface {
    fn render(&self, payload: &ReportPayload) -> Result<RenderedReport> {
        let json = serde_json::to_string_pretty(payload)?;
        let location = self.dir.join(Self::file_name(payload));
        write_atomic(&location, &json)?;
        info!(path = %location.display(), entries = payload.entry_count, "exported report");
        Ok(RenderedReport {
            location,
            bytes: json.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::report::ReportComposer,
        domain::{CategoryTable, NewExpense, Period, TimeWindow},
    };
    use chrono::NaiveDate;
    use tempfile::tempdir;

    #[test]
    fn writes_named_json_file() {
        let dir = tempdir().unwrap();
        let now = NaiveDate::from_ymd_opt(2024, 7, 2)
            .unwrap()
            .and_hms_opt(21, 5, 0)
            .unwrap();
        let rows = vec![NewExpense::new(90.0, "метро", "Транспорт", now).into_expense(1)];
        let payload = ReportComposer::default().payload(
            Period::Week,
            TimeWindow::new(now, now).unwrap(),
            &rows,
            &CategoryTable::default(),
            now,
        );

        let surface = JsonReportSurface::new(dir.path().join("reports"));
        let rendered = surface.render(&payload).unwrap();
        assert!(rendered.location.ends_with("report_week_20240702_2105.json"));

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&rendered.location).unwrap()).unwrap();
        assert_eq!(written["chart"]["labels"][0], "Транспорт");
        assert_eq!(written["details"][0]["index"], 1);
    }
}
