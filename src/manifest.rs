use crate::error::ReportError;
use crate::types::ReportFile;
use std::path::Path;

/// Writes one CSV row per listed file.
pub async fn write_manifest(files: &[ReportFile], path: &Path) -> Result<(), ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ReportError::IoError(e))?;
    }

    let mut wtr = csv::WriterBuilder::new().from_path(path)?;
    wtr.write_record([
        "ID",
        "Report ID",
        "File Name",
        "Format",
        "Status",
        "Last Modified",
        "Start Date",
        "End Date",
        "Browser URL",
    ])?;

    for file in files {
        wtr.write_record([
            file.id.clone(),
            file.report_id.clone(),
            file.file_name_or_empty().to_string(),
            file.format.to_string(),
            file.status.to_string(),
            file.last_modified_time.clone().unwrap_or_default(),
            file.date_range.as_ref().and_then(|r| r.start_date.clone()).unwrap_or_default(),
            file.date_range.as_ref().and_then(|r| r.end_date.clone()).unwrap_or_default(),
            file.browser_url().unwrap_or_default().to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DateRange, FileFormat, FileStatus, FileUrls};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_manifest_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("files.csv");
        let files = vec![
            ReportFile {
                id: "1".into(),
                report_id: "100".into(),
                file_name: Some("weekly, EU".into()),
                format: FileFormat::Csv,
                status: FileStatus::ReportAvailable,
                last_modified_time: Some("1700000000000".into()),
                date_range: Some(DateRange {
                    start_date: Some("2024-01-01".into()),
                    end_date: Some("2024-01-07".into()),
                }),
                urls: Some(FileUrls {
                    browser_url: Some("https://example.test/5".into()),
                }),
            },
            ReportFile {
                id: "2".into(),
                report_id: "100".into(),
                file_name: None,
                format: FileFormat::Xml,
                status: FileStatus::Processing,
                last_modified_time: None,
                date_range: None,
                urls: None,
            },
        ];

        write_manifest(&files, &path).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(
            lines[0],
            "ID,Report ID,File Name,Format,Status,Last Modified,Start Date,End Date,Browser URL"
        );
        assert_eq!(
            lines[1],
            "1,100,\"weekly, EU\",CSV,REPORT_AVAILABLE,1700000000000,2024-01-01,2024-01-07,https://example.test/5"
        );
        assert_eq!(lines[2], "2,100,,XML,PROCESSING,,,,");
    }
}
