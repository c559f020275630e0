mod normalizer;
mod parser;

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use super::domain::{AttendanceRecord, MemberId, RaidEventId};

#[derive(Debug, thiserror::Error)]
pub enum AttendanceImportError {
    #[error("failed to read attendance export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid attendance CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("attendance row on line {line} rejected: {reason}")]
    InvalidRow { line: u64, reason: String },
}

/// Reads officer attendance exports into per-event records.
pub struct AttendanceImporter;

impl AttendanceImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<AttendanceRecord>, AttendanceImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Later rows for a member and raid already seen are ignored.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<AttendanceRecord>, AttendanceImportError> {
        let mut seen: HashSet<(MemberId, RaidEventId)> = HashSet::new();
        let mut records = Vec::new();

        for (line, record) in parser::parse_records(reader)? {
            let key = (record.member_id.clone(), record.raid_event_id.clone());
            if !seen.insert(key) {
                tracing::debug!(
                    line,
                    member_id = %record.member_id,
                    raid_event_id = %record.raid_event_id,
                    "skipping duplicate attendance row"
                );
                continue;
            }
            records.push(record);
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Cursor;

    const HEADER: &str = "Member ID,Raid ID,Raid Date,Signed Up,Attended,No Call No Show\n";

    #[test]
    fn parse_date_supports_rfc3339_and_date_strings() {
        assert_eq!(
            parser::parse_date_for_tests("2025-09-24T21:00:00Z"),
            NaiveDate::from_ymd_opt(2025, 9, 24)
        );
        assert_eq!(
            parser::parse_date_for_tests("2025-09-30"),
            NaiveDate::from_ymd_opt(2025, 9, 30)
        );
        assert!(parser::parse_date_for_tests("  ").is_none());
        assert!(parser::parse_date_for_tests("last tuesday").is_none());
    }

    #[test]
    fn identifiers_drop_invisible_characters() {
        assert_eq!(normalizer::normalize_for_tests("\u{feff} thrall \u{200b}"), "thrall");
    }

    #[test]
    fn flags_accept_officer_shorthand() {
        let csv = format!(
            "{HEADER}thrall,mc-1,2025-09-24,x,Yes,\nthrall,mc-2,2025-10-01,,no,1\n"
        );
        let records = AttendanceImporter::from_reader(Cursor::new(csv)).expect("import succeeds");

        assert_eq!(records.len(), 2);
        assert!(records[0].signed_up);
        assert!(records[0].attended);
        assert!(!records[0].no_call_no_show);
        assert!(!records[1].signed_up);
        assert!(!records[1].attended);
        assert!(records[1].no_call_no_show);
    }

    #[test]
    fn missing_no_show_column_defaults_to_false() {
        let csv = "Member ID,Raid ID,Raid Date,Signed Up,Attended\njaina,bwl-1,2025-09-24,y,y\n";
        let records = AttendanceImporter::from_reader(Cursor::new(csv)).expect("import succeeds");
        assert!(!records[0].no_call_no_show);
    }

    #[test]
    fn invalid_rows_name_their_line() {
        let csv = format!("{HEADER}thrall,mc-1,2025-09-24,y,y,\njaina,mc-1,someday,y,y,\n");
        match AttendanceImporter::from_reader(Cursor::new(csv)) {
            Err(AttendanceImportError::InvalidRow { line, reason }) => {
                assert_eq!(line, 3);
                assert!(reason.contains("someday"));
            }
            other => panic!("expected invalid row, got {other:?}"),
        }

        let csv = format!("{HEADER}thrall,mc-1,2025-09-24,maybe,y,\n");
        let err = AttendanceImporter::from_reader(Cursor::new(csv)).expect_err("flag rejected");
        assert!(err.to_string().contains("Signed Up"));
    }

    #[test]
    fn duplicate_rows_keep_the_first_entry() {
        let csv = format!(
            "{HEADER}thrall,mc-1,2025-09-24,y,y,\nthrall,mc-1,2025-09-24,y,,x\n"
        );
        let records = AttendanceImporter::from_reader(Cursor::new(csv)).expect("import succeeds");
        assert_eq!(records.len(), 1);
        assert!(records[0].attended);
        assert!(!records[0].no_call_no_show);
    }
}
