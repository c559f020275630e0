use super::normalizer::{normalize_identifier, parse_flag};
use crate::workflows::loot::domain::{AttendanceRecord, MemberId, RaidEventId};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};
use std::io::Read;

use super::AttendanceImportError;

pub(crate) fn parse_records<R: Read>(
    reader: R,
) -> Result<Vec<(u64, AttendanceRecord)>, AttendanceImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut records = Vec::new();

    for result in csv_reader.records() {
        let raw = result?;
        let line = raw.position().map(|position| position.line()).unwrap_or(0);
        let row: AttendanceRow = raw.deserialize(Some(&headers))?;
        records.push((line, row.into_record(line)?));
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct AttendanceRow {
    #[serde(rename = "Member ID")]
    member_id: String,
    #[serde(rename = "Raid ID")]
    raid_id: String,
    #[serde(rename = "Raid Date")]
    raid_date: String,
    #[serde(rename = "Signed Up", default, deserialize_with = "empty_string_as_none")]
    signed_up: Option<String>,
    #[serde(rename = "Attended", default, deserialize_with = "empty_string_as_none")]
    attended: Option<String>,
    #[serde(
        rename = "No Call No Show",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    no_call_no_show: Option<String>,
}

impl AttendanceRow {
    fn into_record(self, line: u64) -> Result<AttendanceRecord, AttendanceImportError> {
        let invalid = |reason: String| AttendanceImportError::InvalidRow { line, reason };

        let member_id = normalize_identifier(&self.member_id);
        if member_id.is_empty() {
            return Err(invalid("member id is blank".to_string()));
        }
        let raid_id = normalize_identifier(&self.raid_id);
        if raid_id.is_empty() {
            return Err(invalid("raid id is blank".to_string()));
        }
        let raid_date = parse_date(&self.raid_date)
            .ok_or_else(|| invalid(format!("unrecognized raid date '{}'", self.raid_date)))?;

        let flag = |column: &str, value: Option<String>| {
            parse_flag(value.as_deref()).ok_or_else(|| {
                invalid(format!(
                    "{column} value '{}' is not yes or no",
                    value.unwrap_or_default()
                ))
            })
        };

        Ok(AttendanceRecord {
            member_id: MemberId::new(member_id),
            raid_event_id: RaidEventId::new(raid_id),
            raid_date,
            signed_up: flag("Signed Up", self.signed_up)?,
            attended: flag("Attended", self.attended)?,
            no_call_no_show: flag("No Call No Show", self.no_call_no_show)?,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc().date());
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}

#[cfg(test)]
pub(crate) fn parse_date_for_tests(value: &str) -> Option<NaiveDate> {
    parse_date(value)
}
