//! Pre-joined attendance rows from the operational store.
//!
//! The store hands the engine a flat row set, one row per entry or exit
//! mark, already joined with employee, area, location and shift data. The
//! column names below are the documented contract; every nullable column is
//! kept optional because a null carries meaning (a null `TipoPermiso` means
//! no leave on that day).
//!
//! Times of day are joined to `Fecha`, the schedule date. An exit time
//! earlier on the clock than the shift's entry belongs to the following
//! calendar day, so exit conversions take the shift entry as an anchor.
//! [`punches_from_rows`] and [`classified_from_rows`] read that anchor from
//! the entry row of the same employee and date.

use std::collections::HashMap;

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

use super::{
    parse_time_of_day, ClassifiedPunch, LeaveFact, LeaveKind, ManualAdjustment, Punch,
    PunchType, PunctualityState,
};
use crate::error::{EngineError, EngineResult};

/// One row of the attendance row set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRow {
    /// Employee identifier.
    #[serde(rename = "IdEmpleado", deserialize_with = "id_string")]
    pub employee_id: String,
    /// Area identifier.
    #[serde(rename = "IdArea", default, deserialize_with = "optional_id_string")]
    pub area_id: Option<String>,
    /// Location identifier.
    #[serde(rename = "IdUbicacion", default, deserialize_with = "optional_id_string")]
    pub location_id: Option<String>,
    /// Schedule date of the row.
    #[serde(rename = "Fecha")]
    pub date: NaiveDate,
    /// Shift name.
    #[serde(rename = "NombreTurno", default)]
    pub shift_name: Option<String>,
    /// Entry or exit mark.
    #[serde(rename = "TipoMarcacion", default)]
    pub punch_type: Option<PunchType>,
    /// Expected time of day, `HH:MM[:SS]`.
    #[serde(rename = "HoraEsperada", default)]
    pub expected_time: Option<String>,
    /// Actual time of day, `HH:MM[:SS]`.
    #[serde(rename = "HoraMarcacion", default)]
    pub actual_time: Option<String>,
    /// Full punch timestamp, preferred over `actual_time` when present.
    #[serde(rename = "FechaHoraMarcacion", default)]
    pub actual_timestamp: Option<NaiveDateTime>,
    /// Minutes late as computed upstream.
    #[serde(rename = "MinutosTardanza", default)]
    pub minutes_late: Option<i64>,
    /// Minutes early as computed upstream.
    #[serde(rename = "MinutosAdelanto", default)]
    pub minutes_early: Option<i64>,
    /// State label.
    #[serde(rename = "Estado", default)]
    pub state: Option<String>,
    /// Permit-type label; null means no leave.
    #[serde(rename = "TipoPermiso", default)]
    pub permit_type: Option<String>,
    /// Reason of a manual correction.
    #[serde(rename = "MotivoManual", default)]
    pub manual_reason: Option<String>,
    /// Approver of a manual correction.
    #[serde(rename = "AprobadoPor", default)]
    pub approver: Option<String>,
    /// Punch source (device, web, manual).
    #[serde(rename = "Origen", default)]
    pub source: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdValue {
    Text(String),
    Number(i64),
}

impl From<IdValue> for String {
    fn from(value: IdValue) -> Self {
        match value {
            IdValue::Text(s) => s,
            IdValue::Number(n) => n.to_string(),
        }
    }
}

fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    IdValue::deserialize(deserializer).map(String::from)
}

fn optional_id_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Option::<IdValue>::deserialize(deserializer).map(|v| v.map(String::from))
}

/// Parses a JSON row set.
///
/// # Example
///
/// ```
/// use attendance_engine::models::parse_rows;
///
/// let rows = parse_rows(r#"[
///     {"IdEmpleado": 17, "Fecha": "2024-01-08", "TipoMarcacion": "Entrada",
///      "HoraEsperada": "08:00", "HoraMarcacion": "08:20", "TipoPermiso": null}
/// ]"#).unwrap();
///
/// assert_eq!(rows[0].employee_id, "17");
/// assert!(rows[0].leave_fact().is_none());
/// ```
pub fn parse_rows(json: &str) -> EngineResult<Vec<AttendanceRow>> {
    serde_json::from_str(json).map_err(|e| EngineError::MalformedRow {
        row: format!("line {}", e.line()),
        message: e.to_string(),
    })
}

/// Converts a row set into raw punches, placing overnight exits on the
/// day after their schedule date.
pub fn punches_from_rows(rows: &[AttendanceRow]) -> EngineResult<Vec<Punch>> {
    let anchors = shift_entries(rows)?;
    let mut punches = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(punch) = row.to_punch(row.anchor_in(&anchors))? {
            punches.push(punch);
        }
    }
    Ok(punches)
}

/// Reads a row set classified upstream, anchoring exit rows the same way
/// as [`punches_from_rows`].
pub fn classified_from_rows(rows: &[AttendanceRow]) -> EngineResult<Vec<ClassifiedPunch>> {
    let anchors = shift_entries(rows)?;
    rows.iter()
        .map(|row| row.to_classified(row.anchor_in(&anchors)))
        .collect()
}

type AnchorMap<'r> = HashMap<(&'r str, NaiveDate), NaiveTime>;

/// Shift entry per employee and schedule date, from the first non-exit row
/// that carries a time.
fn shift_entries(rows: &[AttendanceRow]) -> EngineResult<AnchorMap<'_>> {
    let mut anchors = AnchorMap::new();
    for row in rows {
        if row.punch_type == Some(PunchType::Exit) {
            continue;
        }
        let key = (row.employee_id.as_str(), row.date);
        if anchors.contains_key(&key) {
            continue;
        }
        if let Some(entry) = row.shift_entry()? {
            anchors.insert(key, entry);
        }
    }
    Ok(anchors)
}

impl AttendanceRow {
    fn key(&self) -> String {
        format!("{}@{}", self.employee_id, self.date)
    }

    fn anchor_in(&self, anchors: &AnchorMap<'_>) -> Option<NaiveTime> {
        anchors.get(&(self.employee_id.as_str(), self.date)).copied()
    }

    fn parse_time(&self, value: &str) -> EngineResult<NaiveTime> {
        parse_time_of_day(value, &format!("row {}", self.key()))
    }

    /// The shift entry time this row implies: the expected time, else the
    /// punch time. Exit rows imply none.
    pub fn shift_entry(&self) -> EngineResult<Option<NaiveTime>> {
        if self.punch_type == Some(PunchType::Exit) {
            return Ok(None);
        }
        self.expected_time
            .as_deref()
            .or(self.actual_time.as_deref())
            .map(|t| self.parse_time(t))
            .transpose()
    }

    fn time_on_date(
        &self,
        value: &str,
        shift_entry: Option<NaiveTime>,
    ) -> EngineResult<NaiveDateTime> {
        let time = self.parse_time(value)?;
        let next_day = self.punch_type == Some(PunchType::Exit)
            && shift_entry.is_some_and(|entry| time < entry);
        if !next_day {
            return Ok(self.date.and_time(time));
        }
        self.date
            .checked_add_days(Days::new(1))
            .map(|date| date.and_time(time))
            .ok_or_else(|| EngineError::MalformedRow {
                row: self.key(),
                message: "exit date out of range".to_string(),
            })
    }

    /// The recorded punch timestamp, if the row carries one.
    ///
    /// `FechaHoraMarcacion` is taken as is. Otherwise `HoraMarcacion` is
    /// joined to `Fecha`, moving to the next day for an exit earlier than
    /// `shift_entry`.
    pub fn punch_timestamp(
        &self,
        shift_entry: Option<NaiveTime>,
    ) -> EngineResult<Option<NaiveDateTime>> {
        if let Some(ts) = self.actual_timestamp {
            return Ok(Some(ts));
        }
        self.actual_time
            .as_deref()
            .map(|t| self.time_on_date(t, shift_entry))
            .transpose()
    }

    /// Converts the row into a raw punch, if it carries a punch time.
    ///
    /// A manual reason together with an approver becomes an approved
    /// adjustment at the same timestamp, so the reason reaches the
    /// classified record as its remark.
    pub fn to_punch(&self, shift_entry: Option<NaiveTime>) -> EngineResult<Option<Punch>> {
        let Some(timestamp) = self.punch_timestamp(shift_entry)? else {
            return Ok(None);
        };
        let adjustment = match (&self.manual_reason, &self.approver) {
            (Some(reason), Some(approver)) => Some(ManualAdjustment {
                timestamp,
                reason: reason.clone(),
                approver: approver.clone(),
            }),
            _ => None,
        };
        Ok(Some(Punch {
            employee_id: self.employee_id.clone(),
            timestamp,
            punch_type: self.punch_type,
            source: self.source.clone(),
            adjustment,
        }))
    }

    /// The leave covering the row's date, if `TipoPermiso` is set.
    pub fn leave_fact(&self) -> Option<LeaveFact> {
        let label = self.permit_type.as_deref()?;
        LeaveKind::from_label(label).map(|kind| LeaveFact {
            employee_id: self.employee_id.clone(),
            date: self.date,
            kind,
            label: Some(label.to_string()),
        })
    }

    /// Reads an upstream-classified row as a [`ClassifiedPunch`].
    ///
    /// The state comes from `Estado`; a row with no state but a permit type
    /// is read as leave. A row with neither is malformed.
    pub fn to_classified(&self, shift_entry: Option<NaiveTime>) -> EngineResult<ClassifiedPunch> {
        let state = match (&self.state, self.leave_fact()) {
            (Some(label), _) => {
                label
                    .parse::<PunctualityState>()
                    .map_err(|message| EngineError::MalformedRow {
                        row: self.key(),
                        message,
                    })?
            }
            (None, Some(leave)) => match leave.kind {
                LeaveKind::Vacation => PunctualityState::Vacation,
                LeaveKind::Permission => PunctualityState::Permission,
            },
            (None, None) => {
                return Err(EngineError::MalformedRow {
                    row: self.key(),
                    message: "row has neither a state nor a permit type".to_string(),
                });
            }
        };

        let expected = self
            .expected_time
            .as_deref()
            .map(|t| self.time_on_date(t, shift_entry))
            .transpose()?;
        let actual = self.punch_timestamp(shift_entry)?;

        let mut record = ClassifiedPunch::bare(self.employee_id.clone(), self.date, state);
        record.shift_id = self.shift_name.clone();
        record.row_type = self.punch_type;
        record.minutes_late = self.minutes_late;
        record.minutes_early = self.minutes_early;
        record.remark = self.manual_reason.clone();
        record.leave_label = self.permit_type.clone();
        record.punches = actual.into_iter().collect();
        match self.punch_type {
            Some(PunchType::Exit) => {
                record.expected_exit = expected;
                record.exit_punch = actual;
            }
            _ => {
                record.expected_entry = expected;
                record.entry_punch = actual;
            }
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn make_datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn sample_rows() -> Vec<AttendanceRow> {
        parse_rows(
            r#"[
                {"IdEmpleado": "E-1", "IdArea": 3, "IdUbicacion": null, "Fecha": "2024-01-08",
                 "NombreTurno": "Oficina", "TipoMarcacion": "Entrada",
                 "HoraEsperada": "08:00", "HoraMarcacion": "08:20:00",
                 "MinutosTardanza": 20, "MinutosAdelanto": null,
                 "Estado": "TARDANZA", "TipoPermiso": null},
                {"IdEmpleado": "E-1", "Fecha": "2024-01-08", "TipoMarcacion": "Salida",
                 "HoraEsperada": "16:00", "HoraMarcacion": "15:50",
                 "MinutosTardanza": null, "MinutosAdelanto": 10,
                 "Estado": "PUNTUAL", "TipoPermiso": null,
                 "MotivoManual": "Cita medica", "AprobadoPor": "sup_01"},
                {"IdEmpleado": "E-1", "Fecha": "2024-01-09", "TipoMarcacion": null,
                 "HoraEsperada": "08:00", "HoraMarcacion": null,
                 "Estado": null, "TipoPermiso": "Vacaciones"}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_nulls_stay_none() {
        let rows = sample_rows();
        assert_eq!(rows[0].area_id.as_deref(), Some("3"));
        assert_eq!(rows[0].location_id, None);
        assert_eq!(rows[0].permit_type, None);
        assert_eq!(rows[0].minutes_early, None);
    }

    #[test]
    fn test_to_punch_combines_date_and_time() {
        let rows = sample_rows();
        let punch = rows[0].to_punch(None).unwrap().unwrap();
        assert_eq!(punch.timestamp, make_datetime("2024-01-08 08:20:00"));
        assert_eq!(punch.punch_type, Some(PunchType::Entry));
        assert!(rows[2].to_punch(None).unwrap().is_none());
    }

    fn night_rows() -> Vec<AttendanceRow> {
        parse_rows(
            r#"[
                {"IdEmpleado": "N-7", "Fecha": "2024-01-01", "NombreTurno": "Noche",
                 "TipoMarcacion": "Entrada", "HoraEsperada": "22:00", "HoraMarcacion": "21:55",
                 "MinutosTardanza": 0, "Estado": "PUNTUAL", "TipoPermiso": null},
                {"IdEmpleado": "N-7", "Fecha": "2024-01-01", "NombreTurno": "Noche",
                 "TipoMarcacion": "Salida", "HoraEsperada": "06:00", "HoraMarcacion": "05:50",
                 "MinutosAdelanto": 10, "Estado": "PUNTUAL", "TipoPermiso": null}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_night_exit_moves_to_next_day() {
        let rows = night_rows();
        let entry = NaiveTime::from_hms_opt(22, 0, 0).unwrap();

        let exit = rows[1].to_punch(Some(entry)).unwrap().unwrap();
        assert_eq!(exit.timestamp, make_datetime("2024-01-02 05:50:00"));

        let record = rows[1].to_classified(Some(entry)).unwrap();
        assert_eq!(record.date, make_date("2024-01-01"));
        assert_eq!(record.expected_exit, Some(make_datetime("2024-01-02 06:00:00")));
        assert_eq!(record.exit_punch, Some(make_datetime("2024-01-02 05:50:00")));
    }

    #[test]
    fn test_entry_rows_never_move() {
        let rows = night_rows();
        let entry = NaiveTime::from_hms_opt(22, 0, 0).unwrap();
        let punch = rows[0].to_punch(Some(entry)).unwrap().unwrap();
        assert_eq!(punch.timestamp, make_datetime("2024-01-01 21:55:00"));
    }

    #[test]
    fn test_row_set_anchors_exit_on_entry_row() {
        let punches = punches_from_rows(&night_rows()).unwrap();
        let stamps: Vec<NaiveDateTime> = punches.iter().map(|p| p.timestamp).collect();
        assert_eq!(
            stamps,
            vec![
                make_datetime("2024-01-01 21:55:00"),
                make_datetime("2024-01-02 05:50:00"),
            ]
        );

        let records = classified_from_rows(&night_rows()).unwrap();
        assert_eq!(records[0].expected_entry, Some(make_datetime("2024-01-01 22:00:00")));
        assert_eq!(records[1].expected_exit, Some(make_datetime("2024-01-02 06:00:00")));
    }

    #[test]
    fn test_day_shift_exit_stays_on_date() {
        let punches = punches_from_rows(&sample_rows()).unwrap();
        assert_eq!(punches[1].timestamp, make_datetime("2024-01-08 15:50:00"));
    }

    #[test]
    fn test_to_punch_carries_manual_reason() {
        let rows = sample_rows();
        let punch = rows[1].to_punch(None).unwrap().unwrap();
        assert_eq!(punch.remark(), Some("Cita medica"));
    }

    #[test]
    fn test_full_timestamp_wins_over_time_column() {
        let mut row = sample_rows().remove(1);
        row.actual_timestamp = Some(make_datetime("2024-01-09 06:05:00"));
        assert_eq!(
            row.punch_timestamp(None).unwrap(),
            Some(make_datetime("2024-01-09 06:05:00"))
        );
    }

    #[test]
    fn test_leave_fact_from_permit_type() {
        let rows = sample_rows();
        let leave = rows[2].leave_fact().unwrap();
        assert_eq!(leave.kind, LeaveKind::Vacation);
        assert!(rows[0].leave_fact().is_none());
    }

    #[test]
    fn test_to_classified_reads_state_and_minutes() {
        let rows = sample_rows();
        let entry = rows[0].to_classified(None).unwrap();
        assert_eq!(entry.state, PunctualityState::Tardy);
        assert_eq!(entry.minutes_late, Some(20));
        assert_eq!(entry.row_type, Some(PunchType::Entry));
        assert_eq!(entry.expected_entry, Some(make_datetime("2024-01-08 08:00:00")));

        let exit = rows[1].to_classified(None).unwrap();
        assert_eq!(exit.minutes_early, Some(10));
        assert_eq!(exit.exit_punch, Some(make_datetime("2024-01-08 15:50:00")));
        assert_eq!(exit.remark.as_deref(), Some("Cita medica"));

        let leave = rows[2].to_classified(None).unwrap();
        assert_eq!(leave.state, PunctualityState::Vacation);
        assert_eq!(leave.leave_label.as_deref(), Some("Vacaciones"));
    }

    #[test]
    fn test_malformed_time_is_reported() {
        let mut row = sample_rows().remove(0);
        row.actual_time = Some("8h20".to_string());
        assert!(matches!(
            row.to_punch(None),
            Err(EngineError::MalformedTimeOfDay { .. })
        ));
    }

    #[test]
    fn test_unknown_state_label_is_malformed() {
        let mut row = sample_rows().remove(0);
        row.state = Some("LATE".to_string());
        assert!(matches!(
            row.to_classified(None),
            Err(EngineError::MalformedRow { .. })
        ));
    }

    #[test]
    fn test_parse_rows_rejects_invalid_json() {
        assert!(matches!(
            parse_rows("[{\"IdEmpleado\": }]"),
            Err(EngineError::MalformedRow { .. })
        ));
    }
}
