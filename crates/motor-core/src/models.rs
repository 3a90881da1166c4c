use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{MotorError, Result};

/// Cell contents (compared case-insensitively) that mark a missing value.
pub const MISSING_TOKENS: [&str; 6] = ["", "na", "n/a", "nan", "null", "none"];

// ── ProfileId ─────────────────────────────────────────────────────────────────

/// Identifier of one recorded test session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(pub u32);

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProfileId {
    type Err = MotorError;

    /// Accepts plain integers (`"11"`) and integral floats (`"11.0"`), which
    /// is how many exports of the dataset spell the identifier.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Ok(id) = trimmed.parse::<u32>() {
            return Ok(ProfileId(id));
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&v) => {
                Ok(ProfileId(v as u32))
            }
            _ => Err(MotorError::InvalidProfileId(trimmed.to_string())),
        }
    }
}

// ── Field ─────────────────────────────────────────────────────────────────────

/// A column of the cleaned motor table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    /// `u_q`: voltage q-component.
    VoltageQ,
    /// `coolant`: coolant temperature.
    Coolant,
    /// `stator_winding`: stator winding temperature.
    StatorWinding,
    /// `u_d`: voltage d-component.
    VoltageD,
    /// `stator_tooth`: stator tooth temperature.
    StatorTooth,
    /// `motor_speed`: rotor speed.
    MotorSpeed,
    /// `i_d`: current d-component.
    CurrentD,
    /// `i_q`: current q-component.
    CurrentQ,
    /// `pm`: permanent magnet (rotor) temperature.
    Pm,
    /// `stator_yoke`: stator yoke temperature.
    StatorYoke,
    /// `ambient`: ambient temperature.
    Ambient,
    /// `torque`: motor torque.
    Torque,
    /// `profile_id`: session identifier.
    Profile,
    /// `elapsed_seconds`: synthesized per-session time axis.
    ElapsedSeconds,
}

impl Field {
    /// Every column in table order.
    pub const ALL: [Field; 14] = [
        Field::VoltageQ,
        Field::Coolant,
        Field::StatorWinding,
        Field::VoltageD,
        Field::StatorTooth,
        Field::MotorSpeed,
        Field::CurrentD,
        Field::CurrentQ,
        Field::Pm,
        Field::StatorYoke,
        Field::Ambient,
        Field::Torque,
        Field::Profile,
        Field::ElapsedSeconds,
    ];

    /// Sensor columns, i.e. everything except the identifier and time axis.
    pub const MEASUREMENTS: [Field; 12] = [
        Field::VoltageQ,
        Field::Coolant,
        Field::StatorWinding,
        Field::VoltageD,
        Field::StatorTooth,
        Field::MotorSpeed,
        Field::CurrentD,
        Field::CurrentQ,
        Field::Pm,
        Field::StatorYoke,
        Field::Ambient,
        Field::Torque,
    ];

    /// Temperature columns, rotor first.
    pub const TEMPERATURES: [Field; 6] = [
        Field::Pm,
        Field::StatorWinding,
        Field::StatorTooth,
        Field::StatorYoke,
        Field::Coolant,
        Field::Ambient,
    ];

    /// Drive columns: speed, torque, then the control currents and voltages.
    pub const OPERATIONAL: [Field; 6] = [
        Field::MotorSpeed,
        Field::Torque,
        Field::CurrentD,
        Field::CurrentQ,
        Field::VoltageD,
        Field::VoltageQ,
    ];

    /// Column name as it appears in the source CSV.
    pub fn code(self) -> &'static str {
        match self {
            Field::VoltageQ => "u_q",
            Field::Coolant => "coolant",
            Field::StatorWinding => "stator_winding",
            Field::VoltageD => "u_d",
            Field::StatorTooth => "stator_tooth",
            Field::MotorSpeed => "motor_speed",
            Field::CurrentD => "i_d",
            Field::CurrentQ => "i_q",
            Field::Pm => "pm",
            Field::StatorYoke => "stator_yoke",
            Field::Ambient => "ambient",
            Field::Torque => "torque",
            Field::Profile => "profile_id",
            Field::ElapsedSeconds => "elapsed_seconds",
        }
    }

    /// Descriptive header written by the exporter.
    pub fn export_label(self) -> &'static str {
        match self {
            Field::VoltageQ => "voltage q-component in V",
            Field::Coolant => "coolant temperature in °C",
            Field::StatorWinding => "stator winding temperature in °C",
            Field::VoltageD => "voltage d-component in V",
            Field::StatorTooth => "stator tooth temperature in °C",
            Field::MotorSpeed => "motor speed in rpm",
            Field::CurrentD => "current d-component in A",
            Field::CurrentQ => "current q-component in A",
            Field::Pm => "rotor temperature in °C",
            Field::StatorYoke => "stator yoke temperature in °C",
            Field::Ambient => "ambient temperature in °C",
            Field::Torque => "torque in Nm",
            Field::Profile => "test session id",
            Field::ElapsedSeconds => "session time in seconds",
        }
    }

    /// Physical unit suffix, empty for the identifier.
    pub fn unit(self) -> &'static str {
        match self {
            Field::VoltageQ | Field::VoltageD => "V",
            Field::CurrentD | Field::CurrentQ => "A",
            Field::MotorSpeed => "rpm",
            Field::Torque => "Nm",
            Field::ElapsedSeconds => "s",
            Field::Profile => "",
            Field::Coolant
            | Field::StatorWinding
            | Field::StatorTooth
            | Field::Pm
            | Field::StatorYoke
            | Field::Ambient => "°C",
        }
    }

    /// `true` for the 12 sensor columns.
    pub fn is_measurement(self) -> bool {
        !matches!(self, Field::Profile | Field::ElapsedSeconds)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl FromStr for Field {
    type Err = MotorError;

    fn from_str(s: &str) -> Result<Self> {
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.code() == s.trim())
            .ok_or_else(|| MotorError::UnknownField(s.to_string()))
    }
}

// ── RawReading ────────────────────────────────────────────────────────────────

/// One CSV row exactly as loaded. Every cell may be missing.
///
/// Columns not listed here are ignored; a listed column absent from the
/// header makes deserialization fail.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawReading {
    #[serde(deserialize_with = "optional_measurement")]
    pub u_q: Option<f64>,
    #[serde(deserialize_with = "optional_measurement")]
    pub coolant: Option<f64>,
    #[serde(deserialize_with = "optional_measurement")]
    pub stator_winding: Option<f64>,
    #[serde(deserialize_with = "optional_measurement")]
    pub u_d: Option<f64>,
    #[serde(deserialize_with = "optional_measurement")]
    pub stator_tooth: Option<f64>,
    #[serde(deserialize_with = "optional_measurement")]
    pub motor_speed: Option<f64>,
    #[serde(deserialize_with = "optional_measurement")]
    pub i_d: Option<f64>,
    #[serde(deserialize_with = "optional_measurement")]
    pub i_q: Option<f64>,
    #[serde(deserialize_with = "optional_measurement")]
    pub pm: Option<f64>,
    #[serde(deserialize_with = "optional_measurement")]
    pub stator_yoke: Option<f64>,
    #[serde(deserialize_with = "optional_measurement")]
    pub ambient: Option<f64>,
    #[serde(deserialize_with = "optional_measurement")]
    pub torque: Option<f64>,
    #[serde(deserialize_with = "optional_profile_id")]
    pub profile_id: Option<ProfileId>,
}

impl RawReading {
    /// Value of a sensor column; `None` when missing or not a sensor column.
    pub fn measurement(&self, field: Field) -> Option<f64> {
        let value = match field {
            Field::VoltageQ => self.u_q,
            Field::Coolant => self.coolant,
            Field::StatorWinding => self.stator_winding,
            Field::VoltageD => self.u_d,
            Field::StatorTooth => self.stator_tooth,
            Field::MotorSpeed => self.motor_speed,
            Field::CurrentD => self.i_d,
            Field::CurrentQ => self.i_q,
            Field::Pm => self.pm,
            Field::StatorYoke => self.stator_yoke,
            Field::Ambient => self.ambient,
            Field::Torque => self.torque,
            Field::Profile | Field::ElapsedSeconds => None,
        };
        value.filter(|v| !v.is_nan())
    }

    /// Number of missing cells in this row.
    pub fn missing_count(&self) -> usize {
        let missing_measurements = Field::MEASUREMENTS
            .iter()
            .filter(|&&field| self.measurement(field).is_none())
            .count();
        missing_measurements + usize::from(self.profile_id.is_none())
    }

    /// Convert into a complete [`Reading`], or `None` if any cell is missing.
    pub fn complete(&self, elapsed_seconds: f64) -> Option<Reading> {
        Some(Reading {
            u_q: self.measurement(Field::VoltageQ)?,
            coolant: self.measurement(Field::Coolant)?,
            stator_winding: self.measurement(Field::StatorWinding)?,
            u_d: self.measurement(Field::VoltageD)?,
            stator_tooth: self.measurement(Field::StatorTooth)?,
            motor_speed: self.measurement(Field::MotorSpeed)?,
            i_d: self.measurement(Field::CurrentD)?,
            i_q: self.measurement(Field::CurrentQ)?,
            pm: self.measurement(Field::Pm)?,
            stator_yoke: self.measurement(Field::StatorYoke)?,
            ambient: self.measurement(Field::Ambient)?,
            torque: self.measurement(Field::Torque)?,
            profile_id: self.profile_id?,
            elapsed_seconds,
        })
    }
}

/// Returns `true` when `raw` spells a missing value.
pub fn is_missing_token(raw: &str) -> bool {
    let trimmed = raw.trim();
    MISSING_TOKENS
        .iter()
        .any(|token| trimmed.eq_ignore_ascii_case(token))
}

fn optional_measurement<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) if is_missing_token(&s) => Ok(None),
        Some(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid numeric value {s:?}"))),
    }
}

fn optional_profile_id<'de, D>(deserializer: D) -> std::result::Result<Option<ProfileId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) if is_missing_token(&s) => Ok(None),
        Some(s) => s.parse::<ProfileId>().map(Some).map_err(serde::de::Error::custom),
    }
}

// ── Reading ───────────────────────────────────────────────────────────────────

/// A complete, cleaned sensor reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub u_q: f64,
    pub coolant: f64,
    pub stator_winding: f64,
    pub u_d: f64,
    pub stator_tooth: f64,
    pub motor_speed: f64,
    pub i_d: f64,
    pub i_q: f64,
    pub pm: f64,
    pub stator_yoke: f64,
    pub ambient: f64,
    pub torque: f64,
    pub profile_id: ProfileId,
    /// Seconds since the first reading of the same session.
    pub elapsed_seconds: f64,
}

impl Reading {
    /// Numeric value of any column. The identifier is widened to `f64`.
    pub fn value(&self, field: Field) -> f64 {
        match field {
            Field::VoltageQ => self.u_q,
            Field::Coolant => self.coolant,
            Field::StatorWinding => self.stator_winding,
            Field::VoltageD => self.u_d,
            Field::StatorTooth => self.stator_tooth,
            Field::MotorSpeed => self.motor_speed,
            Field::CurrentD => self.i_d,
            Field::CurrentQ => self.i_q,
            Field::Pm => self.pm,
            Field::StatorYoke => self.stator_yoke,
            Field::Ambient => self.ambient,
            Field::Torque => self.torque,
            Field::Profile => f64::from(self.profile_id.0),
            Field::ElapsedSeconds => self.elapsed_seconds,
        }
    }
}

// ── MotorDataset ──────────────────────────────────────────────────────────────

/// The cleaned table: readings in original row order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotorDataset {
    readings: Vec<Reading>,
}

impl MotorDataset {
    pub fn new(readings: Vec<Reading>) -> Self {
        Self { readings }
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Fails with [`MotorError::EmptyDataset`] when there are no rows.
    pub fn require_rows(&self) -> Result<&Self> {
        if self.is_empty() {
            Err(MotorError::EmptyDataset)
        } else {
            Ok(self)
        }
    }

    /// All values of one column, in row order.
    pub fn column(&self, field: Field) -> Vec<f64> {
        self.readings.iter().map(|r| r.value(field)).collect()
    }

    /// Distinct session identifiers, ascending.
    pub fn profile_ids(&self) -> Vec<ProfileId> {
        self.sessions().into_keys().collect()
    }

    /// Rows grouped by session, each group in original row order.
    pub fn sessions(&self) -> BTreeMap<ProfileId, Vec<&Reading>> {
        let mut groups: BTreeMap<ProfileId, Vec<&Reading>> = BTreeMap::new();
        for reading in &self.readings {
            groups.entry(reading.profile_id).or_default().push(reading);
        }
        groups
    }

    /// Rows of one session in original order (empty if unknown).
    pub fn session(&self, profile_id: ProfileId) -> Vec<&Reading> {
        self.readings
            .iter()
            .filter(|r| r.profile_id == profile_id)
            .collect()
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> &[Reading] {
        &self.readings[..n.min(self.readings.len())]
    }

    /// Last `n` rows.
    pub fn tail(&self, n: usize) -> &[Reading] {
        let start = self.readings.len().saturating_sub(n);
        &self.readings[start..]
    }

    /// Count of NaN or infinite cells across all columns.
    pub fn non_finite_count(&self) -> usize {
        self.readings
            .iter()
            .map(|r| {
                Field::ALL
                    .iter()
                    .filter(|&&field| !r.value(field).is_finite())
                    .count()
            })
            .sum()
    }
}

impl FromIterator<Reading> for MotorDataset {
    fn from_iter<I: IntoIterator<Item = Reading>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
