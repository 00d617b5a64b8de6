//! Delivery rows and synthesized clinical records
//!
//! `DeliveryRow` is the snapshot of one database row describing a delivered
//! treatment fraction. `SynthesizedClinicalRecord` is the self-contained
//! object built from it, held in memory only for the duration of the
//! transfer attempt and never persisted by the pipeline.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::ids::ObjectId;

/// Object class of a beams treatment record
pub const TREATMENT_RECORD_CLASS_UID: &str = "1.2.840.10008.5.1.4.1.1.481.4";

/// Object class of the plan a treatment record references
pub const PLAN_CLASS_UID: &str = "1.2.840.10008.5.1.4.1.1.481.5";

/// One database row describing a delivered treatment fraction.
///
/// Only the primary key is guaranteed present; every other column is
/// decoded best-effort at enumeration time and validated by the
/// synthesizer, so a defective row fails that record without touching
/// the rest of the run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryRow {
    pub delivery_id: i64,
    pub patient_id: Option<String>,
    pub patient_last_name: Option<String>,
    pub patient_first_name: Option<String>,
    pub patient_birth_date: Option<NaiveDate>,
    pub plan_uid: Option<String>,
    pub study_uid: Option<String>,
    pub series_uid: Option<String>,
    pub study_id: Option<String>,
    pub study_description: Option<String>,
    pub series_description: Option<String>,
    pub series_number: Option<i32>,
    pub treatment_datetime: Option<NaiveDateTime>,
    pub fraction_number: Option<i32>,
    pub fractions_planned: Option<i32>,
    pub meterset: Option<f64>,
    pub dosimeter_unit_code: Option<i16>,
    pub energy: Option<f64>,
    pub energy_unit_code: Option<i16>,
    pub beam_name: Option<String>,
    pub beam_number: Option<i32>,
    pub beam_type_code: Option<i16>,
    pub termination_status_code: Option<i16>,
    pub termination_code: Option<String>,
    pub verification_status_code: Option<i16>,
    pub machine_name: Option<String>,
    pub site_name: Option<String>,
    pub setup_note: Option<String>,
    pub activity: Option<String>,
    pub gantry_angle: Option<f64>,
    pub gantry_direction_code: Option<i16>,
    pub collimator_angle: Option<f64>,
    pub collimator_direction_code: Option<i16>,
    pub couch_angle: Option<f64>,
    pub couch_direction_code: Option<i16>,
    pub couch_vertical: Option<f64>,
    pub couch_longitudinal: Option<f64>,
    pub couch_lateral: Option<f64>,
    pub source_axis_distance: Option<f64>,
    pub control_point_count: Option<i32>,
    pub leaf_blob: Option<Vec<u8>>,
}

impl DeliveryRow {
    pub fn new(delivery_id: i64) -> Self {
        Self {
            delivery_id,
            ..Default::default()
        }
    }
}

/// One (bank A, bank B) collimator leaf pair position.
///
/// Values are carried in the source system's units, verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafPair {
    pub bank_a: i32,
    pub bank_b: i32,
}

impl LeafPair {
    pub fn new(bank_a: i32, bank_b: i32) -> Self {
        Self { bank_a, bank_b }
    }
}

/// Patient identification module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientIdentification {
    pub patient_id: String,
    pub patient_name: String,
    pub birth_date: Option<NaiveDate>,
}

/// Study and series context module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyContext {
    pub study_uid: String,
    pub series_uid: String,
    pub study_id: Option<String>,
    pub study_description: Option<String>,
    pub series_description: Option<String>,
    pub series_number: Option<i32>,
    pub instance_number: i32,
}

/// Delivery metadata module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryMetadata {
    pub plan_uid: String,
    pub plan_class_uid: String,
    pub treatment_date: Option<String>,
    pub treatment_time: Option<String>,
    pub fraction_number: Option<i32>,
    pub fractions_planned: Option<i32>,
    pub dosimeter_unit: Option<String>,
    pub termination_status: Option<String>,
    pub termination_code: Option<String>,
    pub verification_status: Option<String>,
    pub machine_name: Option<String>,
    pub site_name: Option<String>,
    pub setup_note: Option<String>,
    pub activity: Option<String>,
    pub delivery_type: String,
}

/// Beam delivery module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamDelivery {
    pub beam_number: Option<i32>,
    pub beam_name: Option<String>,
    pub beam_type: Option<String>,
    pub energy: Option<f64>,
    pub energy_unit: Option<String>,
    pub delivered_meterset: f64,
    pub source_axis_distance: Option<f64>,
    pub control_point_count: u32,
}

/// Machine geometry snapshot at one control point, with the decoded leaf
/// positions for that point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlPointRecord {
    pub index: u32,
    pub gantry_angle: Option<f64>,
    pub gantry_direction: Option<String>,
    pub collimator_angle: Option<f64>,
    pub collimator_direction: Option<String>,
    pub couch_angle: Option<f64>,
    pub couch_direction: Option<String>,
    pub couch_vertical: Option<f64>,
    pub couch_longitudinal: Option<f64>,
    pub couch_lateral: Option<f64>,
    pub leaf_positions: Vec<LeafPair>,
}

/// A self-contained treatment record synthesized from one delivery row.
///
/// Serialization is canonical: field order is fixed by the struct
/// definitions, so `to_bytes` produces identical bytes for identical
/// records. The archive copy is compared against these bytes during
/// verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesizedClinicalRecord {
    pub object_id: ObjectId,
    pub record_class_uid: String,
    pub modality: String,
    pub patient: PatientIdentification,
    pub study: StudyContext,
    pub delivery: DeliveryMetadata,
    pub beam: BeamDelivery,
    pub control_points: Vec<ControlPointRecord>,
}

impl SynthesizedClinicalRecord {
    /// Canonical byte form used for store, digesting, and byte-for-byte
    /// verification
    pub fn to_bytes(&self) -> crate::domain::result::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> SynthesizedClinicalRecord {
        SynthesizedClinicalRecord {
            object_id: ObjectId::new("1.2.826.0.1.3680043.10.1.99999.42").unwrap(),
            record_class_uid: TREATMENT_RECORD_CLASS_UID.to_string(),
            modality: "RTRECORD".to_string(),
            patient: PatientIdentification {
                patient_id: "MRN-0042".to_string(),
                patient_name: "Doe^Jane".to_string(),
                birth_date: NaiveDate::from_ymd_opt(1961, 4, 12),
            },
            study: StudyContext {
                study_uid: "1.2.3.4.5".to_string(),
                series_uid: "1.2.3.4.6".to_string(),
                study_id: Some("ST01".to_string()),
                study_description: None,
                series_description: None,
                series_number: Some(1),
                instance_number: 1,
            },
            delivery: DeliveryMetadata {
                plan_uid: "1.2.3.4.7".to_string(),
                plan_class_uid: PLAN_CLASS_UID.to_string(),
                treatment_date: Some("20240115".to_string()),
                treatment_time: Some("081530".to_string()),
                fraction_number: Some(12),
                fractions_planned: Some(30),
                dosimeter_unit: Some("MU".to_string()),
                termination_status: Some("NORMAL".to_string()),
                termination_code: None,
                verification_status: Some("VERIFIED".to_string()),
                machine_name: Some("TB_STX_1".to_string()),
                site_name: Some("Prostate".to_string()),
                setup_note: None,
                activity: Some("TX".to_string()),
                delivery_type: "TREATMENT".to_string(),
            },
            beam: BeamDelivery {
                beam_number: Some(3),
                beam_name: Some("LAO 45".to_string()),
                beam_type: Some("DYNAMIC".to_string()),
                energy: Some(6.0),
                energy_unit: Some("MV".to_string()),
                delivered_meterset: 187.5,
                source_axis_distance: Some(1000.0),
                control_point_count: 2,
            },
            control_points: vec![
                ControlPointRecord {
                    index: 0,
                    gantry_angle: Some(45.0),
                    gantry_direction: Some("CW".to_string()),
                    collimator_angle: Some(10.0),
                    collimator_direction: None,
                    couch_angle: Some(0.0),
                    couch_direction: None,
                    couch_vertical: Some(-12.5),
                    couch_longitudinal: Some(88.1),
                    couch_lateral: Some(1.4),
                    leaf_positions: vec![LeafPair::new(-25, 25), LeafPair::new(-30, 30)],
                },
                ControlPointRecord {
                    index: 1,
                    gantry_angle: Some(47.0),
                    gantry_direction: None,
                    collimator_angle: None,
                    collimator_direction: None,
                    couch_angle: None,
                    couch_direction: None,
                    couch_vertical: None,
                    couch_longitudinal: None,
                    couch_lateral: None,
                    leaf_positions: vec![LeafPair::new(-20, 20), LeafPair::new(-28, 28)],
                },
            ],
        }
    }

    #[test]
    fn test_to_bytes_is_deterministic() {
        let record = sample_record();
        let first = record.to_bytes().unwrap();
        let second = record.to_bytes().unwrap();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_to_bytes_round_trips() {
        let record = sample_record();
        let bytes = record.to_bytes().unwrap();
        let parsed: SynthesizedClinicalRecord = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_different_records_produce_different_bytes() {
        let record = sample_record();
        let mut other = record.clone();
        other.beam.delivered_meterset = 188.0;
        assert_ne!(record.to_bytes().unwrap(), other.to_bytes().unwrap());
    }

    #[test]
    fn test_delivery_row_defaults_to_empty_columns() {
        let row = DeliveryRow::new(77);
        assert_eq!(row.delivery_id, 77);
        assert!(row.patient_id.is_none());
        assert!(row.leaf_blob.is_none());
    }
}
