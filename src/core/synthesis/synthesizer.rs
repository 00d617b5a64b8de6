//! Record synthesizer
//!
//! Builds a self-contained [`SynthesizedClinicalRecord`] from one delivery
//! row. Source values are carried verbatim; enumerated columns are mapped
//! through the source system's indexed label tables; the packed leaf field
//! is decoded with the configured [`LeafCodec`].
//!
//! A row that cannot be synthesized fails with `MalformedRecordError`,
//! which is fatal for that record only. The orchestrator never retries a
//! malformed record; re-reading the same defective row cannot change the
//! outcome.

use super::leaf::{ByteOrder, LeafCodec};
use crate::config::DatabaseSourceConfig;
use crate::domain::ids::ObjectId;
use crate::domain::record::{
    BeamDelivery, ControlPointRecord, DeliveryMetadata, DeliveryRow, PatientIdentification,
    StudyContext, SynthesizedClinicalRecord, PLAN_CLASS_UID, TREATMENT_RECORD_CLASS_UID,
};
use crate::domain::{AegisError, Result};

/// Dosimeter unit labels, indexed by the source system's enum code.
const DOSIMETER_UNITS: [&str; 3] = ["", "MU", "MINUTE"];

/// Treatment termination statuses, indexed by the source system's enum code.
const TERMINATION_STATUSES: [&str; 4] = ["UNKNOWN", "NORMAL", "OPERATOR", "MACHINE"];

/// Treatment verification statuses, indexed by the source system's enum code.
const VERIFICATION_STATUSES: [&str; 4] = ["", "VERIFIED", "VERIFIED_OVR", "NOT_VERIFIED"];

/// Beam energy units, indexed by the source system's enum code.
const ENERGY_UNITS: [&str; 3] = ["KV", "MV", "MEV"];

/// Rotation directions, indexed by the source system's enum code.
const ROTATION_DIRECTIONS: [&str; 4] = ["", "CW", "CC", "NONE"];

/// Beam types, indexed by the source system's enum code.
const BEAM_TYPES: [&str; 3] = ["", "STATIC", "DYNAMIC"];

/// Converts delivery rows into transferable clinical records.
///
/// One synthesizer serves one database source: the uid root and leaf
/// geometry are fixed per source system.
pub struct RecordSynthesizer {
    uid_root: String,
    codec: LeafCodec,
}

impl RecordSynthesizer {
    /// Creates a synthesizer for one database source.
    pub fn new(config: &DatabaseSourceConfig) -> Result<Self> {
        let byte_order: ByteOrder = config
            .leaf_byte_order
            .parse()
            .map_err(AegisError::Configuration)?;
        let codec = LeafCodec::new(config.leaf_pairs, config.leaf_element_width, byte_order)?;
        Ok(Self {
            uid_root: config.uid_root.clone(),
            codec,
        })
    }

    /// Derives the object id a row's record will carry.
    ///
    /// Deterministic per (uid root, delivery id): re-enumerating the same
    /// delivery on a later run maps to the same ledger key.
    pub fn object_id(&self, row: &DeliveryRow) -> Result<ObjectId> {
        ObjectId::derived(&self.uid_root, row.delivery_id).map_err(|e| {
            AegisError::MalformedRecord(format!(
                "Cannot derive object id for delivery {}: {}",
                row.delivery_id, e
            ))
        })
    }

    /// Builds the clinical record for one delivery row.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRecordError` when a required field is absent, the
    /// declared control point count is inconsistent with the packed leaf
    /// field, or the leaf field cannot be decoded.
    pub fn synthesize(&self, row: &DeliveryRow) -> Result<SynthesizedClinicalRecord> {
        let object_id = self.object_id(row)?;

        let patient_id = required_text(&row.patient_id, row.delivery_id, "patient id")?;
        let last_name = required_text(&row.patient_last_name, row.delivery_id, "patient name")?;
        let patient_name = match row.patient_first_name.as_deref() {
            Some(first) if !first.trim().is_empty() => format!("{}^{}", last_name, first),
            _ => format!("{}^", last_name),
        };

        let plan_uid = required_text(&row.plan_uid, row.delivery_id, "referenced plan uid")?;
        let study_uid = required_text(&row.study_uid, row.delivery_id, "study uid")?;
        let series_uid = required_text(&row.series_uid, row.delivery_id, "series uid")?;

        let delivered_meterset = row.meterset.ok_or_else(|| {
            malformed(row.delivery_id, "delivered meterset")
        })?;

        let declared_points = row
            .control_point_count
            .ok_or_else(|| malformed(row.delivery_id, "control point count"))?;
        let point_count = u32::try_from(declared_points)
            .ok()
            .filter(|count| *count >= 1)
            .ok_or_else(|| {
                AegisError::MalformedRecord(format!(
                    "Delivery {} has an invalid control point count {}",
                    row.delivery_id, declared_points
                ))
            })?;

        let leaf_blob = row
            .leaf_blob
            .as_deref()
            .ok_or_else(|| malformed(row.delivery_id, "packed leaf position field"))?;
        let leaf_points = self.codec.decode(leaf_blob)?;
        if leaf_points.len() != point_count as usize {
            return Err(AegisError::MalformedRecord(format!(
                "Delivery {} declares {} control points but its leaf field decodes to {}",
                row.delivery_id,
                point_count,
                leaf_points.len()
            )));
        }

        // First control point carries the full geometry snapshot.
        let mut control_points = vec![ControlPointRecord {
            index: 0,
            gantry_angle: row.gantry_angle,
            gantry_direction: enum_label(&ROTATION_DIRECTIONS, row.gantry_direction_code, ""),
            collimator_angle: row.collimator_angle,
            collimator_direction: enum_label(
                &ROTATION_DIRECTIONS,
                row.collimator_direction_code,
                "",
            ),
            couch_angle: row.couch_angle,
            couch_direction: enum_label(&ROTATION_DIRECTIONS, row.couch_direction_code, ""),
            couch_vertical: row.couch_vertical,
            couch_longitudinal: row.couch_longitudinal,
            couch_lateral: row.couch_lateral,
            leaf_positions: leaf_points[0].clone(),
        }];

        // The final point repeats only the fields the source records for
        // it: gantry angle, index, and its leaf array.
        if point_count > 1 {
            let last_index = point_count - 1;
            control_points.push(ControlPointRecord {
                index: last_index,
                gantry_angle: row.gantry_angle,
                gantry_direction: None,
                collimator_angle: None,
                collimator_direction: None,
                couch_angle: None,
                couch_direction: None,
                couch_vertical: None,
                couch_longitudinal: None,
                couch_lateral: None,
                leaf_positions: leaf_points[last_index as usize].clone(),
            });
        }

        Ok(SynthesizedClinicalRecord {
            object_id,
            record_class_uid: TREATMENT_RECORD_CLASS_UID.to_string(),
            modality: "RTRECORD".to_string(),
            patient: PatientIdentification {
                patient_id,
                patient_name,
                birth_date: row.patient_birth_date,
            },
            study: StudyContext {
                study_uid,
                series_uid,
                study_id: row.study_id.clone(),
                study_description: row.study_description.clone(),
                series_description: row.series_description.clone(),
                series_number: row.series_number,
                instance_number: 1,
            },
            delivery: DeliveryMetadata {
                plan_uid,
                plan_class_uid: PLAN_CLASS_UID.to_string(),
                treatment_date: row
                    .treatment_datetime
                    .map(|dt| dt.format("%Y%m%d").to_string()),
                treatment_time: row
                    .treatment_datetime
                    .map(|dt| dt.format("%H%M%S").to_string()),
                fraction_number: row.fraction_number,
                fractions_planned: row.fractions_planned,
                dosimeter_unit: enum_label(&DOSIMETER_UNITS, row.dosimeter_unit_code, ""),
                termination_status: enum_label(
                    &TERMINATION_STATUSES,
                    row.termination_status_code,
                    "UNKNOWN",
                ),
                termination_code: row.termination_code.clone(),
                verification_status: enum_label(
                    &VERIFICATION_STATUSES,
                    row.verification_status_code,
                    "",
                ),
                machine_name: row
                    .machine_name
                    .as_deref()
                    .map(|name| name.trim().chars().take(16).collect()),
                site_name: row.site_name.clone(),
                setup_note: row.setup_note.clone(),
                activity: row.activity.clone(),
                delivery_type: "TREATMENT".to_string(),
            },
            beam: BeamDelivery {
                beam_number: row.beam_number,
                beam_name: row.beam_name.clone(),
                beam_type: enum_label(&BEAM_TYPES, row.beam_type_code, "Invalid"),
                energy: row.energy,
                energy_unit: enum_label(&ENERGY_UNITS, row.energy_unit_code, ""),
                delivered_meterset,
                source_axis_distance: row.source_axis_distance,
                control_point_count: point_count,
            },
            control_points,
        })
    }
}

/// Maps an enumerated source column through its label table.
///
/// `None` columns stay absent; out-of-range codes take the table's
/// fallback label, matching how the source system renders them.
fn enum_label(table: &[&str], code: Option<i16>, fallback: &str) -> Option<String> {
    let code = code?;
    let label = usize::try_from(code)
        .ok()
        .and_then(|index| table.get(index).copied())
        .unwrap_or(fallback);
    Some(label.to_string())
}

fn required_text(value: &Option<String>, delivery_id: i64, what: &str) -> Result<String> {
    match value.as_deref() {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        _ => Err(malformed(delivery_id, what)),
    }
}

fn malformed(delivery_id: i64, what: &str) -> AegisError {
    AegisError::MalformedRecord(format!("Delivery {} is missing its {}", delivery_id, what))
}
