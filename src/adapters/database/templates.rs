//! Named query templates
//!
//! Enumeration SQL lives here, keyed by the template names configuration
//! refers to. Templates are read-only and parameterized; nothing in the
//! pipeline interpolates strings into SQL.

/// Deliveries with recorded dose inside a lookback window.
///
/// Parameters: `$1` lookback window in days.
///
/// One row per delivered fraction, newest last, with every column the
/// synthesizer consumes aliased to its mapped name. Columns other than
/// `delivery_id` may be NULL; the synthesizer decides which absences are
/// defects.
const DELIVERED_FRACTIONS: &str = r#"
SELECT
    d.delivery_id,
    p.medical_record_number      AS patient_id,
    p.last_name                  AS patient_last_name,
    p.first_name                 AS patient_first_name,
    p.birth_date                 AS patient_birth_date,
    pl.plan_uid,
    pl.study_uid,
    pl.series_uid,
    pl.study_id,
    pl.study_description,
    pl.series_description,
    pl.series_number,
    d.treatment_datetime,
    d.fraction_number,
    st.fractions_planned,
    d.meterset,
    d.dosimeter_unit_code,
    f.energy,
    f.energy_unit_code,
    f.beam_name,
    f.beam_number,
    f.beam_type_code,
    d.termination_status_code,
    d.termination_code,
    d.verification_status_code,
    m.machine_name,
    st.site_name,
    st.setup_note,
    st.activity,
    d.gantry_angle,
    d.gantry_direction_code,
    d.collimator_angle,
    d.collimator_direction_code,
    d.couch_angle,
    d.couch_direction_code,
    d.couch_vertical,
    d.couch_longitudinal,
    d.couch_lateral,
    f.source_axis_distance,
    d.control_point_count,
    d.leaf_blob
FROM treatment_delivery d
JOIN treatment_field f  ON f.field_id = d.field_id
JOIN treatment_plan pl  ON pl.plan_id = f.plan_id
JOIN treatment_site st  ON st.site_id = pl.site_id
JOIN patient p          ON p.patient_id = st.patient_id
LEFT JOIN machine m     ON m.machine_id = f.machine_id
WHERE d.fraction_number > 0
  AND d.meterset > 0
  AND d.treatment_datetime >= now() - ($1::double precision * interval '1 day')
ORDER BY d.treatment_datetime, d.delivery_id
"#;

/// A single delivery by primary key.
///
/// Parameters: `$1` delivery id.
///
/// Same column set as [`DELIVERED_FRACTIONS`]; used to re-enumerate one
/// record on demand.
const DELIVERY_BY_ID: &str = r#"
SELECT
    d.delivery_id,
    p.medical_record_number      AS patient_id,
    p.last_name                  AS patient_last_name,
    p.first_name                 AS patient_first_name,
    p.birth_date                 AS patient_birth_date,
    pl.plan_uid,
    pl.study_uid,
    pl.series_uid,
    pl.study_id,
    pl.study_description,
    pl.series_description,
    pl.series_number,
    d.treatment_datetime,
    d.fraction_number,
    st.fractions_planned,
    d.meterset,
    d.dosimeter_unit_code,
    f.energy,
    f.energy_unit_code,
    f.beam_name,
    f.beam_number,
    f.beam_type_code,
    d.termination_status_code,
    d.termination_code,
    d.verification_status_code,
    m.machine_name,
    st.site_name,
    st.setup_note,
    st.activity,
    d.gantry_angle,
    d.gantry_direction_code,
    d.collimator_angle,
    d.collimator_direction_code,
    d.couch_angle,
    d.couch_direction_code,
    d.couch_vertical,
    d.couch_longitudinal,
    d.couch_lateral,
    f.source_axis_distance,
    d.control_point_count,
    d.leaf_blob
FROM treatment_delivery d
JOIN treatment_field f  ON f.field_id = d.field_id
JOIN treatment_plan pl  ON pl.plan_id = f.plan_id
JOIN treatment_site st  ON st.site_id = pl.site_id
JOIN patient p          ON p.patient_id = st.patient_id
LEFT JOIN machine m     ON m.machine_id = f.machine_id
WHERE d.delivery_id = $1
"#;

/// Resolves a template name to its SQL.
pub fn resolve(name: &str) -> Option<&'static str> {
    match name {
        "delivered_fractions" => Some(DELIVERED_FRACTIONS),
        "delivery_by_id" => Some(DELIVERY_BY_ID),
        _ => None,
    }
}

/// Names of every registered template, for error messages and validation.
pub fn names() -> &'static [&'static str] {
    &["delivered_fractions", "delivery_by_id"]
}
