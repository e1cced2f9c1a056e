//! Vehicle payload rules shared by the service and the API client.
//!
//! The checks are pure: the current year is passed in, and the `*_now`
//! wrappers read it from the clock.

use chrono::Datelike;
use serde_json::Value;

use crate::domain::model::{NewVehicle, VehicleInput, VehicleStatus};
use crate::utils::error::{FleetError, Result};

pub const MIN_YEAR: i32 = 1900;

pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/// Latest accepted model year: next year's models are already on sale.
pub fn max_year(current_year: i32) -> i32 {
    current_year + 1
}

fn is_falsy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

/// Falsy text field. An empty string is present but invalid, so it is not
/// reported as missing.
fn is_missing_text(value: Option<&Value>) -> bool {
    is_falsy(value) && !matches!(value, Some(Value::String(_)))
}

fn missing(field: &str) -> FleetError {
    FleetError::MissingField {
        field: field.to_string(),
    }
}

fn required_text(field: &str, value: Option<&Value>) -> Result<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(FleetError::InvalidType {
            field: field.to_string(),
            expected: "a non-empty text".to_string(),
        }),
    }
}

fn required_year(value: Option<&Value>) -> Result<i64> {
    let invalid = || FleetError::InvalidType {
        field: "year".to_string(),
        expected: "a valid number".to_string(),
    };
    let number = match value {
        Some(Value::Number(n)) => n.as_f64().ok_or_else(invalid)?,
        _ => return Err(invalid()),
    };
    if !number.is_finite() || number.fract() != 0.0 {
        return Err(invalid());
    }
    Ok(number as i64)
}

pub fn check_year(year: i64, current_year: i32) -> Result<i32> {
    let max = max_year(current_year);
    if year < i64::from(MIN_YEAR) || year > i64::from(max) {
        return Err(FleetError::OutOfRange {
            field: "year".to_string(),
            min: i64::from(MIN_YEAR),
            max: i64::from(max),
        });
    }
    Ok(year as i32)
}

/// Optional status: `null` and `""` count as omitted.
fn optional_status(value: Option<&Value>) -> Result<Option<VehicleStatus>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => s.parse().map(Some),
        Some(_) => Err(FleetError::InvalidEnum {
            field: "status".to_string(),
            allowed: VehicleStatus::allowed(),
        }),
    }
}

/// Runs every creation rule and returns the normalized vehicle.
pub fn prepare_new_vehicle(input: &VehicleInput, current_year: i32) -> Result<NewVehicle> {
    if is_missing_text(input.mark.as_ref()) {
        return Err(missing("mark"));
    }
    if is_missing_text(input.model.as_ref()) {
        return Err(missing("model"));
    }
    if is_falsy(input.year.as_ref()) {
        return Err(missing("year"));
    }

    let mark = required_text("mark", input.mark.as_ref())?;
    let model = required_text("model", input.model.as_ref())?;
    let year = check_year(required_year(input.year.as_ref())?, current_year)?;
    let status = optional_status(input.status.as_ref())?.unwrap_or_default();

    Ok(NewVehicle {
        mark,
        model,
        year,
        status,
    })
}

pub fn validate_vehicle_input(input: &VehicleInput, current_year: i32) -> Result<()> {
    prepare_new_vehicle(input, current_year).map(|_| ())
}

pub fn validate_vehicle_input_now(input: &VehicleInput) -> Result<()> {
    validate_vehicle_input(input, current_year())
}

/// Status updates require a status, unlike creation.
pub fn validate_status(status: Option<&str>) -> Result<VehicleStatus> {
    match status {
        None | Some("") => Err(missing("status")),
        Some(raw) => raw.parse(),
    }
}

/// Maps a raw JSON status to the text form `validate_status` expects.
/// Falsy values (`null`, `false`, `0`, `""`) map to `None`.
pub fn status_text(value: Option<&Value>) -> Option<String> {
    if is_falsy(value) {
        return None;
    }
    match value {
        None => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const YEAR: i32 = 2026;

    fn input(value: Value) -> VehicleInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_valid_payload_is_normalized() {
        let vehicle = prepare_new_vehicle(
            &input(json!({"mark": "  Toyota ", "model": "Corolla\t", "year": 2024})),
            YEAR,
        )
        .unwrap();
        assert_eq!(vehicle.mark, "Toyota");
        assert_eq!(vehicle.model, "Corolla");
        assert_eq!(vehicle.year, 2024);
        assert_eq!(vehicle.status, VehicleStatus::Available);
    }

    #[test]
    fn test_missing_fields() {
        for payload in [
            json!({"model": "X", "year": 2020}),
            json!({"mark": "A", "year": 2020}),
            json!({"mark": "A", "model": "X"}),
            json!({"mark": "A", "model": "X", "year": 0}),
            json!({"mark": null, "model": "X", "year": 2020}),
            json!({"mark": false, "model": "X", "year": 2020}),
            json!({"mark": "A", "model": 0, "year": 2020}),
            json!({"mark": "A", "model": "X", "year": false}),
        ] {
            let err = validate_vehicle_input(&input(payload), YEAR).unwrap_err();
            assert!(matches!(err, FleetError::MissingField { .. }), "{err:?}");
        }
    }

    #[test]
    fn test_empty_or_non_text_mark_is_invalid_type() {
        for payload in [
            json!({"mark": "", "model": "X", "year": 2020}),
            json!({"mark": "   ", "model": "X", "year": 2020}),
            json!({"mark": 42, "model": "X", "year": 2020}),
            json!({"mark": "A", "model": ["X"], "year": 2020}),
        ] {
            let err = validate_vehicle_input(&input(payload), YEAR).unwrap_err();
            assert!(matches!(err, FleetError::InvalidType { .. }), "{err:?}");
        }
    }

    #[test]
    fn test_year_must_be_integral_number() {
        for year in [json!("2020"), json!(2020.5), json!(true)] {
            let err = validate_vehicle_input(
                &input(json!({"mark": "A", "model": "X", "year": year})),
                YEAR,
            )
            .unwrap_err();
            assert!(matches!(err, FleetError::InvalidType { ref field, .. } if field == "year"));
        }
    }

    #[test]
    fn test_year_bounds() {
        for year in [1900, 1985, YEAR, YEAR + 1] {
            let payload = VehicleInput::new("A", "X", i64::from(year));
            assert!(validate_vehicle_input(&payload, YEAR).is_ok(), "{year}");
        }
        for year in [1, 1899, YEAR + 2, 9999, -2020] {
            let payload = VehicleInput::new("A", "X", i64::from(year));
            let err = validate_vehicle_input(&payload, YEAR).unwrap_err();
            assert!(matches!(err, FleetError::OutOfRange { min: 1900, max, .. } if max == 2027));
        }
    }

    #[test]
    fn test_creation_status() {
        for status in ["available", "maintenance", "service"] {
            let vehicle =
                prepare_new_vehicle(&VehicleInput::new("A", "X", 2020).with_status(status), YEAR)
                    .unwrap();
            assert_eq!(vehicle.status.as_str(), status);
        }

        let defaulted =
            prepare_new_vehicle(&input(json!({"mark": "A", "model": "X", "year": 2020, "status": ""})), YEAR)
                .unwrap();
        assert_eq!(defaulted.status, VehicleStatus::Available);

        for status in [json!("retired"), json!("AVAILABLE"), json!(3)] {
            let err = validate_vehicle_input(
                &input(json!({"mark": "A", "model": "X", "year": 2020, "status": status})),
                YEAR,
            )
            .unwrap_err();
            assert!(matches!(err, FleetError::InvalidEnum { .. }));
        }
    }

    #[test]
    fn test_validate_status() {
        assert_eq!(validate_status(Some("maintenance")).unwrap(), VehicleStatus::Maintenance);
        assert!(matches!(validate_status(None), Err(FleetError::MissingField { .. })));
        assert!(matches!(validate_status(Some("")), Err(FleetError::MissingField { .. })));
        assert!(matches!(validate_status(Some("broken")), Err(FleetError::InvalidEnum { .. })));

        for raw in [json!(false), json!(0), json!(""), Value::Null] {
            let err = validate_status(status_text(Some(&raw)).as_deref()).unwrap_err();
            assert!(matches!(err, FleetError::MissingField { ref field } if field == "status"), "{raw}");
        }
        let err = validate_status(status_text(Some(&json!(true))).as_deref()).unwrap_err();
        assert!(matches!(err, FleetError::InvalidEnum { .. }));
    }

    #[test]
    fn test_status_text() {
        assert_eq!(status_text(None), None);
        assert_eq!(status_text(Some(&Value::Null)), None);
        assert_eq!(status_text(Some(&json!("service"))).as_deref(), Some("service"));
        assert_eq!(status_text(Some(&json!(5))).as_deref(), Some("5"));
        assert_eq!(status_text(Some(&json!(false))), None);
        assert_eq!(status_text(Some(&json!(""))), None);
    }
}
