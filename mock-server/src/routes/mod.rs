use std::collections::BTreeMap;

use axum::Router;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::AppState;

mod business_units;
mod certificate_owners;
mod certificates;
mod enrollments;
mod profiles;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(certificates::router())
        .merge(business_units::router())
        .merge(certificate_owners::router())
        .merge(enrollments::router())
        .merge(profiles::router())
}

const DEFAULT_VALIDITY_DAYS: i64 = 365;
const MAX_VALIDITY_DAYS: i64 = 100 * 366;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Validity {
    years: i64,
    months: i64,
    days: i64,
}

impl Validity {
    /// Requested lifetime in days; non-positive totals fall back to the default.
    fn days(validity: Option<&Validity>) -> Result<i64, ApiError> {
        let Some(v) = validity else {
            return Ok(DEFAULT_VALIDITY_DAYS);
        };
        let days = v
            .years
            .checked_mul(365)
            .zip(v.months.checked_mul(30))
            .and_then(|(years, months)| years.checked_add(months))
            .and_then(|total| total.checked_add(v.days))
            .filter(|total| *total <= MAX_VALIDITY_DAYS)
            .ok_or_else(|| ApiError::validation("validity out of range"))?;
        Ok(if days > 0 { days } else { DEFAULT_VALIDITY_DAYS })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Attributes {
    common_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CustomAttribute {
    id: String,
    value: String,
}

fn attribute_map(attributes: Vec<CustomAttribute>) -> BTreeMap<String, Value> {
    attributes
        .into_iter()
        .map(|a| (a.id, Value::String(a.value)))
        .collect()
}
