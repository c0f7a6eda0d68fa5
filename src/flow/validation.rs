//! Per-step validation for the report flow.
//!
//! Each step owns one pure function over the merged form data. The mapping
//! from step order to function is a plain table, indexed by `order - 1`.

use std::str::FromStr;

use thiserror::Error;

use super::form::FormData;
use crate::reports::ReportCategory;

pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 80;
pub const DESCRIPTION_MIN: usize = 10;
pub const DESCRIPTION_MAX: usize = 2000;

/// A step's input does not satisfy its constraints
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be between {min} and {max} characters")]
    Length {
        field: String,
        min: usize,
        max: usize,
    },

    #[error("{field} {message}")]
    Invalid { field: String, message: String },
}

impl ValidationError {
    pub fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        ValidationError::Invalid {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Name of the offending field
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::Length { field, .. }
            | ValidationError::Invalid { field, .. } => field,
        }
    }
}

/// Uniform validator signature shared by every step
pub type Validator = fn(&FormData) -> Result<(), ValidationError>;

/// Fixed mapping from step order to validator
#[derive(Debug, Clone)]
pub struct StepValidators {
    validators: Vec<Validator>,
}

impl StepValidators {
    /// Validators for steps 1..=N, in order
    pub fn new(validators: Vec<Validator>) -> Self {
        Self { validators }
    }

    /// Validators matching `StepRegistry::report()`
    pub fn report() -> Self {
        Self::new(vec![
            validate_category,
            validate_details,
            validate_location,
            validate_review,
        ])
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Run the validator for `order` against `form`
    pub fn validate(&self, order: u32, form: &FormData) -> Result<(), ValidationError> {
        match order
            .checked_sub(1)
            .and_then(|i| self.validators.get(i as usize))
        {
            Some(validator) => validator(form),
            None => {
                tracing::warn!(step = order, "no validator registered for step");
                Ok(())
            }
        }
    }
}

/// Always passes; for steps without constraints
pub fn accept_all(_form: &FormData) -> Result<(), ValidationError> {
    Ok(())
}

/// Step 1: a known category
pub fn validate_category(form: &FormData) -> Result<(), ValidationError> {
    let category = form
        .text("category")
        .ok_or_else(|| ValidationError::required("category"))?;
    ReportCategory::from_str(category)
        .map(|_| ())
        .map_err(|_| ValidationError::invalid("category", format!("'{category}' is not a known category")))
}

/// Step 2: title and description
pub fn validate_details(form: &FormData) -> Result<(), ValidationError> {
    check_length(form, "title", TITLE_MIN, TITLE_MAX)?;
    check_length(form, "description", DESCRIPTION_MIN, DESCRIPTION_MAX)
}

/// Step 3: an address or coordinates, optional photo URL
pub fn validate_location(form: &FormData) -> Result<(), ValidationError> {
    let latitude = parse_coordinate(form, "latitude", 90.0)?;
    let longitude = parse_coordinate(form, "longitude", 180.0)?;

    match (latitude, longitude) {
        (Some(_), None) => return Err(ValidationError::required("longitude")),
        (None, Some(_)) => return Err(ValidationError::required("latitude")),
        (None, None) if form.text("address").is_none() => {
            return Err(ValidationError::invalid(
                "location",
                "needs an address or a map pin",
            ))
        }
        _ => {}
    }

    if let Some(url) = form.text("photo_url") {
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ValidationError::invalid(
                "photo_url",
                "must be an http(s) URL",
            ));
        }
    }

    Ok(())
}

/// Step 4: explicit confirmation
pub fn validate_review(form: &FormData) -> Result<(), ValidationError> {
    if form.flag("confirmed") == Some(true) {
        Ok(())
    } else {
        Err(ValidationError::invalid(
            "confirmed",
            "must be checked before sending",
        ))
    }
}

fn check_length(
    form: &FormData,
    field: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let value = form
        .text(field)
        .ok_or_else(|| ValidationError::required(field))?;
    let len = value.chars().count();
    if (min..=max).contains(&len) {
        Ok(())
    } else {
        Err(ValidationError::Length {
            field: field.to_string(),
            min,
            max,
        })
    }
}

fn parse_coordinate(
    form: &FormData,
    field: &str,
    bound: f64,
) -> Result<Option<f64>, ValidationError> {
    let Some(raw) = form.text(field) else {
        return Ok(None);
    };
    let value: f64 = raw
        .parse()
        .map_err(|_| ValidationError::invalid(field, "must be a number"))?;
    if !value.is_finite() || value.abs() > bound {
        return Err(ValidationError::invalid(
            field,
            format!("must be between -{bound} and {bound}"),
        ));
    }
    Ok(Some(value))
}
