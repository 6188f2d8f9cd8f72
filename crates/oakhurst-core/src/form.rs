//! # Form Module
//!
//! Parameter entry for new analyses and edits of existing ones.
//!
//! Input arrives as text (flags, prompts). Blank fields fall back to the
//! defaults the backend expects:
//! - description: `"Untitled Analysis"`
//! - amounts and rates: `0`
//! - projection period and frequencies: `1` week

use crate::{Analysis, AnalysisParams, AnalysisUpdate, OakhurstError};

/// Description used when the user leaves the field blank.
pub const DEFAULT_DESCRIPTION: &str = "Untitled Analysis";

/// Upper bound on the projection period, in weeks (100 years).
pub const MAX_PROJECTION_WEEKS: u32 = 5_200;

/// Names accepted by [`AnalysisUpdate::from_assignments`].
pub const EDITABLE_FIELDS: [&str; 9] = [
    "description",
    "principal",
    "interest_week",
    "projection_period",
    "tax_rate",
    "additional_deposit",
    "deposit_frequency",
    "regular_withdrawal",
    "withdrawal_frequency",
];

// =============================================================================
// ANALYSIS FORM
// =============================================================================

/// Raw text of the "create analysis" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisForm {
    pub description: String,
    pub principal: String,
    pub interest_week: String,
    pub projection_period: String,
    pub tax_rate: String,
    pub additional_deposit: String,
    pub deposit_frequency: String,
    pub regular_withdrawal: String,
    pub withdrawal_frequency: String,
}

impl AnalysisForm {
    /// Validate the form and build the request body.
    pub fn parse(&self) -> Result<AnalysisParams, OakhurstError> {
        let description = self.description.trim();
        let description = if description.is_empty() {
            DEFAULT_DESCRIPTION.to_string()
        } else {
            description.to_string()
        };

        Ok(AnalysisParams {
            description,
            principal: amount_or_zero("principal", &self.principal)?,
            interest_week: amount_or_zero("interest_week", &self.interest_week)?,
            projection_period: weeks_or_one("projection_period", &self.projection_period)?,
            tax_rate: percent_or_zero("tax_rate", &self.tax_rate)?,
            additional_deposit: amount_or_zero("additional_deposit", &self.additional_deposit)?,
            deposit_frequency: weeks_or_one("deposit_frequency", &self.deposit_frequency)?,
            regular_withdrawal: amount_or_zero("regular_withdrawal", &self.regular_withdrawal)?,
            withdrawal_frequency: weeks_or_one(
                "withdrawal_frequency",
                &self.withdrawal_frequency,
            )?,
        })
    }
}

// =============================================================================
// EDITS
// =============================================================================

impl AnalysisUpdate {
    /// Parse `field=value` assignments from the edit panel.
    ///
    /// Later assignments to the same field win. At least one assignment is
    /// required.
    pub fn from_assignments<S: AsRef<str>>(assignments: &[S]) -> Result<Self, OakhurstError> {
        if assignments.is_empty() {
            return Err(OakhurstError::invalid_input(
                "update",
                "expected at least one field=value assignment",
            ));
        }

        let mut update = Self::default();
        for raw in assignments {
            let raw = raw.as_ref();
            let (field, value) = raw.split_once('=').ok_or_else(|| {
                OakhurstError::invalid_input("update", &format!("'{raw}' is not field=value"))
            })?;
            let field = field.trim();
            match field {
                "description" => {
                    let text = value.trim();
                    if text.is_empty() {
                        return Err(OakhurstError::invalid_input(field, "must not be empty"));
                    }
                    update.description = Some(text.to_string());
                }
                "principal" => update.principal = Some(required_amount(field, value)?),
                "interest_week" => update.interest_week = Some(required_amount(field, value)?),
                "projection_period" => {
                    update.projection_period = Some(required_weeks(field, value)?);
                }
                "tax_rate" => update.tax_rate = Some(required_percent(field, value)?),
                "additional_deposit" => {
                    update.additional_deposit = Some(required_amount(field, value)?);
                }
                "deposit_frequency" => {
                    update.deposit_frequency = Some(required_weeks(field, value)?);
                }
                "regular_withdrawal" => {
                    update.regular_withdrawal = Some(required_amount(field, value)?);
                }
                "withdrawal_frequency" => {
                    update.withdrawal_frequency = Some(required_weeks(field, value)?);
                }
                other => {
                    return Err(OakhurstError::invalid_input(
                        other,
                        &format!("unknown field (editable: {})", EDITABLE_FIELDS.join(", ")),
                    ));
                }
            }
        }
        Ok(update)
    }

    /// `true` when no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The analysis as it looks after this edit, without asking the backend.
    #[must_use]
    pub fn apply_to(&self, analysis: &Analysis) -> Analysis {
        let mut edited = analysis.clone();
        if let Some(description) = &self.description {
            edited.description.clone_from(description);
        }
        if let Some(v) = self.principal {
            edited.principal = v;
        }
        if let Some(v) = self.interest_week {
            edited.interest_week = v;
        }
        if let Some(v) = self.projection_period {
            edited.projection_period = v;
        }
        if let Some(v) = self.tax_rate {
            edited.tax_rate = v;
        }
        if self.additional_deposit.is_some() {
            edited.additional_deposit = self.additional_deposit;
        }
        if self.deposit_frequency.is_some() {
            edited.deposit_frequency = self.deposit_frequency;
        }
        if self.regular_withdrawal.is_some() {
            edited.regular_withdrawal = self.regular_withdrawal;
        }
        if self.withdrawal_frequency.is_some() {
            edited.withdrawal_frequency = self.withdrawal_frequency;
        }
        edited
    }
}

// =============================================================================
// FIELD PARSERS
// =============================================================================

fn parse_amount(field: &str, text: &str) -> Result<f64, OakhurstError> {
    let text = text.trim();
    let value: f64 = text
        .parse()
        .map_err(|_| OakhurstError::invalid_input(field, &format!("'{text}' is not a number")))?;
    if !value.is_finite() {
        return Err(OakhurstError::invalid_input(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(OakhurstError::invalid_input(field, "must not be negative"));
    }
    Ok(value)
}

fn parse_percent(field: &str, text: &str) -> Result<f64, OakhurstError> {
    let value = parse_amount(field, text)?;
    if value > 100.0 {
        return Err(OakhurstError::invalid_input(field, "must be at most 100"));
    }
    Ok(value)
}

fn parse_weeks(field: &str, text: &str) -> Result<u32, OakhurstError> {
    let text = text.trim();
    let weeks: u32 = text.parse().map_err(|_| {
        OakhurstError::invalid_input(field, &format!("'{text}' is not a whole number of weeks"))
    })?;
    if weeks == 0 {
        return Err(OakhurstError::invalid_input(field, "must be at least 1 week"));
    }
    if weeks > MAX_PROJECTION_WEEKS {
        return Err(OakhurstError::invalid_input(
            field,
            &format!("must be at most {MAX_PROJECTION_WEEKS} weeks"),
        ));
    }
    Ok(weeks)
}

fn amount_or_zero(field: &str, text: &str) -> Result<f64, OakhurstError> {
    if text.trim().is_empty() {
        Ok(0.0)
    } else {
        parse_amount(field, text)
    }
}

fn percent_or_zero(field: &str, text: &str) -> Result<f64, OakhurstError> {
    if text.trim().is_empty() {
        Ok(0.0)
    } else {
        parse_percent(field, text)
    }
}

fn weeks_or_one(field: &str, text: &str) -> Result<u32, OakhurstError> {
    if text.trim().is_empty() {
        Ok(1)
    } else {
        parse_weeks(field, text)
    }
}

fn required_amount(field: &str, text: &str) -> Result<f64, OakhurstError> {
    if text.trim().is_empty() {
        return Err(OakhurstError::invalid_input(field, "must not be empty"));
    }
    parse_amount(field, text)
}

fn required_percent(field: &str, text: &str) -> Result<f64, OakhurstError> {
    if text.trim().is_empty() {
        return Err(OakhurstError::invalid_input(field, "must not be empty"));
    }
    parse_percent(field, text)
}

fn required_weeks(field: &str, text: &str) -> Result<u32, OakhurstError> {
    if text.trim().is_empty() {
        return Err(OakhurstError::invalid_input(field, "must not be empty"));
    }
    parse_weeks(field, text)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn filled() -> AnalysisForm {
        AnalysisForm {
            description: " Retirement ".into(),
            principal: "10000".into(),
            interest_week: "0.5".into(),
            projection_period: "52".into(),
            tax_rate: "15".into(),
            additional_deposit: "100".into(),
            deposit_frequency: "4".into(),
            regular_withdrawal: "50".into(),
            withdrawal_frequency: "2".into(),
        }
    }

    #[test]
    fn blank_form_uses_defaults() {
        let params = AnalysisForm::default().parse().expect("parse");
        assert_eq!(params.description, DEFAULT_DESCRIPTION);
        assert_eq!(params.principal, 0.0);
        assert_eq!(params.projection_period, 1);
        assert_eq!(params.deposit_frequency, 1);
        assert_eq!(params.withdrawal_frequency, 1);
        assert_eq!(params.tax_rate, 0.0);
    }

    #[test]
    fn filled_form_is_trimmed_and_parsed() {
        let params = filled().parse().expect("parse");
        assert_eq!(params.description, "Retirement");
        assert_eq!(params.principal, 10_000.0);
        assert_eq!(params.interest_week, 0.5);
        assert_eq!(params.projection_period, 52);
        assert_eq!(params.deposit_frequency, 4);
        assert_eq!(params.withdrawal_frequency, 2);
    }

    #[test]
    fn bad_numbers_name_the_field() {
        let mut form = filled();
        form.principal = "ten".into();
        match form.parse() {
            Err(OakhurstError::InvalidInput { field, .. }) => assert_eq!(field, "principal"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn zero_frequency_is_rejected() {
        let mut form = filled();
        form.deposit_frequency = "0".into();
        assert!(form.parse().is_err());
    }

    #[test]
    fn negative_and_non_finite_amounts_are_rejected() {
        let mut form = filled();
        form.regular_withdrawal = "-5".into();
        assert!(form.parse().is_err());

        let mut form = filled();
        form.principal = "inf".into();
        assert!(form.parse().is_err());
    }

    #[test]
    fn tax_rate_above_hundred_is_rejected() {
        let mut form = filled();
        form.tax_rate = "150".into();
        assert!(form.parse().is_err());
    }

    #[test]
    fn assignments_build_partial_update() {
        let update = AnalysisUpdate::from_assignments(&[
            "principal=2500",
            "interest_week = 1.25",
            "withdrawal_frequency=3",
        ])
        .expect("parse");
        assert_eq!(update.principal, Some(2500.0));
        assert_eq!(update.interest_week, Some(1.25));
        assert_eq!(update.withdrawal_frequency, Some(3));
        assert_eq!(update.description, None);
        assert!(!update.is_empty());
    }

    #[test]
    fn assignments_reject_unknown_and_malformed() {
        assert!(AnalysisUpdate::from_assignments(&["color=red"]).is_err());
        assert!(AnalysisUpdate::from_assignments(&["principal"]).is_err());
        assert!(AnalysisUpdate::from_assignments(&["principal="]).is_err());
        assert!(AnalysisUpdate::from_assignments::<&str>(&[]).is_err());
    }

    #[test]
    fn apply_to_only_touches_set_fields() {
        let original: Analysis = filled().parse().expect("parse").into();
        let update = AnalysisUpdate {
            regular_withdrawal: Some(75.0),
            description: Some("Edited".into()),
            ..AnalysisUpdate::default()
        };
        let edited = update.apply_to(&original);
        assert_eq!(edited.description, "Edited");
        assert_eq!(edited.regular_withdrawal, Some(75.0));
        assert_eq!(edited.principal, original.principal);
        assert_eq!(edited.deposit_frequency, original.deposit_frequency);
    }

    #[test]
    fn single_field_edit_yields_full_parameter_set() {
        let base: Analysis = filled().parse().expect("parse").into();
        let stored = Analysis {
            additional_deposit: None,
            regular_withdrawal: None,
            withdrawal_frequency: None,
            ..base
        };
        let update = AnalysisUpdate::from_assignments(&["interest_week=1.0"]).expect("update");
        let body = serde_json::to_value(update.apply_to(&stored).params()).expect("json");

        assert_eq!(body["interest_week"], 1.0);
        assert_eq!(body["principal"], 10000.0);
        assert_eq!(body["additional_deposit"], 0.0);
        assert_eq!(body["regular_withdrawal"], 0.0);
        assert_eq!(body["withdrawal_frequency"], 1);
        assert_eq!(body["description"], "Retirement");
    }
}
