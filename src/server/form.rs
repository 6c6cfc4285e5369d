//! Form field parsing

use std::collections::HashMap;
use std::str::FromStr;

use thiserror::Error;

use crate::data::FeatureRow;

/// Why a submitted form could not become a feature row
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Missing form field: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {field}: {value:?}")]
    Invalid { field: &'static str, value: String },

    #[error("Unreadable form body: {0}")]
    Body(String),
}

fn field<'a>(form: &'a HashMap<String, String>, name: &'static str) -> Result<&'a str, FormError> {
    form.get(name)
        .map(|v| v.trim())
        .ok_or(FormError::Missing(name))
}

fn parse_field<T: FromStr>(form: &HashMap<String, String>, name: &'static str) -> Result<T, FormError> {
    let raw = field(form, name)?;
    raw.parse().map_err(|_| FormError::Invalid {
        field: name,
        value: raw.to_string(),
    })
}

/// A count of people; negative values are invalid
fn parse_count(form: &HashMap<String, String>, name: &'static str) -> Result<i64, FormError> {
    let value: i64 = parse_field(form, name)?;
    if value < 0 {
        return Err(FormError::Invalid {
            field: name,
            value: value.to_string(),
        });
    }
    Ok(value)
}

/// A finite, non-negative real (`NaN`, `inf` and `-1` are rejected)
fn parse_amount(form: &HashMap<String, String>, name: &'static str) -> Result<f64, FormError> {
    let value: f64 = parse_field(form, name)?;
    if !value.is_finite() || value < 0.0 {
        return Err(FormError::Invalid {
            field: name,
            value: field(form, name)?.to_string(),
        });
    }
    Ok(value)
}

/// Build a feature row from the six passenger fields
///
/// `Pclass`, `SibSp` and `Parch` parse as integers, `Age` and `Fare` as
/// finite reals; counts and reals must not be negative. `Sex` and the
/// class are taken as given.
pub fn parse_form(form: &HashMap<String, String>) -> Result<FeatureRow, FormError> {
    Ok(FeatureRow {
        pclass: parse_field(form, "Pclass")?,
        sex: field(form, "Sex")?.to_string(),
        age: parse_amount(form, "Age")?,
        sib_sp: parse_count(form, "SibSp")?,
        parch: parse_count(form, "Parch")?,
        fare: parse_amount(form, "Fare")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn valid() -> HashMap<String, String> {
        form(&[
            ("Pclass", "3"),
            ("Sex", "male"),
            ("Age", "22"),
            ("SibSp", "1"),
            ("Parch", "0"),
            ("Fare", "7.25"),
        ])
    }

    #[test]
    fn test_parse_valid_form() {
        let row = parse_form(&valid()).unwrap();
        assert_eq!(row.pclass, 3);
        assert_eq!(row.sex, "male");
        assert_eq!(row.age, 22.0);
        assert_eq!(row.sib_sp, 1);
        assert_eq!(row.parch, 0);
        assert_eq!(row.fare, 7.25);
    }

    #[test]
    fn test_whitespace_trimmed() {
        let mut f = valid();
        f.insert("Age".into(), " 30.5 ".into());
        assert_eq!(parse_form(&f).unwrap().age, 30.5);
    }

    #[test]
    fn test_non_numeric_age() {
        let mut f = valid();
        f.insert("Age".into(), "abc".into());
        assert_eq!(
            parse_form(&f).unwrap_err(),
            FormError::Invalid {
                field: "Age",
                value: "abc".into()
            }
        );
    }

    #[test]
    fn test_non_finite_reals_rejected() {
        for (name, value) in [
            ("Age", "NaN"),
            ("Age", "inf"),
            ("Fare", "-inf"),
            ("Fare", "nan"),
        ] {
            let mut f = valid();
            f.insert(name.into(), value.into());
            assert_eq!(
                parse_form(&f).unwrap_err(),
                FormError::Invalid {
                    field: name,
                    value: value.into()
                }
            );
        }
    }

    #[test]
    fn test_negative_values_rejected() {
        for (name, value) in [("Age", "-5"), ("Fare", "-0.5"), ("SibSp", "-1"), ("Parch", "-2")] {
            let mut f = valid();
            f.insert(name.into(), value.into());
            assert!(
                matches!(parse_form(&f), Err(FormError::Invalid { field, .. }) if field == name),
                "{name}={value}"
            );
        }
    }

    #[test]
    fn test_zero_is_valid() {
        let mut f = valid();
        f.insert("Age".into(), "0".into());
        f.insert("Fare".into(), "0.0".into());
        let row = parse_form(&f).unwrap();
        assert_eq!(row.age, 0.0);
        assert_eq!(row.fare, 0.0);
    }

    #[test]
    fn test_integer_field_rejects_real() {
        let mut f = valid();
        f.insert("Pclass".into(), "2.5".into());
        assert!(matches!(
            parse_form(&f),
            Err(FormError::Invalid { field: "Pclass", .. })
        ));
    }

    #[test]
    fn test_missing_field() {
        let mut f = valid();
        f.remove("Fare");
        let err = parse_form(&f).unwrap_err();
        assert_eq!(err, FormError::Missing("Fare"));
        assert!(!err.to_string().is_empty());
    }
}
