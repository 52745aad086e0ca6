//! Shape validation for submitted listing forms.
//!
//! Every failing field contributes one message; callers receive all of them
//! at once so the form can be corrected in a single round trip.

use serde_json::json;

use super::{Error, ListingFields};

/// Maximum title length in characters.
pub const TITLE_MAX_CHARS: usize = 120;

/// Raw listing form text as submitted by the browser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPayload {
    /// `listing[title]`.
    pub title: Option<String>,
    /// `listing[description]`.
    pub description: Option<String>,
    /// `listing[price]`.
    pub price: Option<String>,
    /// `listing[location]`.
    pub location: Option<String>,
    /// `listing[country]`.
    pub country: Option<String>,
}

/// Category of a field failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldIssueCode {
    /// Absent or blank.
    Required,
    /// Longer than allowed.
    TooLong,
    /// Not a whole number.
    NotANumber,
    /// Below the minimum.
    TooSmall,
}

impl FieldIssueCode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::TooLong => "too_long",
            Self::NotANumber => "not_a_number",
            Self::TooSmall => "too_small",
        }
    }
}

/// One failing field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Field name without the `listing[...]` wrapper.
    pub field: &'static str,
    /// Failure category.
    pub code: FieldIssueCode,
    /// User-facing message.
    pub message: String,
}

impl FieldIssue {
    /// `"{field}" is required`.
    pub fn required(field: &'static str) -> Self {
        Self {
            field,
            code: FieldIssueCode::Required,
            message: format!("\"{field}\" is required"),
        }
    }
}

/// All field failures for one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingValidationErrors(Vec<FieldIssue>);

impl ListingValidationErrors {
    /// Record another failure.
    pub fn push(&mut self, issue: FieldIssue) {
        self.0.push(issue);
    }

    /// Whether no failure was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Recorded failures in field order.
    pub fn issues(&self) -> &[FieldIssue] {
        &self.0
    }

    /// Messages joined with `,`.
    pub fn message(&self) -> String {
        self.0
            .iter()
            .map(|issue| issue.message.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl From<ListingValidationErrors> for Error {
    fn from(value: ListingValidationErrors) -> Self {
        let details: Vec<_> = value
            .issues()
            .iter()
            .map(|issue| {
                json!({
                    "field": issue.field,
                    "code": issue.code.as_str(),
                    "message": issue.message,
                })
            })
            .collect();
        Self::invalid_request(value.message()).with_details(json!({ "errors": details }))
    }
}

fn required_text(
    field: &'static str,
    value: Option<&str>,
    errors: &mut ListingValidationErrors,
) -> Option<String> {
    match value.map(str::trim).filter(|text| !text.is_empty()) {
        Some(text) => Some(text.to_owned()),
        None => {
            errors.push(FieldIssue::required(field));
            None
        }
    }
}

fn title(value: Option<&str>, errors: &mut ListingValidationErrors) -> Option<String> {
    let text = required_text("title", value, errors)?;
    if text.chars().count() > TITLE_MAX_CHARS {
        errors.push(FieldIssue {
            field: "title",
            code: FieldIssueCode::TooLong,
            message: format!(
                "\"title\" length must be less than or equal to {TITLE_MAX_CHARS} characters long"
            ),
        });
        return None;
    }
    Some(text)
}

fn price(value: Option<&str>, errors: &mut ListingValidationErrors) -> Option<i64> {
    let text = required_text("price", value, errors)?;
    let Ok(amount) = text.parse::<i64>() else {
        errors.push(FieldIssue {
            field: "price",
            code: FieldIssueCode::NotANumber,
            message: "\"price\" must be a whole number".to_owned(),
        });
        return None;
    };
    if amount < 0 {
        errors.push(FieldIssue {
            field: "price",
            code: FieldIssueCode::TooSmall,
            message: "\"price\" must be greater than or equal to 0".to_owned(),
        });
        return None;
    }
    Some(amount)
}

impl ListingPayload {
    /// Validate every field, collecting all failures.
    ///
    /// # Examples
    /// ```
    /// use wanderlust::domain::ListingPayload;
    ///
    /// let payload = ListingPayload {
    ///     price: Some("-5".to_owned()),
    ///     ..ListingPayload::default()
    /// };
    /// let errors = payload.validate().expect_err("invalid payload");
    /// assert!(errors.message().starts_with("\"title\" is required,"));
    /// ```
    pub fn validate(&self) -> Result<ListingFields, ListingValidationErrors> {
        let mut errors = ListingValidationErrors::default();
        let title = title(self.title.as_deref(), &mut errors);
        let description = required_text("description", self.description.as_deref(), &mut errors);
        let price = price(self.price.as_deref(), &mut errors);
        let location = required_text("location", self.location.as_deref(), &mut errors);
        let country = required_text("country", self.country.as_deref(), &mut errors);

        match (title, description, price, location, country) {
            (Some(title), Some(description), Some(price), Some(location), Some(country))
                if errors.is_empty() =>
            {
                Ok(ListingFields {
                    title,
                    description,
                    price,
                    location,
                    country,
                })
            }
            _ => Err(errors),
        }
    }
}
