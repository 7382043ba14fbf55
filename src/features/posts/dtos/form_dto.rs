use std::borrow::Cow;

use serde::Deserialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::features::posts::models::{deserialize_categories, Coordinates, PostKind};
use crate::shared::validation::{not_blank, PH_MOBILE_REGEX};

/// Payload of the "pin a source" form
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_pin_source_location", skip_on_field_errors = false))]
pub struct PinSourceFormDto {
    /// One or more resource categories
    #[serde(default, deserialize_with = "deserialize_categories")]
    #[validate(length(min = 1, message = "Please select at least one category."))]
    pub category: Vec<String>,

    /// Optional headline; derived from category and location when absent
    pub title: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Description is required."))]
    pub description: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Full name is required."))]
    pub full_name: String,

    #[serde(default)]
    #[validate(custom(function = "source_contact_number"))]
    pub contact_number: String,

    /// Free-text location label (search text or selected place name)
    #[serde(default)]
    pub manual_location: String,

    pub coordinates: Option<Coordinates>,

    /// City resolved by the client, if any
    pub city: Option<String>,
}

/// Payload of the "ask for help" form
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_ask_help_location", skip_on_field_errors = false))]
pub struct AskHelpFormDto {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Title is required."))]
    pub title: String,

    /// Assistance needed
    #[serde(default, deserialize_with = "deserialize_categories")]
    #[validate(length(min = 1, message = "Please select at least one category."))]
    pub category: Vec<String>,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Please describe your situation."))]
    pub description: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Full name is required."))]
    pub full_name: String,

    #[serde(default)]
    #[validate(custom(function = "help_contact_number"))]
    pub contact_number: String,

    #[serde(default)]
    pub manual_location: String,

    pub coordinates: Option<Coordinates>,

    pub city: Option<String>,
}

/// Required regional mobile number, reported with the form's own format message
fn contact_number(value: &str, invalid: &'static str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::new("required")
            .with_message(Cow::Borrowed("Contact number is required.")));
    }
    if !PH_MOBILE_REGEX.is_match(value) {
        return Err(ValidationError::new("phone").with_message(Cow::Borrowed(invalid)));
    }
    Ok(())
}

fn source_contact_number(value: &str) -> Result<(), ValidationError> {
    contact_number(
        value,
        "Please enter a valid PH mobile number (e.g., 09171234567 or +639171234567).",
    )
}

fn help_contact_number(value: &str) -> Result<(), ValidationError> {
    contact_number(
        value,
        "Please enter a valid PH mobile number (e.g., 09171234567).",
    )
}

fn location_is_set(coordinates: Option<Coordinates>, manual_location: &str) -> bool {
    coordinates.is_some() || !manual_location.trim().is_empty()
}

fn missing_location() -> ValidationError {
    ValidationError::new("location").with_message(Cow::Borrowed(
        "Please set a location by search or using your current location.",
    ))
}

fn validate_pin_source_location(form: &PinSourceFormDto) -> Result<(), ValidationError> {
    if location_is_set(form.coordinates, &form.manual_location) {
        Ok(())
    } else {
        Err(missing_location())
    }
}

fn validate_ask_help_location(form: &AskHelpFormDto) -> Result<(), ValidationError> {
    if location_is_set(form.coordinates, &form.manual_location) {
        Ok(())
    } else {
        Err(missing_location())
    }
}

/// A validated form, flattened for post creation
#[derive(Debug, Clone)]
pub struct PostSubmission {
    pub kind: PostKind,
    pub categories: Vec<String>,
    pub title: Option<String>,
    pub description: String,
    pub location: String,
    pub city: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub full_name: String,
    pub contact_number: String,
}

impl PostSubmission {
    /// Contact line shown on the map, `"<name> - <number>"`
    pub fn contact(&self) -> String {
        format!("{} - {}", self.full_name, self.contact_number)
    }

    /// Form title, or `"<first category> @ <place>"` when none was given
    pub fn resolved_title(&self) -> String {
        if let Some(title) = self.title.as_deref().map(str::trim) {
            if !title.is_empty() {
                return title.to_string();
            }
        }

        let category = self
            .categories
            .first()
            .map(String::as_str)
            .unwrap_or("Resource");
        let place = self
            .location
            .split(',')
            .next()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .or(self.city.as_deref())
            .unwrap_or("pinned location");
        format!("{} @ {}", category, place)
    }
}

/// Common surface of the two post forms
pub trait PostForm: Validate + Send {
    const KIND: PostKind;

    fn into_submission(self) -> PostSubmission;
}

fn clean_city(city: Option<String>) -> Option<String> {
    city.map(|c| c.trim().to_string()).filter(|c| !c.is_empty())
}

impl PostForm for PinSourceFormDto {
    const KIND: PostKind = PostKind::Source;

    fn into_submission(self) -> PostSubmission {
        PostSubmission {
            kind: Self::KIND,
            categories: self.category,
            title: self.title,
            description: self.description.trim().to_string(),
            location: self.manual_location.trim().to_string(),
            city: clean_city(self.city),
            coordinates: self.coordinates,
            full_name: self.full_name.trim().to_string(),
            contact_number: self.contact_number.trim().to_string(),
        }
    }
}

impl PostForm for AskHelpFormDto {
    const KIND: PostKind = PostKind::Help;

    fn into_submission(self) -> PostSubmission {
        PostSubmission {
            kind: Self::KIND,
            categories: self.category,
            title: Some(self.title.trim().to_string()),
            description: self.description.trim().to_string(),
            location: self.manual_location.trim().to_string(),
            city: clean_city(self.city),
            coordinates: self.coordinates,
            full_name: self.full_name.trim().to_string(),
            contact_number: self.contact_number.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use fake::faker::name::en::Name;
    use fake::Fake;
    use serde_json::json;

    use super::*;
    use crate::shared::validation::field_messages;

    fn valid_help_form() -> serde_json::Value {
        let name: String = Name().fake();
        json!({
            "title": "Family Needs Evacuation",
            "category": ["Rescue"],
            "description": "Family of 5 stranded on 2nd floor.",
            "fullName": name,
            "contactNumber": "09151112233",
            "manualLocation": "Talisay City",
            "coordinates": [10.2447, 123.8494]
        })
    }

    fn messages_for(value: serde_json::Value) -> Vec<String> {
        let form: AskHelpFormDto = serde_json::from_value(value).unwrap();
        match form.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => field_messages(&errors),
        }
    }

    #[test]
    fn test_valid_help_form_passes() {
        assert!(messages_for(valid_help_form()).is_empty());
    }

    #[test]
    fn test_each_missing_field_has_its_own_message() {
        let cases = [
            ("title", "title: Title is required."),
            ("category", "category: Please select at least one category."),
            ("description", "description: Please describe your situation."),
            ("fullName", "fullName: Full name is required."),
            ("contactNumber", "contactNumber: Contact number is required."),
        ];

        for (field, expected) in cases {
            let mut form = valid_help_form();
            form.as_object_mut().unwrap().remove(field);
            assert_eq!(messages_for(form), vec![expected.to_string()], "{}", field);
        }
    }

    #[test]
    fn test_invalid_phone_is_rejected() {
        let mut form = valid_help_form();
        form["contactNumber"] = json!("0917-123-4567");
        assert_eq!(
            messages_for(form),
            vec![
                "contactNumber: Please enter a valid PH mobile number (e.g., 09171234567)."
                    .to_string()
            ]
        );

        let mut form = valid_help_form();
        form["contactNumber"] = json!(" +639171234567 ");
        assert!(messages_for(form).is_empty());
    }

    #[test]
    fn test_location_required_even_with_other_errors() {
        let mut form = valid_help_form();
        let object = form.as_object_mut().unwrap();
        object.remove("coordinates");
        object.insert("manualLocation".to_string(), json!("   "));
        object.remove("title");

        let messages = messages_for(form);
        assert!(messages.contains(&"title: Title is required.".to_string()));
        assert!(messages.contains(
            &"location: Please set a location by search or using your current location."
                .to_string()
        ));
    }

    #[test]
    fn test_manual_location_alone_is_enough() {
        let mut form = valid_help_form();
        form.as_object_mut().unwrap().remove("coordinates");
        assert!(messages_for(form).is_empty());
    }

    #[test]
    fn test_source_form_uses_its_own_description_message() {
        let form: PinSourceFormDto = serde_json::from_value(json!({
            "category": "Water",
            "fullName": "Maria Santos",
            "contactNumber": "09123456789",
            "manualLocation": "Cebu City"
        }))
        .unwrap();
        let messages = field_messages(&form.validate().unwrap_err());
        assert_eq!(messages, vec!["description: Description is required.".to_string()]);
    }

    #[test]
    fn test_source_form_phone_message_shows_both_formats() {
        let form: PinSourceFormDto = serde_json::from_value(json!({
            "category": "Water",
            "description": "Refill station",
            "fullName": "Maria Santos",
            "contactNumber": "12345",
            "manualLocation": "Cebu City"
        }))
        .unwrap();
        let messages = field_messages(&form.validate().unwrap_err());
        assert_eq!(
            messages,
            vec![
                "contactNumber: Please enter a valid PH mobile number (e.g., 09171234567 or +639171234567)."
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_source_title_is_derived() {
        let form: PinSourceFormDto = serde_json::from_value(json!({
            "category": ["Water", "Food"],
            "description": "Free drinking water",
            "fullName": " Maria Santos ",
            "contactNumber": "09123456789",
            "manualLocation": "Barangay Hall, Cebu City, Central Visayas"
        }))
        .unwrap();
        let submission = form.into_submission();
        assert_eq!(submission.resolved_title(), "Water @ Barangay Hall");
        assert_eq!(submission.contact(), "Maria Santos - 09123456789");
    }
}
