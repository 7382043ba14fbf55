use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::features::contacts::models::{ContactGroup, Credits, EmergencyContact};

/// Query params for the emergency directory
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ContactSearchQuery {
    /// Case-insensitive substring of the contact name
    pub search: Option<String>,
    /// Exact group name, or `All` (default)
    pub group: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactDto {
    pub name: String,
    /// Number(s) as published, several separated by `/`
    pub number: String,
    /// First number as digits, ready for a `tel:` link
    pub dial: String,
}

impl From<&EmergencyContact> for ContactDto {
    fn from(contact: &EmergencyContact) -> Self {
        Self {
            name: contact.name.to_string(),
            number: contact.number.to_string(),
            dial: contact.dial(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactGroupDto {
    pub name: String,
    pub contacts: Vec<ContactDto>,
}

impl ContactGroupDto {
    pub fn new(group: &ContactGroup, contacts: Vec<ContactDto>) -> Self {
        Self {
            name: group.name.to_string(),
            contacts,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreditsDto {
    pub developed_by: String,
    pub version: String,
}

impl From<Credits> for CreditsDto {
    fn from(credits: Credits) -> Self {
        Self {
            developed_by: credits.developed_by.to_string(),
            version: credits.version.to_string(),
        }
    }
}

/// Response DTO for the emergency directory
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmergencyDirectoryDto {
    /// Group filter choices, `All` first
    pub groups: Vec<String>,
    /// Matching groups; groups without matches are left out
    pub results: Vec<ContactGroupDto>,
    pub credits: CreditsDto,
}
