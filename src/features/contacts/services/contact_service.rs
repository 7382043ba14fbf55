use crate::features::contacts::dtos::{ContactDto, ContactGroupDto, EmergencyDirectoryDto};
use crate::features::contacts::models::{ContactGroup, ALL_GROUPS, CREDITS, DIRECTORY};

/// Lookup over the static emergency directory
#[derive(Debug)]
pub struct ContactService {
    groups: &'static [ContactGroup],
}

impl Default for ContactService {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactService {
    pub fn new() -> Self {
        Self { groups: DIRECTORY }
    }

    /// Filter choices for the group dropdown
    pub fn group_names(&self) -> Vec<String> {
        std::iter::once(ALL_GROUPS)
            .chain(self.groups.iter().map(|g| g.name))
            .map(str::to_string)
            .collect()
    }

    /// Filters by group first, then by name; groups left empty are dropped
    pub fn lookup(&self, search: Option<&str>, group: Option<&str>) -> EmergencyDirectoryDto {
        let needle = search.map(|s| s.trim().to_lowercase()).unwrap_or_default();
        let group = group
            .map(str::trim)
            .filter(|g| !g.is_empty() && *g != ALL_GROUPS);

        let results = self
            .groups
            .iter()
            .filter(|g| group.is_none_or(|wanted| g.name == wanted))
            .filter_map(|g| {
                let contacts: Vec<ContactDto> = g
                    .contacts
                    .iter()
                    .filter(|c| c.name.to_lowercase().contains(&needle))
                    .map(ContactDto::from)
                    .collect();
                (!contacts.is_empty()).then(|| ContactGroupDto::new(g, contacts))
            })
            .collect();

        EmergencyDirectoryDto {
            groups: self.group_names(),
            results,
            credits: CREDITS.into(),
        }
    }
}
