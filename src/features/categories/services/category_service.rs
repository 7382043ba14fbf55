use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::CategoryGroupDto;
use crate::features::categories::models::categories_for;
use crate::features::posts::models::PostKind;

/// Service for the static category taxonomy
#[derive(Debug, Default)]
pub struct CategoryService;

impl CategoryService {
    pub fn new() -> Self {
        Self
    }

    /// List category groups, optionally for a single kind
    pub fn list(&self, kind: Option<PostKind>) -> Vec<CategoryGroupDto> {
        PostKind::ALL
            .into_iter()
            .filter(|k| kind.is_none_or(|wanted| wanted == *k))
            .map(|k| CategoryGroupDto {
                kind: k,
                categories: categories_for(k).iter().map(|c| c.to_string()).collect(),
            })
            .collect()
    }

    /// Maps free-form labels onto the canonical taxonomy spelling.
    ///
    /// Fails on the first label that the kind does not offer.
    pub fn canonicalize(&self, kind: PostKind, labels: &[String]) -> Result<Vec<String>> {
        labels
            .iter()
            .map(|label| {
                categories_for(kind)
                    .iter()
                    .find(|c| c.eq_ignore_ascii_case(label.trim()))
                    .map(|c| c.to_string())
                    .ok_or_else(|| {
                        AppError::Validation(format!(
                            "category: '{}' is not a valid {} category",
                            label, kind
                        ))
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_filters_by_kind() {
        let service = CategoryService::new();
        assert_eq!(service.list(None).len(), 2);

        let help = service.list(Some(PostKind::Help));
        assert_eq!(help.len(), 1);
        assert!(help[0].categories.contains(&"Rescue".to_string()));
    }

    #[test]
    fn test_canonicalize_fixes_case() {
        let service = CategoryService::new();
        let labels = vec!["water".to_string(), " FOOD ".to_string()];
        assert_eq!(
            service.canonicalize(PostKind::Source, &labels).unwrap(),
            vec!["Water".to_string(), "Food".to_string()]
        );
    }

    #[test]
    fn test_canonicalize_rejects_help_only_label_for_sources() {
        let service = CategoryService::new();
        let labels = vec!["Rescue".to_string()];
        assert!(service.canonicalize(PostKind::Source, &labels).is_err());
        assert!(service.canonicalize(PostKind::Help, &labels).is_ok());
    }
}
