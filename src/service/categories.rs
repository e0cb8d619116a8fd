//! Category endpoints. Names are unique per user, compared case-insensitively.

use serde::Serialize;

use super::{Service, ServiceError, Session};
use crate::core::Category;
use crate::store::DocumentStore;

#[derive(Debug, Clone, Serialize)]
pub struct CategoryResponse {
    pub message: String,
    pub category: Category,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryDeleted {
    pub message: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoriesResponse {
    pub message: String,
    pub categories: Vec<Category>,
}

impl<S: DocumentStore> Service<S> {
    pub fn create_category(
        &self,
        session: &Session,
        category: Category,
    ) -> Result<CategoryResponse, ServiceError> {
        let uid = session.uid()?;
        if category.name.trim().is_empty() || category.kind.trim().is_empty() {
            return Err(ServiceError::InvalidArgument(
                "category name and kind are required".to_string(),
            ));
        }
        let (mut user, revision) = self.load_user(uid)?;
        let duplicate = user
            .categories
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(&category.name));
        if duplicate {
            return Err(ServiceError::AlreadyExists(format!(
                "category {} already exists",
                category.name
            )));
        }
        user.categories.push(category.clone());
        self.write_field(uid, "categories", &user.categories, revision)?;
        Ok(CategoryResponse {
            message: "category created".to_string(),
            category,
        })
    }

    /// Removes the category whose name matches exactly.
    pub fn delete_category(
        &self,
        session: &Session,
        name: &str,
    ) -> Result<CategoryDeleted, ServiceError> {
        let uid = session.uid()?;
        if name.trim().is_empty() {
            return Err(ServiceError::InvalidArgument(
                "category name is required".to_string(),
            ));
        }
        let (mut user, revision) = self.load_user(uid)?;
        let before = user.categories.len();
        user.categories.retain(|c| c.name != name);
        if user.categories.len() == before {
            return Err(ServiceError::NotFound(format!("category {name} not found")));
        }
        self.write_field(uid, "categories", &user.categories, revision)?;
        Ok(CategoryDeleted {
            message: "category deleted".to_string(),
            name: name.to_string(),
        })
    }

    pub fn get_all_categories(
        &self,
        session: &Session,
    ) -> Result<CategoriesResponse, ServiceError> {
        let uid = session.uid()?;
        let (user, _) = self.load_user(uid)?;
        Ok(CategoriesResponse {
            message: "categories found".to_string(),
            categories: user.categories,
        })
    }
}
