//! Category repository. Admin only.

use qd_core::enums::Collection;
use qd_core::inputs::{NewCategory, validate_category_name};
use qd_store::to_fields;
use tracing::info;

use crate::error::MutationError;
use crate::service::HelpdeskService;
use crate::updates::category::CategoryUpdate;

impl HelpdeskService {
    pub async fn create_category(&self, category: NewCategory) -> Result<String, MutationError> {
        self.require_admin("create_category")?;
        category.validate()?;
        let id = self
            .store()
            .add_document(Collection::Categories, to_fields(&category)?)
            .await?;
        info!(category = %id, name = %category.name, "category created");
        Ok(id)
    }

    /// Tickets filed under the old name keep it; renaming does not cascade.
    pub async fn update_category(&self, id: &str, update: CategoryUpdate) -> Result<(), MutationError> {
        self.require_admin("update_category")?;
        if let Some(name) = &update.name {
            validate_category_name(name)?;
        }
        self.store()
            .update_document(Collection::Categories, id, to_fields(&update)?)
            .await?;
        info!(category = %id, "category updated");
        Ok(())
    }

    /// Delete the category. Tickets referencing its name are left as they
    /// are.
    pub async fn delete_category(&self, id: &str) -> Result<(), MutationError> {
        self.require_admin("delete_category")?;
        self.store()
            .delete_document(Collection::Categories, id)
            .await?;
        info!(category = %id, "category deleted");
        Ok(())
    }
}
