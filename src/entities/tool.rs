use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

pub use super::sea_orm_active_enums::{ItemCondition, ToolStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "tools")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub tool_name: String,
    pub tool_category: Option<String>,
    #[sea_orm(unique)]
    pub serial_number: Option<String>,
    pub condition: ItemCondition,
    pub status: ToolStatus,
    pub location: Option<String>,
    pub checked_out_to: Option<i32>,
    pub checked_out_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// A checkout or checkin attempted from the wrong status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("Tool is not available for checkout")]
    NotAvailable(ToolStatus),
    #[error("Tool is not checked out")]
    NotCheckedOut(ToolStatus),
}

impl TransitionError {
    /// The status the guard expected to find.
    pub fn required(&self) -> ToolStatus {
        match self {
            TransitionError::NotAvailable(_) => ToolStatus::Available,
            TransitionError::NotCheckedOut(_) => ToolStatus::InUse,
        }
    }
}

impl Model {
    /// Hands the tool to `user_id`. Only an available tool can be checked out.
    pub fn checkout(self, user_id: i32, now: DateTime) -> Result<ActiveModel, TransitionError> {
        if self.status != ToolStatus::Available {
            return Err(TransitionError::NotAvailable(self.status));
        }

        let mut active: ActiveModel = self.into();
        active.status = Set(ToolStatus::InUse);
        active.checked_out_to = Set(Some(user_id));
        active.checked_out_at = Set(Some(now));
        active.updated_at = Set(now);
        Ok(active)
    }

    /// Returns an in-use tool to the store.
    pub fn checkin(self, now: DateTime) -> Result<ActiveModel, TransitionError> {
        if self.status != ToolStatus::InUse {
            return Err(TransitionError::NotCheckedOut(self.status));
        }

        let mut active: ActiveModel = self.into();
        active.status = Set(ToolStatus::Available);
        active.checked_out_to = Set(None);
        active.checked_out_at = Set(None);
        active.updated_at = Set(now);
        Ok(active)
    }
}
