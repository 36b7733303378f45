use models::{
    grid::Grid, identity::ClassIdentity, publication::PublicationState, slot::SlotCatalog,
};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "timetables")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub year: String,
    pub branch: String, // lowercase
    pub section: String, // uppercase
    pub academic_year: String,
    /// `None` means the class runs on the standard day
    #[sea_orm(column_type = "Text", nullable)]
    pub catalog: Option<SlotCatalog>,
    #[sea_orm(column_type = "Text")]
    pub grid: Grid,
    pub is_published: bool,
    pub published_at: Option<DateTime>,
    pub last_published_at: Option<DateTime>,
    pub created_by: String,
    pub last_modified_by: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn identity(&self) -> ClassIdentity {
        ClassIdentity::new(
            &self.year,
            &self.branch,
            &self.section,
            &self.academic_year,
        )
    }

    /// The catalog the grid is keyed against
    pub fn effective_catalog(&self) -> SlotCatalog {
        self.catalog.clone().unwrap_or_default()
    }

    pub fn state(&self) -> PublicationState {
        PublicationState::from_flags(self.is_published, self.last_published_at)
    }
}
