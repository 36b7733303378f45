use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create timetables table
        manager
            .create_table(
                Table::create()
                    .table(Timetables::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Timetables::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Timetables::Year).string().not_null())
                    .col(ColumnDef::new(Timetables::Branch).string().not_null())
                    .col(ColumnDef::new(Timetables::Section).string().not_null())
                    .col(ColumnDef::new(Timetables::AcademicYear).string().not_null())
                    // Slot catalog as JSON text, NULL means the standard day
                    .col(ColumnDef::new(Timetables::Catalog).text())
                    .col(ColumnDef::new(Timetables::Grid).text().not_null())
                    .col(
                        ColumnDef::new(Timetables::IsPublished)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Timetables::PublishedAt).date_time())
                    .col(ColumnDef::new(Timetables::LastPublishedAt).date_time())
                    .col(ColumnDef::new(Timetables::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Timetables::LastModifiedBy).string())
                    .col(ColumnDef::new(Timetables::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(Timetables::UpdatedAt).date_time().not_null())
                    .to_owned(),
            )
            .await?;

        // One timetable per class identity
        manager
            .create_index(
                Index::create()
                    .name("idx_timetables_class_identity")
                    .table(Timetables::Table)
                    .col(Timetables::Year)
                    .col(Timetables::Branch)
                    .col(Timetables::Section)
                    .col(Timetables::AcademicYear)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create teachers table
        manager
            .create_table(
                Table::create()
                    .table(Teachers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Teachers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Teachers::DisplayName).string().not_null())
                    .col(ColumnDef::new(Teachers::Username).string())
                    .col(ColumnDef::new(Teachers::Department).string().not_null())
                    .col(
                        ColumnDef::new(Teachers::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Teachers::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Teachers::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(Teachers::UpdatedAt).date_time().not_null())
                    .to_owned(),
            )
            .await?;

        // Create subjects table
        manager
            .create_table(
                Table::create()
                    .table(Subjects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subjects::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Subjects::Code).string().not_null())
                    .col(ColumnDef::new(Subjects::Name).string().not_null())
                    .col(ColumnDef::new(Subjects::Acronym).string().not_null())
                    .col(ColumnDef::new(Subjects::SubjectType).string().not_null())
                    .col(ColumnDef::new(Subjects::Department).string())
                    .col(ColumnDef::new(Subjects::CreatedAt).date_time().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Subjects::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Teachers::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Timetables::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Timetables {
    Table,
    Id,
    Year,
    Branch,
    Section,
    AcademicYear,
    Catalog,
    Grid,
    IsPublished,
    PublishedAt,
    LastPublishedAt,
    CreatedBy,
    LastModifiedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Teachers {
    Table,
    Id,
    DisplayName,
    Username,
    Department,
    IsActive,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Subjects {
    Table,
    Id,
    Code,
    Name,
    Acronym,
    SubjectType,
    Department,
    CreatedAt,
}
