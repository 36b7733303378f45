use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Student-facing lookups filter on branch and section of published timetables
        manager
            .create_index(
                Index::create()
                    .name("idx_timetables_branch_section")
                    .table(Timetables::Table)
                    .col(Timetables::Branch)
                    .col(Timetables::Section)
                    .to_owned(),
            )
            .await?;

        // The availability scan and teacher views load published timetables
        manager
            .create_index(
                Index::create()
                    .name("idx_timetables_is_published")
                    .table(Timetables::Table)
                    .col(Timetables::IsPublished)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_teachers_department_active")
                    .table(Teachers::Table)
                    .col(Teachers::Department)
                    .col(Teachers::IsActive)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_subjects_code")
                    .table(Subjects::Table)
                    .col(Subjects::Code)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_subjects_code").to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_teachers_department_active")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(Index::drop().name("idx_timetables_is_published").to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_timetables_branch_section")
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Timetables {
    Table,
    Branch,
    Section,
    IsPublished,
}

#[derive(Iden)]
enum Teachers {
    Table,
    Department,
    IsActive,
}

#[derive(Iden)]
enum Subjects {
    Table,
    Code,
}
