//! Create cars table
//!
//! Cars are keyed by license plate and owned by a user (by email).

use sea_orm_migration::prelude::*;

use super::m20240301_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cars::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Cars::Plate)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Cars::OwnerEmail).string().not_null())
                    .col(ColumnDef::new(Cars::Brand).string())
                    .col(ColumnDef::new(Cars::Model).string())
                    .col(
                        ColumnDef::new(Cars::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cars_owner_email")
                            .from(Cars::Table, Cars::OwnerEmail)
                            .to(Users::Table, Users::Email),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Cars::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Cars {
    Table,
    Plate,
    OwnerEmail,
    Brand,
    Model,
    CreatedAt,
}
