use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202508250010_create_nfc_devices"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("nfc_devices"))
                    .if_not_exists()
                    .col(ColumnDef::new(Alias::new("id")).big_integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Alias::new("device_id")).string().not_null().unique_key())
                    .col(ColumnDef::new(Alias::new("name")).string().not_null())
                    .col(
                        ColumnDef::new(Alias::new("location"))
                            .enumeration(
                                Alias::new("device_location"),
                                vec![
                                    Alias::new("main_gate"),
                                    Alias::new("college_gate"),
                                    Alias::new("classroom"),
                                    Alias::new("lab"),
                                    Alias::new("library"),
                                    Alias::new("auditorium"),
                                ],
                            )
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("assigned_college_id")).big_integer())
                    .col(ColumnDef::new(Alias::new("assigned_department_id")).big_integer())
                    .col(ColumnDef::new(Alias::new("api_key")).string().not_null().unique_key())
                    .col(ColumnDef::new(Alias::new("api_key_expires")).timestamp().not_null())
                    .col(ColumnDef::new(Alias::new("is_active")).boolean().not_null().default(true))
                    .col(ColumnDef::new(Alias::new("last_activity_at")).timestamp())
                    .col(ColumnDef::new(Alias::new("registered_by")).big_integer().not_null())
                    .col(ColumnDef::new(Alias::new("created_at")).timestamp().not_null().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .col(ColumnDef::new(Alias::new("updated_at")).timestamp().not_null().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Alias::new("nfc_devices"), Alias::new("assigned_college_id"))
                            .to(Alias::new("colleges"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Alias::new("nfc_devices"), Alias::new("assigned_department_id"))
                            .to(Alias::new("departments"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Alias::new("nfc_devices"), Alias::new("registered_by"))
                            .to(Alias::new("admins"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_nfc_devices_is_active")
                    .table(Alias::new("nfc_devices"))
                    .col(Alias::new("is_active"))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("nfc_devices")).to_owned())
            .await
    }
}
