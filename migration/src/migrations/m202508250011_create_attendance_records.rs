use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202508250011_create_attendance_records"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("attendance_records"))
                    .if_not_exists()
                    .col(ColumnDef::new(Alias::new("id")).big_integer().not_null().auto_increment().primary_key())
                    .col(
                        ColumnDef::new(Alias::new("record_type"))
                            .enumeration(
                                Alias::new("attendance_record_type"),
                                vec![Alias::new("student"), Alias::new("faculty")],
                            )
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("subject_actor_id")).big_integer().not_null())
                    .col(ColumnDef::new(Alias::new("schedule_id")).big_integer().not_null())
                    .col(ColumnDef::new(Alias::new("date")).date().not_null())
                    .col(ColumnDef::new(Alias::new("captured_at")).timestamp().not_null())
                    .col(
                        ColumnDef::new(Alias::new("status"))
                            .enumeration(
                                Alias::new("attendance_status"),
                                vec![
                                    Alias::new("present"),
                                    Alias::new("absent"),
                                    Alias::new("late"),
                                    Alias::new("excused"),
                                ],
                            )
                            .not_null()
                            .default("present"),
                    )
                    .col(
                        ColumnDef::new(Alias::new("recorded_by"))
                            .enumeration(
                                Alias::new("attendance_recorded_by"),
                                vec![
                                    Alias::new("nfc"),
                                    Alias::new("faculty"),
                                    Alias::new("admin"),
                                    Alias::new("system"),
                                ],
                            )
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("device_id")).big_integer())
                    .col(ColumnDef::new(Alias::new("recording_actor_id")).big_integer())
                    .col(ColumnDef::new(Alias::new("notes")).string())
                    .col(ColumnDef::new(Alias::new("is_manual_correction")).boolean().not_null().default(false))
                    .col(ColumnDef::new(Alias::new("corrected_by")).big_integer())
                    .col(ColumnDef::new(Alias::new("corrected_at")).timestamp())
                    .col(ColumnDef::new(Alias::new("created_at")).timestamp().not_null().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .col(ColumnDef::new(Alias::new("updated_at")).timestamp().not_null().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .foreign_key(
                        ForeignKey::create()
                            .from(Alias::new("attendance_records"), Alias::new("schedule_id"))
                            .to(Alias::new("schedules"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Alias::new("attendance_records"), Alias::new("device_id"))
                            .to(Alias::new("nfc_devices"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // The authoritative duplicate guard: one record per subject actor,
        // session and calendar day. Application pre-checks are advisory only.
        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_unique_actor_session_day")
                    .table(Alias::new("attendance_records"))
                    .col(Alias::new("record_type"))
                    .col(Alias::new("subject_actor_id"))
                    .col(Alias::new("schedule_id"))
                    .col(Alias::new("date"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_date_status")
                    .table(Alias::new("attendance_records"))
                    .col(Alias::new("date"))
                    .col(Alias::new("status"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_schedule_status")
                    .table(Alias::new("attendance_records"))
                    .col(Alias::new("schedule_id"))
                    .col(Alias::new("status"))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("attendance_records")).to_owned())
            .await
    }
}
