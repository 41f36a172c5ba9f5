use sea_orm_migration::prelude::*;

use crate::migrations;

pub struct Migrator;

impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(migrations::m202508250001_create_colleges::Migration),
            Box::new(migrations::m202508250002_create_departments::Migration),
            Box::new(migrations::m202508250003_create_sections::Migration),
            Box::new(migrations::m202508250004_create_subjects::Migration),
            Box::new(migrations::m202508250005_create_admins::Migration),
            Box::new(migrations::m202508250006_create_faculty_members::Migration),
            Box::new(migrations::m202508250007_create_students::Migration),
            Box::new(migrations::m202508250008_create_schedules::Migration),
            Box::new(migrations::m202508250009_create_enrollments::Migration),
            Box::new(migrations::m202508250010_create_nfc_devices::Migration),
            Box::new(migrations::m202508250011_create_attendance_records::Migration),
        ]
    }
}
