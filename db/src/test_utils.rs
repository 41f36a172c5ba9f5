use chrono::NaiveTime;
use migration::Migrator;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use crate::models::{admin, college, department, faculty_member, schedule, section, student, subject};

pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory db");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// A fully wired slice of the academic directory: one of everything the
/// attendance core reads, ready for recording tests.
pub struct TestDirectory {
    pub college: college::Model,
    pub department: department::Model,
    pub section: section::Model,
    pub subject: subject::Model,
    pub admin: admin::Model,
    pub faculty: faculty_member::Model,
    pub student: student::Model,
    pub schedule: schedule::Model,
}

pub async fn seed_directory(db: &DatabaseConnection, tag: &str) -> TestDirectory {
    let college = college::Model::create(db, &format!("College {tag}"), &format!("COL-{tag}"))
        .await
        .expect("create college");
    let department = department::Model::create(
        db,
        college.id,
        &format!("Department {tag}"),
        &format!("DEP-{tag}"),
    )
    .await
    .expect("create department");
    let section = section::Model::create(db, department.id, &format!("Section {tag}"))
        .await
        .expect("create section");
    let subject = subject::Model::create(
        db,
        department.id,
        &format!("Subject {tag}"),
        &format!("SUB-{tag}"),
    )
    .await
    .expect("create subject");
    let admin = admin::Model::create(
        db,
        &format!("Admin {tag}"),
        &format!("admin_{tag}@test.edu"),
        "password",
    )
    .await
    .expect("create admin");
    let faculty = faculty_member::Model::create(
        db,
        department.id,
        &format!("Faculty {tag}"),
        &format!("faculty_{tag}@test.edu"),
        Some(&format!("CARD-F-{tag}")),
        "password",
    )
    .await
    .expect("create faculty");
    let student = student::Model::create(
        db,
        &format!("u{tag}"),
        &format!("Student {tag}"),
        &format!("student_{tag}@test.edu"),
        Some(&format!("CARD-S-{tag}")),
        "password",
    )
    .await
    .expect("create student");
    let schedule = schedule::Model::create(
        db,
        subject.id,
        faculty.id,
        section.id,
        "A-101",
        1,
        NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        "2025-2026",
        1,
    )
    .await
    .expect("create schedule");

    TestDirectory {
        college,
        department,
        section,
        subject,
        admin,
        faculty,
        student,
        schedule,
    }
}
