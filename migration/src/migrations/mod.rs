pub mod m202508250001_create_colleges;
pub mod m202508250002_create_departments;
pub mod m202508250003_create_sections;
pub mod m202508250004_create_subjects;
pub mod m202508250005_create_admins;
pub mod m202508250006_create_faculty_members;
pub mod m202508250007_create_students;
pub mod m202508250008_create_schedules;
pub mod m202508250009_create_enrollments;
pub mod m202508250010_create_nfc_devices;
pub mod m202508250011_create_attendance_records;
