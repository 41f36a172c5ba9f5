pub mod actor;
pub mod admin;
pub mod attendance_record;
pub mod college;
pub mod department;
pub mod enrollment;
pub mod faculty_member;
pub mod nfc_device;
pub mod schedule;
pub mod section;
pub mod student;
pub mod subject;

pub use admin::Entity as Admin;
pub use attendance_record::Entity as AttendanceRecord;
pub use college::Entity as College;
pub use department::Entity as Department;
pub use enrollment::Entity as Enrollment;
pub use faculty_member::Entity as FacultyMember;
pub use nfc_device::Entity as NfcDevice;
pub use schedule::Entity as Schedule;
pub use section::Entity as Section;
pub use student::Entity as Student;
pub use subject::Entity as Subject;
