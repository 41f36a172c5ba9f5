mod attendance_get_test;
mod attendance_post_test;
mod attendance_put_test;
mod devices_test;
mod health_test;
mod reports_test;
