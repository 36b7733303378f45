pub mod assignment;
pub mod availability;
pub mod publication;
pub mod subject;
pub mod teacher;
pub mod timetable;
