pub mod subject;
pub mod teacher;
pub mod timetable;

pub use subject as subjects;
pub use teacher as teachers;
pub use timetable as timetables;
