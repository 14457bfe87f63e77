pub mod chapter;
pub mod lecture;
pub mod loaders;

pub use chapter::{Chapter, ChapteredLecture, LectureRef, CHAPTER_MARKERS};
pub use lecture::{LectureExport, LectureRecord, SimplifiedExport, SimplifiedLecture};
pub use loaders::{load_lecture_json, parse_lecture_json};
