pub mod chapter_classifier;
pub mod cookie_store;
pub mod course_page;
pub mod export_writer;
pub mod html;
pub mod video_locator;

pub use chapter_classifier::ChapterOutline;
pub use cookie_store::CookieStore;
pub use course_page::CoursePage;
pub use export_writer::ExportWriter;
pub use video_locator::{LocateStrategy, VideoLocator, VideoSource};
