//! 基础设施层

pub mod page_driver;

pub use page_driver::PageDriver;
