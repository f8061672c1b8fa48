//! Page objects: locators and high-level actions per page

mod start_page;

pub use start_page::StartPage;
