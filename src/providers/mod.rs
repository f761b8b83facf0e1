pub mod file_page;
pub mod http_page;
pub mod util;

pub use file_page::FilePageSource;
pub use http_page::HttpPageSource;
