pub mod category;
pub mod upload;

pub use category::UploadCategory;
pub use upload::UploadResult;
