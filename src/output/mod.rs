pub mod archive;
pub mod gallery;
pub mod presenter;

pub use archive::ArchiveBuilder;
pub use gallery::GalleryImage;
pub use presenter::Presenter;
