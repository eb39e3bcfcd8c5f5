pub mod caption;
pub mod composer;
pub mod footer;
pub mod labels;
pub mod layout;
pub mod text;
pub mod tile;

pub use caption::resolve_caption;
pub use composer::{CollageComposer, CollageInput, EncodedCollage};
pub use footer::compose_footer_lines;
pub use labels::{Labels, Locale};
pub use layout::{CollageSpec, Rect};
pub use text::{FontSet, FontSource};
pub use tile::{render_tile, square_crop_region};

#[derive(Debug, thiserror::Error)]
pub enum CollageError {
    #[error("No photo rows provided")]
    NoRows,
    #[error("Too many photo rows: {count} (maximum {max})")]
    TooManyRows { count: usize, max: usize },
    #[error("None of the provided photos could be decoded")]
    NoUsablePhotos,
    #[error("Collage canvas too large for {rows} rows")]
    CanvasTooLarge { rows: usize },
    #[error("Image encoding error: {0}")]
    Encode(#[from] image::ImageError),
}

impl CollageError {
    /// Whether the request itself was at fault
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CollageError::NoRows | CollageError::TooManyRows { .. } | CollageError::NoUsablePhotos
        )
    }
}
