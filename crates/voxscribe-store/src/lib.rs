pub mod key;
pub mod palette;
pub mod section;
pub mod store;

pub use key::SectionKey;
pub use palette::{Palette, Rgb, PALETTE_SIZE};
pub use section::Section;
pub use store::{VoxelStore, DEFAULT_SECTION_SIZE};
