//! File-backed artifact storage for lectern.
//!
//! One markdown file per artifact (`{id}.md`): a TOML front-matter block
//! between `+++` lines, a blank line, then the body. Code artifacts keep
//! their HTML in a sibling `{id}.html`; image artifacts keep their decoded
//! files under `assets/` as `{id}-{n}.{ext}`. Nothing is ever updated or
//! deleted.

pub mod header;
pub mod images;
pub mod store;

pub use store::{ArtifactStore, RESERVED_FILES};
