#![forbid(unsafe_code)]

//! Color naming for tintbot.
//!
//! # Role in tintbot
//! `tintbot-core` turns reference word lists into names for arbitrary colors.
//! A [`Catalog`] indexes named reference colors, the blend engine mixes pairs
//! of them in CIELAB into a [`BlendTable`] of compound names ("amber bunny"),
//! and the namer picks the nearest names a [`RecentNameMemory`] has not seen
//! lately.
//!
//! # Primary responsibilities
//! - **Reference data**: TSV parsing and [`ReferenceSource`]s.
//! - **Catalog**: name and color indices, frequency-ranked unigrams, splits.
//! - **Blending**: [`blend`], [`blend_by_name`], [`blend_all_splits`].
//! - **Naming**: [`k_nearest`], [`name_color`], [`closest`].
//! - **Recency**: name and color memories, plus a shared variant.
//! - **Reloads**: [`CatalogStore`] swaps whole snapshots atomically.
//!
//! # Example
//!
//! ```
//! use tintbot_core::{
//!     BlendTable, Catalog, Color, FirstSelector, RecentNameMemory, StereotypeRow, UnigramRow,
//!     name_color,
//! };
//!
//! let catalog = Catalog::build(
//!     &[
//!         StereotypeRow::new("amber", "orange", "#ffbf00"),
//!         StereotypeRow::new("bunny", "white", "#f4efe8"),
//!     ],
//!     &[UnigramRow::new("amberbunny", 240)],
//! )
//! .unwrap();
//! let table = BlendTable::build(&catalog, &[0.5], &mut FirstSelector).unwrap();
//!
//! let target = Color::parse("#f9d77a").unwrap();
//! let names = name_color(&target, &table, 1, &RecentNameMemory::default()).unwrap();
//! assert_eq!(names[0].name, "amber bunny");
//! ```

pub mod blend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod namer;
pub mod recency;
pub mod resources;
pub mod selector;
pub mod store;

pub use blend::{
    BlendTable, BlendWeights, BlendedName, DEFAULT_BLEND_RATIOS, blend, blend_all_splits,
    blend_by_name,
};
pub use catalog::{BuildSummary, Catalog, CatalogBuilder, CatalogEntry};
pub use config::NamerConfig;
pub use error::{CoreError, DataError, DataErrorKind, Result};
pub use namer::{AcceptancePolicy, HasColor, NamedColor, Neighbor, closest, k_nearest, name_color};
pub use recency::{RecentColorWindow, RecentNameMemory, SharedRecentMemory, approve, remember};
pub use resources::{
    BigramRow, InMemorySource, ReferenceData, ReferenceSource, StereotypeRow, TsvDirSource,
    UnigramRow, UnigramSplit,
};
pub use selector::{ColorSelector, FirstSelector, UniformSelector, choose};
pub use store::{CatalogStore, Snapshot, StoreOptions};
pub use tintbot_color::{Color, FormatError, Lab};
