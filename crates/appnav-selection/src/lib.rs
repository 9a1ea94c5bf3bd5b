//! AppNav Selection Variants
//!
//! Portable description of "what data is currently shown": filter criteria
//! per property plus single-value parameters, with a stable JSON wire shape.
//!
//! # Core Concepts
//!
//! - [`SelectionVariant`]: ordered select options and parameters
//! - [`Range`]: one `Sign` / `SelectOption` / low / high entry
//! - [`ConditionOperator`]: widget operators and their mapping table
//!
//! # Example
//!
//! ```rust
//! use appnav_selection::{ConditionOperator, SelectionVariant};
//!
//! let mut variant = SelectionVariant::new();
//! variant
//!     .add_select_option("Customer", "I", "EQ", "C1", None)?
//!     .add_condition("Name", ConditionOperator::StartsWith, &["Sm"])?;
//!
//! let restored: SelectionVariant = variant.to_json_string().parse()?;
//! assert_eq!(restored, variant);
//! # Ok::<(), appnav_selection::SelectionError>(())
//! ```

mod condition;
mod error;
mod range;
mod variant;
mod wire;

pub use condition::ConditionOperator;
pub use error::{SelectionError, SelectionResult};
pub use range::{Range, SelectOption, Sign};
pub use variant::SelectionVariant;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
