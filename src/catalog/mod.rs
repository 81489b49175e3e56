//! The article catalog: filter inputs, debounced list fetching, and the
//! published view.

mod controller;
mod debounce;
mod filter;
mod view;

pub use controller::{CatalogController, CatalogHandle};
pub use debounce::DebouncedInput;
pub use filter::{FilterState, compose_query};
pub use view::{CatalogDisplay, CatalogView, FETCH_FAILED_MESSAGE, FetchFailure};
