//! Filter, merge/sort and pagination over task candidate sets.

pub mod filter;
pub mod paginate;
pub mod retrieval;
pub mod sort;

pub use filter::{DEFAULT_DATE_FORMAT, FilterPlan, filter};
pub use paginate::{DEFAULT_PER_PAGE, Page, PageRequest, paginate};
pub use retrieval::{ResolvedScopes, TaskQuery};
pub use sort::{SortColumn, SortDirection, SortSpec, SortValue, merge, merge_and_sort};
