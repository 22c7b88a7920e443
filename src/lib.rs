/// Loading, normalization, and relational indexing of item/recipe datasets
pub mod catalog;
/// Error definitions
pub mod error;
/// Filter option discovery (distinct types and stat keys)
pub mod options;
/// The search/filter/sort pipeline evaluated over the item collection
pub mod query;

#[cfg(feature = "arc")]
pub type Rc<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub type Rc<T> = std::rc::Rc<T>;
