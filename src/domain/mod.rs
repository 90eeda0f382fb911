pub mod book;
pub mod catalog;
pub mod circulation;
pub mod commands;
pub mod errors;
pub mod events;
pub mod library;
pub mod loan;
pub mod member;
pub mod queries;
pub mod snapshot;
pub mod stats;
pub mod value_objects;

pub use book::Book;
pub use errors::LibraryError;
pub use events::*;
pub use library::Library;
pub use loan::{Loan, LoanStatus};
pub use member::Member;
pub use snapshot::Snapshot;
pub use value_objects::*;
