mod errors;
mod library_service;
mod queries;

pub use errors::{LibraryApplicationError, Result};
pub use library_service::{
    ServiceDependencies, add_book, add_member, clear_library, delete_book, delete_member, flush,
    issue_loan, open_library, return_loan, update_book, update_member,
};
pub use queries::{
    get_book, get_loan, get_member, get_stats, list_books, list_categories, list_loans,
    list_members,
};
