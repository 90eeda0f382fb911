use chrono::{Duration, NaiveDate};
use circulation_desk::domain::commands::{BookFields, IssueLoan, MemberFields};
use circulation_desk::domain::{BookId, Library, LibraryError, LoanId, MemberId};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Issue { book: usize, member: usize },
    Return { loan: usize },
    AdvanceDays(i64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..3usize, 0..3usize).prop_map(|(book, member)| Op::Issue { book, member }),
        3 => (0..20usize).prop_map(|loan| Op::Return { loan }),
        1 => (0..10i64).prop_map(Op::AdvanceDays),
    ]
}

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn seed(quantities: &[i64]) -> (Library, Vec<BookId>, Vec<MemberId>) {
    let mut library = Library::new();
    let books = quantities
        .iter()
        .enumerate()
        .map(|(i, &quantity)| {
            let fields = BookFields {
                title: format!("Book {i}"),
                author: "Author".to_string(),
                isbn: format!("97800000000{i}"),
                category: "General".to_string(),
                year: 2000,
                quantity,
            };
            library.add_book(&fields, start()).unwrap().id
        })
        .collect();
    let members = (0..3)
        .map(|i| {
            let fields = MemberFields {
                name: format!("Member {i}"),
                email: format!("member{i}@example.com"),
                phone: "555-0100".to_string(),
            };
            library.add_member(&fields, start()).unwrap().id
        })
        .collect();
    (library, books, members)
}

/// available + 未返却の貸出数 == quantity を全書籍で確認する
fn assert_availability_invariant(library: &Library, today: NaiveDate) {
    let snapshot = library.snapshot();
    for book in &snapshot.books {
        let outstanding = snapshot
            .loans
            .iter()
            .filter(|l| l.book_id == book.id && l.return_date.is_none())
            .count() as u32;
        assert!(book.available <= book.quantity);
        assert_eq!(book.available + outstanding, book.quantity);
    }

    let stats = library.get_stats(today);
    let outstanding = snapshot.loans.iter().filter(|l| l.return_date.is_none()).count();
    assert_eq!(stats.issued_count, outstanding);
    assert!(stats.overdue_count <= stats.issued_count);
}

proptest! {
    #[test]
    fn test_availability_invariant_holds_for_any_issue_return_sequence(
        quantities in proptest::collection::vec(1..4i64, 3),
        ops in proptest::collection::vec(op_strategy(), 1..60),
    ) {
        let (mut library, books, members) = seed(&quantities);
        let mut today = start();
        let mut issued: Vec<LoanId> = Vec::new();

        for op in ops {
            let before = library.clone();
            match op {
                Op::Issue { book, member } => {
                    let cmd = IssueLoan {
                        book_id: books[book],
                        member_id: members[member],
                        due_date: today + Duration::days(7),
                    };
                    match library.issue_loan(&cmd, today) {
                        Ok((loan, _)) => issued.push(loan.id),
                        Err(LibraryError::BookUnavailable(_)) => {
                            prop_assert_eq!(&library, &before);
                        }
                        Err(e) => prop_assert!(false, "unexpected error: {}", e),
                    }
                }
                Op::Return { loan } => {
                    let Some(&loan_id) = issued.get(loan) else { continue };
                    match library.return_loan(loan_id, today) {
                        Ok(_) => {}
                        Err(LibraryError::AlreadyReturned(_)) => {
                            prop_assert_eq!(&library, &before);
                        }
                        Err(e) => prop_assert!(false, "unexpected error: {}", e),
                    }
                }
                Op::AdvanceDays(days) => today += Duration::days(days),
            }
            assert_availability_invariant(&library, today);
        }
    }
}
