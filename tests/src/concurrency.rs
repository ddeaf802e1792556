//! Races the engine guarantees to resolve cleanly: one winner per copy,
//! no blocking across copies, and sweeps that never clobber a return.

use std::sync::Arc;

use circ_common::clock::Clock;
use circ_common::error::ErrorKind;
use circ_common::ident::{CopyId, PatronId};
use circ_common::model::LoanStatus;

use crate::support;

#[tokio::test]
async fn contested_copy_has_exactly_one_winner() {
    // Repeated to give both interleavings a chance to occur.
    for _ in 0..50 {
        let f = support::engine();
        let engine = Arc::new(f.engine);

        let first = tokio::spawn({
            let engine = engine.clone();
            async move {
                engine
                    .checkout(&CopyId::from("C1"), &PatronId::from("P1"), None)
                    .await
            }
        });
        let second = tokio::spawn({
            let engine = engine.clone();
            async move {
                engine
                    .checkout(&CopyId::from("C1"), &PatronId::from("P2"), None)
                    .await
            }
        });

        let results = [first.await.unwrap(), second.await.unwrap()];
        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1, "exactly one checkout may claim the copy");

        let refusal = results.iter().find(|r| r.is_err()).unwrap();
        assert_eq!(refusal.as_ref().unwrap_err().kind(), ErrorKind::Conflict);

        assert!(!engine.copy_available(&CopyId::from("C1")).unwrap());
        assert_eq!(engine.count_loans_with_status(LoanStatus::Active), 1);
    }
}

#[tokio::test]
async fn distinct_copies_do_not_contend() {
    let f = support::engine();
    let engine = Arc::new(f.engine);

    let first = tokio::spawn({
        let engine = engine.clone();
        async move {
            engine
                .checkout(&CopyId::from("C1"), &PatronId::from("P1"), None)
                .await
        }
    });
    let second = tokio::spawn({
        let engine = engine.clone();
        async move {
            engine
                .checkout(&CopyId::from("C2"), &PatronId::from("P2"), None)
                .await
        }
    });

    assert!(first.await.unwrap().is_ok());
    assert!(second.await.unwrap().is_ok());
    assert_eq!(engine.count_loans_with_status(LoanStatus::Active), 2);
}

#[tokio::test]
async fn sweep_racing_a_return_never_unreturns_the_loan() {
    for _ in 0..50 {
        let f = support::engine();
        let loan = f
            .engine
            .checkout(&CopyId::from("C1"), &PatronId::from("P1"), None)
            .await
            .unwrap();

        // Six days past due before either contender runs.
        f.clock.advance_days(20);
        let as_of = f.clock.today();
        let engine = Arc::new(f.engine);

        let sweeper = tokio::spawn({
            let engine = engine.clone();
            async move { engine.sweep_overdue(as_of) }
        });
        let returner = tokio::spawn({
            let engine = engine.clone();
            let loan_id = loan.id.clone();
            async move { engine.return_copy(&loan_id, None).await }
        });

        sweeper.await.unwrap();
        let outcome = returner.await.unwrap().unwrap();

        // Whichever side ran first, the loan ends Returned and the late
        // fine reflects the actual return date.
        let view = engine.loan_view(&loan.id).await.unwrap();
        assert_eq!(view.loan.status, LoanStatus::Returned);
        assert_eq!(outcome.fine.unwrap().amount_cents, 6 * 200);
        assert!(engine.copy_available(&CopyId::from("C1")).unwrap());
    }
}
