use chrono::{NaiveDate, TimeZone, Utc};
use circ_common::clock::Clock;
use circ_common::config::CirculationPolicy;
use circ_common::error::{CircError, ErrorKind};
use circ_common::ident::{CopyId, LoanId, PatronId};
use circ_common::model::{FineKind, FineStatus, Loan, LoanStatus};
use circ_core::engine::EngineSnapshot;

use crate::support;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn checkout_and_return_round_trip() {
    let f = support::engine();
    let c1 = CopyId::from("C1");

    let loan = f.engine.checkout(&c1, &PatronId::from("P1"), None).await.unwrap();
    assert_eq!(loan.status, LoanStatus::Active);
    assert_eq!(loan.due_on, date(2026, 3, 15));
    assert!(!f.engine.copy_available(&c1).unwrap());

    let outcome = f.engine.return_copy(&loan.id, None).await.unwrap();
    assert_eq!(outcome.loan.status, LoanStatus::Returned);
    assert!(outcome.fine.is_none(), "on-time return must not be fined");
    assert!(f.engine.copy_available(&c1).unwrap());

    let again = f.engine.return_copy(&loan.id, None).await;
    assert_eq!(again, Err(CircError::AlreadyClosed(loan.id.clone())));
}

#[tokio::test]
async fn copy_on_loan_refuses_a_second_checkout() {
    let f = support::engine();
    let c1 = CopyId::from("C1");

    f.engine.checkout(&c1, &PatronId::from("P1"), None).await.unwrap();

    let refused = f.engine.checkout(&c1, &PatronId::from("P2"), None).await;
    assert_eq!(refused, Err(CircError::AlreadyClaimed(c1.clone())));
    assert_eq!(refused.unwrap_err().kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn inactive_and_unknown_patrons_are_refused() {
    let f = support::engine();
    let c1 = CopyId::from("C1");

    assert_eq!(
        f.engine.checkout(&c1, &PatronId::from("P3"), None).await,
        Err(CircError::PatronInactive(PatronId::from("P3")))
    );
    assert_eq!(
        f.engine.checkout(&c1, &PatronId::from("P9"), None).await,
        Err(CircError::PatronNotFound(PatronId::from("P9")))
    );
    // Refusals must not leave a claim behind.
    assert!(f.engine.copy_available(&c1).unwrap());
}

#[tokio::test]
async fn renewal_extends_the_due_date_up_to_the_cap() {
    let f = support::engine();
    let loan = f
        .engine
        .checkout(&CopyId::from("C1"), &PatronId::from("P1"), None)
        .await
        .unwrap();

    let mut expected = loan.due_on;
    for n in 1..=3 {
        let renewed = f.engine.renew(&loan.id, None).await.unwrap();
        expected = expected + chrono::Days::new(7);
        assert_eq!(renewed.due_on, expected);
        assert_eq!(renewed.renewals, n);
    }

    assert_eq!(
        f.engine.renew(&loan.id, None).await,
        Err(CircError::RenewalLimitExceeded(loan.id.clone()))
    );
}

#[tokio::test]
async fn late_return_is_fined_per_day_past_due() {
    let f = support::engine();
    let p1 = PatronId::from("P1");
    let loan = f.engine.checkout(&CopyId::from("C1"), &p1, None).await.unwrap();

    // Due 2026-03-15; returning on 2026-03-18 is three days late.
    f.clock.advance_days(17);
    let outcome = f.engine.return_copy(&loan.id, None).await.unwrap();

    let fine = outcome.fine.expect("late return must be fined");
    assert_eq!(fine.amount_cents, 3 * 200);
    assert_eq!(fine.kind, FineKind::LateReturn);
    assert_eq!(fine.status, FineStatus::Pending);
    assert_eq!(fine.loan, Some(loan.id.clone()));
    assert_eq!(f.engine.pending_total_cents(Some(&p1)), 600);
}

#[tokio::test]
async fn pending_fine_blocks_checkout_until_paid() {
    let f = support::engine();
    let p1 = PatronId::from("P1");
    let c2 = CopyId::from("C2");

    let fine = f
        .engine
        .issue_fine(&p1, FineKind::Damage, 500, "water damage".into())
        .await
        .unwrap();

    assert_eq!(
        f.engine.checkout(&c2, &p1, None).await,
        Err(CircError::OutstandingFines(p1.clone()))
    );

    f.engine.pay_fine(&fine.id).unwrap();
    assert!(f.engine.checkout(&c2, &p1, None).await.is_ok());
}

#[tokio::test]
async fn sweep_flags_overdue_loans_exactly_once() {
    let f = support::engine();
    let loan = f
        .engine
        .checkout(&CopyId::from("C1"), &PatronId::from("P1"), None)
        .await
        .unwrap();

    // Not yet due, then due today: neither is overdue.
    assert_eq!(f.engine.sweep_overdue(f.clock.today()), 0);
    f.clock.advance_days(14);
    assert_eq!(f.engine.sweep_overdue(f.clock.today()), 0);

    // One day past due: flagged once, then the sweep is a no-op.
    f.clock.advance_days(1);
    assert_eq!(f.engine.sweep_overdue(f.clock.today()), 1);
    assert_eq!(f.engine.sweep_overdue(f.clock.today()), 0);
    assert_eq!(f.engine.loan_view(&loan.id).await.unwrap().loan.status, LoanStatus::Overdue);

    // Renewal reactivates the loan and pushes the due date out.
    let renewed = f.engine.renew(&loan.id, None).await.unwrap();
    assert_eq!(renewed.status, LoanStatus::Active);
    assert_eq!(renewed.due_on, date(2026, 3, 22));
    assert_eq!(f.engine.sweep_overdue(f.clock.today()), 0);
}

#[tokio::test]
async fn cancel_releases_the_claim() {
    let f = support::engine();
    let c1 = CopyId::from("C1");
    let loan = f.engine.checkout(&c1, &PatronId::from("P1"), None).await.unwrap();

    let cancelled = f.engine.cancel_loan(&loan.id).await.unwrap();
    assert_eq!(cancelled.status, LoanStatus::Cancelled);
    assert!(f.engine.copy_available(&c1).unwrap());

    assert_eq!(
        f.engine.cancel_loan(&loan.id).await,
        Err(CircError::AlreadyClosed(loan.id.clone()))
    );
}

#[tokio::test]
async fn lateness_of_a_returned_loan_is_frozen_at_the_return_date() {
    let f = support::engine();
    let loan = f
        .engine
        .checkout(&CopyId::from("C1"), &PatronId::from("P1"), None)
        .await
        .unwrap();

    f.clock.advance_days(17);
    f.engine.return_copy(&loan.id, None).await.unwrap();

    // Time keeps moving; the recorded lateness must not.
    f.clock.advance_days(10);
    let view = f.engine.loan_view(&loan.id).await.unwrap();
    assert!(view.is_late);
    assert_eq!(view.days_late, 3);
    assert_eq!(view.barcode.as_deref(), Some("BC-0001"));
    assert_eq!(view.work_title.as_deref(), Some("The Count of Monte Cristo"));
}

/// Checkout on day 0 with a 14-day period, swept overdue on day 15,
/// returned on day 17: a 3-day fine, and the copy is loanable again at
/// once. The ledger and the loan book agree at every step.
#[tokio::test]
async fn overdue_then_late_return_frees_the_copy() {
    let f = support::engine();
    let c1 = CopyId::from("C1");
    let loan = f.engine.checkout(&c1, &PatronId::from("P1"), None).await.unwrap();
    assert!(!f.engine.copy_available(&c1).unwrap());

    f.clock.advance_days(15);
    assert_eq!(f.engine.sweep_overdue(f.clock.today()), 1);
    let view = f.engine.loan_view(&loan.id).await.unwrap();
    assert_eq!(view.loan.status, LoanStatus::Overdue);
    assert!(!f.engine.copy_available(&c1).unwrap());

    f.clock.advance_days(2);
    let outcome = f.engine.return_copy(&loan.id, None).await.unwrap();
    assert_eq!(outcome.loan.status, LoanStatus::Returned);
    assert_eq!(outcome.fine.unwrap().amount_cents, 3 * 200);
    assert!(f.engine.copy_available(&c1).unwrap());

    // P1 now carries the fine; P2 can take the copy straight away.
    let next = f.engine.checkout(&c1, &PatronId::from("P2"), None).await.unwrap();
    assert_eq!(next.status, LoanStatus::Active);
    assert!(!f.engine.copy_available(&c1).unwrap());
}

#[tokio::test]
async fn unknown_loan_is_reported_as_not_found() {
    let f = support::engine();
    let missing = LoanId::from("LN-404");
    let err = f.engine.return_copy(&missing, None).await.unwrap_err();
    assert_eq!(err, CircError::LoanNotFound(missing));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn snapshot_restores_loans_claims_and_fines() {
    let f = support::engine();
    let p1 = PatronId::from("P1");
    let c1 = CopyId::from("C1");
    let loan = f.engine.checkout(&c1, &p1, None).await.unwrap();
    f.engine
        .issue_fine(&PatronId::from("P2"), FineKind::Loss, 2500, "lost copy".into())
        .await
        .unwrap();

    let snapshot = f.engine.snapshot();

    let fresh = support::empty_engine();
    fresh.engine.restore(snapshot).unwrap();

    assert!(!fresh.engine.copy_available(&c1).unwrap());
    let restored = fresh.engine.loan_view(&loan.id).await.unwrap();
    assert_eq!(restored.loan.patron, p1);
    assert_eq!(restored.loan.status, LoanStatus::Active);
    assert_eq!(fresh.engine.pending_total_cents(None), 2500);
}

/// A corrupted state file can pair an open loan with an available copy.
/// Both mutation paths must detect the broken pairing and abort without
/// a partial commit, leaving the records as they were.
#[tokio::test]
async fn broken_claim_pairing_aborts_without_partial_commit() {
    let fresh = support::empty_engine();
    let c1 = CopyId::from("C1");
    let loan = Loan {
        id: LoanId::from("LN-1"),
        copy: c1.clone(),
        patron: PatronId::from("P1"),
        checked_out_at: Utc.with_ymd_and_hms(2026, 2, 20, 10, 0, 0).unwrap(),
        due_on: date(2026, 3, 6),
        returned_at: None,
        renewals: 0,
        status: LoanStatus::Active,
        notes: None,
    };
    fresh
        .engine
        .restore(EngineSnapshot {
            copies: vec![support::copy("C1", "BC-0001")],
            loans: vec![loan.clone()],
            fines: vec![],
        })
        .unwrap();

    let err = fresh.engine.return_copy(&loan.id, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Invariant);
    let untouched = fresh.engine.loan_view(&loan.id).await.unwrap().loan;
    assert_eq!(untouched.status, LoanStatus::Active);
    assert!(untouched.returned_at.is_none());

    // Checkout spots the same orphan loan and rolls its claim back.
    let err = fresh
        .engine
        .checkout(&c1, &PatronId::from("P2"), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Invariant);
    assert!(fresh.engine.copy_available(&c1).unwrap());
    assert!(fresh.engine.fines_all().is_empty());
}

#[tokio::test]
async fn custom_policy_drives_due_dates_and_rates() {
    let f = support::engine_with(CirculationPolicy {
        loan_period_days: 7,
        renewal_extension_days: 3,
        max_renewals: 1,
        per_day_rate_cents: 50,
    });
    let loan = f
        .engine
        .checkout(&CopyId::from("C1"), &PatronId::from("P1"), None)
        .await
        .unwrap();
    assert_eq!(loan.due_on, date(2026, 3, 8));

    f.clock.advance_days(9);
    let outcome = f.engine.return_copy(&loan.id, None).await.unwrap();
    assert_eq!(outcome.fine.unwrap().amount_cents, 2 * 50);
}
