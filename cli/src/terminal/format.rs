use colored::*;

use circ_common::model::{Fine, FineStatus, LoanStatus};
use circ_core::engine::LoanView;

type Detail = (String, ColoredString);

pub fn money(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, (cents % 100).abs())
}

fn loan_status(status: LoanStatus) -> ColoredString {
    match status {
        LoanStatus::Active => "active".green(),
        LoanStatus::Overdue => "overdue".red().bold(),
        LoanStatus::Returned => "returned".normal(),
        LoanStatus::Cancelled => "cancelled".dimmed(),
    }
}

fn fine_status(status: FineStatus) -> ColoredString {
    match status {
        FineStatus::Pending => "pending".yellow().bold(),
        FineStatus::Paid => "paid".green(),
        FineStatus::Cancelled => "cancelled".dimmed(),
    }
}

pub fn loan_details(view: &LoanView) -> Vec<Detail> {
    let loan = &view.loan;
    let mut details: Vec<Detail> = vec![
        ("Patron".to_string(), loan.patron.to_string().normal()),
        ("Copy".to_string(), loan.copy.to_string().normal()),
    ];

    if let Some(title) = &view.work_title {
        details.push(("Work".to_string(), title.clone().cyan()));
    }
    if let Some(barcode) = &view.barcode {
        details.push(("Barcode".to_string(), barcode.clone().dimmed()));
    }

    details.push(("Status".to_string(), loan_status(loan.status)));
    details.push(("Out".to_string(), loan.checked_out_at.date_naive().to_string().normal()));
    details.push(("Due".to_string(), loan.due_on.to_string().normal()));
    if let Some(returned) = loan.returned_at {
        details.push(("Returned".to_string(), returned.date_naive().to_string().normal()));
    }
    if loan.renewals > 0 {
        details.push(("Renewals".to_string(), loan.renewals.to_string().normal()));
    }
    if view.is_late {
        details.push((
            "Late".to_string(),
            format!("{} day(s)", view.days_late).red().bold(),
        ));
    }

    details
}

pub fn fine_details(fine: &Fine) -> Vec<Detail> {
    let mut details: Vec<Detail> = vec![
        ("Patron".to_string(), fine.patron.to_string().normal()),
        ("Kind".to_string(), format!("{:?}", fine.kind).normal()),
        ("Amount".to_string(), money(fine.amount_cents).yellow()),
        ("Status".to_string(), fine_status(fine.status)),
        ("Issued".to_string(), fine.issued_at.date_naive().to_string().normal()),
    ];

    if let Some(loan) = &fine.loan {
        details.push(("Loan".to_string(), loan.to_string().normal()));
    }
    if let Some(paid) = fine.paid_at {
        details.push(("Paid".to_string(), paid.date_naive().to_string().normal()));
    }
    if !fine.description.is_empty() {
        details.push(("Note".to_string(), fine.description.clone().dimmed()));
    }

    details
}
