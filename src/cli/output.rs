use std::{
    fmt::{self, Write as _},
    io::IsTerminal,
};

use colored::{Color, Colorize};
use costbook_domain::{CostLedger, Displayable, PaymentReport, PaymentSnapshot, PaymentStatus};
use rust_decimal::Decimal;

/// Terminal styling resolved once per invocation.
#[derive(Debug, Clone)]
pub struct Palette {
    pub use_color: bool,
    pub currency: String,
}

impl Palette {
    /// Colors only when stdout is a terminal and `NO_COLOR` is unset.
    pub fn detect(currency: &str) -> Self {
        let stdout_tty = std::io::stdout().is_terminal();
        let no_color = std::env::var_os("NO_COLOR").is_some();
        Self {
            use_color: stdout_tty && !no_color,
            currency: currency.to_string(),
        }
    }

    pub fn plain(currency: &str) -> Self {
        Self {
            use_color: false,
            currency: currency.to_string(),
        }
    }

    fn header(&self, text: &str) -> String {
        if self.use_color {
            text.color(Color::BrightBlue).bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn status(&self, status: PaymentStatus) -> String {
        let label = format!("{:<9}", status.as_str());
        if !self.use_color {
            return label;
        }
        match status {
            PaymentStatus::Overdue => label.red().bold().to_string(),
            PaymentStatus::Pending => label.yellow().to_string(),
            PaymentStatus::Paid => label.green().to_string(),
            PaymentStatus::Cancelled => label.dimmed().to_string(),
        }
    }

    fn amount(&self, amount: Decimal) -> String {
        format!("{:.2} {}", amount, self.currency)
    }
}

pub fn render_payments(
    ledger: &CostLedger,
    snapshot: &PaymentSnapshot,
    palette: &Palette,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "{}", palette.header(&ledger.display_label()))?;

    if snapshot.payments.is_empty() {
        writeln!(out, "No payments recorded.")?;
        return Ok(out);
    }

    for payment in &snapshot.payments {
        let date = payment
            .payment_date
            .map(|date| date.to_string())
            .unwrap_or_else(|| "-".into());
        write!(
            out,
            "  {}  {}  {:>10}  {:>16}  {}",
            payment.id,
            palette.status(payment.status),
            date,
            palette.amount(payment.amount),
            payment.kind
        )?;
        if let Some(note) = &payment.note {
            write!(out, "  ({note})")?;
        }
        out.push('\n');
    }

    let overall = snapshot
        .overall_status
        .map(|status| status.as_str())
        .unwrap_or("none");
    writeln!(
        out,
        "Total paid: {}  Status: {}",
        palette.amount(snapshot.total_paid),
        overall
    )?;
    Ok(out)
}

pub fn render_report(report: &PaymentReport, palette: &Palette) -> Result<String, fmt::Error> {
    let mut out = String::new();
    if report.is_empty() {
        writeln!(out, "No payments match the filter.")?;
        return Ok(out);
    }

    for group in &report.by_status {
        writeln!(
            out,
            "{} {} payment(s), {}",
            palette.status(group.status),
            group.count,
            palette.amount(group.total_amount)
        )?;
        for row in &group.rows {
            let date = row
                .payment
                .payment_date
                .map(|date| date.to_string())
                .unwrap_or_else(|| "-".into());
            writeln!(
                out,
                "    {:<24} {:>10}  {:>16}  {}",
                row.ledger.label,
                date,
                palette.amount(row.payment.amount),
                row.ledger.counterparty
            )?;
        }
    }
    writeln!(
        out,
        "{}",
        palette.header(&format!(
            "Total: {} payment(s), {}",
            report.total_count,
            palette.amount(report.total_amount)
        ))
    )?;
    Ok(out)
}

pub fn render_items(ledgers: &[CostLedger], palette: &Palette) -> Result<String, fmt::Error> {
    let mut out = String::new();
    if ledgers.is_empty() {
        writeln!(out, "No cost items.")?;
        return Ok(out);
    }
    for ledger in ledgers {
        let status = ledger
            .overall_status()
            .map(|status| palette.status(status))
            .unwrap_or_else(|| format!("{:<9}", "none"));
        writeln!(
            out,
            "{}  {:<8}  {:<24}  {}  {:>16}",
            ledger.id,
            ledger.kind(),
            ledger.label,
            status,
            palette.amount(ledger.total_paid())
        )?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use costbook_domain::{CostItem, PaymentInput};
    use uuid::Uuid;

    fn ledger_with_payments() -> CostLedger {
        let mut ledger = CostLedger::new(
            Uuid::new_v4(),
            "Framing",
            CostItem::contract("Acme Builders", None),
        );
        let today = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let record = PaymentInput::new(Decimal::new(12050, 2), "wire", PaymentStatus::Paid)
            .with_note("first installment")
            .into_record(Uuid::new_v4())
            .unwrap();
        ledger.append_payment(record, today).unwrap();
        ledger
    }

    #[test]
    fn payments_render_amounts_and_totals() {
        let ledger = ledger_with_payments();
        let text = render_payments(
            &ledger,
            &PaymentSnapshot::from(&ledger),
            &Palette::plain("EUR"),
        )
        .unwrap();
        assert!(text.starts_with("Framing (contract: Acme Builders)"));
        assert!(text.contains("120.50 EUR"));
        assert!(text.contains("2024-04-01"));
        assert!(text.contains("(first installment)"));
        assert!(text.contains("Status: paid"));
    }

    #[test]
    fn empty_report_has_placeholder() {
        let text = render_report(&PaymentReport::empty(), &Palette::plain("USD")).unwrap();
        assert_eq!(text.trim(), "No payments match the filter.");
    }
}
