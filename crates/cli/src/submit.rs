use std::path::PathBuf;
use std::time::Duration;

use fincore_api_client::{ApiClient, ApiError};
use fincore_engine::{Field, HeaderField, Invoice, Origin};
use fincore_review::{
    ReviewSession, SessionError, SessionObserver, SessionState, TIMEOUT_MESSAGE,
};

use crate::exit_codes::{
    EXIT_PROCESSING_FAILED, EXIT_PROCESSING_TIMEOUT, EXIT_UPLOAD_FAILED, EXIT_VERIFICATION_GATE,
};
use crate::CliError;

/// Progress lines on stderr; stdout stays clean for the result.
struct StderrProgress;

impl SessionObserver for StderrProgress {
    fn state_changed(&self, state: &SessionState) {
        match state {
            SessionState::Uploading => eprintln!("Uploading..."),
            SessionState::Processing { task_id, .. } => {
                eprintln!("Processing (task {})...", task_id)
            }
            SessionState::Completed => eprintln!("Extraction complete."),
            SessionState::Idle | SessionState::Error { .. } => {}
        }
    }

    fn poll_error(&self, attempt: u32, error: &ApiError) {
        eprintln!("warning: poll attempt {} failed: {}", attempt, error);
    }

    fn stale_response_discarded(&self) {
        eprintln!("warning: discarded a stale backend response");
    }
}

pub fn cmd_submit(
    client: ApiClient,
    file: PathBuf,
    approve: bool,
    verify: Vec<String>,
    interval_secs: u64,
    max_attempts: u32,
    json: bool,
) -> Result<(), CliError> {
    let mut session = ReviewSession::new(client)
        .with_observer(Box::new(StderrProgress))
        .with_max_poll_attempts(max_attempts);

    session
        .select_file(&file)
        .map_err(|e| CliError::error(e.to_string()))?;

    if let SessionState::Error { message } = session.state() {
        return Err(CliError {
            code: EXIT_UPLOAD_FAILED,
            message: message.clone(),
            hint: Some(format!("is the backend reachable? tried {}", file.display())),
        });
    }

    session.run_poll_loop(Duration::from_secs(interval_secs.max(1)), std::thread::sleep);

    match session.state() {
        SessionState::Completed => {}
        SessionState::Error { message } if message == TIMEOUT_MESSAGE => {
            return Err(CliError {
                code: EXIT_PROCESSING_TIMEOUT,
                message: message.clone(),
                hint: Some("raise --max-attempts or --interval-secs".to_string()),
            });
        }
        SessionState::Error { message } => {
            return Err(CliError {
                code: EXIT_PROCESSING_FAILED,
                message: message.clone(),
                hint: None,
            });
        }
        other => {
            return Err(CliError::error(format!(
                "session ended in unexpected state {:?}",
                other
            )));
        }
    }

    let invoice = match session.invoice() {
        Some(invoice) => invoice.clone(),
        None => return Err(CliError::error("extraction completed without an invoice")),
    };

    if json {
        let out = serde_json::json!({
            "invoice": invoice,
            "derivedTotals": invoice.derived_totals(),
            "lowConfidence": invoice.has_low_confidence(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).map_err(|e| CliError::error(e.to_string()))?
        );
    } else {
        print_invoice(&invoice);
    }

    for field in verify {
        session.acknowledge(field);
    }

    if approve {
        match session.approve() {
            Ok(()) => eprintln!("Approved."),
            Err(SessionError::VerificationIncomplete) => {
                return Err(CliError {
                    code: EXIT_VERIFICATION_GATE,
                    message: "verification gate unmet".to_string(),
                    hint: Some(
                        "acknowledge with --verify date --verify total_amount".to_string(),
                    ),
                });
            }
            Err(e) => return Err(CliError::error(e.to_string())),
        }
    }

    Ok(())
}

fn print_invoice(invoice: &Invoice) {
    println!(
        "Vendor:          {:<24} [{}]{}",
        invoice.vendor_name.value,
        field_note(&invoice.vendor_name),
        flag_marker(invoice, HeaderField::VendorName)
    );
    println!(
        "Invoice number:  {:<24} [{}]{}",
        invoice.invoice_number.value,
        field_note(&invoice.invoice_number),
        flag_marker(invoice, HeaderField::InvoiceNumber)
    );
    println!(
        "Date:            {:<24} [{}]{}",
        invoice.date.value,
        field_note(&invoice.date),
        flag_marker(invoice, HeaderField::Date)
    );
    println!(
        "Total:           {:<24} [{}]{}",
        format!("{}{:.2}", invoice.currency, invoice.total_amount.value),
        field_note(&invoice.total_amount),
        flag_marker(invoice, HeaderField::TotalAmount)
    );
    println!(
        "Tax:             {:<24} [{}]{}",
        format!("{}{:.2}", invoice.currency, invoice.tax_amount.value),
        field_note(&invoice.tax_amount),
        flag_marker(invoice, HeaderField::TaxAmount)
    );

    if !invoice.line_items.is_empty() {
        println!();
        println!("Line items:");
        for item in &invoice.line_items {
            println!(
                "  {:<32} {:>8} x {:>10} = {:>10}",
                item.description.value,
                format_number(item.quantity.value),
                format_number(item.unit_price.value),
                format_number(item.amount.value),
            );
        }
    }

    let totals = invoice.derived_totals();
    println!();
    println!(
        "Subtotal {}  Est. tax {}  Total {}",
        format_number(totals.subtotal),
        format_number(totals.tax),
        format_number(totals.total),
    );

    if invoice.has_low_confidence() {
        eprintln!("warning: low-confidence fields present; review before approving");
    }
    if let Some(validation) = &invoice.validation {
        for reason in &validation.reasons {
            eprintln!("warning: validation: {}", reason);
        }
    }
}

fn field_note<T>(field: &Field<T>) -> String {
    match field.origin {
        Origin::Human => "edited".to_string(),
        Origin::Ai if field.is_low_confidence() => {
            format!("ai {:.2} LOW", field.confidence)
        }
        Origin::Ai => format!("ai {:.2}", field.confidence),
    }
}

fn flag_marker(invoice: &Invoice, field: HeaderField) -> &'static str {
    if invoice.is_field_flagged(field) {
        " !"
    } else {
        ""
    }
}

fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.2}", value)
    }
}
