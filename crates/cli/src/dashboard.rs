use fincore_api_client::ApiClient;
use fincore_protocol::InvoiceQuery;

use crate::CliError;

pub fn cmd_stats(client: &ApiClient, json: bool) -> Result<(), CliError> {
    let stats = client.dashboard_stats().map_err(CliError::api)?;
    if json {
        print_json(&stats)?;
        return Ok(());
    }
    println!("Total spend:     {:.2}", stats.total_spend);
    println!("Pending reviews: {}", stats.pending_reviews);
    println!("Monthly growth:  {:+.1}%", stats.monthly_growth);
    Ok(())
}

pub fn cmd_invoices(client: &ApiClient, query: InvoiceQuery, json: bool) -> Result<(), CliError> {
    let invoices = client.dashboard_invoices(&query).map_err(CliError::api)?;
    if json {
        print_json(&invoices)?;
        return Ok(());
    }
    if invoices.is_empty() {
        println!("No invoices match the filter.");
        return Ok(());
    }
    println!(
        "{:>6}  {:<24} {:<12} {:>12}  {}",
        "ID", "VENDOR", "DATE", "TOTAL", "STATUS"
    );
    for inv in invoices {
        println!(
            "{:>6}  {:<24} {:<12} {:>12}  {}",
            inv.id,
            inv.vendor,
            inv.date.as_deref().unwrap_or("-"),
            format!("{}{:.2}", inv.currency, inv.total),
            inv.status,
        );
    }
    Ok(())
}

pub fn cmd_chart(client: &ApiClient, json: bool) -> Result<(), CliError> {
    let points = client.dashboard_chart().map_err(CliError::api)?;
    if json {
        print_json(&points)?;
        return Ok(());
    }
    for point in points {
        println!("{:<12} {:>12.2}", point.name, point.spend);
    }
    Ok(())
}

pub fn cmd_status(client: &ApiClient, json: bool) -> Result<(), CliError> {
    let slices = client.status_distribution().map_err(CliError::api)?;
    if json {
        print_json(&slices)?;
        return Ok(());
    }
    for slice in slices {
        println!("{:<20} {:>6}", slice.name, slice.value);
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    let out = serde_json::to_string_pretty(value).map_err(|e| CliError::error(e.to_string()))?;
    println!("{}", out);
    Ok(())
}
