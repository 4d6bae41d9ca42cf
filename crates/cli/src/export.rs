use std::path::PathBuf;

use fincore_api_client::ApiClient;
use fincore_protocol::InvoiceQuery;

use crate::CliError;

pub fn cmd_export(
    client: &ApiClient,
    query: InvoiceQuery,
    output: PathBuf,
) -> Result<(), CliError> {
    let written = client
        .export_invoices(&query, &output)
        .map_err(CliError::api)?;
    eprintln!("Wrote {} bytes to {}", written, output.display());
    Ok(())
}
