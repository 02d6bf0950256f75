//! Sign command implementation (fixture generation).

use parallel_guard_webhook::{sign, signature_header};

use super::read_input;
use crate::errors::CliError;

pub fn run(secret: String, webhook_id: String, timestamp: String, body_file: Option<String>) -> Result<bool, CliError> {
    let body = read_input(body_file.as_deref())?;
    let digest = sign(secret.as_bytes(), &webhook_id, &timestamp, &body)?;
    println!("{}", signature_header(&digest));
    Ok(true)
}
