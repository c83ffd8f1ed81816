//! Output serialization for query results and import payloads
//!
//! All functions write to any `Write` and perform no other I/O.

use crate::io::fixed_width::round_money;
use crate::types::{OrderDetails, OrderError};
use serde::Serialize;
use std::io::Write;

/// Write any serializable value as pretty JSON followed by a newline
///
/// Used for query results, import counts and rejected-line payloads.
pub fn write_json<T: Serialize + ?Sized>(
    value: &T,
    output: &mut dyn Write,
) -> Result<(), OrderError> {
    serde_json::to_writer_pretty(&mut *output, value).map_err(|e| OrderError::IoError {
        message: format!("Failed to write JSON: {}", e),
    })?;
    writeln!(output)?;
    Ok(())
}

/// Write order details as flat CSV rows
///
/// One row per product line with columns:
/// `user_id,name,order_id,date,total,product_id,value`. Users and orders keep
/// the order of `details`; amounts are rounded with [`round_money`] and
/// written with two decimals.
pub fn write_details_csv(details: &[OrderDetails], output: &mut dyn Write) -> Result<(), OrderError> {
    let mut writer = csv::Writer::from_writer(output);
    let csv_err = |e: csv::Error| OrderError::IoError {
        message: format!("Failed to write CSV: {}", e),
    };

    writer
        .write_record(["user_id", "name", "order_id", "date", "total", "product_id", "value"])
        .map_err(csv_err)?;

    for user in details {
        for order in &user.orders {
            for product in &order.products {
                writer
                    .write_record(&[
                        user.user_id.to_string(),
                        user.name.clone(),
                        order.order_id.to_string(),
                        order.date.to_string(),
                        format!("{:.2}", round_money(order.total)),
                        product.product_id.to_string(),
                        format!("{:.2}", round_money(product.value)),
                    ])
                    .map_err(csv_err)?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}
