//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::io::Write;
use std::time::Duration;

use sales_server::ingest::{IngestionCoordinator, IngestionStatus};
use tempfile::NamedTempFile;

pub const HEADER: &str = "Order ID,Product ID,Customer ID,Product Name,Category,Region,\
Date of Sale,Quantity Sold,Unit Price,Discount,Shipping Cost,Payment Method,\
Customer Name,Customer Email,Customer Address";

/// One sales line with the given keys and otherwise fixed values
pub fn sale(order_id: &str, product_id: &str, customer_id: &str, date: &str) -> String {
    format!(
        "{order_id},{product_id},{customer_id},Trail Runner,Shoes,Europe,{date},2,50.00,5.00,3.50,\
Credit Card,Jane Doe,jane@example.com,\"12 High St, Leeds\""
    )
}

/// Write a CSV file with the standard header followed by `lines`
pub fn csv_file(lines: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file.flush().unwrap();
    file
}

pub async fn wait_for_idle(coordinator: &IngestionCoordinator) -> IngestionStatus {
    for _ in 0..1000 {
        let status = coordinator.status();
        if !status.is_running {
            return status;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("ingestion run did not finish");
}
