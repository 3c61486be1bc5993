use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::new(cargo_bin!("kilnstore"));
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("load-products"))
        .stdout(predicate::str::contains("export-orders"));
}

#[test]
fn test_load_products_reports_count() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "product_id,name,category,description,price,weight_kg,stock_quantity"
    )
    .unwrap();
    writeln!(file, "bowl-1,Zen Breakfast Bowl,tableware,Stoneware,650.00,0.4,12").unwrap();
    writeln!(file, "vase-3,Raku Vase,art,Crackle glaze,2200.00,1.1,3").unwrap();

    let mut cmd = Command::new(cargo_bin!("kilnstore"));
    cmd.arg("load-products").arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Loaded 2 products"));
}

#[test]
fn test_load_products_skips_malformed_rows() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "product_id,name,category,description,price,weight_kg,stock_quantity"
    )
    .unwrap();
    writeln!(file, "bowl-1,Zen Breakfast Bowl,tableware,Stoneware,650.00,0.4,12").unwrap();
    writeln!(file, "plate-2,Dinner Plate,not-a-category,Glazed,450.00,0.6,8").unwrap();

    let mut cmd = Command::new(cargo_bin!("kilnstore"));
    cmd.arg("load-products").arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Loaded 1 products"))
        .stderr(predicate::str::contains("Error reading product"));
}

#[test]
fn test_export_orders_writes_header() {
    let mut cmd = Command::new(cargo_bin!("kilnstore"));
    cmd.arg("export-orders");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("order_number,created_at,customer_name"));
}
