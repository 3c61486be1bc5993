use crate::domain::order::Order;
use crate::error::Result;
use std::io::Write;

/// Writes orders as CSV for bookkeeping and reconciliation exports.
pub struct OrderWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OrderWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new().from_writer(sink),
        }
    }

    pub fn write_orders(&mut self, orders: Vec<Order>) -> Result<()> {
        self.writer.write_record([
            "order_number",
            "created_at",
            "customer_name",
            "customer_email",
            "status",
            "payment_method",
            "payment_received",
            "subtotal",
            "shipping",
            "tax",
            "discount",
            "total",
            "items",
        ])?;
        for order in orders {
            let items = order
                .items
                .iter()
                .map(|i| format!("{} x {}", i.product_name, i.quantity))
                .collect::<Vec<_>>()
                .join("; ");
            let record = vec![
                order.order_number.clone(),
                order.created_at.to_rfc3339(),
                order.customer.name.clone(),
                order.customer.email.clone(),
                format!("{:?}", order.status).to_lowercase(),
                format!("{:?}", order.payment_method).to_lowercase(),
                order.payment_received.to_string(),
                order.totals.subtotal.to_string(),
                order.totals.shipping.to_string(),
                order.totals.tax.to_string(),
                order.totals.discount.to_string(),
                order.totals.total.to_string(),
                items,
            ];
            self.writer.write_record(&record)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
