pub mod in_memory;
pub mod notify;
pub mod razorpay;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
