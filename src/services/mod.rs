pub mod data_client;
pub mod file_store;
pub mod memory_client;

pub use data_client::{ClientError, ClientResult, DataClient};
pub use file_store::FileReportStore;
pub use memory_client::MemoryClient;
