mod request;
mod response;

pub use request::DescribeParams;
pub use response::{CollectionsResponse, HealthResponse, RootResponse};
