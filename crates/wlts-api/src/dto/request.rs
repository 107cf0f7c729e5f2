use serde::Deserialize;

/// Query parameters of `describe_collection`
#[derive(Debug, Default, Deserialize)]
pub struct DescribeParams {
    pub collection_id: Option<String>,
}
