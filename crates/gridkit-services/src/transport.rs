//! Remote column-definition protocol
//!
//! One resource, `col-def`, carries every operation:
//!
//! - `GET col-def?page_name&table_name` returns the stored configuration
//! - `POST col-def` saves, checks existence, fetches the full schema or adds
//!   columns, depending on the body
//! - `DELETE col-def?table_name&column_name` drops a live column

use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};
use crate::view_models::{
    AddColumnsOutcome, ColumnConfigRecord, ColumnSpec, DbColumn, DeleteResponse, SaveConfigRequest,
};

/// Transport for the column-definition service
///
/// `ColumnConfigStore` talks to this trait so tests can substitute an
/// in-memory implementation.
#[async_trait]
pub trait ColumnDefTransport: Send + Sync {
    async fn fetch_config(&self, page_name: &str, table_name: &str) -> ServiceResult<ColumnConfigRecord>;

    async fn save_config(&self, request: &SaveConfigRequest) -> ServiceResult<()>;

    /// field → exists for the requested fields
    async fn check_columns(&self, table_name: &str, fields: &[String]) -> ServiceResult<IndexMap<String, bool>>;

    async fn fetch_all_columns(&self, table_name: &str) -> ServiceResult<Vec<DbColumn>>;

    async fn add_columns(&self, table_name: &str, specs: &[ColumnSpec]) -> ServiceResult<AddColumnsOutcome>;

    async fn delete_column(&self, table_name: &str, column_name: &str) -> ServiceResult<DeleteResponse>;
}

#[derive(Serialize)]
struct CheckColumnsRequest<'a> {
    check_columns: &'a [String],
    table_name: &'a str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    get_all_columns: bool,
}

#[derive(Serialize)]
struct AddColumnsRequest<'a> {
    add_columns: &'a [ColumnSpec],
    table_name: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckColumnsResponse {
    #[serde(default)]
    column_status: IndexMap<String, bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AllColumnsResponse {
    #[serde(default)]
    all_columns: Vec<DbColumn>,
}

#[derive(Deserialize)]
struct SaveResponse {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

fn default_success() -> bool {
    true
}

/// HTTP implementation of `ColumnDefTransport`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    /// `base_url` is the API root; requests go to `<base_url>/col-def`
    pub fn new(base_url: &str, timeout: Duration) -> ServiceResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/col-def", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(&self, body: &B) -> ServiceResult<T> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> ServiceResult<T> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ServiceError::Remote {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json()
        .await
        .map_err(|e| ServiceError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl ColumnDefTransport for HttpTransport {
    async fn fetch_config(&self, page_name: &str, table_name: &str) -> ServiceResult<ColumnConfigRecord> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("page_name", page_name), ("table_name", table_name)])
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        read_json(response).await
    }

    async fn save_config(&self, request: &SaveConfigRequest) -> ServiceResult<()> {
        let response: SaveResponse = self.post_json(request).await?;
        if response.success {
            Ok(())
        } else {
            Err(ServiceError::SaveFailed(
                response.message.unwrap_or_else(|| "rejected by server".to_string()),
            ))
        }
    }

    async fn check_columns(&self, table_name: &str, fields: &[String]) -> ServiceResult<IndexMap<String, bool>> {
        let request = CheckColumnsRequest {
            check_columns: fields,
            table_name,
            get_all_columns: false,
        };
        let response: CheckColumnsResponse = self.post_json(&request).await?;
        Ok(response.column_status)
    }

    async fn fetch_all_columns(&self, table_name: &str) -> ServiceResult<Vec<DbColumn>> {
        let request = CheckColumnsRequest {
            check_columns: &[],
            table_name,
            get_all_columns: true,
        };
        let response: AllColumnsResponse = self.post_json(&request).await?;
        Ok(response.all_columns)
    }

    async fn add_columns(&self, table_name: &str, specs: &[ColumnSpec]) -> ServiceResult<AddColumnsOutcome> {
        let request = AddColumnsRequest {
            add_columns: specs,
            table_name,
        };
        self.post_json(&request).await
    }

    async fn delete_column(&self, table_name: &str, column_name: &str) -> ServiceResult<DeleteResponse> {
        let response = self
            .client
            .delete(&self.endpoint)
            .query(&[("table_name", table_name), ("column_name", column_name)])
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_endpoint_joins_base_url() {
        let transport = HttpTransport::new("http://localhost:3000/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(transport.endpoint(), "http://localhost:3000/api/col-def");
    }

    #[test]
    fn test_request_bodies() {
        let fields = vec!["a".to_string(), "b".to_string()];
        let check = serde_json::to_value(CheckColumnsRequest {
            check_columns: &fields,
            table_name: "users",
            get_all_columns: false,
        })
        .unwrap();
        assert_eq!(
            check,
            serde_json::json!({"check_columns": ["a", "b"], "table_name": "users"})
        );

        let all = serde_json::to_value(CheckColumnsRequest {
            check_columns: &[],
            table_name: "users",
            get_all_columns: true,
        })
        .unwrap();
        assert_eq!(
            all,
            serde_json::json!({"check_columns": [], "table_name": "users", "get_all_columns": true})
        );

        let specs = vec![ColumnSpec::new("nick", "string")];
        let add = serde_json::to_value(AddColumnsRequest {
            add_columns: &specs,
            table_name: "users",
        })
        .unwrap();
        assert_eq!(
            add,
            serde_json::json!({"add_columns": [{"field": "nick", "type": "string"}], "table_name": "users"})
        );
    }
}
