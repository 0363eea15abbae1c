//! Relational-table surface.
//!
//! A small typed builder over the backend's table API. Filters, ordering
//! and limits are collected as query pairs and sent with the terminal verb
//! (`fetch`, `insert`, `update`, `delete`). Rows are decoded into caller
//! supplied types.

use reqwest::header::ACCEPT;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{decode_json, expect_success, ApiError, SupabaseClient};

/// Accept header requesting exactly one row. Zero or multiple matches make
/// the backend answer with an error status instead of an array.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Prefer header asking mutation calls to return the affected rows.
const RETURN_ROWS: (&str, &str) = ("Prefer", "return=representation");

/// A query against one table.
#[derive(Debug, Clone)]
pub struct TableQuery {
    client: SupabaseClient,
    table: String,
    pairs: Vec<(String, String)>,
    single: bool,
}

impl TableQuery {
    pub(crate) fn new(client: SupabaseClient, table: &str) -> Self {
        Self {
            client,
            table: table.to_string(),
            pairs: Vec::new(),
            single: false,
        }
    }

    /// Choose the columns to return.
    pub fn select(mut self, columns: &str) -> Self {
        self.pairs.push(("select".to_string(), columns.to_string()));
        self
    }

    /// Keep rows where `column` equals `value`.
    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.pairs
            .push((column.to_string(), format!("eq.{}", value.to_string())));
        self
    }

    /// Keep rows where `column` is greater than or equal to `value`.
    pub fn gte(mut self, column: &str, value: impl ToString) -> Self {
        self.pairs
            .push((column.to_string(), format!("gte.{}", value.to_string())));
        self
    }

    /// Order the result by `column`.
    pub fn order(mut self, column: &str, descending: bool) -> Self {
        let direction = if descending { "desc" } else { "asc" };
        self.pairs
            .push(("order".to_string(), format!("{column}.{direction}")));
        self
    }

    /// Return at most `n` rows.
    pub fn limit(mut self, n: usize) -> Self {
        self.pairs.push(("limit".to_string(), n.to_string()));
        self
    }

    /// Demand exactly one row. The fetched value decodes as a bare object
    /// rather than an array.
    pub fn single(mut self) -> Self {
        self.single = true;
        self
    }

    fn path(&self) -> String {
        format!("/rest/v1/{}", self.table)
    }

    fn builder(&self, method: Method) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, &self.path()).query(&self.pairs);
        if self.single {
            builder = builder.header(ACCEPT, SINGLE_OBJECT);
        }
        builder
    }

    /// Run the query as a read and decode the rows.
    pub async fn fetch<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let resp = self.builder(Method::GET).send().await?;
        decode_json(resp).await
    }

    /// Insert rows and decode the stored representation.
    pub async fn insert<B, R>(self, rows: &B) -> Result<Vec<R>, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let resp = self
            .builder(Method::POST)
            .header(RETURN_ROWS.0, RETURN_ROWS.1)
            .json(rows)
            .send()
            .await?;
        decode_json(resp).await
    }

    /// Insert rows without asking for them back.
    pub async fn insert_only<B>(self, rows: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let resp = self.builder(Method::POST).json(rows).send().await?;
        expect_success(resp).await
    }

    /// Patch the rows matched by the collected filters and decode the
    /// updated representation.
    pub async fn update<B, R>(self, patch: &B) -> Result<Vec<R>, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let resp = self
            .builder(Method::PATCH)
            .header(RETURN_ROWS.0, RETURN_ROWS.1)
            .json(patch)
            .send()
            .await?;
        decode_json(resp).await
    }

    /// Delete the rows matched by the collected filters.
    pub async fn delete(self) -> Result<(), ApiError> {
        let resp = self.builder(Method::DELETE).send().await?;
        expect_success(resp).await
    }
}
