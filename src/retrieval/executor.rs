//! Store seam and pagination loop
//!
//! The request is compiled before the first store call, so builder, compile
//! and index selection errors never reach the network. Store failures are
//! returned as-is; retry policy belongs to the client.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::errors::{RetrievalError, RetrievalResult, StoreError};
use super::input::{Page, RequestInput, ResponseSet};
use super::request::{Operation, RetrievalRequest};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::value::{JsonMarshaller, ValueMarshaller};

/// Future returned by a store client
pub type StoreFuture<'a> = Pin<Box<dyn Future<Output = Result<Page, StoreError>> + Send + 'a>>;

/// Network seam to the key-value store
pub trait StoreClient: Send + Sync {
    fn query<'a>(&'a self, input: &'a RequestInput) -> StoreFuture<'a>;

    fn scan<'a>(&'a self, input: &'a RequestInput) -> StoreFuture<'a>;
}

impl<C: StoreClient + ?Sized> StoreClient for Arc<C> {
    fn query<'a>(&'a self, input: &'a RequestInput) -> StoreFuture<'a> {
        (**self).query(input)
    }

    fn scan<'a>(&'a self, input: &'a RequestInput) -> StoreFuture<'a> {
        (**self).scan(input)
    }
}

/// Runs retrieval requests against a store client
pub struct Retriever<C: StoreClient> {
    client: C,
    marshaller: Arc<dyn ValueMarshaller>,
    metrics: Arc<MetricsRegistry>,
}

impl<C: StoreClient> Retriever<C> {
    /// Creates a retriever using the schema-less JSON marshaller
    pub fn new(client: C) -> Self {
        Self {
            client,
            marshaller: Arc::new(JsonMarshaller),
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    pub fn with_marshaller(mut self, marshaller: Arc<dyn ValueMarshaller>) -> Self {
        self.marshaller = marshaller;
        self
    }

    /// Shares a metrics registry with other components
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Fetches one page, or every page when `all_pages` is set.
    ///
    /// In all-pages mode the loop follows `LastEvaluatedKey`, sleeps the
    /// configured delay between calls and stops after `max_pages`.
    pub async fn execute(&self, request: &RetrievalRequest) -> RetrievalResult<ResponseSet> {
        let prepared = request
            .prepare(self.marshaller.as_ref(), Some(self.metrics.as_ref()))
            .await?;
        let operation = request.operation();
        let table = request.table().name.as_str();
        let all_pages = request.options().all_pages;

        let mut response = ResponseSet::default();
        let mut input = prepared.input;

        loop {
            let page = match self.fetch(operation, &input).await {
                Ok(page) => page,
                Err(source) => {
                    self.metrics.increment_store_failures();
                    let reason = source.to_string();
                    log_event_with_fields(
                        Event::StoreFailed,
                        &[("reason", reason.as_str()), ("table", table)],
                    );
                    return Err(RetrievalError::Store {
                        pages: response.times_queried,
                        source,
                    });
                }
            };

            self.metrics.record_page(page.items.len() as u64);
            response.absorb(page);
            let page_number = response.times_queried.to_string();
            log_event_with_fields(
                Event::PageFetched,
                &[("page", page_number.as_str()), ("table", table)],
            );

            let Some(all_pages) = all_pages else {
                break;
            };
            let Some(key) = response.last_key.clone() else {
                break;
            };
            if let Some(max_pages) = all_pages.max_pages {
                if response.times_queried >= max_pages {
                    break;
                }
            }

            let delay = all_pages.delay();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            input = input.with_start_key(key);
        }

        let items = response.items.len().to_string();
        let pages = response.times_queried.to_string();
        log_event_with_fields(
            Event::RetrievalComplete,
            &[
                ("items", items.as_str()),
                ("pages", pages.as_str()),
                ("table", table),
            ],
        );
        Ok(response)
    }

    async fn fetch(&self, operation: Operation, input: &RequestInput) -> Result<Page, StoreError> {
        match operation {
            Operation::Query => self.client.query(input).await,
            Operation::Scan => self.client.scan(input).await,
        }
    }
}
