//! Retrieval request builder
//!
//! Holds the condition uncompiled. Compilation, index selection and key
//! extraction all happen in [`RetrievalRequest::build`], right before the
//! store is called.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::RetrievalResult;
use super::input::RequestInput;
use super::options::{AllPages, RetrievalOptions};
use crate::compiler::{compile, CompileContext, ExpressionKeyword, NAME_PREFIX};
use crate::condition::Condition;
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::planner::{
    split_key_condition, ComparatorChart, ExplainPlan, IndexSelector, Selection, TableDescriptor,
};
use crate::value::{Item, ValueMarshaller};

/// Store operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Query,
    Scan,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Query => "Query",
            Operation::Scan => "Scan",
        }
    }
}

/// Compiled request plus the index decision behind it
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Prepared {
    pub input: RequestInput,
    pub selection: Option<Selection>,
}

/// A query or scan waiting to be compiled
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalRequest {
    operation: Operation,
    table: TableDescriptor,
    condition: Condition,
    options: RetrievalOptions,
    placeholder_offset: u32,
}

impl RetrievalRequest {
    /// Query; the condition must pin an index's hash attribute with `Eq`
    pub fn query(table: TableDescriptor, condition: Condition) -> Self {
        Self::new(Operation::Query, table, condition)
    }

    /// Scan; the condition becomes the filter and no index is selected
    pub fn scan(table: TableDescriptor, condition: Condition) -> Self {
        Self::new(Operation::Scan, table, condition)
    }

    pub fn new(operation: Operation, table: TableDescriptor, condition: Condition) -> Self {
        Self {
            operation,
            table,
            condition,
            options: RetrievalOptions::default(),
            placeholder_offset: 0,
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.options.limit = Some(limit);
        self
    }

    pub fn consistent_read(mut self) -> Self {
        self.options.consistent_read = true;
        self
    }

    /// Ask for counts only (`Select = COUNT`)
    pub fn count(mut self) -> Self {
        self.options.count = true;
        self
    }

    /// Resume after `key`
    pub fn start_at(mut self, key: Item) -> Self {
        self.options.start_at = Some(key);
        self
    }

    /// Project only these attributes
    pub fn attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Follow every page, pausing `delay` between calls
    pub fn all_pages(mut self, delay: Duration, max_pages: Option<u32>) -> Self {
        self.options.all_pages = Some(AllPages {
            delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            max_pages,
        });
        self
    }

    pub fn with_options(mut self, options: RetrievalOptions) -> Self {
        self.options = options;
        self
    }

    /// First placeholder index used by this request
    pub fn placeholder_offset(mut self, offset: u32) -> Self {
        self.placeholder_offset = offset;
        self
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn table(&self) -> &TableDescriptor {
        &self.table
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    pub fn options(&self) -> &RetrievalOptions {
        &self.options
    }

    /// Compiles into the wire request.
    ///
    /// Fails before any store call on builder, compile, option or index
    /// selection errors.
    pub async fn build(&self, marshaller: &dyn ValueMarshaller) -> RetrievalResult<RequestInput> {
        Ok(self.prepare(marshaller, None).await?.input)
    }

    /// Describes how the request would run. Never fails: rejections become
    /// a rejected plan.
    pub async fn explain(&self, marshaller: &dyn ValueMarshaller) -> ExplainPlan {
        let plan = match self.prepare(marshaller, None).await {
            Ok(prepared) => {
                let input = prepared.input;
                let plan = match (&prepared.selection, input.key_condition_expression) {
                    (Some(selection), Some(key)) => ExplainPlan::query(
                        &self.table.name,
                        selection,
                        key,
                        input.filter_expression,
                    ),
                    _ => ExplainPlan::scan(&self.table.name, input.filter_expression),
                };
                plan.with_projection(input.projection_expression)
            }
            Err(err) => ExplainPlan::rejected(
                self.operation.as_str(),
                &self.table.name,
                err.code(),
                err.to_string(),
            ),
        };

        log_event_with_fields(
            Event::ExplainComplete,
            &[
                ("table", self.table.name.as_str()),
                ("accepted", if plan.accepted { "true" } else { "false" }),
            ],
        );
        plan
    }

    pub(crate) async fn prepare(
        &self,
        marshaller: &dyn ValueMarshaller,
        metrics: Option<&MetricsRegistry>,
    ) -> RetrievalResult<Prepared> {
        match self.prepare_inner(marshaller, metrics).await {
            Ok(prepared) => {
                log_event_with_fields(
                    Event::RequestBuilt,
                    &[
                        ("operation", self.operation.as_str()),
                        ("table", self.table.name.as_str()),
                    ],
                );
                if let Some(metrics) = metrics {
                    metrics.increment_requests_built();
                }
                Ok(prepared)
            }
            Err(err) => {
                log_event_with_fields(
                    Event::RequestRejected,
                    &[
                        ("code", err.code()),
                        ("operation", self.operation.as_str()),
                        ("table", self.table.name.as_str()),
                    ],
                );
                if let Some(metrics) = metrics {
                    metrics.increment_requests_rejected();
                }
                Err(err)
            }
        }
    }

    async fn prepare_inner(
        &self,
        marshaller: &dyn ValueMarshaller,
        metrics: Option<&MetricsRegistry>,
    ) -> RetrievalResult<Prepared> {
        self.options.validate()?;
        self.table.validate()?;

        let mut ctx = CompileContext::new(marshaller, ExpressionKeyword::Filter)
            .with_offset(self.placeholder_offset);
        let compiled = compile(&self.condition, &mut ctx).await?;

        let mut input = RequestInput::new(&self.table.name);
        let mut selection = None;

        match self.operation {
            Operation::Query => {
                let chart = ComparatorChart::from_condition(&self.condition);
                let mut selector = IndexSelector::new(&self.table);
                if let Some(metrics) = metrics {
                    selector = selector.with_metrics(metrics);
                }
                let chosen = selector.select(&chart)?;
                let split = split_key_condition(&self.table, &chosen.resolve(&self.table), compiled)?;

                input.index_name = chosen.index_name().map(str::to_string);
                input.key_condition_expression = Some(split.key_condition.expression);
                input.expression_attribute_names = split.key_condition.names;
                input.expression_attribute_values = split.key_condition.values;
                if let Some(filter) = split.filter {
                    input.filter_expression = filter.render();
                    input.expression_attribute_names.extend(filter.names);
                    input.expression_attribute_values.extend(filter.values);
                }
                selection = Some(chosen);
            }
            Operation::Scan => {
                input.filter_expression = compiled.render();
                input.expression_attribute_names = compiled.names;
                input.expression_attribute_values = compiled.values;
            }
        }

        if !self.options.attributes.is_empty() {
            let mut projected = Vec::with_capacity(self.options.attributes.len());
            for attribute in &self.options.attributes {
                let index = ctx.allocate()?;
                let segments: Vec<&str> = attribute.split('.').collect();
                let mut placeholders = Vec::with_capacity(segments.len());
                for (k, segment) in segments.iter().enumerate() {
                    let placeholder = if segments.len() > 1 {
                        format!("{}{}_{}", NAME_PREFIX, index, k)
                    } else {
                        format!("{}{}", NAME_PREFIX, index)
                    };
                    input
                        .expression_attribute_names
                        .insert(placeholder.clone(), segment.to_string());
                    placeholders.push(placeholder);
                }
                projected.push(placeholders.join("."));
            }
            input.projection_expression = Some(projected.join(", "));
        }

        input.limit = self.options.limit;
        if self.options.consistent_read {
            input.consistent_read = Some(true);
        }
        if self.options.count {
            input.select = Some("COUNT".to_string());
        }
        input.exclusive_start_key = self.options.start_at.clone();

        Ok(Prepared { input, selection })
    }
}
