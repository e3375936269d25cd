use strata_core::{stmt::Value, Result};
use strata_sql::{Query, QueryKind};

use async_trait::async_trait;

/// Outcome of running one batch.
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Total rows affected across the batch.
    pub rows_affected: i64,

    /// Generated ID values, one per executed insert statement, in
    /// statement order.
    pub generated: Vec<Value>,
}

/// Collects parameterized statements and hands them to the database as one
/// round trip.
///
/// The mapping core stays synchronous; suspension happens only here, at the
/// execution boundary. Implementations are provided by the session layer;
/// [`RecordingBatch`] is the in-memory stand-in.
#[async_trait(?Send)]
pub trait QueryBatch {
    /// Queues one statement. Statements with empty text are dropped.
    fn add_query(&mut self, query: &Query);

    /// Drops queued statements whose text and parameters duplicate an
    /// earlier entry. Used on declaration preambles, which repeat once per
    /// object of a type.
    fn remove_duplicate_commands(&mut self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Executes the queued statements and clears the queue.
    fn execute(&mut self) -> Result<BatchResult>;

    /// Asynchronous variant of [`QueryBatch::execute`].
    async fn execute_async(&mut self) -> Result<BatchResult>;
}

/// In-memory batch: records what would be sent to the database and feeds
/// sequential generated IDs back for insert statements.
#[derive(Debug)]
pub struct RecordingBatch {
    queue: Vec<Query>,
    /// Every statement executed so far, in execution order.
    pub executed: Vec<Query>,
    next_id: i64,
}

impl Default for RecordingBatch {
    fn default() -> RecordingBatch {
        RecordingBatch::new()
    }
}

impl RecordingBatch {
    pub fn new() -> RecordingBatch {
        RecordingBatch::starting_at(1)
    }

    /// Starts generated IDs at the given value, as if the tables already
    /// held rows.
    pub fn starting_at(next_id: i64) -> RecordingBatch {
        RecordingBatch {
            queue: vec![],
            executed: vec![],
            next_id,
        }
    }

    fn run(&mut self) -> BatchResult {
        let mut result = BatchResult {
            rows_affected: self.queue.len() as i64,
            generated: vec![],
        };

        for query in self.queue.drain(..) {
            if query.kind == QueryKind::Insert && query.text.contains("SCOPE_IDENTITY()") {
                result.generated.push(Value::I64(self.next_id));
                self.next_id += 1;
            }
            self.executed.push(query);
        }

        result
    }
}

#[async_trait(?Send)]
impl QueryBatch for RecordingBatch {
    fn add_query(&mut self, query: &Query) {
        if !query.text.is_empty() {
            self.queue.push(query.clone());
        }
    }

    fn remove_duplicate_commands(&mut self) {
        let mut kept: Vec<Query> = vec![];
        for query in self.queue.drain(..) {
            if !kept
                .iter()
                .any(|q| q.text == query.text && q.parameters == query.parameters)
            {
                kept.push(query);
            }
        }
        self.queue = kept;
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn execute(&mut self) -> Result<BatchResult> {
        Ok(self.run())
    }

    async fn execute_async(&mut self) -> Result<BatchResult> {
        Ok(self.run())
    }
}
