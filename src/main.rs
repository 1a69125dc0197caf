use std::rc::Rc;
use std::thread;
use std::time::Duration;

use futureflow::config::{config, create_runtime};
use futureflow::{ApplyFailure, ComputationFailure, DelegateRuntime, ExecutionContext, ExecutionEventKind,
                 MapBasedFutureDelegate, MappedFutureDelegate, TaskInvoker, UnitOutcome, ValidationFailure,
                 VariableMap, VariableSnapshot};
use serde_json::json;
use uuid::Uuid;

/// Cotización: extrae cantidad y precio, calcula el total en un worker y lo
/// guarda en `total`.
struct QuoteDelegate;

#[derive(Debug)]
struct QuoteInput {
    quantity: i64,
    unit_price: i64,
}

impl MappedFutureDelegate for QuoteDelegate {
    type Input = QuoteInput;
    type Output = i64;

    fn extract_input(&self, ctx: &ExecutionContext) -> Result<QuoteInput, ValidationFailure> {
        Ok(QuoteInput { quantity: ctx.variable("quantity")?,
                        unit_price: ctx.variable("unit_price")? })
    }

    fn compute(input: QuoteInput) -> Result<i64, ComputationFailure> {
        // simula una llamada remota lenta
        thread::sleep(Duration::from_millis(25));
        if input.unit_price == 0 {
            return Err(ComputationFailure::failed("divide by zero"));
        }
        input.quantity
             .checked_mul(input.unit_price)
             .ok_or_else(|| ComputationFailure::failed("overflow"))
    }

    fn apply_output(&self, ctx: &mut ExecutionContext, output: i64) -> Result<(), ApplyFailure> {
        ctx.set_variable("total", output)?;
        Ok(())
    }
}

/// Cuenta variables y deja el resultado en `variable_count`.
struct AuditDelegate;

impl MapBasedFutureDelegate for AuditDelegate {
    fn compute(input: VariableSnapshot) -> Result<VariableMap, ComputationFailure> {
        let mut out = VariableMap::new();
        out.insert("variable_count".into(), json!(input.variables().len()));
        out.insert("audited_activity".into(), json!(input.activity_id()));
        Ok(out)
    }
}

fn quote_ctx(quantity: Option<i64>, unit_price: i64) -> ExecutionContext {
    let ctx = ExecutionContext::new(Uuid::new_v4(), "quote").with_variable("unit_price", json!(unit_price));
    match quantity {
        Some(q) => ctx.with_variable("quantity", json!(q)),
        None => ctx,
    }
}

fn report(label: &str, rt: &DelegateRuntime, outcome: &UnitOutcome) {
    let trail: Vec<String> = rt.list_events_for(outcome.execution_id)
                               .iter()
                               .map(|e| match &e.kind {
                                   ExecutionEventKind::ExecutionStarted { attempt, .. } => format!("started#{attempt}"),
                                   ExecutionEventKind::ComputationSubmitted { task_id } => format!("submitted(task-{task_id})"),
                                   ExecutionEventKind::OutputApplied => "applied".to_string(),
                                   ExecutionEventKind::ExecutionFailed { kind, .. } => format!("failed({kind:?})"),
                                   ExecutionEventKind::RetryScheduled { attempt, delay_ms } => {
                                       format!("retry#{attempt}+{delay_ms}ms")
                                   }
                               })
                               .collect();
    match &outcome.result {
        Ok(()) => println!("[{label}] ok total={:?} events={trail:?}", outcome.context.raw_variable("total")),
        Err(e) => println!("[{label}] {e} events={trail:?}"),
    }
}

fn main() {
    let cfg = match config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("[futureflow] {e}");
            std::process::exit(2);
        }
    };
    println!("futureflow demo: workers={} capacity={} retry={:?}",
             cfg.invoker.worker_threads,
             cfg.invoker.capacity(),
             cfg.retry);

    let mut rt = match create_runtime() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("[futureflow] runtime error: {e}");
            std::process::exit(2);
        }
    };

    let quote = Rc::new(QuoteDelegate);
    let happy = rt.schedule(Rc::clone(&quote), quote_ctx(Some(7), 2));
    let invalid = rt.schedule(Rc::clone(&quote), quote_ctx(None, 2));
    let failing = rt.schedule(Rc::clone(&quote), quote_ctx(Some(3), 0));
    let audit = rt.schedule(Rc::new(AuditDelegate), quote_ctx(Some(1), 1));

    let outcomes = rt.run_until_idle();
    for outcome in &outcomes {
        let label = match outcome.execution_id {
            id if id == happy => "A happy",
            id if id == invalid => "B validation",
            id if id == failing => "C computation",
            id if id == audit => "audit",
            _ => "?",
        };
        report(label, &rt, outcome);
    }
    if let Some(audited) = outcomes.iter().find(|o| o.execution_id == audit) {
        println!("[audit] variable_count={:?}", audited.context.raw_variable("variable_count"));
    }

    // D: el invoker ya no acepta trabajo
    rt.invoker().shutdown();
    let rejected = rt.execute(quote, quote_ctx(Some(1), 1));
    report("D rejected", &rt, &rejected);
}
