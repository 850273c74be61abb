//! Evaluation gateway backed by `fend-core`.
//!
//! One calculator context lives for the whole session. Submitted input is
//! evaluated against it, so variable bindings persist; previews evaluate
//! against a throwaway clone. fend is synchronous, so every call runs on the
//! blocking pool with an interrupt that trips once the time budget is spent.
//!
//! Random functions draw from `rand`. Currency units work once exchange rates
//! have been installed, see [`FendGateway::setup_exchange_rates`].

mod completion;
pub mod exchange;

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tally_engine::{CompletionFut, EvalFut, EvalOutcome, EvaluationGateway};

pub use completion::CompletionIndex;
pub use exchange::ExchangeRates;

/// Stops a fend evaluation after a fixed budget.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutInterrupt {
    deadline: Instant,
}

impl TimeoutInterrupt {
    #[must_use]
    pub fn new(budget: Duration) -> Self {
        Self {
            deadline: Instant::now() + budget,
        }
    }
}

impl fend_core::Interrupt for TimeoutInterrupt {
    fn should_interrupt(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

/// Context seeded with the local clock and a random source.
fn new_context() -> fend_core::Context {
    let mut context = fend_core::Context::new();
    let now = chrono::Local::now();
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
    context.set_current_time_v1(millis, i64::from(now.offset().local_minus_utc()));
    context.set_random_u32_fn(rand::random::<u32>);
    context
}

fn run(input: &str, context: &mut fend_core::Context, budget: Duration) -> EvalOutcome {
    let interrupt = TimeoutInterrupt::new(budget);
    fend_core::evaluate_with_interrupt(input, context, &interrupt).map(|result| {
        if result.is_unit_type() {
            String::new()
        } else {
            result.get_main_result().to_string()
        }
    })
}

#[derive(Clone)]
pub struct FendGateway {
    context: Arc<Mutex<fend_core::Context>>,
    names: Arc<Mutex<CompletionIndex>>,
}

impl std::fmt::Debug for FendGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FendGateway").finish_non_exhaustive()
    }
}

impl Default for FendGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl FendGateway {
    #[must_use]
    pub fn new() -> Self {
        Self {
            context: Arc::new(Mutex::new(new_context())),
            names: Arc::new(Mutex::new(CompletionIndex::default())),
        }
    }

    /// Let currency units convert with `rates`.
    ///
    /// Previews pick the rates up too, since they clone the shared context.
    pub fn install_exchange_rates(&self, rates: ExchangeRates) {
        let mut context = self.context.lock().unwrap_or_else(PoisonError::into_inner);
        context.set_exchange_rate_handler_v1(move |currency: &str| {
            rates
                .rate(currency)
                .map_err(|err| Box::new(err) as Box<dyn std::error::Error + Send + Sync>)
        });
    }

    /// Load today's rates (cache first, then network) and install them.
    ///
    /// Returns whether rates were installed. Failures are logged only.
    pub async fn setup_exchange_rates(&self, cache_dir: Option<std::path::PathBuf>) -> bool {
        match exchange::load_rates(cache_dir).await {
            Some(rates) => {
                self.install_exchange_rates(rates);
                true
            }
            None => false,
        }
    }

    fn blocking(task: impl FnOnce() -> EvalOutcome + Send + 'static) -> EvalFut {
        Box::pin(async move {
            match tokio::task::spawn_blocking(task).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::error!("Evaluation task failed: {err}");
                    Err(format!("evaluation failed: {err}"))
                }
            }
        })
    }
}

impl EvaluationGateway for FendGateway {
    fn evaluate(&self, input: String, timeout: Duration) -> EvalFut {
        let context = Arc::clone(&self.context);
        let names = Arc::clone(&self.names);
        Self::blocking(move || {
            let outcome = {
                let mut context = context.lock().unwrap_or_else(PoisonError::into_inner);
                run(&input, &mut context, timeout)
            };
            if outcome.is_ok() {
                names
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .learn_assignment(&input);
            }
            outcome
        })
    }

    fn preview(&self, input: String, timeout: Duration) -> EvalFut {
        let context = Arc::clone(&self.context);
        Self::blocking(move || {
            let mut scratch = context
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            run(&input, &mut scratch, timeout)
        })
    }

    fn complete(&self, input: String) -> CompletionFut {
        let suggestion = self
            .names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .complete(&input);
        Box::pin(async move { suggestion })
    }
}
