//! Bootstrap helper: declare an application and run it exactly once.
//!
//! ```no_run
//! use apprun::{AppIdentity, Application, Bootstrap, LoopSignal, RunContext};
//!
//! struct Hello(AppIdentity);
//!
//! impl Application for Hello {
//!     fn identity(&self) -> &AppIdentity {
//!         &self.0
//!     }
//!
//!     fn work(&mut self, _ctx: &RunContext) -> eyre::Result<LoopSignal> {
//!         println!("hello");
//!         Ok(LoopSignal::terminate(0))
//!     }
//! }
//!
//! Bootstrap::new("Hello").param("level", 1).launch(Hello);
//! ```

use log::{info, warn};
use serde_json::Value;

use crate::domain::{RunParameters, RunReport};
use crate::runtime::{AppIdentity, Application, Console, Interrupt, Runtime, RuntimeConfig};

/// Builder that constructs an application from a factory and runs it once.
#[derive(Debug, Clone)]
pub struct Bootstrap {
    identity: AppIdentity,
    params: Vec<(String, Value)>,
    config: RuntimeConfig,
}

impl Bootstrap {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            identity: AppIdentity::new(name),
            params: Vec::new(),
            config: RuntimeConfig::default(),
        }
    }

    /// Echo faults to the console as well as the error log.
    pub fn traceback(mut self, print_traceback: bool) -> Self {
        self.identity.print_traceback = print_traceback;
        self
    }

    /// Add one named run parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Add every parameter of an existing snapshot.
    pub fn params(mut self, params: &RunParameters) -> Self {
        self.params
            .extend(params.iter().map(|(k, v)| (k.to_string(), v.clone())));
        self
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn identity(&self) -> &AppIdentity {
        &self.identity
    }

    /// Construct the application, install the Ctrl-C handler and run it.
    ///
    /// Never returns: the process exits with the run's exit code.
    pub fn launch<A, F>(self, factory: F) -> !
    where
        A: Application,
        F: FnOnce(AppIdentity) -> A,
    {
        let interrupt = Interrupt::new();
        if let Err(e) = interrupt.install_ctrlc() {
            warn!("Running without Ctrl-C handling: {}", e);
        }
        let (app, params) = self.assemble(factory);
        let mut runtime = Runtime::new(self.config).with_interrupt(interrupt);
        runtime.run(app, params)
    }

    /// Construct and run the application against `console`, returning the report.
    ///
    /// Installs no process-wide handlers and does not exit.
    pub fn execute_with<A, F, C>(self, console: C, factory: F) -> RunReport
    where
        A: Application,
        F: FnOnce(AppIdentity) -> A,
        C: Console,
    {
        let (app, params) = self.assemble(factory);
        let mut runtime = Runtime::with_console(self.config, console);
        runtime.execute(app, params)
    }

    fn assemble<A, F>(&self, factory: F) -> (A, RunParameters)
    where
        F: FnOnce(AppIdentity) -> A,
    {
        info!("Bootstrapping {}", self.identity.name);
        let params = self.params.iter().cloned().collect();
        (factory(self.identity.clone()), params)
    }
}

/// Construct the application with `name` and `traceback` and run it once.
///
/// `None` parameters run with an empty snapshot.
pub fn autorun<A, F>(name: &str, traceback: bool, params: Option<RunParameters>, factory: F) -> !
where
    A: Application,
    F: FnOnce(AppIdentity) -> A,
{
    let mut bootstrap = Bootstrap::new(name).traceback(traceback);
    if let Some(params) = params {
        bootstrap = bootstrap.params(&params);
    }
    bootstrap.launch(factory)
}
