//! The hook contract every application implements.

use eyre::Result;
use serde::{Deserialize, Serialize};

use crate::domain::{LoopSignal, RunParameters};

/// Name and traceback-echo flag of an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppIdentity {
    /// Used as the error log basename and in status messages
    pub name: String,
    /// Echo fault text to the console as well as the log
    pub print_traceback: bool,
}

impl AppIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            print_traceback: false,
        }
    }

    pub fn with_traceback(mut self, print_traceback: bool) -> Self {
        self.print_traceback = print_traceback;
        self
    }
}

/// Read-only view handed to every hook of one run.
///
/// The same context (and so the same parameters) is seen by every hook.
#[derive(Debug, Clone)]
pub struct RunContext {
    identity: AppIdentity,
    params: RunParameters,
}

impl RunContext {
    pub(crate) fn new(identity: AppIdentity, params: RunParameters) -> Self {
        Self { identity, params }
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn print_traceback(&self) -> bool {
        self.identity.print_traceback
    }

    pub fn identity(&self) -> &AppIdentity {
        &self.identity
    }

    /// The parameters the run was started with
    pub fn params(&self) -> &RunParameters {
        &self.params
    }
}

/// A supervised application.
///
/// Only [`Application::work`] is required. Lifecycle hooks default to no-ops and
/// return `eyre::Result<()>`: any `Err` (or panic) is a fault. They cannot emit
/// loop signals; only the work hook can.
pub trait Application {
    /// Name and traceback flag, usually the identity the factory was given
    fn identity(&self) -> &AppIdentity;

    /// Runs once before the first iteration.
    fn on_start(&mut self, _ctx: &RunContext) -> Result<()> {
        Ok(())
    }

    /// One unit of work. Must not assume it is the first or last call.
    fn work(&mut self, ctx: &RunContext) -> Result<LoopSignal>;

    /// Runs once after the work hook returns `Terminate`.
    fn on_finish(&mut self, _ctx: &RunContext) -> Result<()> {
        Ok(())
    }

    /// Runs once with the fault that ended the run.
    fn on_error(&mut self, _ctx: &RunContext, _fault: &eyre::Report) -> Result<()> {
        Ok(())
    }

    /// Runs once after an external interrupt.
    fn on_interrupt(&mut self, _ctx: &RunContext) -> Result<()> {
        Ok(())
    }
}

impl<A: Application + ?Sized> Application for Box<A> {
    fn identity(&self) -> &AppIdentity {
        (**self).identity()
    }

    fn on_start(&mut self, ctx: &RunContext) -> Result<()> {
        (**self).on_start(ctx)
    }

    fn work(&mut self, ctx: &RunContext) -> Result<LoopSignal> {
        (**self).work(ctx)
    }

    fn on_finish(&mut self, ctx: &RunContext) -> Result<()> {
        (**self).on_finish(ctx)
    }

    fn on_error(&mut self, ctx: &RunContext, fault: &eyre::Report) -> Result<()> {
        (**self).on_error(ctx, fault)
    }

    fn on_interrupt(&mut self, ctx: &RunContext) -> Result<()> {
        (**self).on_interrupt(ctx)
    }
}

impl<A: Application + ?Sized> Application for &mut A {
    fn identity(&self) -> &AppIdentity {
        (**self).identity()
    }

    fn on_start(&mut self, ctx: &RunContext) -> Result<()> {
        (**self).on_start(ctx)
    }

    fn work(&mut self, ctx: &RunContext) -> Result<LoopSignal> {
        (**self).work(ctx)
    }

    fn on_finish(&mut self, ctx: &RunContext) -> Result<()> {
        (**self).on_finish(ctx)
    }

    fn on_error(&mut self, ctx: &RunContext, fault: &eyre::Report) -> Result<()> {
        (**self).on_error(ctx, fault)
    }

    fn on_interrupt(&mut self, ctx: &RunContext) -> Result<()> {
        (**self).on_interrupt(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Minimal {
        identity: AppIdentity,
    }

    impl Application for Minimal {
        fn identity(&self) -> &AppIdentity {
            &self.identity
        }

        fn work(&mut self, _ctx: &RunContext) -> Result<LoopSignal> {
            Ok(LoopSignal::terminate(0))
        }
    }

    #[test]
    fn test_identity_builder() {
        let identity = AppIdentity::new("svc").with_traceback(true);
        assert_eq!(identity.name, "svc");
        assert!(identity.print_traceback);
        assert!(!AppIdentity::new("svc").print_traceback);
    }

    #[test]
    fn test_context_accessors() {
        let params: RunParameters = [("level", json!(1))].into_iter().collect();
        let ctx = RunContext::new(AppIdentity::new("svc").with_traceback(true), params);
        assert_eq!(ctx.name(), "svc");
        assert!(ctx.print_traceback());
        assert_eq!(ctx.params().get("level"), Some(&json!(1)));
    }

    #[test]
    fn test_default_hooks_are_noops() {
        let mut app = Minimal {
            identity: AppIdentity::new("minimal"),
        };
        let ctx = RunContext::new(app.identity().clone(), RunParameters::new());
        assert!(app.on_start(&ctx).is_ok());
        assert!(app.on_finish(&ctx).is_ok());
        assert!(app.on_error(&ctx, &eyre::eyre!("boom")).is_ok());
        assert!(app.on_interrupt(&ctx).is_ok());
        assert_eq!(app.work(&ctx).unwrap(), LoopSignal::terminate(0));
    }

    #[test]
    fn test_boxed_application_forwards() {
        let mut app: Box<dyn Application> = Box::new(Minimal {
            identity: AppIdentity::new("boxed"),
        });
        let ctx = RunContext::new(app.identity().clone(), RunParameters::new());
        assert_eq!(app.identity().name, "boxed");
        assert_eq!(app.work(&ctx).unwrap(), LoopSignal::terminate(0));
    }
}
