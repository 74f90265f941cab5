use std::fmt;
use std::sync::Arc;

use anyhow::Context;

use crate::module::{InitCtx, Module};

/// Core modules run in this order; the HTTP server starts after all of them.
const CORE_MODULE_ORDER: &[&str] = &["sheets"];

#[derive(Debug, Clone, Copy)]
enum Phase {
    Init,
    Start,
    Stop,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Init => "init",
            Phase::Start => "start",
            Phase::Stop => "stop",
        })
    }
}

/// Owns every module and drives their lifecycle.
///
/// Core modules (infrastructure such as the store connection) go first on the
/// way up and last on the way down. Custom modules keep registration order.
pub struct ModuleRegistry {
    core_modules: Vec<Arc<dyn Module>>,
    custom_modules: Vec<Arc<dyn Module>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            core_modules: Vec::new(),
            custom_modules: Vec::new(),
        }
    }

    pub fn register_core(&mut self, module: Arc<dyn Module>) {
        self.core_modules.push(module);
    }

    pub fn register_custom(&mut self, module: Arc<dyn Module>) {
        self.custom_modules.push(module);
    }

    /// Core modules in registration order, then custom modules.
    pub fn modules(&self) -> Vec<&Arc<dyn Module>> {
        self.core_modules
            .iter()
            .chain(self.custom_modules.iter())
            .collect()
    }

    pub fn get_module(&self, name: &str) -> Option<&Arc<dyn Module>> {
        self.core_modules
            .iter()
            .chain(self.custom_modules.iter())
            .find(|module| module.name() == name)
    }

    pub fn core_module_count(&self) -> usize {
        self.core_modules.len()
    }

    pub fn custom_module_count(&self) -> usize {
        self.custom_modules.len()
    }

    pub async fn init_all(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        run("core", self.ordered_core_modules(), Phase::Init, Some(ctx)).await?;
        run("custom", self.custom_modules.iter().collect(), Phase::Init, Some(ctx)).await
    }

    pub async fn start_all(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        run("core", self.ordered_core_modules(), Phase::Start, Some(ctx)).await?;
        run("custom", self.custom_modules.iter().collect(), Phase::Start, Some(ctx)).await
    }

    /// Custom modules first, then core, each group in reverse order.
    pub async fn stop_all(&self) -> anyhow::Result<()> {
        run("custom", self.custom_modules.iter().rev().collect(), Phase::Stop, None).await?;
        let mut core = self.ordered_core_modules();
        core.reverse();
        run("core", core, Phase::Stop, None).await
    }

    /// Known core modules in `CORE_MODULE_ORDER`, then any others in registration order.
    fn ordered_core_modules(&self) -> Vec<&Arc<dyn Module>> {
        let mut ordered: Vec<&Arc<dyn Module>> = CORE_MODULE_ORDER
            .iter()
            .filter_map(|&name| self.core_modules.iter().find(|m| m.name() == name))
            .collect();
        ordered.extend(
            self.core_modules
                .iter()
                .filter(|m| !CORE_MODULE_ORDER.contains(&m.name())),
        );
        ordered
    }
}

async fn run(
    group: &str,
    modules: Vec<&Arc<dyn Module>>,
    phase: Phase,
    ctx: Option<&InitCtx<'_>>,
) -> anyhow::Result<()> {
    tracing::info!(group, %phase, count = modules.len(), "running module phase");

    for module in modules {
        tracing::info!(module = module.name(), group, %phase, "module phase");
        let outcome = match (phase, ctx) {
            (Phase::Init, Some(ctx)) => module.init(ctx).await,
            (Phase::Start, Some(ctx)) => module.start(ctx).await,
            (Phase::Stop, _) => module.stop().await,
            (_, None) => anyhow::bail!("{} phase needs an init context", phase),
        };
        outcome.with_context(|| format!("failed to {} {} module '{}'", phase, group, module.name()))?;
    }

    Ok(())
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
