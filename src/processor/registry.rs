//! Module registration.
//!
//! The registry owns the store modules of one chain and keeps them in the
//! order they were added, which is also the order they are flushed in.

use super::error::ProcessorError;
use super::modules::{
    AuthModule, BankModule, DelegationsModule, IbcChannelsModule, IbcConnectionsModule,
    IbcDenomTracesModule, LiquidityPoolsModule, LiquiditySwapsModule,
};
use super::traits::Module;

/// Modules enabled when a chain does not list any.
pub const DEFAULT_MODULES: &[&str] = &[
    BankModule::NAME,
    DelegationsModule::NAME,
    AuthModule::NAME,
];

/// Ordered set of store modules, unique by name.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: Vec<Box<dyn Module>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a module. A name that is already registered is rejected and
    /// the registry is left unchanged.
    pub fn register(&mut self, module: Box<dyn Module>) -> Result<(), ProcessorError> {
        if self.modules.iter().any(|m| m.name() == module.name()) {
            return Err(ProcessorError::DuplicateModule(module.name().to_string()));
        }

        self.modules.push(module);
        Ok(())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Module>> {
        self.modules.iter_mut()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    /// Table schemas of every module, in registration order.
    pub fn migrations(&self) -> Vec<String> {
        self.modules.iter().map(|m| m.table_schema()).collect()
    }
}

/// Construct a fresh module, with an empty cache, from its name.
pub fn module_by_name(name: &str) -> Result<Box<dyn Module>, ProcessorError> {
    let module: Box<dyn Module> = match name {
        BankModule::NAME => Box::new(BankModule::new()),
        AuthModule::NAME => Box::new(AuthModule::new()),
        DelegationsModule::NAME => Box::new(DelegationsModule::new()),
        IbcConnectionsModule::NAME => Box::new(IbcConnectionsModule::new()),
        IbcChannelsModule::NAME => Box::new(IbcChannelsModule::new()),
        IbcDenomTracesModule::NAME => Box::new(IbcDenomTracesModule::new()),
        LiquidityPoolsModule::NAME => Box::new(LiquidityPoolsModule::new()),
        LiquiditySwapsModule::NAME => Box::new(LiquiditySwapsModule::new()),
        other => return Err(ProcessorError::UnknownModule(other.to_string())),
    };

    Ok(module)
}

/// Build the registry for one chain.
///
/// `enabled = None` selects [`DEFAULT_MODULES`].
pub fn build_registry(enabled: Option<&[String]>) -> Result<ModuleRegistry, ProcessorError> {
    let names: Vec<&str> = match enabled {
        Some(names) => names.iter().map(String::as_str).collect(),
        None => DEFAULT_MODULES.to_vec(),
    };

    let mut registry = ModuleRegistry::new();
    for name in names {
        registry.register(module_by_name(name)?)?;
    }

    tracing::debug!("Built module registry: {:?}", registry.names());

    Ok(registry)
}
