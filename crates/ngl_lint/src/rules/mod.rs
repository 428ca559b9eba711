//! All built-in lint rule implementations.
//!
//! This module re-exports all individual rule types and provides
//! `register_builtin_rules` to add all 8 rules to a `LintEngine`.

mod c101;
mod c102;
mod w103;
mod w104;
mod w105;
mod w106;
mod w107;
mod w108;

pub use c101::PreferReadonly;
pub use c102::PreferInject;
pub use w103::{DenyElement, DEFAULT_DENIED_ELEMENTS};
pub use w104::LifecycleInterface;
pub use w105::SignalUsage;
pub use w106::TemplateSignalUsage;
pub use w107::IonBooleanAttribute;
pub use w108::IonAttributeType;

use std::sync::Arc;

use ngl_config::RuleOptions;
use ngl_ionic::AttributeTypeOracle;

use crate::error::RuleSetupError;
use crate::LintEngine;

/// Registers all 8 built-in lint rules with the engine.
///
/// This adds rules C101-C102 and W103-W108. Rule options come from
/// `[lint.rules]`; the Ionic attribute rules share `oracle`.
pub fn register_builtin_rules(
    engine: &mut LintEngine,
    options: &RuleOptions,
    oracle: Arc<AttributeTypeOracle>,
) -> Result<(), RuleSetupError> {
    engine.register(Box::new(PreferReadonly::new(options.prefer_readonly)));
    engine.register(Box::new(PreferInject));
    engine.register(Box::new(DenyElement::from_options(
        options.deny_element.as_ref(),
    )?));
    engine.register(Box::new(LifecycleInterface));
    engine.register(Box::new(SignalUsage));
    engine.register(Box::new(TemplateSignalUsage));
    engine.register(Box::new(IonBooleanAttribute::new(Arc::clone(&oracle))));
    engine.register(Box::new(IonAttributeType::new(oracle)));
    Ok(())
}
