//! Builtin tools registered into every kernel unless disabled.

mod alias;
mod cat;
mod echo;
mod env;
mod export;
mod true_false;
mod unset;

use super::ToolRegistry;

/// Register all builtin tools.
pub fn register_builtins(registry: &mut ToolRegistry) {
    registry.register(alias::Alias);
    registry.register(cat::Cat);
    registry.register(echo::Echo);
    registry.register(env::Env);
    registry.register(export::Export);
    registry.register(true_false::True);
    registry.register(true_false::False);
    registry.register(unset::Unset);
}
