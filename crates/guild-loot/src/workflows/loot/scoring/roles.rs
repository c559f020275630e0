use super::config::GuildScoringConfig;

/// Looks up the configured modifier for a guild rank. Unknown ranks resolve to zero.
pub struct RoleModifierResolver<'a> {
    config: &'a GuildScoringConfig,
}

impl<'a> RoleModifierResolver<'a> {
    pub fn new(config: &'a GuildScoringConfig) -> Self {
        Self { config }
    }

    pub fn modifier(&self, role: &str) -> f64 {
        match self.config.role_modifiers.get(role) {
            Some(modifier) => *modifier,
            None => {
                tracing::debug!(role, "no role modifier configured; using 0");
                0.0
            }
        }
    }
}
