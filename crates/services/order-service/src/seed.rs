//! Default identity seeding.

use common::AppResult;
use domain::UserRole;

use crate::service::IdentityService;

/// External accounts bound on a fresh install: `(external_id, display_name, role)`
pub const DEFAULT_IDENTITIES: [(&str, &str, UserRole); 3] = [
    ("kook_admin_001", "Admin", UserRole::Admin),
    ("kook_boss_001", "Boss A", UserRole::Boss),
    ("kook_player_001", "Player A", UserRole::Player),
];

/// Outcome of a seed run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub skipped: usize,
}

/// Bind the default identities. Bindings that already exist are skipped.
pub async fn seed_identities(identities: &dyn IdentityService) -> AppResult<SeedReport> {
    let mut report = SeedReport::default();

    for (external_id, display_name, role) in DEFAULT_IDENTITIES {
        let (user, created) = identities.bind(external_id, display_name, role).await?;
        if created {
            tracing::info!(user_id = user.id, external_id, "Seeded identity");
            report.created += 1;
        } else {
            tracing::debug!(external_id, "Identity already bound");
            report.skipped += 1;
        }
    }

    Ok(report)
}
