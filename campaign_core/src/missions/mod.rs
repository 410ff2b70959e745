//! The story missions of the built-in campaign.
//!
//! Level 1 is a patrol, a convoy escort and the promotion that ends the
//! level. Level 2 brings a defecting squadron, a siege, an outbreak and first
//! contact with the Dargslan, whose completion wins the campaign.

mod defector;
mod envoy;
mod epidemic;
mod first_patrol;
mod merchant_escort;
mod promotion;
mod siege;

pub use defector::Defector;
pub use envoy::Envoy;
pub use epidemic::Epidemic;
pub use first_patrol::FirstPatrol;
pub use merchant_escort::MerchantEscort;
pub use promotion::Promotion;
pub use siege::Siege;

use galaxy_rules::{EntityId, PlayerId};

use crate::mission::{Mission, MissionCtx};

/// Neutral merchants the player escorts.
pub const TRADERS: &str = "Traders";
pub const PIRATES: &str = "Pirates";
/// The invading race of level 2.
pub const GARTHOG: &str = "Garthog";
pub const DARGSLAN: &str = "Dargslan";

/// Every story mission, in dispatch order.
pub fn story_missions(player: PlayerId) -> Vec<Box<dyn Mission>> {
    vec![
        Box::new(FirstPatrol::new(player.clone())),
        Box::new(MerchantEscort::new(player.clone())),
        Box::new(Promotion::new(player.clone())),
        Box::new(Defector::new(player.clone())),
        Box::new(Siege::new(player.clone())),
        Box::new(Epidemic::new(player.clone())),
        Box::new(Envoy::new(player)),
    ]
}

/// Whether `fleet` belongs to the scripted player.
pub(crate) fn is_player_fleet(ctx: &MissionCtx<'_>, fleet: EntityId) -> bool {
    ctx.world
        .fleet(fleet)
        .map_or(false, |f| &f.owner == ctx.player())
}
