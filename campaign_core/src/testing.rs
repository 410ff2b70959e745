//! Headless campaign sandbox shared by the dispatcher and mission tests.

use galaxy_rules::{Battle, EntityId, Planet, PlanetId, Player, PlayerId, Position, WorldState};

use crate::campaign::{Campaign, CampaignSave};
use crate::config::ScriptConfig;
use crate::data::{CampaignData, TextCatalog};
use crate::environment::{Host, ScriptedPresentation};
use crate::events::WorldEvent;
use crate::mission::{Continuation, Mission};
use crate::missions::story_missions;

pub const PLAYER: &str = "Empire";

/// A small galaxy with every faction and planet the story refers to.
pub fn story_world() -> WorldState {
    let mut world = WorldState::new();
    let empire = world.add_player(Player::new(PLAYER, "human", false));
    for (id, race) in [
        ("Traders", "human"),
        ("Pirates", "human"),
        ("Garthog", "garthog"),
        ("Dargslan", "dargslan"),
    ] {
        world.add_player(Player::new(id, race, true));
    }
    world.add_planet(Planet::new("Earth", Some(empire.clone()), Position::new(100.0, 100.0)));
    world.add_planet(Planet::new("Achilles", None, Position::new(400.0, 300.0)));
    world.add_planet(Planet::new(
        "Naxos",
        Some(PlayerId::from("Traders")),
        Position::new(700.0, 200.0),
    ));
    world.add_planet(Planet::new("San Sterling", Some(empire.clone()), Position::new(300.0, 600.0)));
    world.add_planet(Planet::new(
        "Dargslan",
        Some(PlayerId::from("Dargslan")),
        Position::new(1500.0, 1500.0),
    ));
    let home = world.create_fleet(&empire, "Home Guard", Position::new(100.0, 100.0));
    if let Some(fleet) = world.get_fleet_mut(home) {
        fleet.add_item("Fighter1", 5);
    }
    world
}

pub struct Sandbox {
    pub campaign: Campaign,
    pub world: WorldState,
    pub presentation: ScriptedPresentation,
    pub text: TextCatalog,
}

impl Sandbox {
    /// The story campaign in [`story_world`].
    pub fn new() -> Self {
        Self::with_missions(story_missions(PlayerId::from(PLAYER)))
    }

    pub fn with_missions(missions: Vec<Box<dyn Mission>>) -> Self {
        let data = CampaignData::builtin().unwrap();
        let text = data.text_catalog();
        Self {
            campaign: Campaign::new(data, ScriptConfig::default(), missions),
            world: story_world(),
            presentation: ScriptedPresentation::new(),
            text,
        }
    }

    pub fn player(&self) -> PlayerId {
        PlayerId::from(PLAYER)
    }

    pub fn home_fleet(&self) -> EntityId {
        self.world
            .fleets
            .values()
            .find(|f| f.name == "Home Guard")
            .map(|f| f.id)
            .unwrap()
    }

    pub fn stage(&self, mission: &str) -> String {
        self.campaign.mission(mission).unwrap().stage_name()
    }

    pub fn tick(&mut self) {
        let mut host = Host::new(&mut self.world, &mut self.presentation, &self.text);
        self.campaign.tick(&mut host);
    }

    /// Move the game clock forward, then tick once.
    pub fn advance_hours(&mut self, hours: u64) {
        self.world.advance_hours(hours);
        self.tick();
    }

    /// Let real time pass, then tick once.
    pub fn advance_ms(&mut self, millis: u64) {
        self.campaign.advance_timeouts(millis);
        self.tick();
    }

    pub fn dispatch(&mut self, event: WorldEvent) {
        let mut host = Host::new(&mut self.world, &mut self.presentation, &self.text);
        self.campaign.dispatch(&mut host, &event);
    }

    pub fn resume(&mut self, continuation: Continuation) -> bool {
        let mut host = Host::new(&mut self.world, &mut self.presentation, &self.text);
        self.campaign.resume(&mut host, continuation)
    }

    /// Finish every cut-scene and message, including ones queued meanwhile.
    pub fn complete_playback(&mut self) {
        while let Some(continuation) = self.presentation.complete_next() {
            self.resume(continuation);
        }
    }

    pub fn spacewar(&mut self, battle: &mut Battle) {
        let mut host = Host::new(&mut self.world, &mut self.presentation, &self.text);
        self.campaign.spacewar_start(&mut host, battle);
    }

    pub fn spacewar_done(&mut self, battle: &Battle) {
        let mut host = Host::new(&mut self.world, &mut self.presentation, &self.text);
        self.campaign.spacewar_finish(&mut host, battle);
    }

    pub fn autobattle(&mut self, battle: &mut Battle) {
        let mut host = Host::new(&mut self.world, &mut self.presentation, &self.text);
        self.campaign.autobattle_start(&mut host, battle);
    }

    pub fn autobattle_done(&mut self, battle: &Battle) {
        let mut host = Host::new(&mut self.world, &mut self.presentation, &self.text);
        self.campaign.autobattle_finish(&mut host, battle);
    }

    pub fn load(&mut self, save: &CampaignSave) -> usize {
        let mut host = Host::new(&mut self.world, &mut self.presentation, &self.text);
        self.campaign.load(&mut host, save)
    }

    /// Save, then load into a fresh campaign over a copy of the world, as a
    /// reload after restarting the game would.
    pub fn reloaded(&self) -> Sandbox {
        let json = self.campaign.save().unwrap().to_json().unwrap();
        let mut fresh = Sandbox::new();
        fresh.world = self.world.clone();
        fresh.load(&CampaignSave::from_json(&json).unwrap());
        fresh
    }

    /// Destroy every ship in a fleet, as a lost battle would.
    pub fn destroy_fleet(&mut self, fleet: EntityId) {
        if let Some(fleet) = self.world.get_fleet_mut(fleet) {
            for item in fleet.inventory.iter_mut() {
                item.hp = 0;
            }
        }
    }

    pub fn fleet_named(&self, name: &str) -> Option<EntityId> {
        self.world
            .fleets
            .values()
            .find(|f| f.name == name)
            .map(|f| f.id)
    }

    pub fn planet(&self, id: &str) -> &Planet {
        self.world.get_planet(&PlanetId::from(id)).unwrap()
    }
}
