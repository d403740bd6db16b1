//! Data-driven menu scenes, one per scene id.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use otherworlds_core::input::{InputSource, Key, PointerPosition};
use otherworlds_core::scene_id::SceneId;
use otherworlds_core::snapshot::ActivityMode;
use otherworlds_navigation::TransitionRecord;
use otherworlds_scene::{Scene, SceneError, SceneFactory, ScopedInputRegistrar};
use tracing::debug;

use crate::party::PartyState;
use crate::request::{NavigationRequest, RequestQueue};
use crate::surface::TextSurface;

/// What selecting a menu entry does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Post a navigation request.
    Navigate(NavigationRequest),
    /// Add a new member to the party.
    Recruit,
    /// Switch the party's activity, then go to `to`.
    Travel {
        /// The activity to switch to.
        mode: ActivityMode,
        /// Where to go afterwards.
        to: SceneId,
    },
}

/// One selectable line of a menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEntry {
    /// Text shown for the entry.
    pub label: &'static str,
    /// Effect of selecting it.
    pub action: MenuAction,
}

const fn goto(label: &'static str, to: SceneId) -> MenuEntry {
    MenuEntry {
        label,
        action: MenuAction::Navigate(NavigationRequest::Goto(to)),
    }
}

const fn back(label: &'static str) -> MenuEntry {
    MenuEntry {
        label,
        action: MenuAction::Navigate(NavigationRequest::Back),
    }
}

const fn travel(label: &'static str, mode: ActivityMode, to: SceneId) -> MenuEntry {
    MenuEntry {
        label,
        action: MenuAction::Travel { mode, to },
    }
}

/// Title and entries of the menu shown for `id`.
#[must_use]
pub fn menu_for(id: SceneId) -> (&'static str, Vec<MenuEntry>) {
    match id {
        SceneId::Title => ("Otherworlds", vec![goto("New game", SceneId::Hub)]),
        SceneId::Hub => (
            "Town Square",
            vec![
                goto("Create character", SceneId::CharacterCreation),
                goto("Party roster", SceneId::PartyRoster),
                goto("Training grounds", SceneId::Training),
                goto("Shop", SceneId::Shop),
                goto("Temple", SceneId::Temple),
                goto("Inn", SceneId::Inn),
                goto("Expedition staging", SceneId::ExpeditionStaging),
                MenuEntry {
                    label: "Return to title",
                    action: MenuAction::Navigate(NavigationRequest::Restart),
                },
            ],
        ),
        SceneId::CharacterCreation => (
            "Character Creation",
            vec![
                MenuEntry {
                    label: "Recruit adventurer",
                    action: MenuAction::Recruit,
                },
                back("Done"),
            ],
        ),
        SceneId::PartyRoster => ("Party Roster", vec![back("Back")]),
        SceneId::Training => ("Training Grounds", vec![back("Leave")]),
        SceneId::Shop => ("Shop", vec![back("Leave")]),
        SceneId::Temple => ("Temple", vec![back("Leave")]),
        SceneId::Inn => ("Inn", vec![back("Leave")]),
        SceneId::ExpeditionStaging => (
            "Expedition Staging",
            vec![
                travel("Embark", ActivityMode::Expedition, SceneId::Dungeon),
                goto("Back to town", SceneId::Hub),
            ],
        ),
        SceneId::Dungeon => (
            "Dungeon",
            vec![
                travel("Explore", ActivityMode::Encounter, SceneId::Encounter),
                travel("Return to town", ActivityMode::Safe, SceneId::Hub),
            ],
        ),
        SceneId::Encounter => (
            "Encounter",
            vec![travel("Flee", ActivityMode::Expedition, SceneId::Dungeon)],
        ),
    }
}

#[derive(Debug, Clone, Copy)]
enum MenuInput {
    Key(Key),
    Click(PointerPosition),
}

/// A scene rendered as a cursor-driven list of entries.
///
/// Input handlers only queue events; they are applied in `update`.
pub struct MenuScene {
    id: SceneId,
    title: &'static str,
    entries: Vec<MenuEntry>,
    cursor: usize,
    arrived_from: Option<SceneId>,
    inbox: Rc<RefCell<VecDeque<MenuInput>>>,
    registrar: ScopedInputRegistrar,
    party: Rc<PartyState>,
    requests: RequestQueue,
}

impl MenuScene {
    /// Builds the menu for `id`.
    #[must_use]
    pub fn new(
        id: SceneId,
        input: Rc<dyn InputSource>,
        party: Rc<PartyState>,
        requests: RequestQueue,
    ) -> Self {
        let (title, entries) = menu_for(id);
        Self {
            id,
            title,
            entries,
            cursor: 0,
            arrived_from: None,
            inbox: Rc::default(),
            registrar: ScopedInputRegistrar::new(input),
            party,
            requests,
        }
    }

    /// Index of the highlighted entry.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn handle(&mut self, input: MenuInput) {
        match input {
            MenuInput::Key(Key::Up) => {
                self.cursor = self.cursor.checked_sub(1).unwrap_or(self.entries.len() - 1);
            }
            MenuInput::Key(Key::Down) => {
                self.cursor = (self.cursor + 1) % self.entries.len();
            }
            MenuInput::Key(Key::Enter) => self.activate(self.cursor),
            MenuInput::Key(Key::Escape) => self.requests.post(NavigationRequest::Back),
            MenuInput::Key(Key::Char(c)) => {
                if let Some(index) = c
                    .to_digit(10)
                    .and_then(|digit| usize::try_from(digit).ok())
                    .and_then(|digit| digit.checked_sub(1))
                    .filter(|index| *index < self.entries.len())
                {
                    self.cursor = index;
                    self.activate(index);
                }
            }
            MenuInput::Key(Key::Backspace) => {}
            MenuInput::Click(at) => {
                if let Some(index) = self.entry_at(at) {
                    self.cursor = index;
                    self.activate(index);
                }
            }
        }
    }

    fn activate(&mut self, index: usize) {
        let Some(entry) = self.entries.get(index).copied() else {
            return;
        };
        debug!(scene = %self.id, entry = entry.label, "menu entry selected");
        match entry.action {
            MenuAction::Navigate(request) => self.requests.post(request),
            MenuAction::Recruit => {
                let next = self.party.len() + 1;
                self.party.recruit(format!("Adventurer {next}"));
            }
            MenuAction::Travel { mode, to } => {
                self.party.set_mode(mode);
                self.requests.post(NavigationRequest::Goto(to));
            }
        }
    }

    /// Line 0 is the title; entry `i` is drawn on line `i + 1`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn entry_at(&self, at: PointerPosition) -> Option<usize> {
        if !at.y.is_finite() || at.y < 1.0 {
            return None;
        }
        let index = at.y as usize - 1;
        (index < self.entries.len()).then_some(index)
    }
}

#[async_trait(?Send)]
impl Scene<TextSurface> for MenuScene {
    fn scene_id(&self) -> SceneId {
        self.id
    }

    async fn init(&mut self, _surface: &TextSurface) -> Result<(), SceneError> {
        if self.entries.is_empty() {
            return Err(SceneError::Other(format!("{} has no menu entries", self.id)));
        }
        let keys = Rc::clone(&self.inbox);
        self.registrar
            .on_key_press(move |key| keys.borrow_mut().push_back(MenuInput::Key(key)));
        let clicks = Rc::clone(&self.inbox);
        self.registrar
            .on_pointer_click(move |at| clicks.borrow_mut().push_back(MenuInput::Click(at)));
        Ok(())
    }

    fn enter(&mut self, record: Option<&TransitionRecord>) {
        self.arrived_from = record.map(|record| record.from_scene);
    }

    fn exit(&mut self) {
        self.inbox.borrow_mut().clear();
    }

    fn update(&mut self, _delta_ms: f64) {
        let pending: Vec<MenuInput> = self.inbox.borrow_mut().drain(..).collect();
        if self.entries.is_empty() {
            return;
        }
        for input in pending {
            self.handle(input);
        }
    }

    fn render(&mut self, surface: &TextSurface) {
        surface.draw(format!("== {} ==", self.title));
        for (index, entry) in self.entries.iter().enumerate() {
            let marker = if index == self.cursor { '>' } else { ' ' };
            surface.draw(format!("{marker} {}", entry.label));
        }
        surface.draw(format!(
            "party: {} ({:?})",
            self.party.len(),
            self.party.mode()
        ));
        if let Some(from) = self.arrived_from {
            surface.draw(format!("arrived from {from}"));
        }
    }

    fn destroy(&mut self) {
        self.registrar.destroy();
    }
}

/// Builds a fresh [`MenuScene`] for every bind.
#[derive(Clone)]
pub struct MenuFactory {
    input: Rc<dyn InputSource>,
    party: Rc<PartyState>,
    requests: RequestQueue,
}

impl MenuFactory {
    /// Creates a factory whose scenes subscribe through `input`.
    #[must_use]
    pub fn new(input: Rc<dyn InputSource>, party: Rc<PartyState>, requests: RequestQueue) -> Self {
        Self {
            input,
            party,
            requests,
        }
    }
}

impl SceneFactory<TextSurface> for MenuFactory {
    fn create(&self, id: SceneId) -> Box<dyn Scene<TextSurface>> {
        Box::new(MenuScene::new(
            id,
            Rc::clone(&self.input),
            Rc::clone(&self.party),
            self.requests.clone(),
        ))
    }
}
