use std::collections::HashMap;

use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::action::Action;
use crate::cli::Args;
use crate::components::footer_component::FooterComponent;
use crate::components::header_component::HeaderComponent;
use crate::components::help_component::HelpComponent;
use crate::components::overlay::OverlayComponent;
use crate::components::results_component::ResultsComponent;
use crate::components::schedule_query_component::ScheduleQueryComponent;
use crate::components::search_component::SearchComponent;
use crate::components::sql_viewer_component::SqlViewerComponent;
use crate::components::{Component, ComponentId};
use crate::config::Config;

/// Lays out the screen and routes events: overlay first, then the focused popup or input,
/// then the global keys, then the grid.
pub struct RootComponent {
    components: HashMap<ComponentId, Box<dyn Component>>,
    /// component receiving key events instead of the grid
    focused: Option<ComponentId>,
    overlay: Option<OverlayComponent>,
    action_tx: Option<UnboundedSender<Action>>,
}

impl RootComponent {
    pub fn new(config: &Config, args: &Args) -> Self {
        let components: Vec<Box<dyn Component>> = vec![
            Box::new(HeaderComponent::new(args.title.as_str())),
            Box::new(FooterComponent::default()),
            Box::new(SearchComponent::default()),
            Box::new(ResultsComponent::new(config.filter_mode, config.show_sql_tooltip.clone())),
            Box::new(HelpComponent::default()),
            Box::new(SqlViewerComponent::new(args.title.as_str())),
            Box::new(ScheduleQueryComponent::new(
                config.scheduled_queries.clone(),
                args.label.clone(),
            )),
        ];
        let components = components.into_iter().map(|c| (c.id(), c)).collect();
        Self { components, focused: None, overlay: None, action_tx: None }
    }

    fn get(&mut self, id: ComponentId) -> Result<&mut Box<dyn Component>> {
        self.components.get_mut(&id).with_context(|| format!("unknown component {id:?}"))
    }

    fn is_popup(id: ComponentId) -> bool {
        matches!(id, ComponentId::Help | ComponentId::SqlViewer | ComponentId::ScheduleQuery)
    }

    fn send(&self, action: Action) -> Result<()> {
        if let Some(tx) = &self.action_tx {
            tx.send(action)?;
        }
        Ok(())
    }

    /// Sends the key hints of the component now receiving keys to the footer.
    fn send_shortcuts(&mut self) -> Result<()> {
        let id = self.focused.unwrap_or(ComponentId::Results);
        let shortcuts = self.get(id)?.shortcuts();
        self.send(Action::Shortcuts(shortcuts))
    }
}

impl Component for RootComponent {
    fn id(&self) -> ComponentId {
        ComponentId::Root
    }

    fn init(&mut self) -> Result<()> {
        for component in self.components.values_mut() {
            component.init()?;
        }
        self.send_shortcuts()
    }

    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        for component in self.components.values_mut() {
            component.register_action_handler(tx.clone())?;
        }
        self.action_tx = Some(tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let Some(overlay) = &self.overlay {
            if overlay.should_close_on_key(key) {
                self.overlay = None;
            }
            return Ok(None);
        }
        if let Some(focused) = self.focused {
            return self.get(focused)?.handle_key_event(key);
        }

        match key.code {
            KeyCode::Char('q') => return Ok(Some(Action::Quit)),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(Some(Action::Quit));
            }
            KeyCode::Char('z') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(Some(Action::Suspend));
            }
            KeyCode::Char('?') => return Ok(Some(Action::Help)),
            _ => {}
        }
        debug!("Try handling key event: key={:?}", key);
        self.get(ComponentId::Results)?.handle_key_event(key)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if self.overlay.is_some() || self.focused.is_some_and(Self::is_popup) {
            return Ok(None);
        }
        self.get(ComponentId::Results)?.handle_mouse_event(mouse)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Help => {
                self.focused = Some(ComponentId::Help);
                self.send_shortcuts()?;
            }
            Action::Focus(id) => {
                self.focused = Some(id);
                self.send_shortcuts()?;
            }
            Action::Unfocus => {
                self.focused = None;
                self.send_shortcuts()?;
            }
            Action::Error(ref error) => {
                self.overlay = Some(error.clone().into());
            }
            _ => {}
        }
        // propagate action to all components, follow-ups go back on the bus
        for component in self.components.values_mut() {
            if let Some(follow_up) = component.update(action.clone())?
                && let Some(tx) = &self.action_tx
            {
                tx.send(follow_up)?;
            }
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let [header, search, results, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(area);

        self.get(ComponentId::Header)?.draw(frame, header)?;
        self.get(ComponentId::Search)?.draw(frame, search)?;
        self.get(ComponentId::Results)?.draw(frame, results)?;
        self.get(ComponentId::Footer)?.draw(frame, footer)?;
        if let Some(popup) = self.focused.filter(|id| Self::is_popup(*id)) {
            let popup_area = if popup == ComponentId::Help { area } else { results };
            self.get(popup)?.draw(frame, popup_area)?;
        }
        if let Some(overlay) = &self.overlay {
            overlay.draw(frame, area)?;
        }
        Ok(())
    }
}
