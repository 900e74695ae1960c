use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use ratatui::prelude::Rect;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, trace, warn};

use crate::action::Action;
use crate::cli::Args;
use crate::components::Component;
use crate::components::root_component::RootComponent;
use crate::config::Config;
use crate::models::query_result::QueryResult;
use crate::models::scheduled_query::ScheduledQuery;
use crate::tui::{Event, Tui};

pub struct App {
    args: Args,
    result: Arc<QueryResult>,
    root: RootComponent,
    /// queries scheduled during the session, written out after the terminal is restored
    scheduled: Vec<ScheduledQuery>,

    should_quit: bool,
    should_suspend: bool,
    action_tx: UnboundedSender<Action>,
    action_rx: UnboundedReceiver<Action>,
}

impl App {
    pub fn new(config: Config, args: Args, result: QueryResult) -> Result<Self> {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let root = RootComponent::new(&config, &args);
        Ok(Self {
            args,
            result: Arc::new(result),
            root,
            scheduled: vec![],

            should_quit: false,
            should_suspend: false,
            action_tx,
            action_rx,
        })
    }

    /// Runs the UI until quit, returning the queries scheduled meanwhile.
    pub async fn run(mut self) -> Result<Vec<ScheduledQuery>> {
        let mut tui = Tui::new()?.tick_rate(self.args.tick_rate).frame_rate(self.args.frame_rate);
        tui.enter()?;

        self.root.register_action_handler(self.action_tx.clone())?;
        self.root.init()?;

        let action_tx = self.action_tx.clone();
        action_tx.send(Action::Loaded(Arc::clone(&self.result)))?;
        if let Some(filter) = self.args.filter.clone() {
            action_tx.send(Action::SearchInputSet(Some(filter)))?;
        }

        loop {
            self.handle_events(&mut tui).await?;
            self.handle_actions(&mut tui)?;
            if self.should_suspend {
                tui.suspend()?;
                action_tx.send(Action::Resume)?;
                action_tx.send(Action::ClearScreen)?;
                tui.enter()?;
            } else if self.should_quit {
                tui.stop()?;
                break;
            }
        }
        tui.exit()?;
        Ok(self.scheduled)
    }

    async fn handle_events(&mut self, tui: &mut Tui) -> Result<()> {
        let Some(event) = tui.next_event().await else {
            return Ok(());
        };
        trace!("handle_events: {event:?}");
        let action_tx = self.action_tx.clone();
        match event {
            Event::Tick => action_tx.send(Action::Tick)?,
            Event::Render => action_tx.send(Action::Render)?,
            Event::Resize(x, y) => action_tx.send(Action::Resize(x, y))?,
            _ => {}
        }
        if let Some(action) = self.root.handle_events(Some(event.clone()))? {
            action_tx.send(action)?;
        }
        Ok(())
    }

    fn handle_actions(&mut self, tui: &mut Tui) -> Result<()> {
        while let Ok(action) = self.action_rx.try_recv() {
            if !matches!(action, Action::Tick | Action::Render) {
                trace!("handle_actions: {action:?}");
            }
            match action {
                Action::Quit => self.should_quit = true,
                Action::Suspend => self.should_suspend = true,
                Action::Resume => self.should_suspend = false,
                Action::ClearScreen => tui.terminal.clear()?,
                Action::Resize(w, h) => self.handle_resize(tui, w, h)?,
                Action::Render => self.render(tui)?,
                Action::Reload => {
                    let action = reload(&self.args.results);
                    if let Action::Loaded(ref result) = action {
                        self.result = Arc::clone(result);
                    }
                    self.action_tx.send(action)?;
                }
                Action::QueryScheduled(ref query) => {
                    self.scheduled.push(query.as_ref().clone());
                    debug!("{} queries scheduled in this session", self.scheduled.len());
                }
                _ => {}
            }
            if let Some(action) = self.root.update(action)? {
                self.action_tx.send(action)?
            };
        }
        Ok(())
    }

    fn handle_resize(&mut self, tui: &mut Tui, w: u16, h: u16) -> Result<()> {
        tui.resize(Rect::new(0, 0, w, h))?;
        self.render(tui)?;
        Ok(())
    }

    fn render(&mut self, tui: &mut Tui) -> Result<()> {
        tui.draw(|frame| {
            if let Err(err) = self.root.draw(frame, frame.area()) {
                let _ = self.action_tx.send(Action::Error(("Failed to draw", err).into()));
            }
        })?;
        Ok(())
    }
}

/// Re-reads the result file, answering with `Loaded` or with the error to show.
fn reload(path: &Path) -> Action {
    if path.as_os_str() == "-" {
        return Action::Error(("Reload failed", "results read from stdin cannot be reloaded").into());
    }
    match QueryResult::from_path(path) {
        Ok(result) => {
            info!(path = %path.display(), rows = result.rows.len(), "Results reloaded");
            Action::Loaded(Arc::new(result))
        }
        Err(err) => {
            warn!("Fail to reload results: {err:?}");
            Action::Error(("Reload failed", err).into())
        }
    }
}
