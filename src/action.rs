use std::sync::Arc;

use crate::components::ComponentId;
use crate::error::UserError;
use crate::models::query_result::QueryResult;
use crate::models::scheduled_query::ScheduledQuery;
use crate::widgets::shortcut::Shortcut;

#[derive(Debug, Clone)]
pub enum Action {
    Tick,
    Render,
    Resize(u16, u16),
    Suspend,
    Resume,
    Quit,
    ClearScreen,
    Error(UserError),
    Help,
    Focus(ComponentId),
    Unfocus,
    Shortcuts(Vec<Shortcut>),

    // results
    SearchInputSet(Option<String>),
    SearchInputChanged(Option<String>),
    Reload,
    Loaded(Arc<QueryResult>),

    // modals
    ShowSql,
    ScheduleQuery,
    QueryScheduled(Box<ScheduledQuery>),
}
