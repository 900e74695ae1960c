pub mod columns;
pub mod date_expr;
pub mod row_filter;
pub mod sql_highlight;
pub mod symbols;
pub mod text_ui;
