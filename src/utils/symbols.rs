#[allow(unused)]
pub mod arrow {
    pub const UP: &str = "↑";
    pub const DOWN: &str = "↓";
    pub const LEFT: &str = "←";
    pub const RIGHT: &str = "→";
}

/// Sort direction markers in column headers, choice markers in forms
pub mod triangle {
    pub const UP: &str = "▲";
    pub const DOWN: &str = "▼";
    pub const LEFT: &str = "◀";
    pub const RIGHT: &str = "▶";
}

pub mod dot {
    pub const RED_LARGE: &str = "🔴";
}

/// Shown in the grid for null cells
pub const NULL: &str = "NULL";
